use clap::{Parser, ValueEnum};
use osdtree::state::request::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    Basic,
    Random,
}

/// A request given on the command line as `x,y` or `x,y:expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointArg {
    pub point: Point,
    pub expr: Option<String>,
}

pub fn parse_point_arg(s: &str) -> Result<PointArg, String> {
    let (coords, expr) = match s.split_once(':') {
        Some((coords, expr)) => (coords, Some(expr.trim().to_string())),
        None => (s, None),
    };
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{coords}'"))?;
    let parse = |v: &str| match v.trim().parse::<f64>() {
        Ok(c) if c.is_finite() => Ok(c),
        Ok(_) => Err(format!("coordinate '{v}' is not finite")),
        Err(e) => Err(format!("bad coordinate '{v}': {e}")),
    };
    Ok(PointArg {
        point: Point::new(parse(x)?, parse(y)?),
        expr,
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "osdtree",
    about = "Run an online-service-with-delay scenario on an HST",
    version
)]
pub struct Cli {
    #[arg(long, value_enum, default_value_t = ScenarioKind::Basic)]
    pub scenario: ScenarioKind,

    /// Seed for the random scenario.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of requests in the random scenario.
    #[arg(long, default_value_t = 20)]
    pub points: usize,

    #[arg(long, default_value_t = 600)]
    pub ticks: usize,

    #[arg(long = "tick-ms", default_value_t = 100)]
    pub tick_ms: u64,

    /// Cluster radius multiplier.
    #[arg(long)]
    pub beta: Option<f64>,

    #[arg(long)]
    pub lazy: bool,

    /// Serviced requests leave instead of waiting again.
    #[arg(long = "single-servicing")]
    pub single_servicing: bool,

    /// Extra request, `x,y` or `x,y:expr` (e.g. `3,4:2x^2+1`). Repeatable.
    #[arg(long = "point", value_parser = parse_point_arg)]
    pub points_extra: Vec<PointArg>,
}

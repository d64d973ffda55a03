use crate::cli::{Cli, ScenarioKind};
use clap::Parser;
use osdtree::approximation::builder::ApproximationOptions;
use osdtree::config::SessionConfig;
use osdtree::error::OsdResult;
use osdtree::scenario::basic::BasicScenario;
use osdtree::scenario::random::RandomScenario;
use osdtree::scenario::scenario::{Scenario, populate};
use osdtree::simulation::session::Session;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

fn main() -> OsdResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> OsdResult<()> {
    let scenario: Box<dyn Scenario> = match cli.scenario {
        ScenarioKind::Basic => Box::new(BasicScenario::new()),
        ScenarioKind::Random => Box::new(RandomScenario::new(cli.seed, cli.points)),
    };

    let defaults = scenario.options();
    let config = SessionConfig {
        approximation: ApproximationOptions {
            beta_coefficient: cli.beta.unwrap_or(defaults.beta_coefficient),
            lazy: cli.lazy || defaults.lazy,
        },
        single_servicing: cli.single_servicing,
        ..SessionConfig::default()
    };

    let mut session = Session::new(config);
    populate(&mut session, scenario.as_ref());
    for extra in &cli.points_extra {
        match &extra.expr {
            Some(expr) => session.add_request_expr(extra.point, expr)?,
            None => session.add_request(extra.point, None),
        };
    }
    info!(scenario = scenario.name(), requests = session.requests().len(), "session ready");

    let dt = Duration::from_millis(cli.tick_ms);
    for _ in 0..cli.ticks {
        if session.tick(dt)?.is_some() {
            session.apply_pending();
        }
    }

    print_summary(&session, scenario.name());
    Ok(())
}

fn print_summary(session: &Session, name: &str) {
    let tree = session.tree();
    let metric = tree.metric_info();
    println!("scenario        {name}");
    println!("simulated       {:.1}s", session.clock().as_secs_f64());
    println!(
        "tree            {} nodes, {} edges, diameter {:.2}, max radius {:.2}",
        tree.node_count(),
        tree.edge_count(),
        metric.diameter,
        metric.max_cluster_radius
    );
    println!("services        {}", session.services());
    println!(
        "server          {} ({} moves, {:.2} travelled)",
        session.trail().current().key,
        session.trail().positions().len() - 1,
        session.trail().distance_travelled()
    );
    println!();
    println!("{:>4}  {:>16}  {:>14}  {:>8}  state", "id", "point", "penalty", "waited");
    for request in session.requests() {
        let live = session.request(request.id()).unwrap_or(request);
        let penalty = live
            .penalty()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "x".to_string());
        println!(
            "{:>4}  {:>16}  {:>14}  {:>7.1}s  {:?}",
            live.id().0,
            format!("({:.1}, {:.1})", live.point().x, live.point().y),
            penalty,
            live.elapsed(),
            live.lifecycle()
        );
    }
}

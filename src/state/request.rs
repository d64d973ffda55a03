use crate::simulation::penalty::Penalty;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(pub u32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    Pending,
    Serviced,
}

/// A marked point waiting for the server.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Request {
    id: RequestId,
    point: Point,
    lifecycle: Lifecycle,
    /// `None` falls back to the engine's default penalty.
    penalty: Option<Penalty>,
    /// seconds already consumed by the penalty function, >= 0.0
    elapsed: f64,
}

impl Request {
    pub fn new(id: RequestId, point: Point) -> Self {
        Self {
            id,
            point,
            lifecycle: Lifecycle::Pending,
            penalty: None,
            elapsed: 0.0,
        }
    }

    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = Some(penalty);
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_pending(&self) -> bool {
        self.lifecycle == Lifecycle::Pending
    }

    pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub fn penalty(&self) -> Option<&Penalty> {
        self.penalty.as_ref()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn set_elapsed(&mut self, elapsed: f64) {
        self.elapsed = elapsed.max(0.0);
    }

    /// Moves the cursor forward by `dt` seconds and returns the penalty
    /// accrued over that window.
    pub fn consume(&mut self, dt: f64, default_penalty: &Penalty) -> f64 {
        let penalty = self.penalty.as_ref().unwrap_or(default_penalty);
        let injected = penalty.evaluate(self.elapsed + dt) - penalty.evaluate(self.elapsed);
        self.elapsed += dt;
        // decreasing penalties never drain an edge
        injected.max(0.0)
    }
}

use crate::scenario::scenario::Scenario;
use crate::simulation::penalty::{Penalty, Term};
use crate::state::request::Point;

/// Two tight neighbourhoods and one straggler, with mixed penalties.
pub struct BasicScenario {
    requests: Vec<(Point, Penalty)>,
}

impl BasicScenario {
    pub fn new() -> Self {
        let linear = |c| Penalty::Polynomial(vec![Term::new(c, 1)]);
        let requests = vec![
            (Point::new(0.0, 0.0), Penalty::Identity),
            (Point::new(1.5, 0.5), linear(2.0)),
            (Point::new(10.0, 0.0), Penalty::Identity),
            (
                Point::new(11.0, 1.0),
                Penalty::Polynomial(vec![Term::new(1.0, 2)]),
            ),
            (Point::new(30.0, 5.0), linear(0.5)),
            (
                Point::new(-12.0, 20.0),
                Penalty::Polynomial(vec![Term::new(1.0, 2), Term::new(1.0, 1)]),
            ),
        ];
        Self { requests }
    }
}

impl Default for BasicScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for BasicScenario {
    fn name(&self) -> &str {
        "basic"
    }

    fn requests(&self) -> Vec<(Point, Penalty)> {
        self.requests.clone()
    }
}

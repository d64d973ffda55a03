use crate::scenario::scenario::Scenario;
use crate::simulation::penalty::{Penalty, Term};
use crate::state::request::Point;
use rand::{Rng, SeedableRng, rngs::StdRng};

pub struct RandomScenario {
    seed: u64,
    count: usize,
    extent: f64,
}

impl RandomScenario {
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            seed,
            count,
            extent: 100.0,
        }
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }
}

impl Scenario for RandomScenario {
    fn name(&self) -> &str {
        "random"
    }

    /// Same seed, same requests.
    fn requests(&self) -> Vec<(Point, Penalty)> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|_| {
                let point = Point::new(
                    rng.gen_range(0.0..self.extent),
                    rng.gen_range(0.0..self.extent),
                );
                let penalty = match rng.gen_range(0..3) {
                    0 => Penalty::Identity,
                    1 => Penalty::Polynomial(vec![Term::new(rng.gen_range(0.5..2.0), 1)]),
                    _ => Penalty::Polynomial(vec![
                        Term::new(rng.gen_range(0.1..0.5), 2),
                        Term::new(rng.gen_range(0.5..1.0), 1),
                    ]),
                };
                (point, penalty)
            })
            .collect()
    }
}

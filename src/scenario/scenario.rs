use crate::approximation::builder::ApproximationOptions;
use crate::simulation::penalty::Penalty;
use crate::simulation::session::Session;
use crate::state::request::{Point, RequestId};

pub trait Scenario {
    fn name(&self) -> &str;
    fn requests(&self) -> Vec<(Point, Penalty)>;

    fn options(&self) -> ApproximationOptions {
        ApproximationOptions::default()
    }
}

/// Adds every scenario request to `session`, in scenario order.
pub fn populate(session: &mut Session, scenario: &dyn Scenario) -> Vec<RequestId> {
    scenario
        .requests()
        .into_iter()
        .map(|(point, penalty)| session.add_request(point, Some(penalty)))
        .collect()
}

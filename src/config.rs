use crate::approximation::builder::ApproximationOptions;
use crate::simulation::penalty::Penalty;
use std::time::Duration;

/// Synthetic clock used while forwarding time inside an overloaded subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForwardingConfig {
    pub increment: Duration,
    /// upper bound on synthetic increments per forwarding call
    pub max_steps: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            increment: Duration::from_millis(100),
            max_steps: 10_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SessionConfig {
    pub approximation: ApproximationOptions,
    /// Serviced requests leave the system instead of waiting again.
    pub single_servicing: bool,
    pub forwarding: ForwardingConfig,
    /// Penalty for requests that were added without one.
    pub default_penalty: Penalty,
}

pub mod basic;
pub mod random;
#[allow(clippy::module_inception)]
pub mod scenario;

pub mod edge;
#[cfg(test)]
pub mod fixtures;
pub mod node;
#[allow(clippy::module_inception)]
pub mod tree;

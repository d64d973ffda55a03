pub mod builder;
pub mod cluster;

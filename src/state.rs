pub mod edge_state;
pub mod request;
pub mod server;
pub mod snapshot;

pub mod forwarding;
pub mod resolver;
pub mod subtree;

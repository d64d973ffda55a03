pub mod engine;
pub mod expression;
pub mod penalty;
pub mod session;

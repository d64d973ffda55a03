//! Crate error type.
//!
//! Unreachable paths are not errors: lookups that find no route return an
//! empty result and the caller simply makes no decision this cycle.

use thiserror::Error;

use crate::simulation::expression::ExpressionError;
use crate::state::request::RequestId;
use crate::tree::node::NodeKey;

#[derive(Debug, Error)]
pub enum OsdError {
    /// A leaf has no incoming edge. The tree and the engine disagree about
    /// its structure; the current pass is aborted.
    #[error("malformed tree: leaf {node} has no incoming edge")]
    MalformedTree { node: NodeKey },

    #[error("invalid penalty expression: {0}")]
    Expression(#[from] ExpressionError),

    #[error("request {0} not found")]
    UnknownRequest(RequestId),
}

pub type OsdResult<T> = Result<T, OsdError>;

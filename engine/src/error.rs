use crate::node::NodeId;
use thiserror::Error;

/// Errors raised while validating, evaluating or simulating a tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("malformed tree at node {node}: {reason}")]
    MalformedTree { node: NodeId, reason: String },

    #[error("invalid strategy at decision node {node}: {reason}")]
    InvalidStrategy { node: NodeId, reason: String },

    #[error("cannot sample chance node {node}: {reason}")]
    SamplingDegenerate { node: NodeId, reason: String },
}

impl Error {
    pub(crate) fn malformed(node: NodeId, reason: impl Into<String>) -> Self {
        Error::MalformedTree {
            node,
            reason: reason.into(),
        }
    }

    pub(crate) fn strategy(node: NodeId, reason: impl Into<String>) -> Self {
        Error::InvalidStrategy {
            node,
            reason: reason.into(),
        }
    }

    /// Node the error refers to
    pub fn node(&self) -> NodeId {
        match self {
            Error::MalformedTree { node, .. } => *node,
            Error::InvalidStrategy { node, .. } => *node,
            Error::SamplingDegenerate { node, .. } => *node,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

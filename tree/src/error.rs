use arbor_engine::NodeId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing trees
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{} already exists; refusing to overwrite", .0.display())]
    Conflict(PathBuf),

    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("node {node} cannot be written: {reason}")]
    Unrepresentable { node: NodeId, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Tree(#[from] arbor_engine::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        PersistError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Nothing is caught or retried inside the
//! crate; every error goes straight back to the caller.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Hierarchy request error: cannot append node {child} to node {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomError {
    /// The error raised when a build argument is neither a list nor a mapping
    pub(crate) fn unsupported_argument(kind: &str) -> Self {
        DomError::InvalidArgument(format!(
            "unsupported argument type for element construction: {kind}"
        ))
    }
}

//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Names follow the DOM exceptions they model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Node {child} is not a child of node {parent}")]
    NotFound { parent: u32, child: u32 },

    #[error("Invalid character in name: {0:?}")]
    InvalidCharacter(String),

    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("Markup assignment requires a TrustedHTML value")]
    TrustedTypesRequired,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

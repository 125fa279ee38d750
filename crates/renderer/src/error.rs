//! Error types owned by the renderer layer
//!
//! Host tree failures are not wrapped: they surface as the host's own error
//! type. Only policy negotiation and configuration have errors of their own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy with this name exists and duplicates are not allowed
    #[error("Policy {0:?} already exists")]
    Duplicate(String),

    #[error("Policy {name:?} rejected: {reason}")]
    Rejected { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid renderer config: {0}")]
    Parse(#[from] serde_json::Error),
}

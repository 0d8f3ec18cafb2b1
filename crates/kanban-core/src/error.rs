//! Store-level errors
//!
//! What callers of `BoardStore` observe. Gateway failures are folded into
//! this taxonomy at the store boundary. Display strings are the
//! user-facing messages (server-provided text wins where there is one).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Common result type for store operations
pub type KanbanResult<T> = Result<T, KanbanError>;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum KanbanError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ValidationFailed(String),
    #[error("Session expired: {0}")]
    Unauthorized(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("{0}")]
    Server(String),
}

impl KanbanError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound(format!("{} {} not found", kind, id))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

impl From<GatewayError> for KanbanError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(msg) => Self::NotFound(msg),
            GatewayError::ValidationFailed(msg) => Self::ValidationFailed(msg),
            GatewayError::Unauthorized(msg) => Self::Unauthorized(msg),
            GatewayError::Network(msg) => Self::Network(msg),
            GatewayError::Server { message, .. } => Self::Server(message),
        }
    }
}

//! Remote Board Gateway
//!
//! Translates store intents into calls against the remote Board Store.
//! One method per intent, no business rules. Implementations can use HTTP,
//! an in-process store, etc.

mod http;
mod memory;
pub mod wire;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Board, BoardPatch, BoardSummary, Card, CardTarget, CardUpdate, Comment, List, ListPatch,
    NewBoard, NewCard, NewComment, NewList,
};

pub use http::{HttpGateway, API_PREFIX};
pub use memory::{GatewayOp, MemoryGateway};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures surfaced by a gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
}

impl GatewayError {
    /// Map a non-success HTTP status to the taxonomy
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => Self::ValidationFailed(message),
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            _ => Self::Server { status, message },
        }
    }
}

/// Board Store operations
///
/// Futures are not required to be `Send`: in the browser they run on the
/// single-threaded event loop.
#[async_trait(?Send)]
pub trait BoardGateway: Send + Sync {
    /// Board summaries the user may open (no lists/cards)
    async fn list_boards(&self) -> GatewayResult<Vec<BoardSummary>>;

    /// One board with its full list/card tree
    async fn get_board(&self, board_id: &str) -> GatewayResult<Board>;

    async fn create_board(&self, input: &NewBoard) -> GatewayResult<Board>;

    async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> GatewayResult<Board>;

    /// Soft-delete; returns the server's confirmation message
    async fn archive_board(&self, board_id: &str) -> GatewayResult<String>;

    async fn create_list(&self, board_id: &str, input: &NewList) -> GatewayResult<List>;

    async fn update_list(&self, list_id: &str, patch: &ListPatch) -> GatewayResult<List>;

    async fn create_card(&self, list_id: &str, input: &NewCard) -> GatewayResult<Card>;

    async fn update_card(&self, card_id: &str, update: &CardUpdate) -> GatewayResult<Card>;

    /// Persist a card move; returns the card with its new list/position
    async fn move_card(&self, card_id: &str, target: &CardTarget) -> GatewayResult<Card>;

    async fn add_comment(&self, card_id: &str, input: &NewComment) -> GatewayResult<Comment>;

    async fn delete_comment(&self, comment_id: &str) -> GatewayResult<String>;
}

//! Observable store state

use crate::domain::{Board, BoardSummary};

/// What subscribers see after every transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    /// Board index (summaries only)
    pub boards: Vec<BoardSummary>,
    /// The open board with its full list/card tree
    pub current: Option<Board>,
    /// True while any operation is pending
    pub loading: bool,
    /// Last failure message; cleared when the next operation starts
    pub error: Option<String>,
    /// Set when the server rejected the session token
    pub session_expired: bool,
    /// Bumped on every change to `current`
    pub revision: u64,
}

impl BoardState {
    pub fn current_board_id(&self) -> Option<&str> {
        self.current.as_ref().map(|board| board.id.as_str())
    }

    pub(crate) fn is_current(&self, board_id: &str) -> bool {
        self.current_board_id() == Some(board_id)
    }
}

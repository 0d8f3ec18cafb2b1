//! Reactive Board State
//!
//! Mirror of the `kanban_core` store in a reactive_stores `Store`, so views
//! subscribe field by field instead of to the whole board.

use kanban_core::domain::{Board, BoardSummary, Card, List};
use kanban_core::BoardState;
use leptos::prelude::*;
use reactive_stores::Store;

/// UI copy of the board store state
#[derive(Clone, Debug, Default, Store)]
pub struct UiState {
    /// Active boards for the tab bar
    pub boards: Vec<BoardSummary>,
    /// Open board with its lists and cards
    pub current: Option<Board>,
    pub loading: bool,
    /// Message of the last failed operation
    pub error: Option<String>,
    pub session_expired: bool,
}

/// Type alias for the store
pub type UiStore = Store<UiState>;

/// Get the UI store from context
pub fn use_ui_store() -> UiStore {
    expect_context::<UiStore>()
}

/// Copy a store snapshot in, writing only the fields that changed
pub fn sync_from(store: &UiStore, state: &BoardState) {
    if store.boards().with_untracked(|boards| boards != &state.boards) {
        *store.boards().write() = state.boards.clone();
    }
    if store.current().with_untracked(|current| current != &state.current) {
        *store.current().write() = state.current.clone();
    }
    if store.loading().get_untracked() != state.loading {
        *store.loading().write() = state.loading;
    }
    if store.error().with_untracked(|error| error != &state.error) {
        *store.error().write() = state.error.clone();
    }
    if store.session_expired().get_untracked() != state.session_expired {
        *store.session_expired().write() = state.session_expired;
    }
}

pub fn current_board_id(store: &UiStore) -> Option<String> {
    store.current().with(|current| current.as_ref().map(|b| b.id.clone()))
}

/// List of the open board by id
pub fn find_list(store: &UiStore, list_id: &str) -> Option<List> {
    store.current().with(|current| current.as_ref()?.list(list_id).cloned())
}

/// Card of the open board by id
pub fn find_card(store: &UiStore, card_id: &str) -> Option<Card> {
    store.current().with(|current| current.as_ref()?.card(card_id).cloned())
}

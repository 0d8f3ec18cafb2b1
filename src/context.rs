//! Application Context
//!
//! Shared handles provided via Leptos Context API. Board operations run on
//! `spawn_local`; their failures land in the store's `error` field, which
//! the error banner shows, so callers here ignore the results.

use std::future::Future;
use std::sync::Arc;

use kanban_core::domain::{CardPatch, CardTarget, Comment, NewBoard, NewCard, NewList};
use kanban_core::drag::{CollisionStrategy, DragIntent};
use kanban_core::BoardStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::DndSignals;
use tracing::debug;

#[derive(Clone)]
pub struct BoardContext {
    pub store: Arc<BoardStore>,
    pub dnd: DndSignals,
    pub collision: CollisionStrategy,
    /// Card shown in the editor panel
    pub editing_card: RwSignal<Option<String>>,
}

impl BoardContext {
    pub fn new(store: Arc<BoardStore>, dnd: DndSignals) -> Self {
        let collision = store.config().collision;
        Self {
            store,
            dnd,
            collision,
            editing_card: RwSignal::new(None),
        }
    }

    fn spawn<F, Fut>(&self, op: F)
    where
        F: FnOnce(Arc<BoardStore>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        spawn_local(op(self.store.clone()));
    }

    pub fn open_board(&self, board_id: String) {
        self.editing_card.set(None);
        self.spawn(move |store| async move {
            let _ = store.load_board(&board_id).await;
        });
    }

    /// Create a board and open it
    pub fn create_board(&self, title: String) {
        self.editing_card.set(None);
        self.spawn(move |store| async move {
            let input = NewBoard {
                title,
                ..Default::default()
            };
            if let Ok(board) = store.create_board(&input).await {
                let _ = store.load_board(&board.id).await;
            }
        });
    }

    pub fn archive_board(&self, board_id: String) {
        self.editing_card.set(None);
        self.spawn(move |store| async move {
            if store.archive_board(&board_id).await.is_ok() {
                let next = store.snapshot().boards.first().map(|b| b.id.clone());
                if let Some(next) = next {
                    let _ = store.load_board(&next).await;
                }
            }
        });
    }

    pub fn create_list(&self, board_id: String, title: String) {
        self.spawn(move |store| async move {
            let _ = store.create_list(&board_id, &NewList { title }).await;
        });
    }

    pub fn rename_list(&self, list_id: String, title: String) {
        self.spawn(move |store| async move {
            let _ = store.update_list(&list_id, &title).await;
        });
    }

    pub fn create_card(&self, list_id: String, title: String) {
        self.spawn(move |store| async move {
            let input = NewCard {
                title,
                ..Default::default()
            };
            let _ = store.create_card(&list_id, &input).await;
        });
    }

    pub fn update_card(&self, card_id: String, patch: CardPatch) {
        if patch.is_empty() {
            return;
        }
        self.spawn(move |store| async move {
            let _ = store.update_card(&card_id, &patch).await;
        });
    }

    /// Archive a list; an open editor for one of its cards closes with it
    pub fn archive_list(&self, list_id: String) {
        self.spawn(move |store| async move {
            let _ = store.archive_list(&list_id).await;
        });
    }

    pub fn archive_card(&self, card_id: String) {
        if self.editing_card.get_untracked().as_deref() == Some(card_id.as_str()) {
            self.editing_card.set(None);
        }
        self.spawn(move |store| async move {
            let _ = store.archive_card(&card_id).await;
        });
    }

    /// Post a comment; `added` receives the stored comment
    pub fn add_comment(&self, card_id: String, content: String, added: WriteSignal<Vec<Comment>>) {
        self.spawn(move |store| async move {
            if let Ok(comment) = store.add_comment(&card_id, &content).await {
                added.update(|comments| comments.push(comment));
            }
        });
    }

    pub fn delete_comment(&self, comment_id: String, removed: WriteSignal<Vec<Comment>>) {
        self.spawn(move |store| async move {
            if store.delete_comment(&comment_id).await.is_ok() {
                removed.update(|comments| comments.retain(|c| c.id != comment_id));
            }
        });
    }

    /// Persist the move a finished drag asked for
    pub fn apply_intent(&self, intent: DragIntent) {
        debug!(?intent, "Drop");
        match intent {
            DragIntent::MoveCard { card_id, target } => self.move_card(card_id, target),
            DragIntent::MoveList { list_id, position } => {
                self.spawn(move |store| async move {
                    let _ = store.move_list(&list_id, position).await;
                });
            }
        }
    }

    pub fn move_card(&self, card_id: String, target: CardTarget) {
        self.spawn(move |store| async move {
            let _ = store.move_card(&card_id, &target).await;
        });
    }
}

pub fn use_board_context() -> BoardContext {
    use_context::<BoardContext>().expect("BoardContext should be provided")
}

//! Kanban Board App
//!
//! Wires the board store to the reactive mirror, binds the document-level
//! drag handlers and lays out tab bar, board and card editor.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use kanban_core::domain::{Board, Card, List};
use kanban_core::drag::{DragActivation, DragController, DragEvent};
use kanban_core::{BoardGateway, BoardStore, HttpGateway, KanbanConfig, MemoryGateway};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_global_drag_handlers, create_dnd_signals, DropInfo};
use reactive_stores::Store;
use tracing::{info, warn};

use crate::components::{BoardTabBar, BoardView, CardEditor, ErrorBanner};
use crate::context::BoardContext;
use crate::store::{sync_from, UiState, UiStateStoreFields};

/// Local storage key holding the JSON client config
const CONFIG_KEY: &str = "kanban.config";

fn load_config() -> KanbanConfig {
    let stored = web_sys::window()
        .and_then(|win| win.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(CONFIG_KEY).ok().flatten());
    match stored {
        Some(json) => KanbanConfig::from_json(&json).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring stored config");
            KanbanConfig::default()
        }),
        None => KanbanConfig::default(),
    }
}

fn build_gateway(config: &KanbanConfig) -> Arc<dyn BoardGateway> {
    if config.is_offline() {
        info!("No API configured, using the in-memory demo board");
        Arc::new(MemoryGateway::with_boards([demo_board()]))
    } else {
        info!(api = %config.api_base_url, "Using remote board API");
        Arc::new(HttpGateway::from_config(config))
    }
}

fn demo_board() -> Board {
    let mut board = Board::new("demo", "Staffing pipeline");
    board.description = Some("Open requests from partner facilities".to_string());
    let columns: [(&str, &str, &[&str]); 3] = [
        ("demo-open", "Open requests", &["ICU night shift", "ER weekend cover", "Pediatrics float"]),
        ("demo-credentialing", "Credentialing", &["License check: RN Alvarez"]),
        ("demo-placed", "Placed", &[]),
    ];
    for (position, (list_id, title, cards)) in columns.into_iter().enumerate() {
        let mut list = List::new(list_id, "demo", title, position as i32);
        for (index, card_title) in cards.iter().enumerate() {
            let card_id = format!("{}-{}", list_id, index + 1);
            list.cards.push(Card::new(card_id, list_id, *card_title, index as i32));
        }
        board.lists.push(list);
    }
    board
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let board_store = Arc::new(BoardStore::new(build_gateway(&config), config.clone()));

    // Reactive mirror of the board store
    let ui = Store::new(UiState::default());
    provide_context(ui);
    sync_from(&ui, &board_store.snapshot());
    board_store.subscribe(move |state| sync_from(&ui, state));

    let ctx = BoardContext::new(board_store.clone(), create_dnd_signals());
    provide_context(ctx.clone());

    // Document-level drag handling
    let controller = Rc::new(RefCell::new(DragController::new()));
    let start_controller = controller.clone();
    let cancel_controller = controller.clone();
    let drop_ctx = ctx.clone();
    bind_global_drag_handlers(
        ctx.dnd,
        DragActivation::new(config.drag_threshold_px),
        move |subject_id| {
            start_controller.borrow_mut().on_drag_start(subject_id);
        },
        move |drop: DropInfo| {
            let Some(board) = ui.current().get_untracked() else {
                controller.borrow_mut().cancel();
                return;
            };
            let over_id = drop.target(&board, drop_ctx.collision);
            let event = DragEvent::new(drop.subject_id, over_id);
            let intent = controller.borrow_mut().on_drag_end(&event, &board);
            if let Some(intent) = intent {
                drop_ctx.apply_intent(intent);
            }
        },
        move || cancel_controller.borrow_mut().cancel(),
    );

    // Initial load: board index, then the first board
    let boot = board_store.clone();
    spawn_local(async move {
        if let Ok(boards) = boot.load_boards().await {
            if let Some(first) = boards.first() {
                let _ = boot.load_board(&first.id).await;
            }
        }
    });

    view! {
        <div class="app-layout">
            <main class="main-content">
                <BoardTabBar />
                <ErrorBanner />
                <BoardView />
            </main>
            <CardEditor />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::ordering::check_invariants;

    #[test]
    fn test_demo_board_is_well_formed() {
        let board = demo_board();
        assert_eq!(board.lists.len(), 3);
        assert!(check_invariants(&board).is_ok());
        assert!(board.lists[2].cards.is_empty());
    }
}

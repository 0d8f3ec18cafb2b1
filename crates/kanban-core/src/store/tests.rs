use std::sync::{Arc, Mutex, Weak};

use super::*;
use crate::gateway::{GatewayError, GatewayOp, MemoryGateway};

fn board_with(lists: &[(&str, &[&str])]) -> Board {
    let mut board = Board::new("b1", "Board1");
    for (list_pos, (list_id, cards)) in lists.iter().enumerate() {
        let mut list = List::new(*list_id, "b1", list_id.to_uppercase(), list_pos as i32);
        for (pos, card_id) in cards.iter().enumerate() {
            list.cards.push(Card::new(*card_id, *list_id, *card_id, pos as i32));
        }
        board.lists.push(list);
    }
    board
}

fn default_board() -> Board {
    board_with(&[("l1", &["c1", "c2", "c3"]), ("l2", &[])])
}

fn config(reconcile: bool) -> KanbanConfig {
    KanbanConfig {
        reconcile_after_move: reconcile,
        ..Default::default()
    }
}

async fn open(board: Board, reconcile: bool) -> (MemoryGateway, BoardStore) {
    let gw = MemoryGateway::with_boards([board]);
    let store = BoardStore::new(Arc::new(gw.clone()), config(reconcile));
    store.load_board("b1").await.unwrap();
    (gw, store)
}

fn current(store: &BoardStore) -> Board {
    store.snapshot().current.expect("board should be open")
}

fn card_ids(board: &Board, list_id: &str) -> Vec<String> {
    board
        .list(list_id)
        .map(|l| l.cards.iter().map(|c| c.id.clone()).collect())
        .unwrap_or_default()
}

/// Yield until the gateway has seen `n` calls of `op`
async fn wait_for_calls(gw: &MemoryGateway, op: GatewayOp, n: usize) {
    for _ in 0..1000 {
        if gw.call_count(op) >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("gateway never received {} {:?} calls", n, op);
}

#[tokio::test]
async fn test_load_boards_and_board() {
    let gw = MemoryGateway::with_boards([default_board()]);
    let store = BoardStore::new(Arc::new(gw), KanbanConfig::default());

    let boards = store.load_boards().await.unwrap();
    assert_eq!(boards.len(), 1);

    let board = store.load_board("b1").await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.current.as_ref(), Some(&board));
    assert_eq!(state.boards[0].title, "Board1");
    assert!(!state.loading);
    assert!(state.error.is_none());
    ordering::check_invariants(&board).unwrap();
}

#[tokio::test]
async fn test_load_board_drops_archived_entities() {
    let mut board = default_board();
    board.lists[0].cards[1].archived = true;
    let mut archived = List::new("l9", "b1", "Old", 9);
    archived.archived = true;
    board.lists.push(archived);
    let gw = MemoryGateway::with_boards([board]);
    let store = BoardStore::new(Arc::new(gw), KanbanConfig::default());

    let loaded = store.load_board("b1").await.unwrap();

    assert_eq!(loaded.lists.len(), 2);
    assert_eq!(card_ids(&loaded, "l1"), vec!["c1", "c3"]);
    ordering::check_invariants(&loaded).unwrap();
}

#[tokio::test]
async fn test_switch_to_missing_board_closes_current() {
    let (_gw, store) = open(default_board(), true).await;

    let err = store.load_board("nope").await.unwrap_err();

    assert!(matches!(err, KanbanError::NotFound(_)));
    let state = store.snapshot();
    assert!(state.current.is_none());
    assert_eq!(state.error.as_deref(), Some("Board not found"));
}

#[tokio::test]
async fn test_failed_refresh_keeps_board() {
    let (gw, store) = open(default_board(), true).await;
    gw.fail_next(GatewayOp::GetBoard, GatewayError::Network("offline".into()));

    assert!(store.load_board("b1").await.is_err());

    let state = store.snapshot();
    assert_eq!(state.current_board_id(), Some("b1"));
    assert_eq!(state.error.as_deref(), Some("Network error: offline"));
}

#[tokio::test]
async fn test_load_boards_failure_leaves_index_empty() {
    let gw = MemoryGateway::with_boards([default_board()]);
    let store = BoardStore::new(Arc::new(gw.clone()), KanbanConfig::default());
    store.load_boards().await.unwrap();
    gw.fail_next(
        GatewayOp::ListBoards,
        GatewayError::Server {
            status: 502,
            message: "Bad Gateway".into(),
        },
    );

    assert!(store.load_boards().await.is_err());

    let state = store.snapshot();
    assert!(state.boards.is_empty());
    assert_eq!(state.error.as_deref(), Some("Bad Gateway"));
}

#[tokio::test]
async fn test_end_to_end_move_with_reconciliation() {
    let board = board_with(&[("L1", &["Card1", "Card2", "Card3"]), ("L2", &[])]);
    let (gw, store) = open(board, true).await;

    store
        .move_card("Card2", &CardTarget::new("L2", 0))
        .await
        .unwrap();

    let board = current(&store);
    assert_eq!(card_ids(&board, "L1"), vec!["Card1", "Card3"]);
    assert_eq!(card_ids(&board, "L2"), vec!["Card2"]);
    assert_eq!(board.card("Card3").map(|c| c.position), Some(1));
    assert_eq!(board.card("Card2").map(|c| c.position), Some(0));
    assert_eq!(gw.call_count(GatewayOp::GetBoard), 2);
    assert_eq!(Some(board), gw.board("b1"));
}

#[tokio::test]
async fn test_failed_move_rolls_back() {
    let (gw, store) = open(board_with(&[("A", &["c1", "c2"]), ("B", &[])]), true).await;
    let before = current(&store);
    gw.fail_next(GatewayOp::MoveCard, GatewayError::Network("connection reset".into()));

    let err = store.move_card("c1", &CardTarget::new("B", 0)).await.unwrap_err();

    assert_eq!(err, KanbanError::Network("connection reset".into()));
    let state = store.snapshot();
    assert_eq!(state.current, Some(before));
    assert_eq!(state.error.as_deref(), Some("Network error: connection reset"));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_move_position_is_clamped_before_persisting() {
    let (gw, store) = open(board_with(&[("A", &["c1"]), ("B", &["x", "y"])]), false).await;

    let card = store.move_card("c1", &CardTarget::new("B", 99)).await.unwrap();

    assert_eq!(card.position, 2);
    assert_eq!(card_ids(&current(&store), "B"), vec!["x", "y", "c1"]);
    let server = gw.board("b1").unwrap();
    assert_eq!(card_ids(&server, "B"), vec!["x", "y", "c1"]);
}

#[tokio::test]
async fn test_same_position_move_still_round_trips() {
    let (gw, store) = open(default_board(), true).await;
    let before = current(&store);

    store.move_card("c2", &CardTarget::new("l1", 1)).await.unwrap();

    assert_eq!(gw.call_count(GatewayOp::MoveCard), 1);
    assert_eq!(current(&store), before);
}

#[tokio::test]
async fn test_move_unknown_card_is_not_found() {
    let (gw, store) = open(default_board(), true).await;
    let revision = store.snapshot().revision;

    let err = store.move_card("ghost", &CardTarget::new("l2", 0)).await.unwrap_err();

    assert!(matches!(err, KanbanError::NotFound(_)));
    assert_eq!(store.snapshot().revision, revision);
    assert_eq!(gw.call_count(GatewayOp::MoveCard), 0);
}

#[tokio::test]
async fn test_optimistic_state_visible_before_response() {
    let (gw, store) = open(default_board(), false).await;
    let gate = gw.hold_next(GatewayOp::MoveCard);

    let target = CardTarget::new("l2", 0);
    let (result, _) = tokio::join!(store.move_card("c2", &target), async {
        wait_for_calls(&gw, GatewayOp::MoveCard, 1).await;
        let state = store.snapshot();
        let board = state.current.as_ref().unwrap();
        assert_eq!(card_ids(board, "l2"), vec!["c2"]);
        assert!(state.loading);
        // Server has not applied it yet
        assert_eq!(card_ids(&gw.board("b1").unwrap(), "l2"), Vec::<String>::new());
        gate.notify_one();
    });

    result.unwrap();
    assert!(!store.snapshot().loading);
}

#[tokio::test]
async fn test_stale_reconciliation_is_discarded() {
    let (gw, store) = open(default_board(), true).await;
    let gate = gw.hold_next(GatewayOp::GetBoard);

    let target = CardTarget::new("l2", 0);
    let (moved, _) = tokio::join!(store.move_card("c1", &target), async {
        // Reload requested and held; meanwhile edit locally and on the server
        wait_for_calls(&gw, GatewayOp::GetBoard, 2).await;
        gw.edit_board("b1", |board| board.lists[1].title = "Renamed elsewhere".into());
        let patch = CardPatch {
            title: Some("Local edit".into()),
            ..Default::default()
        };
        store.update_card("c2", &patch).await.unwrap();
        gate.notify_one();
    });

    moved.unwrap();
    let board = current(&store);
    assert_eq!(board.list("l2").map(|l| l.title.as_str()), Some("L2"));
    assert_eq!(board.card("c2").map(|c| c.title.as_str()), Some("Local edit"));
    assert_eq!(card_ids(&board, "l2"), vec!["c1"]);
}

#[tokio::test]
async fn test_concurrent_moves_of_different_cards() {
    let board = board_with(&[("l1", &["c1", "c2"]), ("l2", &["c3", "c4"]), ("l3", &[])]);
    let (gw, store) = open(board, true).await;
    let first = gw.hold_next(GatewayOp::MoveCard);
    let second = gw.hold_next(GatewayOp::MoveCard);

    let target_a = CardTarget::new("l3", 0);
    let target_b = CardTarget::new("l1", 0);
    let (a, b, _) = tokio::join!(
        store.move_card("c1", &target_a),
        store.move_card("c4", &target_b),
        async {
            wait_for_calls(&gw, GatewayOp::MoveCard, 2).await;
            let board = current(&store);
            assert_eq!(card_ids(&board, "l1"), vec!["c4", "c2"]);
            assert_eq!(card_ids(&board, "l3"), vec!["c1"]);
            second.notify_one();
            first.notify_one();
        }
    );

    a.unwrap();
    b.unwrap();
    let board = current(&store);
    ordering::check_invariants(&board).unwrap();
    assert_eq!(card_ids(&board, "l1"), vec!["c4", "c2"]);
    assert_eq!(card_ids(&board, "l2"), vec!["c3"]);
    assert_eq!(card_ids(&board, "l3"), vec!["c1"]);
    // Only the last move to finish reconciles
    assert_eq!(gw.call_count(GatewayOp::GetBoard), 2);
    assert_eq!(Some(board), gw.board("b1"));
}

#[tokio::test]
async fn test_moves_of_same_card_are_serialized() {
    let (gw, store) = open(default_board(), false).await;
    let gate = gw.hold_next(GatewayOp::MoveCard);

    let target_first = CardTarget::new("l2", 0);
    let target_second = CardTarget::new("l1", 5);
    let (first, second, _) = tokio::join!(
        store.move_card("c1", &target_first),
        store.move_card("c1", &target_second),
        async {
            wait_for_calls(&gw, GatewayOp::MoveCard, 1).await;
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            // Second move waits for the first to settle
            assert_eq!(gw.call_count(GatewayOp::MoveCard), 1);
            assert_eq!(card_ids(&current(&store), "l2"), vec!["c1"]);
            gate.notify_one();
        }
    );

    assert_eq!(first.unwrap().list_id, "l2");
    let second = second.unwrap();
    assert_eq!((second.list_id.as_str(), second.position), ("l1", 2));
    let board = current(&store);
    assert_eq!(card_ids(&board, "l1"), vec!["c2", "c3", "c1"]);
    assert_eq!(card_ids(&gw.board("b1").unwrap(), "l1"), vec!["c2", "c3", "c1"]);
}

#[tokio::test]
async fn test_rollback_keeps_unrelated_optimistic_state() {
    let (gw, store) = open(default_board(), false).await;
    let gate = gw.hold_next(GatewayOp::MoveCard);
    gw.fail_next(GatewayOp::MoveCard, GatewayError::Network("timeout".into()));

    let target = CardTarget::new("l2", 0);
    let (moved, _) = tokio::join!(store.move_card("c1", &target), async {
        wait_for_calls(&gw, GatewayOp::MoveCard, 1).await;
        let patch = CardPatch {
            title: Some("Edited meanwhile".into()),
            ..Default::default()
        };
        store.update_card("c3", &patch).await.unwrap();
        gate.notify_one();
    });

    assert!(moved.is_err());
    let board = current(&store);
    assert_eq!(card_ids(&board, "l1"), vec!["c1", "c2", "c3"]);
    assert!(card_ids(&board, "l2").is_empty());
    assert_eq!(board.card("c3").map(|c| c.title.as_str()), Some("Edited meanwhile"));
    ordering::check_invariants(&board).unwrap();
}

#[tokio::test]
async fn test_unauthorized_sets_session_expired() {
    let (gw, store) = open(default_board(), true).await;
    let before = current(&store);
    gw.fail_next(GatewayOp::MoveCard, GatewayError::Unauthorized("Token expired".into()));

    let err = store.move_card("c1", &CardTarget::new("l2", 0)).await.unwrap_err();

    assert!(err.is_unauthorized());
    let state = store.snapshot();
    assert!(state.session_expired);
    assert!(state.error.is_none());
    assert_eq!(state.current, Some(before));
}

#[tokio::test]
async fn test_validation_never_reaches_gateway() {
    let (gw, store) = open(default_board(), true).await;

    let err = store
        .create_board(&NewBoard {
            title: "   ".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err, KanbanError::ValidationFailed("Board title is required".into()));
    assert_eq!(store.snapshot().error.as_deref(), Some("Board title is required"));

    assert!(store
        .create_list("b1", &NewList { title: "".into() })
        .await
        .is_err());
    assert!(store
        .create_card("l1", &NewCard { title: " \t".into(), ..Default::default() })
        .await
        .is_err());
    assert!(store.add_comment("c1", "   ").await.is_err());
    let blank_title = CardPatch {
        title: Some(" ".into()),
        ..Default::default()
    };
    assert!(store.update_card("c1", &blank_title).await.is_err());

    let remote: Vec<_> = gw
        .calls()
        .into_iter()
        .filter(|(op, _)| *op != GatewayOp::GetBoard)
        .collect();
    assert!(remote.is_empty(), "unexpected calls: {:?}", remote);
}

#[tokio::test]
async fn test_next_operation_clears_error() {
    let (gw, store) = open(default_board(), true).await;
    gw.fail_next(GatewayOp::MoveCard, GatewayError::Network("down".into()));
    assert!(store.move_card("c1", &CardTarget::new("l2", 0)).await.is_err());
    assert!(store.snapshot().error.is_some());

    store.move_card("c1", &CardTarget::new("l2", 0)).await.unwrap();

    assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn test_create_board_list_and_card() {
    let gw = MemoryGateway::new();
    let store = BoardStore::new(Arc::new(gw), KanbanConfig::default());

    let board = store
        .create_board(&NewBoard {
            title: "  Night shift  ".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(board.title, "Night shift");
    assert_eq!(store.snapshot().boards.len(), 1);
    assert!(store.snapshot().current.is_none());

    store.load_board(&board.id).await.unwrap();
    let todo = store
        .create_list(&board.id, &NewList { title: "To do".into() })
        .await
        .unwrap();
    let done = store
        .create_list(&board.id, &NewList { title: "Done".into() })
        .await
        .unwrap();
    store
        .create_card(&todo.id, &NewCard { title: "Credentialing".into(), ..Default::default() })
        .await
        .unwrap();
    let second = store
        .create_card(&todo.id, &NewCard { title: "Orientation".into(), ..Default::default() })
        .await
        .unwrap();

    let current = current(&store);
    assert_eq!(current.lists.len(), 2);
    assert_eq!(current.list(&done.id).map(|l| l.position), Some(1));
    assert_eq!(current.card(&second.id).map(|c| c.position), Some(1));
    ordering::check_invariants(&current).unwrap();
}

#[tokio::test]
async fn test_update_card_applies_and_rolls_back() {
    let (gw, store) = open(default_board(), true).await;
    let patch = CardPatch {
        title: Some("Renamed".into()),
        labels: Some(["urgent".to_string()].into_iter().collect()),
        ..Default::default()
    };

    let card = store.update_card("c1", &patch).await.unwrap();
    assert_eq!(card.title, "Renamed");
    let board = current(&store);
    let local = board.card("c1").unwrap();
    assert_eq!(local.title, "Renamed");
    assert!(local.labels.contains("urgent"));
    assert_eq!(local.position, 0);

    gw.fail_next(
        GatewayOp::UpdateCard,
        GatewayError::Server {
            status: 500,
            message: "boom".into(),
        },
    );
    let again = CardPatch {
        title: Some("Lost".into()),
        ..Default::default()
    };
    assert!(store.update_card("c1", &again).await.is_err());
    let state = store.snapshot();
    assert_eq!(state.current.as_ref().and_then(|b| b.card("c1")).map(|c| c.title.as_str()), Some("Renamed"));
    assert_eq!(state.error.as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_archive_card_removes_and_restores() {
    let (gw, store) = open(default_board(), true).await;

    let archived = store.archive_card("c2").await.unwrap();
    assert!(archived.archived);
    let board = current(&store);
    assert_eq!(card_ids(&board, "l1"), vec!["c1", "c3"]);
    ordering::check_invariants(&board).unwrap();

    gw.fail_next(GatewayOp::UpdateCard, GatewayError::Network("offline".into()));
    assert!(store.archive_card("c1").await.is_err());
    let board = current(&store);
    assert_eq!(card_ids(&board, "l1"), vec!["c1", "c3"]);
}

#[tokio::test]
async fn test_archive_list_removes_and_restores() {
    let (gw, store) = open(board_with(&[("a", &["c1"]), ("b", &["c2", "c3"]), ("c", &[])]), true).await;

    gw.fail_next(GatewayOp::UpdateList, GatewayError::Network("offline".into()));
    assert!(store.archive_list("b").await.is_err());
    let board = current(&store);
    let order: Vec<_> = board.lists.iter().map(|l| l.id.clone()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
    assert_eq!(card_ids(&board, "b"), vec!["c2", "c3"]);
    assert!(store.snapshot().error.is_some());

    let archived = store.archive_list("b").await.unwrap();
    assert!(archived.archived);
    let board = current(&store);
    let order: Vec<_> = board.lists.iter().map(|l| l.id.clone()).collect();
    assert_eq!(order, vec!["a", "c"]);
    assert!(board.card("c2").is_none());
    ordering::check_invariants(&board).unwrap();

    // Server agrees after a reload
    let reloaded = store.load_board("b1").await.unwrap();
    assert_eq!(reloaded.lists.len(), 2);
    assert!(matches!(store.archive_list("b").await, Err(KanbanError::NotFound(_))));
}

#[tokio::test]
async fn test_move_and_rename_list() {
    let (gw, store) = open(board_with(&[("a", &[]), ("b", &[]), ("c", &[])]), true).await;

    store.move_list("a", 2).await.unwrap();
    let order: Vec<_> = current(&store).lists.iter().map(|l| l.id.clone()).collect();
    assert_eq!(order, vec!["b", "c", "a"]);

    gw.fail_next(GatewayOp::UpdateList, GatewayError::Network("offline".into()));
    assert!(store.move_list("c", 0).await.is_err());
    let order: Vec<_> = current(&store).lists.iter().map(|l| l.id.clone()).collect();
    assert_eq!(order, vec!["b", "c", "a"]);

    let list = store.update_list("b", "  Backlog ").await.unwrap();
    assert_eq!(list.title, "Backlog");
    assert_eq!(current(&store).list("b").map(|l| l.title.clone()), Some("Backlog".into()));
    ordering::check_invariants(&current(&store)).unwrap();
}

#[tokio::test]
async fn test_update_and_archive_board() {
    let (_gw, store) = open(default_board(), true).await;
    store.load_boards().await.unwrap();

    let patch = BoardPatch {
        title: Some("Placements".into()),
        ..Default::default()
    };
    store.update_board("b1", &patch).await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.boards[0].title, "Placements");
    assert_eq!(state.current.as_ref().map(|b| b.title.as_str()), Some("Placements"));
    assert_eq!(state.current.as_ref().map(|b| b.lists.len()), Some(2));

    let message = store.archive_board("b1").await.unwrap();
    assert_eq!(message, "Board archived");
    let state = store.snapshot();
    assert!(state.boards.is_empty());
    assert!(state.current.is_none());
}

#[tokio::test]
async fn test_comments_are_remote_only() {
    let (_gw, store) = open(default_board(), true).await;
    let before = current(&store);

    let comment = store.add_comment("c1", "  Called the facility ").await.unwrap();
    assert_eq!(comment.content, "Called the facility");
    assert_eq!(current(&store), before);

    store.delete_comment(&comment.id).await.unwrap();
    assert!(matches!(
        store.delete_comment(&comment.id).await,
        Err(KanbanError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_subscribers_run_without_lock_held() {
    let gw = MemoryGateway::with_boards([default_board()]);
    let store = Arc::new(BoardStore::new(Arc::new(gw), KanbanConfig::default()));
    let seen: Arc<Mutex<Vec<(bool, u64)>>> = Arc::default();

    let weak: Weak<BoardStore> = Arc::downgrade(&store);
    let log = seen.clone();
    let id = store.subscribe(move |state| {
        // Re-entering the store would deadlock if the state lock were held
        let reread = weak.upgrade().map(|s| s.snapshot().revision);
        assert_eq!(reread, Some(state.revision));
        log.lock().unwrap().push((state.loading, state.revision));
    });

    store.load_board("b1").await.unwrap();
    let events = seen.lock().unwrap().clone();
    assert_eq!(events.first(), Some(&(true, 0)));
    assert_eq!(events.last(), Some(&(false, 1)));

    assert!(store.unsubscribe(id));
    let count = seen.lock().unwrap().len();
    store.load_board("b1").await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), count);
}

#[tokio::test]
async fn test_with_state_starts_from_given_state() {
    let initial = BoardState {
        current: Some(default_board()),
        revision: 7,
        ..Default::default()
    };
    let gw = MemoryGateway::with_boards([default_board()]);
    let store = BoardStore::with_state(Arc::new(gw), config(false), initial.clone());

    assert_eq!(store.snapshot(), initial);

    store.move_card("c3", &CardTarget::new("l2", 0)).await.unwrap();
    let state = store.snapshot();
    assert!(state.revision > 7);
    assert_eq!(card_ids(state.current.as_ref().unwrap(), "l2"), vec!["c3"]);
}

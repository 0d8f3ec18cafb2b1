//! Board State Store
//!
//! Holds the board index and the open board, applies mutations optimistically,
//! persists them through a `BoardGateway` and rolls back on failure.
//!
//! State lives behind a plain mutex that is never held across an await or
//! while subscribers run. Mutations of the same card or list are serialized
//! by a per-entity async lock; unrelated entities proceed concurrently.
//!
//! Every change to the open board bumps `revision`. Server responses are
//! only applied when nothing newer happened locally in the meantime.

mod state;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::config::KanbanConfig;
use crate::domain::{
    required_title, Board, BoardPatch, BoardSummary, Card, CardPatch, CardTarget, CardUpdate,
    Comment, List, ListPatch, NewBoard, NewCard, NewComment, NewList,
};
use crate::error::{KanbanError, KanbanResult};
use crate::gateway::BoardGateway;
use crate::ordering;

pub use state::BoardState;

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&BoardState) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: BoardState,
    /// Operations started but not settled (drives `loading`)
    pending: usize,
    /// Optimistic mutations waiting for the server
    in_flight: usize,
    /// Revision of the latest local mutation per entity key
    entity_revisions: HashMap<String, u64>,
}

impl Inner {
    fn set_current(&mut self, board: Option<Board>) {
        self.state.current = board;
        self.state.revision += 1;
    }
}

/// Bookkeeping for one optimistic mutation
struct Optimistic<M> {
    board_id: String,
    snapshot: Board,
    revision: u64,
    outcome: M,
}

fn card_key(card_id: &str) -> String {
    format!("card:{}", card_id)
}

fn list_key(list_id: &str) -> String {
    format!("list:{}", list_id)
}

pub struct BoardStore {
    gateway: Arc<dyn BoardGateway>,
    config: KanbanConfig,
    inner: Mutex<Inner>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
    entity_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl BoardStore {
    pub fn new(gateway: Arc<dyn BoardGateway>, config: KanbanConfig) -> Self {
        Self::with_state(gateway, config, BoardState::default())
    }

    /// Start from a given state (restored session, tests)
    pub fn with_state(gateway: Arc<dyn BoardGateway>, config: KanbanConfig, state: BoardState) -> Self {
        Self {
            gateway,
            config,
            inner: Mutex::new(Inner {
                state,
                ..Default::default()
            }),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            entity_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &KanbanConfig {
        &self.config
    }

    /// Deep copy of the current state
    pub fn snapshot(&self) -> BoardState {
        self.lock().state.clone()
    }

    /// Register a callback run after every state transition
    pub fn subscribe(&self, callback: impl Fn(&BoardState) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock_recover(&self.subscribers).push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock_recover(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    /// Drop the current error message (user dismissed it)
    pub fn clear_error(&self) {
        self.update(|inner| inner.state.error = None);
    }

    // ========================
    // Board index
    // ========================

    pub async fn load_boards(&self) -> KanbanResult<Vec<BoardSummary>> {
        self.track("load_boards", self.fetch_boards()).await
    }

    /// Fetch a board and make it current. A failed refresh of the open board
    /// leaves it in place; a failed switch to another board closes the old one.
    pub async fn load_board(&self, board_id: &str) -> KanbanResult<Board> {
        self.track("load_board", self.fetch_board(board_id)).await
    }

    pub async fn create_board(&self, input: &NewBoard) -> KanbanResult<Board> {
        self.track("create_board", self.persist_new_board(input)).await
    }

    pub async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> KanbanResult<Board> {
        self.track("update_board", self.persist_board_patch(board_id, patch))
            .await
    }

    /// Archive after server confirmation; closes the board if it was open
    pub async fn archive_board(&self, board_id: &str) -> KanbanResult<String> {
        self.track("archive_board", self.persist_board_archive(board_id))
            .await
    }

    // ========================
    // Lists
    // ========================

    pub async fn create_list(&self, board_id: &str, input: &NewList) -> KanbanResult<List> {
        self.track("create_list", self.persist_new_list(board_id, input))
            .await
    }

    /// Optimistic rename
    pub async fn update_list(&self, list_id: &str, title: &str) -> KanbanResult<List> {
        self.track("update_list", self.persist_list_title(list_id, title))
            .await
    }

    /// Optimistic reorder; `position` is clamped to the list count
    pub async fn move_list(&self, list_id: &str, position: i32) -> KanbanResult<()> {
        self.track("move_list", self.persist_list_move(list_id, position))
            .await
    }

    /// Optimistic removal of a list together with its cards
    pub async fn archive_list(&self, list_id: &str) -> KanbanResult<List> {
        self.track("archive_list", self.persist_list_archive(list_id))
            .await
    }

    // ========================
    // Cards
    // ========================

    pub async fn create_card(&self, list_id: &str, input: &NewCard) -> KanbanResult<Card> {
        self.track("create_card", self.persist_new_card(list_id, input))
            .await
    }

    /// Optimistic content edit; never changes list or position
    pub async fn update_card(&self, card_id: &str, patch: &CardPatch) -> KanbanResult<Card> {
        self.track("update_card", self.persist_card_patch(card_id, patch))
            .await
    }

    /// Optimistic move. The destination position is clamped after the card
    /// has been taken out of its source list, and the clamped target is what
    /// gets persisted.
    pub async fn move_card(&self, card_id: &str, target: &CardTarget) -> KanbanResult<Card> {
        self.track("move_card", self.persist_card_move(card_id, target))
            .await
    }

    /// Optimistic removal from the open board
    pub async fn archive_card(&self, card_id: &str) -> KanbanResult<Card> {
        self.track("archive_card", self.persist_card_archive(card_id))
            .await
    }

    // ========================
    // Comments (remote only)
    // ========================

    pub async fn add_comment(&self, card_id: &str, content: &str) -> KanbanResult<Comment> {
        self.track("add_comment", self.persist_comment(card_id, content))
            .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> KanbanResult<String> {
        self.track("delete_comment", self.persist_comment_removal(comment_id))
            .await
    }

    // ========================
    // Operation bodies
    // ========================

    async fn fetch_boards(&self) -> KanbanResult<Vec<BoardSummary>> {
        match self.gateway.list_boards().await {
            Ok(boards) => {
                let boards: Vec<_> = boards.into_iter().filter(|b| !b.archived).collect();
                self.update(|inner| inner.state.boards = boards.clone());
                info!(count = boards.len(), "boards loaded");
                Ok(boards)
            }
            Err(err) => {
                self.update(|inner| inner.state.boards.clear());
                Err(err.into())
            }
        }
    }

    async fn fetch_board(&self, board_id: &str) -> KanbanResult<Board> {
        match self.gateway.get_board(board_id).await {
            Ok(mut board) => {
                ordering::normalize_board(&mut board);
                self.update(|inner| inner.set_current(Some(board.clone())));
                info!(board_id, lists = board.lists.len(), "board loaded");
                Ok(board)
            }
            Err(err) => {
                self.update(|inner| {
                    if inner.state.current.is_some() && !inner.state.is_current(board_id) {
                        inner.set_current(None);
                    }
                });
                Err(err.into())
            }
        }
    }

    async fn persist_new_board(&self, input: &NewBoard) -> KanbanResult<Board> {
        let input = NewBoard {
            title: required_title("Board", &input.title).map_err(KanbanError::ValidationFailed)?,
            ..input.clone()
        };
        let board = self.gateway.create_board(&input).await?;
        self.update(|inner| inner.state.boards.push(board.summary()));
        info!(board_id = %board.id, "board created");
        Ok(board)
    }

    async fn persist_board_patch(&self, board_id: &str, patch: &BoardPatch) -> KanbanResult<Board> {
        let mut patch = patch.clone();
        if let Some(title) = &patch.title {
            patch.title = Some(required_title("Board", title).map_err(KanbanError::ValidationFailed)?);
        }
        let updated = self.gateway.update_board(board_id, &patch).await?;
        self.update(|inner| {
            if let Some(summary) = inner.state.boards.iter_mut().find(|b| b.id == board_id) {
                *summary = updated.summary();
            }
            if let Some(current) = inner.state.current.as_ref().filter(|b| b.id == board_id) {
                let mut next = current.clone();
                next.title = updated.title.clone();
                next.description = updated.description.clone();
                next.members = updated.members.clone();
                next.owner_id = updated.owner_id.clone();
                next.updated_at = updated.updated_at;
                inner.set_current(Some(next));
            }
        });
        Ok(updated)
    }

    async fn persist_board_archive(&self, board_id: &str) -> KanbanResult<String> {
        let message = self.gateway.archive_board(board_id).await?;
        self.update(|inner| {
            inner.state.boards.retain(|b| b.id != board_id);
            if inner.state.is_current(board_id) {
                inner.set_current(None);
            }
        });
        info!(board_id, "board archived");
        Ok(message)
    }

    async fn persist_new_list(&self, board_id: &str, input: &NewList) -> KanbanResult<List> {
        let input = NewList {
            title: required_title("List", &input.title).map_err(KanbanError::ValidationFailed)?,
        };
        let list = self.gateway.create_list(board_id, &input).await?;
        self.update(|inner| {
            if let Some(current) = inner.state.current.as_ref().filter(|b| b.id == board_id) {
                let next = ordering::append_list(current, list.clone());
                inner.set_current(Some(next));
            }
        });
        info!(list_id = %list.id, board_id, "list created");
        Ok(list)
    }

    async fn persist_list_title(&self, list_id: &str, title: &str) -> KanbanResult<List> {
        let title = required_title("List", title).map_err(KanbanError::ValidationFailed)?;
        let key = list_key(list_id);
        let lock = self.entity_lock(&key);
        let _guard = lock.lock().await;

        let pending = self.apply_optimistic(&key, |board| {
            let mut next = board.clone();
            let list = next
                .list_mut(list_id)
                .ok_or_else(|| KanbanError::not_found("List", list_id))?;
            list.title = title.clone();
            Ok((next, ()))
        })?;

        let patch = ListPatch {
            title: Some(title),
            ..Default::default()
        };
        match self.gateway.update_list(list_id, &patch).await {
            Ok(list) => {
                self.confirm(&pending.board_id);
                self.update(|inner| {
                    if inner.entity_revisions.get(&key) != Some(&pending.revision) {
                        return;
                    }
                    let Some(current) = inner.state.current.as_ref().filter(|b| b.id == pending.board_id) else {
                        return;
                    };
                    let mut next = current.clone();
                    if let Some(local) = next.list_mut(list_id) {
                        local.title = list.title.clone();
                        local.updated_at = list.updated_at;
                        inner.set_current(Some(next));
                    }
                });
                Ok(list)
            }
            Err(err) => {
                self.rollback("update_list", pending, |current, snapshot| {
                    let mut next = current.clone();
                    if let (Some(local), Some(before)) = (next.list_mut(list_id), snapshot.list(list_id)) {
                        local.title = before.title.clone();
                    }
                    Ok(next)
                });
                Err(err.into())
            }
        }
    }

    async fn persist_list_move(&self, list_id: &str, position: i32) -> KanbanResult<()> {
        let key = list_key(list_id);
        let lock = self.entity_lock(&key);
        let _guard = lock.lock().await;

        let pending = self.apply_optimistic(&key, |board| ordering::move_list(board, list_id, position))?;
        let moved = pending.outcome.clone();
        let patch = ListPatch {
            position: Some(moved.to as i32),
            ..Default::default()
        };
        match self.gateway.update_list(list_id, &patch).await {
            Ok(_) => {
                self.confirm(&pending.board_id);
                info!(list_id, from = moved.from, to = moved.to, "list moved");
                if self.config.reconcile_after_move {
                    self.reconcile(&pending.board_id).await;
                }
                Ok(())
            }
            Err(err) => {
                self.rollback("move_list", pending, |current, _| {
                    Ok(ordering::move_list(current, list_id, moved.from as i32)?.0)
                });
                Err(err.into())
            }
        }
    }

    async fn persist_list_archive(&self, list_id: &str) -> KanbanResult<List> {
        let key = list_key(list_id);
        let lock = self.entity_lock(&key);
        let _guard = lock.lock().await;

        let pending = self.apply_optimistic(&key, |board| {
            let (next, list, index) = ordering::remove_list(board, list_id)?;
            Ok((next, (list, index)))
        })?;
        let (removed, index) = pending.outcome.clone();
        let patch = ListPatch {
            archived: Some(true),
            ..Default::default()
        };
        match self.gateway.update_list(list_id, &patch).await {
            Ok(list) => {
                self.confirm(&pending.board_id);
                info!(list_id, cards = removed.cards.len(), "list archived");
                Ok(list)
            }
            Err(err) => {
                self.rollback("archive_list", pending, |current, _| {
                    Ok(ordering::restore_list(current, removed, index))
                });
                Err(err.into())
            }
        }
    }

    async fn persist_new_card(&self, list_id: &str, input: &NewCard) -> KanbanResult<Card> {
        let input = NewCard {
            title: required_title("Card", &input.title).map_err(KanbanError::ValidationFailed)?,
            ..input.clone()
        };
        let card = self.gateway.create_card(list_id, &input).await?;
        self.update(|inner| {
            let Some(current) = inner.state.current.as_ref() else {
                return;
            };
            if current.list(&card.list_id).is_none() {
                return;
            }
            match ordering::append_card(current, card.clone()) {
                Ok(next) => inner.set_current(Some(next)),
                Err(err) => warn!(card_id = %card.id, error = %err, "created card not placed"),
            }
        });
        info!(card_id = %card.id, list_id, "card created");
        Ok(card)
    }

    async fn persist_card_patch(&self, card_id: &str, patch: &CardPatch) -> KanbanResult<Card> {
        let mut patch = patch.clone();
        if let Some(title) = &patch.title {
            patch.title = Some(required_title("Card", title).map_err(KanbanError::ValidationFailed)?);
        }
        let key = card_key(card_id);
        let lock = self.entity_lock(&key);
        let _guard = lock.lock().await;

        let pending = self.apply_optimistic(&key, |board| {
            let mut next = board.clone();
            next.card_mut(card_id)
                .ok_or_else(|| KanbanError::not_found("Card", card_id))?
                .apply_patch(&patch);
            Ok((next, ()))
        })?;

        let update = CardUpdate {
            patch,
            archived: None,
        };
        match self.gateway.update_card(card_id, &update).await {
            Ok(card) => {
                self.confirm(&pending.board_id);
                self.apply_returned_card(&key, &card, pending.revision, false);
                Ok(card)
            }
            Err(err) => {
                self.rollback("update_card", pending, |current, snapshot| {
                    let mut next = current.clone();
                    if let (Some(local), Some(before)) = (next.card_mut(card_id), snapshot.card(card_id)) {
                        local.absorb_content(before);
                    }
                    Ok(next)
                });
                Err(err.into())
            }
        }
    }

    async fn persist_card_move(&self, card_id: &str, target: &CardTarget) -> KanbanResult<Card> {
        let key = card_key(card_id);
        let lock = self.entity_lock(&key);
        let _guard = lock.lock().await;

        let pending = self.apply_optimistic(&key, |board| {
            ordering::move_card(board, card_id, &target.list_id, target.position)
        })?;
        let moved = pending.outcome.clone();
        let clamped = CardTarget::new(moved.to.list_id.clone(), moved.to.index as i32);
        debug!(card_id, list_id = %clamped.list_id, position = clamped.position, noop = moved.is_noop(), "persisting move");

        match self.gateway.move_card(card_id, &clamped).await {
            Ok(card) => {
                self.confirm(&pending.board_id);
                info!(card_id, list_id = %clamped.list_id, position = clamped.position, "card moved");
                if self.config.reconcile_after_move {
                    self.reconcile(&pending.board_id).await;
                } else {
                    self.apply_returned_card(&key, &card, pending.revision, true);
                }
                Ok(card)
            }
            Err(err) => {
                self.rollback("move_card", pending, |current, snapshot| {
                    let card = current
                        .card(card_id)
                        .or_else(|| snapshot.card(card_id))
                        .cloned()
                        .ok_or_else(|| KanbanError::not_found("Card", card_id))?;
                    ordering::restore_card(current, card, &moved.from)
                });
                Err(err.into())
            }
        }
    }

    async fn persist_card_archive(&self, card_id: &str) -> KanbanResult<Card> {
        let key = card_key(card_id);
        let lock = self.entity_lock(&key);
        let _guard = lock.lock().await;

        let pending = self.apply_optimistic(&key, |board| ordering::remove_card(board, card_id))?;
        let placement = pending.outcome.clone();
        let update = CardUpdate {
            archived: Some(true),
            ..Default::default()
        };
        match self.gateway.update_card(card_id, &update).await {
            Ok(card) => {
                self.confirm(&pending.board_id);
                info!(card_id, "card archived");
                Ok(card)
            }
            Err(err) => {
                self.rollback("archive_card", pending, |current, snapshot| {
                    let card = snapshot
                        .card(card_id)
                        .cloned()
                        .ok_or_else(|| KanbanError::not_found("Card", card_id))?;
                    ordering::restore_card(current, card, &placement)
                });
                Err(err.into())
            }
        }
    }

    async fn persist_comment(&self, card_id: &str, content: &str) -> KanbanResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(KanbanError::ValidationFailed(
                "Comment content is required".to_string(),
            ));
        }
        let input = NewComment {
            content: content.to_string(),
        };
        let comment = self.gateway.add_comment(card_id, &input).await?;
        info!(card_id, comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    async fn persist_comment_removal(&self, comment_id: &str) -> KanbanResult<String> {
        let message = self.gateway.delete_comment(comment_id).await?;
        info!(comment_id, "comment deleted");
        Ok(message)
    }

    // ========================
    // Bookkeeping
    // ========================

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_recover(&self.inner)
    }

    /// Mutate state under the lock, then notify subscribers with the lock released
    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let (out, state) = {
            let mut inner = self.lock();
            let out = f(&mut inner);
            (out, inner.state.clone())
        };
        self.notify(&state);
        out
    }

    fn notify(&self, state: &BoardState) {
        let subscribers: Vec<Subscriber> = lock_recover(&self.subscribers)
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in subscribers {
            callback(state);
        }
    }

    fn entity_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        lock_recover(&self.entity_locks)
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    async fn track<T>(
        &self,
        op: &'static str,
        body: impl Future<Output = KanbanResult<T>>,
    ) -> KanbanResult<T> {
        self.update(|inner| {
            inner.pending += 1;
            inner.state.loading = true;
            inner.state.error = None;
        });
        debug!(op, "started");
        let result = body.await;
        self.update(|inner| {
            inner.pending = inner.pending.saturating_sub(1);
            inner.state.loading = inner.pending > 0;
            match &result {
                Ok(_) => debug!(op, "succeeded"),
                Err(KanbanError::Unauthorized(message)) => {
                    warn!(op, %message, "session expired");
                    inner.state.session_expired = true;
                }
                Err(err) => {
                    warn!(op, error = %err, "failed");
                    inner.state.error = Some(err.to_string());
                }
            }
        });
        result
    }

    /// Commit a mutation of the open board before the server sees it
    fn apply_optimistic<M>(
        &self,
        key: &str,
        mutate: impl FnOnce(&Board) -> KanbanResult<(Board, M)>,
    ) -> KanbanResult<Optimistic<M>> {
        self.update(|inner| {
            let current = inner
                .state
                .current
                .as_ref()
                .ok_or_else(|| KanbanError::NotFound("No board is open".to_string()))?;
            let (next, outcome) = mutate(current)?;
            let snapshot = current.clone();
            let board_id = current.id.clone();
            inner.set_current(Some(next));
            let revision = inner.state.revision;
            inner.entity_revisions.insert(key.to_string(), revision);
            inner.in_flight += 1;
            debug!(key, revision, "optimistic commit");
            Ok(Optimistic {
                board_id,
                snapshot,
                revision,
                outcome,
            })
        })
    }

    /// Server accepted an optimistic mutation
    fn confirm(&self, board_id: &str) {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        debug!(board_id, in_flight = inner.in_flight, "mutation confirmed");
    }

    /// Undo a rejected optimistic mutation. If nothing changed since the
    /// commit the snapshot is restored as is; otherwise `undo` reverts just
    /// this mutation on top of the current board.
    fn rollback<M>(
        &self,
        op: &str,
        pending: Optimistic<M>,
        undo: impl FnOnce(&Board, &Board) -> KanbanResult<Board>,
    ) {
        self.update(|inner| {
            inner.in_flight = inner.in_flight.saturating_sub(1);
            let Some(current) = inner.state.current.as_ref().filter(|b| b.id == pending.board_id) else {
                warn!(op, board_id = %pending.board_id, "board closed before rollback");
                return;
            };
            let restored = if inner.state.revision == pending.revision {
                pending.snapshot
            } else {
                match undo(current, &pending.snapshot) {
                    Ok(board) => board,
                    Err(err) => {
                        error!(op, error = %err, "rollback could not be applied");
                        return;
                    }
                }
            };
            error!(op, revision = pending.revision, "persisting failed, rolled back");
            inner.set_current(Some(restored));
        });
    }

    /// Fold a server-returned card into the open board unless a newer local
    /// mutation of the same card exists
    fn apply_returned_card(&self, key: &str, card: &Card, revision: u64, placement: bool) {
        self.update(|inner| {
            if inner.entity_revisions.get(key) != Some(&revision) {
                warn!(card_id = %card.id, revision, "discarding stale card response");
                return;
            }
            let Some(current) = inner.state.current.as_ref() else {
                return;
            };
            let mut next = current.clone();
            let Some(local) = next.card_mut(&card.id) else {
                return;
            };
            local.absorb_content(card);
            let placed = (local.list_id.clone(), local.position);
            // Server positions only line up with ours once nothing else is in flight
            if placement && inner.in_flight == 0 && placed != (card.list_id.clone(), card.position) {
                match ordering::move_card(&next, &card.id, &card.list_id, card.position) {
                    Ok((moved, _)) => next = moved,
                    Err(err) => warn!(card_id = %card.id, error = %err, "server placement not applied"),
                }
            }
            if &next != current {
                inner.set_current(Some(next));
            }
        });
    }

    /// Replace the open board with a fresh fetch. Skipped while other
    /// optimistic mutations are in flight (the last one to finish reloads);
    /// discarded if the board changed locally while the fetch was pending.
    async fn reconcile(&self, board_id: &str) {
        let issued = {
            let inner = self.lock();
            if inner.in_flight > 0 || !inner.state.is_current(board_id) {
                debug!(board_id, in_flight = inner.in_flight, "reconciliation skipped");
                return;
            }
            inner.state.revision
        };
        match self.gateway.get_board(board_id).await {
            Ok(mut board) => {
                ordering::normalize_board(&mut board);
                self.update(|inner| {
                    if inner.state.revision != issued || !inner.state.is_current(board_id) {
                        warn!(
                            board_id,
                            issued,
                            revision = inner.state.revision,
                            "discarding stale reconciliation"
                        );
                        return;
                    }
                    debug!(board_id, "reconciled with server");
                    inner.set_current(Some(board));
                });
            }
            Err(err) => {
                warn!(board_id, error = %err, "reconciliation failed, keeping local state");
            }
        }
    }
}

/// Lock a std mutex, recovering the data if a previous holder panicked
fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

//! In-process Board Store
//!
//! Behaves like the remote store (server-side ids, position recomputation,
//! soft archive) without a network. Failures and delays can be injected per
//! operation, which is what the store tests and the offline demo rely on.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use tracing::debug;

use super::{BoardGateway, GatewayError, GatewayResult};
use crate::domain::{
    Board, BoardPatch, BoardSummary, Card, CardTarget, CardUpdate, Comment, List, ListPatch,
    NewBoard, NewCard, NewComment, NewList,
};
use crate::ordering;

/// Gateway operations, for failure/delay injection and call inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    ListBoards,
    GetBoard,
    CreateBoard,
    UpdateBoard,
    ArchiveBoard,
    CreateList,
    UpdateList,
    CreateCard,
    UpdateCard,
    MoveCard,
    AddComment,
    DeleteComment,
}

#[derive(Default)]
struct MemoryState {
    boards: BTreeMap<String, Board>,
    comments: HashMap<String, Comment>,
    next_id: u64,
    failures: HashMap<GatewayOp, Vec<GatewayError>>,
    holds: HashMap<GatewayOp, Vec<Arc<Notify>>>,
    calls: Vec<(GatewayOp, String)>,
}

impl MemoryState {
    fn mint_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn board_of_list(&mut self, list_id: &str) -> GatewayResult<&mut Board> {
        self.boards
            .values_mut()
            .find(|board| board.list(list_id).is_some())
            .ok_or_else(|| GatewayError::NotFound("List not found".to_string()))
    }

    fn board_of_card(&mut self, card_id: &str) -> GatewayResult<&mut Board> {
        self.boards
            .values_mut()
            .find(|board| board.locate_card(card_id).is_some())
            .ok_or_else(|| GatewayError::NotFound("Card not found".to_string()))
    }
}

/// Board Store kept in memory
#[derive(Default, Clone)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing boards; positions are normalized on the way in
    pub fn with_boards(boards: impl IntoIterator<Item = Board>) -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.lock();
            for mut board in boards {
                ordering::normalize_board(&mut board);
                state.boards.insert(board.id.clone(), board);
            }
        }
        gateway
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave the maps half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail the next call of `op` with `error`
    pub fn fail_next(&self, op: GatewayOp, error: GatewayError) {
        self.lock().failures.entry(op).or_default().push(error);
    }

    /// Hold the next call of `op` until the returned handle is notified
    pub fn hold_next(&self, op: GatewayOp) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().holds.entry(op).or_default().push(gate.clone());
        gate
    }

    /// Operations received so far, with their primary argument
    pub fn calls(&self) -> Vec<(GatewayOp, String)> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: GatewayOp) -> usize {
        self.lock().calls.iter().filter(|(o, _)| *o == op).count()
    }

    /// Server-side copy of a board, as another client would see it
    pub fn board(&self, board_id: &str) -> Option<Board> {
        self.lock().boards.get(board_id).cloned()
    }

    /// Mutate a stored board directly (simulates edits by another client)
    pub fn edit_board(&self, board_id: &str, edit: impl FnOnce(&mut Board)) {
        if let Some(board) = self.lock().boards.get_mut(board_id) {
            edit(board);
            ordering::normalize_board(board);
        }
    }

    /// Record the call, wait on any hold, then surface any injected failure
    async fn enter(&self, op: GatewayOp, arg: &str) -> GatewayResult<()> {
        let gate = {
            let mut state = self.lock();
            state.calls.push((op, arg.to_string()));
            state.holds.get_mut(&op).and_then(|gates| {
                if gates.is_empty() {
                    None
                } else {
                    Some(gates.remove(0))
                }
            })
        };
        if let Some(gate) = gate {
            debug!(?op, arg, "held");
            gate.notified().await;
        }
        let mut state = self.lock();
        match state.failures.get_mut(&op) {
            Some(errors) if !errors.is_empty() => Err(errors.remove(0)),
            _ => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl BoardGateway for MemoryGateway {
    async fn list_boards(&self) -> GatewayResult<Vec<BoardSummary>> {
        self.enter(GatewayOp::ListBoards, "").await?;
        Ok(self
            .lock()
            .boards
            .values()
            .filter(|board| !board.archived)
            .map(Board::summary)
            .collect())
    }

    async fn get_board(&self, board_id: &str) -> GatewayResult<Board> {
        self.enter(GatewayOp::GetBoard, board_id).await?;
        self.lock()
            .boards
            .get(board_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Board not found".to_string()))
    }

    async fn create_board(&self, input: &NewBoard) -> GatewayResult<Board> {
        self.enter(GatewayOp::CreateBoard, &input.title).await?;
        if input.title.trim().is_empty() {
            return Err(GatewayError::ValidationFailed("Title is required".to_string()));
        }
        let mut state = self.lock();
        let id = state.mint_id("board");
        let mut board = Board::new(id.clone(), input.title.trim());
        board.description = input.description.clone();
        board.members = input.members.clone();
        board.created_at = Some(Utc::now());
        board.updated_at = board.created_at;
        state.boards.insert(id, board.clone());
        Ok(board)
    }

    async fn update_board(&self, board_id: &str, patch: &BoardPatch) -> GatewayResult<Board> {
        self.enter(GatewayOp::UpdateBoard, board_id).await?;
        let mut state = self.lock();
        let board = state
            .boards
            .get_mut(board_id)
            .ok_or_else(|| GatewayError::NotFound("Board not found".to_string()))?;
        if let Some(title) = &patch.title {
            board.title = title.clone();
        }
        if let Some(description) = &patch.description {
            board.description = description.clone();
        }
        if let Some(members) = &patch.members {
            board.members = members.clone();
        }
        board.updated_at = Some(Utc::now());
        Ok(board.clone())
    }

    async fn archive_board(&self, board_id: &str) -> GatewayResult<String> {
        self.enter(GatewayOp::ArchiveBoard, board_id).await?;
        let mut state = self.lock();
        let board = state
            .boards
            .get_mut(board_id)
            .ok_or_else(|| GatewayError::NotFound("Board not found".to_string()))?;
        board.archived = true;
        Ok("Board archived".to_string())
    }

    async fn create_list(&self, board_id: &str, input: &NewList) -> GatewayResult<List> {
        self.enter(GatewayOp::CreateList, board_id).await?;
        let mut state = self.lock();
        let id = state.mint_id("list");
        let board = state
            .boards
            .get_mut(board_id)
            .ok_or_else(|| GatewayError::NotFound("Board not found".to_string()))?;
        let mut list = List::new(id, board_id, input.title.clone(), board.next_list_position());
        list.created_at = Some(Utc::now());
        board.lists.push(list.clone());
        Ok(list)
    }

    async fn update_list(&self, list_id: &str, patch: &ListPatch) -> GatewayResult<List> {
        self.enter(GatewayOp::UpdateList, list_id).await?;
        let mut state = self.lock();
        let board = state.board_of_list(list_id)?;
        if let Some(position) = patch.position {
            *board = ordering::move_list(board, list_id, position)
                .map_err(|e| GatewayError::NotFound(e.to_string()))?
                .0;
        }
        if patch.archived == Some(true) {
            let (next, mut archived, _) = ordering::remove_list(board, list_id)
                .map_err(|e| GatewayError::NotFound(e.to_string()))?;
            *board = next;
            archived.archived = true;
            return Ok(archived);
        }
        let list = board
            .list_mut(list_id)
            .ok_or_else(|| GatewayError::NotFound("List not found".to_string()))?;
        if let Some(title) = &patch.title {
            list.title = title.clone();
        }
        list.updated_at = Some(Utc::now());
        Ok(list.clone())
    }

    async fn create_card(&self, list_id: &str, input: &NewCard) -> GatewayResult<Card> {
        self.enter(GatewayOp::CreateCard, list_id).await?;
        let mut state = self.lock();
        let id = state.mint_id("card");
        let board = state.board_of_list(list_id)?;
        let list = board
            .list_mut(list_id)
            .ok_or_else(|| GatewayError::NotFound("List not found".to_string()))?;
        let mut card = Card::new(id, list_id, input.title.clone(), list.next_card_position());
        card.description = input.description.clone();
        card.due_date = input.due_date;
        card.created_at = Some(Utc::now());
        list.cards.push(card.clone());
        Ok(card)
    }

    async fn update_card(&self, card_id: &str, update: &CardUpdate) -> GatewayResult<Card> {
        self.enter(GatewayOp::UpdateCard, card_id).await?;
        let mut state = self.lock();
        let board = state.board_of_card(card_id)?;
        if update.archived == Some(true) {
            let mut card = board
                .card(card_id)
                .cloned()
                .ok_or_else(|| GatewayError::NotFound("Card not found".to_string()))?;
            *board = ordering::remove_card(board, card_id)
                .map_err(|e| GatewayError::NotFound(e.to_string()))?
                .0;
            card.archived = true;
            return Ok(card);
        }
        let card = board
            .card_mut(card_id)
            .ok_or_else(|| GatewayError::NotFound("Card not found".to_string()))?;
        card.apply_patch(&update.patch);
        card.updated_at = Some(Utc::now());
        Ok(card.clone())
    }

    async fn move_card(&self, card_id: &str, target: &CardTarget) -> GatewayResult<Card> {
        self.enter(GatewayOp::MoveCard, card_id).await?;
        let mut state = self.lock();
        let board = state.board_of_card(card_id)?;
        let (next, _) = ordering::move_card(board, card_id, &target.list_id, target.position)
            .map_err(|e| GatewayError::NotFound(e.to_string()))?;
        *board = next;
        board
            .card(card_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Card not found".to_string()))
    }

    async fn add_comment(&self, card_id: &str, input: &NewComment) -> GatewayResult<Comment> {
        self.enter(GatewayOp::AddComment, card_id).await?;
        let mut state = self.lock();
        state.board_of_card(card_id)?;
        let comment = Comment {
            id: state.mint_id("comment"),
            card_id: card_id.to_string(),
            author_id: None,
            content: input.content.clone(),
            created_at: Some(Utc::now()),
        };
        state.comments.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, comment_id: &str) -> GatewayResult<String> {
        self.enter(GatewayOp::DeleteComment, comment_id).await?;
        self.lock()
            .comments
            .remove(comment_id)
            .map(|_| "Comment deleted".to_string())
            .ok_or_else(|| GatewayError::NotFound("Comment not found".to_string()))
    }
}

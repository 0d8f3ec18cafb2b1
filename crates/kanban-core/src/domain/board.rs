//! Board and List Entities
//!
//! A board owns an ordered sequence of lists; each list owns its cards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::Card;
use super::entity::{BoardId, Entity, ListId, Positioned, UserId};

/// Board index entry, as returned by the board listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub archived: bool,
}

/// A full board with its list/card tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Option<UserId>,
    pub members: BTreeSet<UserId>,
    pub archived: bool,
    /// Lists in display order (ascending position)
    pub lists: Vec<List>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            owner_id: None,
            members: BTreeSet::new(),
            archived: false,
            lists: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            archived: self.archived,
        }
    }

    pub fn list(&self, list_id: &str) -> Option<&List> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    pub fn list_mut(&mut self, list_id: &str) -> Option<&mut List> {
        self.lists.iter_mut().find(|list| list.id == list_id)
    }

    /// Index of a list in display order
    pub fn list_index(&self, list_id: &str) -> Option<usize> {
        self.lists.iter().position(|list| list.id == list_id)
    }

    /// Locate a card: (list index, card index)
    pub fn locate_card(&self, card_id: &str) -> Option<(usize, usize)> {
        self.lists.iter().enumerate().find_map(|(list_idx, list)| {
            list.card_index(card_id).map(|card_idx| (list_idx, card_idx))
        })
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.locate_card(card_id)
            .map(|(list_idx, card_idx)| &self.lists[list_idx].cards[card_idx])
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        let (list_idx, card_idx) = self.locate_card(card_id)?;
        Some(&mut self.lists[list_idx].cards[card_idx])
    }

    /// Next free list position (max + 1, or 0 for an empty board)
    pub fn next_list_position(&self) -> i32 {
        self.lists
            .iter()
            .map(|list| list.position)
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl Entity for Board {
    fn id(&self) -> &str {
        &self.id
    }
}

/// An ordered column of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub title: String,
    pub position: i32,
    pub archived: bool,
    /// Cards in display order (ascending position)
    pub cards: Vec<Card>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl List {
    pub fn new(
        id: impl Into<ListId>,
        board_id: impl Into<BoardId>,
        title: impl Into<String>,
        position: i32,
    ) -> Self {
        Self {
            id: id.into(),
            board_id: board_id.into(),
            title: title.into(),
            position,
            archived: false,
            cards: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }

    pub fn next_card_position(&self) -> i32 {
        self.cards
            .iter()
            .map(|card| card.position)
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl Entity for List {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Positioned for List {
    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn is_archived(&self) -> bool {
        self.archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_cards() -> Board {
        let mut board = Board::new("b1", "Board1");
        let mut l1 = List::new("l1", "b1", "L1", 0);
        l1.cards.push(Card::new("c1", "l1", "Card1", 0));
        l1.cards.push(Card::new("c2", "l1", "Card2", 1));
        board.lists.push(l1);
        board.lists.push(List::new("l2", "b1", "L2", 1));
        board
    }

    #[test]
    fn test_locate_card() {
        let board = board_with_cards();
        assert_eq!(board.locate_card("c2"), Some((0, 1)));
        assert_eq!(board.locate_card("missing"), None);
        assert_eq!(board.card("c1").map(|c| c.title.as_str()), Some("Card1"));
    }

    #[test]
    fn test_next_positions() {
        let board = board_with_cards();
        assert_eq!(board.next_list_position(), 2);
        assert_eq!(board.lists[0].next_card_position(), 2);
        assert_eq!(board.lists[1].next_card_position(), 0);
        assert_eq!(Board::new("b2", "Empty").next_list_position(), 0);
    }

    #[test]
    fn test_summary() {
        let board = board_with_cards();
        let summary = board.summary();
        assert_eq!(summary.id, "b1");
        assert_eq!(summary.title, "Board1");
        assert!(!summary.archived);
    }
}

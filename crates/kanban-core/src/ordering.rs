//! Position Bookkeeping
//!
//! Pure functions over the board tree. Every mutation works on a structural
//! copy and finishes by re-deriving positions densely (0, 1, 2, ...) from
//! sequence order, so positions can never drift from what is displayed.

use crate::domain::{Board, Card, List, Positioned};
use crate::error::{KanbanError, KanbanResult};

/// Where a card sits: owning list and index within it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPlacement {
    pub list_id: String,
    pub index: usize,
}

/// Result of relocating a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: String,
    pub from: CardPlacement,
    pub to: CardPlacement,
}

impl CardMove {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Result of relocating a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMove {
    pub list_id: String,
    pub from: usize,
    pub to: usize,
}

/// Clamp a requested position into `[0, len]`
pub fn clamp_position(position: i32, len: usize) -> usize {
    usize::try_from(position).map_or(0, |p| p.min(len))
}

/// Assign positions from sequence order
pub fn renumber<T: Positioned>(items: &mut [T]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.set_position(idx as i32);
    }
}

/// Sort siblings by (position, id) and renumber densely
pub fn reindex<T: Positioned>(items: &mut Vec<T>) {
    items.retain(|item| !item.is_archived());
    items.sort_by(|a, b| {
        a.position()
            .cmp(&b.position())
            .then_with(|| a.id().cmp(b.id()))
    });
    renumber(items);
}

/// Bring a freshly fetched board into canonical shape: archived lists and
/// cards dropped, siblings reindexed, owner ids consistent with containment.
pub fn normalize_board(board: &mut Board) {
    reindex(&mut board.lists);
    for list in &mut board.lists {
        list.board_id = board.id.clone();
        reindex(&mut list.cards);
        for card in &mut list.cards {
            card.list_id = list.id.clone();
        }
    }
}

/// Relocate a card to `target_list_id` at `position`.
///
/// The card is removed from its source list first; the insertion index is
/// then clamped to the destination length after removal.
pub fn move_card(
    board: &Board,
    card_id: &str,
    target_list_id: &str,
    position: i32,
) -> KanbanResult<(Board, CardMove)> {
    let (src_list, src_idx) = board
        .locate_card(card_id)
        .ok_or_else(|| KanbanError::not_found("Card", card_id))?;
    let dst_list = board
        .list_index(target_list_id)
        .ok_or_else(|| KanbanError::not_found("List", target_list_id))?;

    let mut next = board.clone();
    let mut card = next.lists[src_list].cards.remove(src_idx);
    renumber(&mut next.lists[src_list].cards);

    let dst_cards = &mut next.lists[dst_list].cards;
    let dst_idx = clamp_position(position, dst_cards.len());
    card.list_id = target_list_id.to_string();
    dst_cards.insert(dst_idx, card);
    renumber(dst_cards);

    let moved = CardMove {
        card_id: card_id.to_string(),
        from: CardPlacement {
            list_id: board.lists[src_list].id.clone(),
            index: src_idx,
        },
        to: CardPlacement {
            list_id: target_list_id.to_string(),
            index: dst_idx,
        },
    };
    Ok((next, moved))
}

/// Reorder a list within its board
pub fn move_list(board: &Board, list_id: &str, position: i32) -> KanbanResult<(Board, ListMove)> {
    let from = board
        .list_index(list_id)
        .ok_or_else(|| KanbanError::not_found("List", list_id))?;

    let mut next = board.clone();
    let list = next.lists.remove(from);
    let to = clamp_position(position, next.lists.len());
    next.lists.insert(to, list);
    renumber(&mut next.lists);

    Ok((
        next,
        ListMove {
            list_id: list_id.to_string(),
            from,
            to,
        },
    ))
}

/// Take a card out of the tree (archive), renumbering its former siblings
pub fn remove_card(board: &Board, card_id: &str) -> KanbanResult<(Board, CardPlacement)> {
    let (list_idx, card_idx) = board
        .locate_card(card_id)
        .ok_or_else(|| KanbanError::not_found("Card", card_id))?;

    let mut next = board.clone();
    let cards = &mut next.lists[list_idx].cards;
    cards.remove(card_idx);
    renumber(cards);

    Ok((
        next,
        CardPlacement {
            list_id: board.lists[list_idx].id.clone(),
            index: card_idx,
        },
    ))
}

/// Put a card back at an exact placement (used to undo a failed mutation)
pub fn restore_card(board: &Board, mut card: Card, at: &CardPlacement) -> KanbanResult<Board> {
    let mut next = board.clone();
    if let Some((list_idx, card_idx)) = next.locate_card(&card.id) {
        let cards = &mut next.lists[list_idx].cards;
        cards.remove(card_idx);
        renumber(cards);
    }
    let list = next
        .list_mut(&at.list_id)
        .ok_or_else(|| KanbanError::not_found("List", &at.list_id))?;
    let idx = at.index.min(list.cards.len());
    card.list_id = list.id.clone();
    list.cards.insert(idx, card);
    renumber(&mut list.cards);
    Ok(next)
}

/// Take a list (and its cards) out of the board, renumbering the rest.
/// Returns the removed list and the index it held.
pub fn remove_list(board: &Board, list_id: &str) -> KanbanResult<(Board, List, usize)> {
    let idx = board
        .list_index(list_id)
        .ok_or_else(|| KanbanError::not_found("List", list_id))?;

    let mut next = board.clone();
    let list = next.lists.remove(idx);
    renumber(&mut next.lists);
    Ok((next, list, idx))
}

/// Put a list back at `index`, replacing any copy already present
pub fn restore_list(board: &Board, mut list: List, index: usize) -> Board {
    let mut next = board.clone();
    next.lists.retain(|existing| existing.id != list.id);
    list.board_id = next.id.clone();
    list.archived = false;
    let idx = index.min(next.lists.len());
    next.lists.insert(idx, list);
    renumber(&mut next.lists);
    next
}

/// Append a server-confirmed list at the end of the board
pub fn append_list(board: &Board, mut list: List) -> Board {
    let mut next = board.clone();
    next.lists.retain(|existing| existing.id != list.id);
    list.board_id = next.id.clone();
    list.position = next.next_list_position();
    reindex(&mut list.cards);
    next.lists.push(list);
    renumber(&mut next.lists);
    next
}

/// Append a server-confirmed card at the end of its list
pub fn append_card(board: &Board, mut card: Card) -> KanbanResult<Board> {
    let mut next = board.clone();
    let list = next
        .list_mut(&card.list_id)
        .ok_or_else(|| KanbanError::not_found("List", &card.list_id))?;
    list.cards.retain(|existing| existing.id != card.id);
    card.position = list.next_card_position();
    list.cards.push(card);
    renumber(&mut list.cards);
    Ok(next)
}

/// Verify dense positions and containment across the whole tree
pub fn check_invariants(board: &Board) -> Result<(), String> {
    for (idx, list) in board.lists.iter().enumerate() {
        if list.position != idx as i32 {
            return Err(format!(
                "list {} has position {} at index {}",
                list.id, list.position, idx
            ));
        }
        if list.board_id != board.id {
            return Err(format!("list {} claims board {}", list.id, list.board_id));
        }
        for (card_idx, card) in list.cards.iter().enumerate() {
            if card.position != card_idx as i32 {
                return Err(format!(
                    "card {} has position {} at index {} of list {}",
                    card.id, card.position, card_idx, list.id
                ));
            }
            if card.list_id != list.id {
                return Err(format!(
                    "card {} in list {} claims list {}",
                    card.id, list.id, card.list_id
                ));
            }
        }
    }
    let mut seen = std::collections::HashSet::new();
    for card in board.lists.iter().flat_map(|list| list.cards.iter()) {
        if !seen.insert(card.id.as_str()) {
            return Err(format!("card {} appears twice", card.id));
        }
    }
    Ok(())
}

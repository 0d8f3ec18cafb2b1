//! Drag-Reorder Controller
//!
//! Turns drag gestures into move intents for the store. The pointer plumbing
//! lives in `leptos-dragdrop`; this module only sees ids.
//!
//! Draggable and droppable elements carry namespaced ids: `card:<id>` and
//! `list:<id>`.

mod collision;

use tracing::debug;

use crate::domain::{Board, CardId, CardTarget, ListId};

pub use collision::{
    order_candidates, resolve_collision, CollisionStrategy, DropCandidate, Point, Rect,
};

pub const CARD_PREFIX: &str = "card:";
pub const LIST_PREFIX: &str = "list:";

pub fn card_dom_id(card_id: &str) -> String {
    format!("{}{}", CARD_PREFIX, card_id)
}

pub fn list_dom_id(list_id: &str) -> String {
    format!("{}{}", LIST_PREFIX, list_id)
}

/// What is being dragged (or dropped onto)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSubject {
    Card(CardId),
    List(ListId),
}

impl DragSubject {
    /// Classify a namespaced id; anything without a known prefix and a
    /// non-empty remainder is rejected.
    pub fn parse(dom_id: &str) -> Option<Self> {
        if let Some(id) = dom_id.strip_prefix(CARD_PREFIX) {
            return Some(Self::Card(id.to_string())).filter(|_| !id.is_empty());
        }
        if let Some(id) = dom_id.strip_prefix(LIST_PREFIX) {
            return Some(Self::List(id.to_string())).filter(|_| !id.is_empty());
        }
        None
    }

    pub fn dom_id(&self) -> String {
        match self {
            Self::Card(id) => card_dom_id(id),
            Self::List(id) => list_dom_id(id),
        }
    }
}

/// Library-neutral drop notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    pub subject_id: String,
    pub over_id: Option<String>,
}

impl DragEvent {
    pub fn new(subject_id: impl Into<String>, over_id: Option<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            over_id,
        }
    }
}

/// Move requested by a completed drag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    MoveCard { card_id: CardId, target: CardTarget },
    MoveList { list_id: ListId, position: i32 },
}

/// Pointer travel needed before a press turns into a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragActivation {
    pub distance_px: i32,
}

impl Default for DragActivation {
    fn default() -> Self {
        Self {
            distance_px: crate::config::DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

impl DragActivation {
    pub fn new(distance_px: i32) -> Self {
        Self {
            distance_px: distance_px.max(0),
        }
    }

    /// True once the pointer moved beyond the threshold along either axis
    pub fn is_drag(&self, start: Point, current: Point) -> bool {
        let limit = f64::from(self.distance_px);
        (current.x - start.x).abs() > limit || (current.y - start.y).abs() > limit
    }
}

/// Tracks the active drag subject between start and end
#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragSubject>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&DragSubject> {
        self.active.as_ref()
    }

    /// Begin a drag. Returns false (and keeps nothing active) for ids
    /// that are neither a card nor a list.
    pub fn on_drag_start(&mut self, dragged_id: &str) -> bool {
        self.active = DragSubject::parse(dragged_id);
        debug!(dragged_id, accepted = self.active.is_some(), "drag start");
        self.active.is_some()
    }

    pub fn cancel(&mut self) {
        if self.active.take().is_some() {
            debug!("drag cancelled");
        }
    }

    /// Finish the drag and compute the move, if any. The active subject is
    /// always cleared.
    pub fn on_drag_end(&mut self, event: &DragEvent, board: &Board) -> Option<DragIntent> {
        let subject = self.active.take()?;
        if subject.dom_id() != event.subject_id {
            debug!(active = %subject.dom_id(), event = %event.subject_id, "drag end for another subject");
            return None;
        }
        let over = DragSubject::parse(event.over_id.as_deref()?)?;
        if over == subject {
            return None;
        }

        let intent = match subject {
            DragSubject::Card(card_id) => {
                let target = match over {
                    DragSubject::Card(over_card) => {
                        let (list_idx, card_idx) = board.locate_card(&over_card)?;
                        CardTarget::new(board.lists[list_idx].id.clone(), card_idx as i32)
                    }
                    DragSubject::List(list_id) => {
                        let list = board.list(&list_id)?;
                        CardTarget::new(list_id, list.cards.len() as i32)
                    }
                };
                DragIntent::MoveCard { card_id, target }
            }
            DragSubject::List(list_id) => {
                let over_list = match over {
                    DragSubject::List(id) => board.list_index(&id)?,
                    DragSubject::Card(id) => board.locate_card(&id)?.0,
                };
                DragIntent::MoveList {
                    list_id,
                    position: over_list as i32,
                }
            }
        };
        debug!(?intent, "drag end");
        Some(intent)
    }
}

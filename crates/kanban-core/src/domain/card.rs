//! Card and Comment Entities

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{CardId, CommentId, Entity, ListId, Positioned, UserId};

/// A task unit belonging to exactly one list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub assignees: BTreeSet<UserId>,
    pub labels: BTreeSet<String>,
    pub archived: bool,
    /// Comments as of the last fetch; not kept in sync by comment operations
    pub comments: Vec<Comment>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(
        id: impl Into<CardId>,
        list_id: impl Into<ListId>,
        title: impl Into<String>,
        position: i32,
    ) -> Self {
        Self {
            id: id.into(),
            list_id: list_id.into(),
            title: title.into(),
            description: None,
            position,
            due_date: None,
            assignees: BTreeSet::new(),
            labels: BTreeSet::new(),
            archived: false,
            comments: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Apply the editable fields of a patch. Position and list are untouched.
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(assignees) = &patch.assignees {
            self.assignees = assignees.clone();
        }
        if let Some(labels) = &patch.labels {
            self.labels = labels.clone();
        }
    }

    /// Copy server-owned content fields from `other`, keeping local placement
    pub fn absorb_content(&mut self, other: &Card) {
        self.title = other.title.clone();
        self.description = other.description.clone();
        self.due_date = other.due_date;
        self.assignees = other.assignees.clone();
        self.labels = other.labels.clone();
        self.updated_at = other.updated_at;
    }
}

impl Entity for Card {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Positioned for Card {
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

/// Partial card update. `None` leaves a field unchanged; for nullable
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assignees: Option<BTreeSet<UserId>>,
    pub labels: Option<BTreeSet<String>>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.assignees.is_none()
            && self.labels.is_none()
    }
}

/// Append-only comment on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub card_id: CardId,
    pub author_id: Option<UserId>,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_patch_keeps_placement() {
        let mut card = Card::new("c1", "l1", "Old", 3);
        let patch = CardPatch {
            title: Some("New".to_string()),
            description: Some(Some("notes".to_string())),
            labels: Some(["urgent".to_string()].into_iter().collect()),
            ..Default::default()
        };

        card.apply_patch(&patch);

        assert_eq!(card.title, "New");
        assert_eq!(card.description.as_deref(), Some("notes"));
        assert!(card.labels.contains("urgent"));
        assert_eq!(card.position, 3);
        assert_eq!(card.list_id, "l1");
    }

    #[test]
    fn test_patch_clears_nullable_field() {
        let mut card = Card::new("c1", "l1", "Card", 0);
        card.description = Some("text".to_string());

        card.apply_patch(&CardPatch {
            description: Some(None),
            ..Default::default()
        });

        assert_eq!(card.description, None);
        assert!(CardPatch::default().is_empty());
    }
}

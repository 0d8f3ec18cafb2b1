//! Mutation inputs shared by the store and the gateway

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::card::CardPatch;
use super::entity::{ListId, UserId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBoard {
    pub title: String,
    pub description: Option<String>,
    pub members: BTreeSet<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub members: Option<BTreeSet<UserId>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewList {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPatch {
    pub title: Option<String>,
    pub position: Option<i32>,
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Card update as sent to the server: content patch plus archive flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub patch: CardPatch,
    pub archived: Option<bool>,
}

/// Destination of a card move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTarget {
    pub list_id: ListId,
    pub position: i32,
}

impl CardTarget {
    pub fn new(list_id: impl Into<ListId>, position: i32) -> Self {
        Self {
            list_id: list_id.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewComment {
    pub content: String,
}

/// Trim a required title, rejecting blank input
pub fn required_title(kind: &str, title: &str) -> Result<String, String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(format!("{} title is required", kind))
    } else {
        Ok(trimmed.to_string())
    }
}

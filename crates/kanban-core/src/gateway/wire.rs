//! Wire Format
//!
//! Request bodies and raw response documents of the Board Store API, plus
//! the normalization from raw documents to domain entities. Server documents
//! may key records by `_id` instead of `id`, and may embed referenced users
//! as objects instead of ids; this module is the only place that knows.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GatewayError, GatewayResult};
use crate::domain::{
    Board, BoardPatch, BoardSummary, Card, CardTarget, CardUpdate, Comment, List, ListPatch,
    NewBoard, NewCard, NewComment, NewList,
};

// ========================
// Request Bodies
// ========================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardBody<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_set")]
    pub members: &'a BTreeSet<String>,
}

fn is_empty_set(set: &&BTreeSet<String>) -> bool {
    set.is_empty()
}

impl<'a> From<&'a NewBoard> for CreateBoardBody<'a> {
    fn from(input: &'a NewBoard) -> Self {
        Self {
            title: &input.title,
            description: input.description.as_deref(),
            members: &input.members,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<&'a BTreeSet<String>>,
}

impl<'a> From<&'a BoardPatch> for UpdateBoardBody<'a> {
    fn from(patch: &'a BoardPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            description: patch.description.as_ref().map(|d| d.as_deref()),
            members: patch.members.as_ref(),
        }
    }
}

#[derive(Serialize)]
pub struct CreateListBody<'a> {
    pub title: &'a str,
}

impl<'a> From<&'a NewList> for CreateListBody<'a> {
    fn from(input: &'a NewList) -> Self {
        Self { title: &input.title }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl<'a> From<&'a ListPatch> for UpdateListBody<'a> {
    fn from(patch: &'a ListPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            position: patch.position,
            archived: patch.archived,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardBody<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl<'a> From<&'a NewCard> for CreateCardBody<'a> {
    fn from(input: &'a NewCard) -> Self {
        Self {
            title: &input.title,
            description: input.description.as_deref(),
            due_date: input.due_date,
        }
    }
}

/// `Some(None)` fields serialize as `null` so the server clears them
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl<'a> From<&'a CardUpdate> for UpdateCardBody<'a> {
    fn from(update: &'a CardUpdate) -> Self {
        let patch = &update.patch;
        Self {
            title: patch.title.as_deref(),
            description: patch.description.as_ref().map(|d| d.as_deref()),
            due_date: patch.due_date,
            assignees: patch.assignees.as_ref(),
            labels: patch.labels.as_ref(),
            archived: update.archived,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardBody<'a> {
    pub list_id: &'a str,
    pub position: i32,
}

impl<'a> From<&'a CardTarget> for MoveCardBody<'a> {
    fn from(target: &'a CardTarget) -> Self {
        Self {
            list_id: &target.list_id,
            position: target.position,
        }
    }
}

#[derive(Serialize)]
pub struct CommentBody<'a> {
    pub content: &'a str,
}

impl<'a> From<&'a NewComment> for CommentBody<'a> {
    fn from(input: &'a NewComment) -> Self {
        Self {
            content: &input.content,
        }
    }
}

// ========================
// Raw Response Documents
// ========================

/// Identifier as the server may send it
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Reference to another record: a bare id or an embedded document
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Id(RawId),
    Doc {
        #[serde(rename = "_id")]
        mongo_id: Option<RawId>,
        id: Option<RawId>,
    },
}

impl RawRef {
    fn into_id(self) -> Option<String> {
        match self {
            RawRef::Id(id) => Some(id.into_string()),
            RawRef::Doc { mongo_id, id } => id.or(mongo_id).map(RawId::into_string),
        }
    }
}

/// Label as a plain string or a `{name}` document
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Name(String),
    Doc { name: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoard {
    #[serde(rename = "_id")]
    pub mongo_id: Option<RawId>,
    pub id: Option<RawId>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(alias = "ownerId")]
    pub owner: Option<RawRef>,
    #[serde(default)]
    pub members: Vec<RawRef>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub lists: Vec<RawList>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawList {
    #[serde(rename = "_id")]
    pub mongo_id: Option<RawId>,
    pub id: Option<RawId>,
    #[serde(alias = "board")]
    pub board_id: Option<RawRef>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub cards: Vec<RawCard>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    #[serde(rename = "_id")]
    pub mongo_id: Option<RawId>,
    pub id: Option<RawId>,
    #[serde(alias = "list")]
    pub list_id: Option<RawRef>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignees: Vec<RawRef>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub comments: Vec<RawComment>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    #[serde(rename = "_id")]
    pub mongo_id: Option<RawId>,
    pub id: Option<RawId>,
    #[serde(alias = "card")]
    pub card_id: Option<RawRef>,
    #[serde(alias = "author")]
    pub author_id: Option<RawRef>,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// `{ "message": "..." }` acknowledgements
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub message: String,
}

// ========================
// Normalization
// ========================

fn primary_id(kind: &str, mongo_id: Option<RawId>, id: Option<RawId>) -> GatewayResult<String> {
    id.or(mongo_id)
        .map(RawId::into_string)
        .ok_or_else(|| GatewayError::Network(format!("Malformed response: {} without id", kind)))
}

fn ref_ids(refs: Vec<RawRef>) -> BTreeSet<String> {
    refs.into_iter().filter_map(RawRef::into_id).collect()
}

pub fn normalize_summary(raw: RawBoard) -> GatewayResult<BoardSummary> {
    Ok(BoardSummary {
        id: primary_id("board", raw.mongo_id, raw.id)?,
        title: raw.title,
        description: raw.description,
        archived: raw.archived,
    })
}

pub fn normalize_board(raw: RawBoard) -> GatewayResult<Board> {
    let id = primary_id("board", raw.mongo_id, raw.id)?;
    let lists = raw
        .lists
        .into_iter()
        .map(|list| normalize_list(list, Some(&id)))
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(Board {
        title: raw.title,
        description: raw.description,
        owner_id: raw.owner.and_then(RawRef::into_id),
        members: ref_ids(raw.members),
        archived: raw.archived,
        lists,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        id,
    })
}

/// `board_id` fills in for documents that omit their owner
pub fn normalize_list(raw: RawList, board_id: Option<&str>) -> GatewayResult<List> {
    let id = primary_id("list", raw.mongo_id, raw.id)?;
    let cards = raw
        .cards
        .into_iter()
        .map(|card| normalize_card(card, Some(&id)))
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(List {
        board_id: raw
            .board_id
            .and_then(RawRef::into_id)
            .or_else(|| board_id.map(str::to_string))
            .unwrap_or_default(),
        title: raw.title,
        position: raw.position,
        archived: raw.archived,
        cards,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        id,
    })
}

/// `list_id` fills in for documents that omit their owner
pub fn normalize_card(raw: RawCard, list_id: Option<&str>) -> GatewayResult<Card> {
    let id = primary_id("card", raw.mongo_id, raw.id)?;
    let comments = raw
        .comments
        .into_iter()
        .map(|comment| normalize_comment(comment, Some(&id)))
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(Card {
        list_id: raw
            .list_id
            .and_then(RawRef::into_id)
            .or_else(|| list_id.map(str::to_string))
            .unwrap_or_default(),
        title: raw.title,
        description: raw.description,
        position: raw.position,
        due_date: raw.due_date,
        assignees: ref_ids(raw.assignees),
        labels: raw
            .labels
            .into_iter()
            .map(|label| match label {
                RawLabel::Name(name) | RawLabel::Doc { name } => name,
            })
            .collect(),
        archived: raw.archived,
        comments,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        id,
    })
}

pub fn normalize_comment(raw: RawComment, card_id: Option<&str>) -> GatewayResult<Comment> {
    Ok(Comment {
        id: primary_id("comment", raw.mongo_id, raw.id)?,
        card_id: raw
            .card_id
            .and_then(RawRef::into_id)
            .or_else(|| card_id.map(str::to_string))
            .unwrap_or_default(),
        author_id: raw.author_id.and_then(RawRef::into_id),
        content: raw.content,
        created_at: raw.created_at,
    })
}

/// Human-readable message from an error body.
///
/// Tries `message`, then `error`, then falls back to the raw body.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

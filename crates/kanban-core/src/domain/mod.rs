//! Domain Layer
//!
//! Core entities of a Kanban board: boards own lists, lists own cards.

mod board;
mod card;
mod entity;
mod input;

pub use board::{Board, BoardSummary, List};
pub use card::{Card, CardPatch, Comment};
pub use entity::{BoardId, CardId, CommentId, Entity, ListId, Positioned, UserId};
pub use input::{
    required_title, BoardPatch, CardTarget, CardUpdate, ListPatch, NewBoard, NewCard,
    NewComment, NewList,
};

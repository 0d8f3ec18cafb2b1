//! Domain Layer - Core Entity Traits
//!
//! Every board entity has an opaque string id. Lists and cards additionally
//! carry a dense zero-based position among their siblings.

/// Core trait for all domain entities
pub trait Entity: Sized + Clone {
    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}

/// Entities ordered among siblings by an integer position
pub trait Positioned: Entity {
    fn position(&self) -> i32;

    fn set_position(&mut self, position: i32);

    /// Archived siblings are excluded from ordering
    fn is_archived(&self) -> bool;
}

pub type BoardId = String;
pub type ListId = String;
pub type CardId = String;
pub type CommentId = String;
pub type UserId = String;

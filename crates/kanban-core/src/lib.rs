//! Kanban Core
//!
//! Platform-independent part of the board client: the board/list/card model,
//! position bookkeeping, the optimistic board store, the remote gateway and
//! the drag controller. The Leptos UI and `leptos-dragdrop` sit on top.

pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod gateway;
pub mod ordering;
pub mod store;

pub use config::KanbanConfig;
pub use error::{KanbanError, KanbanResult};
pub use gateway::{BoardGateway, GatewayError, HttpGateway, MemoryGateway};
pub use store::{BoardState, BoardStore, SubscriptionId};

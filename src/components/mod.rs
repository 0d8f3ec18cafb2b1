//! UI Components
//!
//! Reusable Leptos components.

mod archive_confirm;
mod board_tab_bar;
mod board_view;
mod card_editor;
mod card_item;
mod error_banner;
mod list_column;
mod title_form;

pub use archive_confirm::ArchiveConfirm;
pub use board_tab_bar::BoardTabBar;
pub use board_view::BoardView;
pub use card_editor::CardEditor;
pub use card_item::CardItem;
pub use error_banner::ErrorBanner;
pub use list_column::ListColumn;
pub use title_form::TitleForm;

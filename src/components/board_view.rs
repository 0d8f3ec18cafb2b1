//! Board View Component
//!
//! Columns of the open board plus the "add list" form.

use leptos::prelude::*;

use crate::components::{ListColumn, TitleForm};
use crate::context::use_board_context;
use crate::store::{current_board_id, use_ui_store, UiStateStoreFields};

#[component]
pub fn BoardView() -> impl IntoView {
    let ctx = use_board_context();
    let store = use_ui_store();

    let list_ids = move || {
        store.current().with(|current| {
            current
                .as_ref()
                .map(|b| b.lists.iter().map(|l| l.id.clone()).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let board_title = move || store.current().with(|c| c.as_ref().map(|b| b.title.clone()).unwrap_or_default());
    let board_description = move || store.current().with(|c| c.as_ref().and_then(|b| b.description.clone()));

    let on_new_list = Callback::new(move |title: String| {
        if let Some(board_id) = current_board_id(&store) {
            ctx.create_list(board_id, title);
        }
    });

    view! {
        <div class="board-view">
            <Show
                when=move || store.current().with(|c| c.is_some())
                fallback=move || view! {
                    <div class="board-empty">
                        {move || if store.loading().get() { "Loading..." } else { "No board open" }}
                    </div>
                }
            >
                <div class="board-header">
                    <h2 class="board-title">{board_title}</h2>
                    {move || board_description().map(|d| view! { <p class="board-description">{d}</p> })}
                    <Show when=move || store.loading().get()>
                        <span class="board-loading">"Saving..."</span>
                    </Show>
                </div>
                <div class="board-lists">
                    <For
                        each=list_ids
                        key=|id| id.clone()
                        children=move |list_id| view! { <ListColumn list_id=list_id /> }
                    />
                    <TitleForm class="new-list-form" placeholder="Add a list..." on_submit=on_new_list />
                </div>
            </Show>
        </div>
    }
}

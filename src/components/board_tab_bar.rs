//! Board Tab Bar Component
//!
//! Tab bar for switching between boards, creating and archiving them.

use leptos::prelude::*;

use crate::components::ArchiveConfirm;
use crate::context::use_board_context;
use crate::store::{current_board_id, use_ui_store, UiStateStoreFields};

/// Board Tab Bar component
#[component]
pub fn BoardTabBar() -> impl IntoView {
    let ctx = use_board_context();
    let store = use_ui_store();
    let (adding, set_adding) = signal(false);
    let (new_name, set_new_name) = signal(String::new());

    let create_ctx = ctx.clone();
    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get().trim().to_string();
        if name.is_empty() {
            return;
        }
        create_ctx.create_board(name);
        set_new_name.set(String::new());
        set_adding.set(false);
    };

    view! {
        <div class="board-tab-bar">
            <For
                each=move || store.boards().get()
                key=|board| (board.id.clone(), board.title.clone())
                children=move |board| {
                    let id = board.id.clone();
                    let active_id = id.clone();
                    let is_active = move || current_board_id(&store).as_deref() == Some(active_id.as_str());
                    let tab_class = {
                        let is_active = is_active.clone();
                        move || if is_active() { "board-tab active" } else { "board-tab" }
                    };
                    let open_ctx = ctx.clone();
                    let open_id = id.clone();
                    let archive_ctx = ctx.clone();
                    let archive_id = id.clone();

                    view! {
                        <span class=tab_class>
                            <button
                                class="board-tab-title"
                                on:click=move |_| open_ctx.open_board(open_id.clone())
                            >
                                {board.title.clone()}
                            </button>
                            <Show when=is_active.clone()>
                                <ArchiveConfirm
                                    class="board-archive-btn"
                                    label="Archive board"
                                    on_confirm={
                                        let archive_ctx = archive_ctx.clone();
                                        let archive_id = archive_id.clone();
                                        Callback::new(move |_| archive_ctx.archive_board(archive_id.clone()))
                                    }
                                />
                            </Show>
                        </span>
                    }
                }
            />

            {move || if adding.get() {
                view! {
                    <form class="board-add-form" on:submit=on_add.clone()>
                        <input
                            type="text"
                            placeholder="Board name"
                            prop:value=move || new_name.get()
                            on:input=move |ev| set_new_name.set(event_target_value(&ev))
                        />
                        <button type="submit">"+"</button>
                        <button type="button" on:click=move |_| set_adding.set(false)>"×"</button>
                    </form>
                }.into_any()
            } else {
                view! {
                    <button
                        class="board-add-btn"
                        on:click=move |_| set_adding.set(true)
                    >
                        "+"
                    </button>
                }.into_any()
            }}
        </div>
    }
}

//! List Column Component
//!
//! A list with its cards. The header is the list's drag handle; the column
//! body is a drop target so cards can land in empty lists.

use kanban_core::drag::list_dom_id;
use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_mouseenter, make_on_mouseleave};

use crate::components::{ArchiveConfirm, CardItem, TitleForm};
use crate::context::use_board_context;
use crate::store::{find_list, use_ui_store};

#[component]
pub fn ListColumn(list_id: String) -> impl IntoView {
    let ctx = use_board_context();
    let store = use_ui_store();
    let dnd = ctx.dnd;
    let dom_id = list_dom_id(&list_id);

    let list = {
        let list_id = list_id.clone();
        Memo::new(move |_| find_list(&store, &list_id))
    };
    let title = move || list.with(|l| l.as_ref().map(|l| l.title.clone()).unwrap_or_default());
    let card_ids = move || {
        list.with(|l| {
            l.as_ref()
                .map(|l| l.cards.iter().map(|c| c.id.clone()).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let card_count = move || list.with(|l| l.as_ref().map_or(0, |l| l.cards.len()));

    let (renaming, set_renaming) = signal(false);
    let (title_value, set_title_value) = signal(String::new());

    let on_mousedown = make_on_mousedown(dnd, dom_id.clone());
    let on_mouseenter = make_on_mouseenter(dnd, dom_id.clone());
    let on_mouseleave = make_on_mouseleave(dnd, dom_id.clone());

    let column_class = {
        let dom_id = dom_id.clone();
        move || {
            let mut class = String::from("list-column");
            if dnd.is_dragging(&dom_id) {
                class.push_str(" dragging");
            }
            if dnd.is_over(&dom_id) {
                class.push_str(" drag-over");
            }
            class
        }
    };

    let rename_ctx = ctx.clone();
    let rename_id = list_id.clone();
    let save_title = move || {
        if !renaming.get_untracked() {
            return;
        }
        set_renaming.set(false);
        let new_title = title_value.get_untracked().trim().to_string();
        if new_title.is_empty() || new_title == title() {
            return;
        }
        rename_ctx.rename_list(rename_id.clone(), new_title);
    };

    let archive_ctx = ctx.clone();
    let archive_id = list_id.clone();
    let on_archive = Callback::new(move |_| archive_ctx.archive_list(archive_id.clone()));

    let create_ctx = ctx.clone();
    let new_card_list = list_id.clone();
    let on_new_card = Callback::new(move |card_title: String| {
        create_ctx.create_card(new_card_list.clone(), card_title)
    });

    view! {
        <section
            class=column_class
            data-dnd-id=dom_id
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <header class="list-header" on:mousedown=on_mousedown>
                {move || if renaming.get() {
                    let on_blur = save_title.clone();
                    let on_enter = save_title.clone();
                    view! {
                        <input
                            class="list-title-input"
                            type="text"
                            prop:value=move || title_value.get()
                            on:input=move |ev| set_title_value.set(event_target_value(&ev))
                            on:blur=move |_| on_blur()
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                if ev.key() == "Enter" {
                                    on_enter();
                                } else if ev.key() == "Escape" {
                                    set_renaming.set(false);
                                }
                            }
                        />
                    }.into_any()
                } else {
                    view! {
                        <h3
                            class="list-title"
                            title="Double-click to rename"
                            on:dblclick=move |_| {
                                set_title_value.set(title());
                                set_renaming.set(true);
                            }
                        >
                            {title}
                        </h3>
                    }.into_any()
                }}
                <span class="list-count">{card_count}</span>
                <ArchiveConfirm class="list-archive-btn" label="Archive list" on_confirm=on_archive />
            </header>
            <div class="list-cards">
                <For
                    each=card_ids
                    key=|id| id.clone()
                    children=move |card_id| view! { <CardItem card_id=card_id /> }
                />
            </div>
            <TitleForm class="new-card-form" placeholder="Add a card..." on_submit=on_new_card />
        </section>
    }
}

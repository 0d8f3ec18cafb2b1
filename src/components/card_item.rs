//! Card Item Component
//!
//! One card in a list column. The whole card is the drag handle and a drop
//! target; a click that is not the tail of a drag opens the editor.

use kanban_core::drag::card_dom_id;
use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_mouseenter, make_on_mouseleave};

use crate::components::ArchiveConfirm;
use crate::context::use_board_context;
use crate::markdown::{label_class, parse_markdown_inline};
use crate::store::{find_card, use_ui_store};

#[component]
pub fn CardItem(card_id: String) -> impl IntoView {
    let ctx = use_board_context();
    let store = use_ui_store();
    let dnd = ctx.dnd;
    let dom_id = card_dom_id(&card_id);

    let card = {
        let card_id = card_id.clone();
        Memo::new(move |_| find_card(&store, &card_id))
    };

    let on_mousedown = make_on_mousedown(dnd, dom_id.clone());
    let on_mouseenter = make_on_mouseenter(dnd, dom_id.clone());
    let on_mouseleave = make_on_mouseleave(dnd, dom_id.clone());

    let editing = ctx.editing_card;
    let card_class = {
        let dom_id = dom_id.clone();
        let card_id = card_id.clone();
        move || {
            let mut class = String::from("card-item");
            if dnd.is_dragging(&dom_id) {
                class.push_str(" dragging");
            }
            if dnd.is_over(&dom_id) {
                class.push_str(" drag-over");
            }
            if editing.get().as_deref() == Some(card_id.as_str()) {
                class.push_str(" editing");
            }
            class
        }
    };

    let click_id = card_id.clone();
    let on_click = move |_: web_sys::MouseEvent| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        editing.set(Some(click_id.clone()));
    };

    let archive_ctx = ctx.clone();
    let archive_id = card_id.clone();
    let on_archive = Callback::new(move |_| archive_ctx.archive_card(archive_id.clone()));

    let labels = move || {
        card.with(|c| c.as_ref().map(|c| c.labels.iter().cloned().collect::<Vec<_>>()))
            .unwrap_or_default()
    };
    let title_html = move || card.with(|c| c.as_ref().map(|c| parse_markdown_inline(&c.title)).unwrap_or_default());
    let due = move || card.with(|c| c.as_ref()?.due_date.map(|d| d.format("%b %-d").to_string()));
    let has_description = move || {
        card.with(|c| {
            c.as_ref()
                .and_then(|c| c.description.as_deref())
                .is_some_and(|d| !d.trim().is_empty())
        })
    };
    let comment_count = move || card.with(|c| c.as_ref().map_or(0, |c| c.comments.len()));
    let assignees = move || {
        card.with(|c| {
            c.as_ref()
                .map(|c| c.assignees.iter().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default()
        })
    };

    view! {
        <div
            class=card_class
            data-dnd-id=dom_id
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
            on:click=on_click
        >
            <div class="card-labels">
                <For
                    each=labels
                    key=|label| label.clone()
                    children=move |label| view! {
                        <span class=format!("card-label {}", label_class(&label))>{label.clone()}</span>
                    }
                />
            </div>
            <div class="card-title" inner_html=title_html></div>
            <div class="card-meta">
                {move || due().map(|d| view! { <span class="card-due">{d}</span> })}
                <Show when=has_description>
                    <span class="card-has-description" title="Has description">"≡"</span>
                </Show>
                <Show when={move || comment_count() > 0}>
                    <span class="card-comments">{move || format!("💬 {}", comment_count())}</span>
                </Show>
                <span class="card-assignees">{assignees}</span>
            </div>
            <ArchiveConfirm class="card-archive-btn" label="Archive card" on_confirm=on_archive />
        </div>
    }
}

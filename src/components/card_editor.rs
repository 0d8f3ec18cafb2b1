//! Card Editor Column
//!
//! Side panel for the card picked in the board: title, markdown description
//! with live preview, labels, assignees, due date and comments.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use kanban_core::domain::{Card, CardPatch, Comment};
use leptos::prelude::*;

use crate::components::{ArchiveConfirm, TitleForm};
use crate::context::use_board_context;
use crate::markdown::parse_markdown;
use crate::store::{find_card, use_ui_store};

/// Editable copy of a card's fields
#[derive(Clone, Debug, Default, PartialEq)]
struct Draft {
    title: String,
    description: String,
    labels: String,
    assignees: String,
    due_date: String,
}

impl Draft {
    fn from_card(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone().unwrap_or_default(),
            labels: card.labels.iter().cloned().collect::<Vec<_>>().join(", "),
            assignees: card.assignees.iter().cloned().collect::<Vec<_>>().join(", "),
            due_date: card
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    /// Patch with only the fields that differ from `card`
    fn patch_against(&self, card: &Card) -> CardPatch {
        let mut patch = CardPatch::default();
        let title = self.title.trim();
        if !title.is_empty() && title != card.title {
            patch.title = Some(title.to_string());
        }
        let description = Some(self.description.clone()).filter(|d| !d.trim().is_empty());
        if description != card.description {
            patch.description = Some(description);
        }
        let labels = split_set(&self.labels);
        if labels != card.labels {
            patch.labels = Some(labels);
        }
        let assignees = split_set(&self.assignees);
        if assignees != card.assignees {
            patch.assignees = Some(assignees);
        }
        let due_date = parse_due_date(&self.due_date);
        if due_date != card.due_date {
            patch.due_date = Some(due_date);
        }
        patch
    }
}

fn split_set(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `<input type="date">` value to midnight UTC
fn parse_due_date(text: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

#[component]
pub fn CardEditor() -> impl IntoView {
    let ctx = use_board_context();
    let store = use_ui_store();
    let editing = ctx.editing_card;

    let card = Memo::new(move |_| editing.get().and_then(|id| find_card(&store, &id)));
    let (draft, set_draft) = signal(Draft::default());
    let (comments, set_comments) = signal(Vec::<Comment>::new());

    // Reset the draft only when another card is picked, so a board refresh
    // does not wipe half-typed edits
    let (last_card_id, set_last_card_id) = signal(None::<String>);
    Effect::new(move |_| {
        let current = card.get();
        let current_id = current.as_ref().map(|c| c.id.clone());
        if current_id != last_card_id.get_untracked() {
            set_last_card_id.set(current_id);
            match current {
                Some(card) => {
                    set_draft.set(Draft::from_card(&card));
                    set_comments.set(card.comments.clone());
                }
                None => {
                    set_draft.set(Draft::default());
                    set_comments.set(Vec::new());
                }
            }
        }
    });

    // Closing the panel for a card that vanished (archived, moved boards)
    Effect::new(move |_| {
        if editing.get().is_some() && card.get().is_none() {
            editing.set(None);
        }
    });

    let save_ctx = ctx.clone();
    let save = move || {
        let Some(current) = card.get_untracked() else {
            return;
        };
        let patch = draft.get_untracked().patch_against(&current);
        save_ctx.update_card(current.id.clone(), patch);
    };
    let save_on_blur = save.clone();

    let comment_ctx = ctx.clone();
    let on_comment = Callback::new(move |content: String| {
        if let Some(card_id) = editing.get_untracked() {
            comment_ctx.add_comment(card_id, content, set_comments);
        }
    });

    let archive_ctx = ctx.clone();
    let on_archive = Callback::new(move |_| {
        if let Some(card_id) = editing.get_untracked() {
            archive_ctx.archive_card(card_id);
        }
    });

    let delete_ctx = ctx.clone();
    let rendered_html = move || draft.with(|d| parse_markdown(&d.description));

    view! {
        <Show when=move || card.with(|c| c.is_some())>
            {
                let save_on_blur = save_on_blur.clone();
                let save = save.clone();
                let delete_ctx = delete_ctx.clone();
                view! {
                    <aside class="card-editor-column">
                        <div class="card-editor-header">
                            <input
                                class="card-title-input"
                                type="text"
                                prop:value=move || draft.with(|d| d.title.clone())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    set_draft.update(|d| d.title = value);
                                }
                                on:blur={
                                    let save = save_on_blur.clone();
                                    move |_| save()
                                }
                            />
                            <ArchiveConfirm class="card-archive-btn" label="Archive card" on_confirm=on_archive />
                            <button class="close-btn" on:click=move |_| editing.set(None)>"×"</button>
                        </div>

                        <div class="card-editor-fields">
                            <label>
                                "Labels"
                                <input
                                    type="text"
                                    placeholder="urgent, icu"
                                    prop:value=move || draft.with(|d| d.labels.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        set_draft.update(|d| d.labels = value);
                                    }
                                    on:blur={
                                        let save = save_on_blur.clone();
                                        move |_| save()
                                    }
                                />
                            </label>
                            <label>
                                "Assignees"
                                <input
                                    type="text"
                                    placeholder="user ids, comma separated"
                                    prop:value=move || draft.with(|d| d.assignees.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        set_draft.update(|d| d.assignees = value);
                                    }
                                    on:blur={
                                        let save = save_on_blur.clone();
                                        move |_| save()
                                    }
                                />
                            </label>
                            <label>
                                "Due"
                                <input
                                    type="date"
                                    prop:value=move || draft.with(|d| d.due_date.clone())
                                    on:change={
                                        let save = save.clone();
                                        move |ev| {
                                            let value = event_target_value(&ev);
                                            set_draft.update(|d| d.due_date = value);
                                            save();
                                        }
                                    }
                                />
                            </label>
                        </div>

                        <div class="card-editor-body">
                            <div class="description-edit-pane">
                                <div class="pane-header">"Description"</div>
                                <textarea
                                    class="description-textarea"
                                    prop:value=move || draft.with(|d| d.description.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        set_draft.update(|d| d.description = value);
                                    }
                                    on:blur={
                                        let save = save_on_blur.clone();
                                        move |_| save()
                                    }
                                    placeholder="Markdown supported..."
                                ></textarea>
                            </div>
                            <div class="description-preview-pane">
                                <div class="pane-header">"Preview"</div>
                                <div class="description-preview" inner_html=rendered_html></div>
                            </div>
                        </div>

                        <div class="card-comments-section">
                            <div class="pane-header">"Comments"</div>
                            <For
                                each=move || comments.get()
                                key=|comment| comment.id.clone()
                                children=move |comment| {
                                    let delete_ctx = delete_ctx.clone();
                                    let comment_id = comment.id.clone();
                                    let when = comment
                                        .created_at
                                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                                        .unwrap_or_default();
                                    view! {
                                        <div class="comment">
                                            <div class="comment-meta">
                                                <span class="comment-author">{comment.author_id.clone().unwrap_or_default()}</span>
                                                <span class="comment-date">{when}</span>
                                                <ArchiveConfirm
                                                    class="comment-delete-btn"
                                                    label="Delete comment"
                                                    prompt="Delete?"
                                                    on_confirm=Callback::new(move |_| {
                                                        delete_ctx.delete_comment(comment_id.clone(), set_comments)
                                                    })
                                                />
                                            </div>
                                            <div class="comment-body" inner_html=parse_markdown(&comment.content)></div>
                                        </div>
                                    }
                                }
                            />
                            <TitleForm
                                class="new-comment-form"
                                placeholder="Write a comment..."
                                button_label="Comment"
                                on_submit=on_comment
                            />
                        </div>
                    </aside>
                }
            }
        </Show>
    }
}

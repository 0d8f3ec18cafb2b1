//! Error Banner Component
//!
//! Shows the last failed operation and the session-expired notice.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_board_context;
use crate::store::{use_ui_store, UiStateStoreFields};

/// Errors stay up this long unless dismissed
const AUTO_DISMISS_MS: u32 = 8_000;

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let ctx = use_board_context();
    let store = use_ui_store();

    // Auto-dismiss only the message that was showing when the timer started
    let timer_ctx = ctx.clone();
    Effect::new(move |_| {
        let Some(message) = store.error().get() else {
            return;
        };
        let ctx = timer_ctx.clone();
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(AUTO_DISMISS_MS).await;
            if store.error().get_untracked().as_deref() == Some(message.as_str()) {
                ctx.store.clear_error();
            }
        });
    });

    let dismiss_ctx = ctx.clone();

    view! {
        <Show when=move || store.session_expired().get()>
            <div class="session-banner">
                "Your session has expired. Sign in again to keep editing."
            </div>
        </Show>
        <Show when=move || store.error().with(|e| e.is_some()) && !store.session_expired().get()>
            {
                let dismiss_ctx = dismiss_ctx.clone();
                view! {
                    <div class="error-banner" role="alert">
                        <span class="error-text">{move || store.error().get().unwrap_or_default()}</span>
                        <button class="close-btn" on:click=move |_| dismiss_ctx.store.clear_error()>"×"</button>
                    </div>
                }
            }
        </Show>
    }
}

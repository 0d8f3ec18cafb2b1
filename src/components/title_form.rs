//! Title Form Component
//!
//! One-line form used to add boards, lists and cards.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Inline "add" form. Blank titles are not submitted; the store rejects
/// them as well.
#[component]
pub fn TitleForm(
    #[prop(into)] class: String,
    #[prop(into)] placeholder: String,
    #[prop(into, default = "Add".to_string())] button_label: String,
    #[prop(into)] on_submit: Callback<String>,
) -> impl IntoView {
    let (new_text, set_new_text) = signal(String::new());

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = new_text.get().trim().to_string();
        if text.is_empty() {
            return;
        }
        set_new_text.set(String::new());
        on_submit.run(text);
    };

    view! {
        <form class=class on:submit=submit>
            <div class="new-item-row">
                <input
                    type="text"
                    placeholder=placeholder
                    prop:value=move || new_text.get()
                    on:input=move |ev| {
                        if let Some(input) = ev
                            .target()
                            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                        {
                            set_new_text.set(input.value());
                        }
                    }
                />
                <button type="submit">{button_label}</button>
            </div>
        </form>
    }
}

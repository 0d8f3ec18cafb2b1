//! Two-step archive control shared by boards, lists, cards and comments.

use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Idle,
    Armed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Arm,
    Confirm,
    Cancel,
}

impl Step {
    /// Next step and whether the archive fires. Confirming is only
    /// possible from `Armed`, so a stray click never archives.
    fn after(self, action: Action) -> (Step, bool) {
        match (self, action) {
            (Step::Idle, Action::Arm) => (Step::Armed, false),
            (Step::Armed, Action::Confirm) => (Step::Idle, true),
            (_, Action::Cancel) | (Step::Armed, Action::Arm) => (Step::Idle, false),
            (Step::Idle, Action::Confirm) => (Step::Idle, false),
        }
    }
}

/// `×` button that arms an inline prompt. Escape or leaving the prompt with
/// the pointer disarms it. Mouse-downs are swallowed so the control never
/// starts a drag of the card or list it sits on.
#[component]
pub fn ArchiveConfirm(
    #[prop(into)] class: String,
    #[prop(into, default = "Archive".to_string())] label: String,
    #[prop(into, default = "Archive?".to_string())] prompt: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (step, set_step) = signal(Step::Idle);
    let dispatch = move |action: Action| {
        let (next, fire) = step.get_untracked().after(action);
        set_step.set(next);
        if fire {
            on_confirm.run(());
        }
    };

    move || match step.get() {
        Step::Idle => view! {
            <button
                class=class.clone()
                title=label.clone()
                on:mousedown=|ev| ev.stop_propagation()
                on:click=move |ev| {
                    ev.stop_propagation();
                    dispatch(Action::Arm);
                }
            >
                "×"
            </button>
        }
        .into_any(),
        Step::Armed => view! {
            <span
                class="archive-confirm"
                on:mousedown=|ev| ev.stop_propagation()
                on:mouseleave=move |_| dispatch(Action::Cancel)
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Escape" {
                        dispatch(Action::Cancel);
                    }
                }
            >
                <span class="archive-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        dispatch(Action::Confirm);
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        dispatch(Action::Cancel);
                    }
                >
                    "✗"
                </button>
            </span>
        }
        .into_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_needs_arm_then_confirm() {
        let (armed, fired) = Step::Idle.after(Action::Arm);
        assert_eq!((armed, fired), (Step::Armed, false));
        assert_eq!(armed.after(Action::Confirm), (Step::Idle, true));
    }

    #[test]
    fn test_confirm_without_arming_does_nothing() {
        assert_eq!(Step::Idle.after(Action::Confirm), (Step::Idle, false));
    }

    #[test]
    fn test_cancel_and_second_arm_disarm() {
        assert_eq!(Step::Armed.after(Action::Cancel), (Step::Idle, false));
        assert_eq!(Step::Armed.after(Action::Arm), (Step::Idle, false));
        assert_eq!(Step::Idle.after(Action::Cancel), (Step::Idle, false));
    }
}

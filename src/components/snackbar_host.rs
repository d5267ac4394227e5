//! Snackbar Host Component
//!
//! Shows the current notification and closes it after its duration.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use finance_store::store::{Action, Severity};

use crate::context::use_app_context;
use crate::store::{use_view_store, ViewStateStoreFields};

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "snackbar success",
        Severity::Error => "snackbar error",
        Severity::Warning => "snackbar warning",
        Severity::Info => "snackbar info",
    }
}

#[component]
pub fn SnackbarHost() -> impl IntoView {
    let ctx = use_app_context();
    let view = use_view_store();

    // Auto-close; a newer snackbar is left alone
    Effect::new(move |_| {
        let Some(shown) = view.snackbar().get() else {
            return;
        };
        Timeout::new(shown.duration_ms, move || {
            let still_shown = ctx.store().select(|s| s.ui.snackbar.as_ref() == Some(&shown));
            if still_shown {
                ctx.dispatch(Action::CloseSnackbar);
            }
        })
        .forget();
    });

    view! {
        {move || view.snackbar().get().map(|bar| view! {
            <div class=severity_class(bar.severity) role="status">
                <span class="snackbar-message">{bar.message}</span>
                <button
                    class="snackbar-close"
                    on:click=move |_| ctx.dispatch(Action::CloseSnackbar)
                >
                    "×"
                </button>
            </div>
        })}
    }
}

//! Session Bar Component
//!
//! Signed-in user with refresh/sign-out, or a token form when signed out.

use leptos::prelude::*;

use finance_store::store::Session;

use crate::components::ConnectionBadge;
use crate::context::use_app_context;
use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn SessionBar() -> impl IntoView {
    let ctx = use_app_context();
    let view = use_view_store();

    let (token, set_token) = signal(String::new());
    let (user_id, set_user_id) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let token = token.get().trim().to_string();
        let Ok(user_id) = user_id.get().trim().parse::<u32>() else {
            return;
        };
        if token.is_empty() {
            return;
        }
        ctx.sign_in(
            Session {
                token,
                user_id,
                username: None,
            },
            false,
        );
        set_token.set(String::new());
    };

    view! {
        <header class="session-bar">
            <h1>"Finance"</h1>
            {move || match view.user_id().get() {
                Some(id) => view! {
                    <div class="session-info">
                        <span class="session-user">
                            {move || {
                                view.username().get().unwrap_or_else(|| format!("User #{}", id))
                            }}
                        </span>
                        <ConnectionBadge />
                        <button on:click=move |_| ctx.refresh()>"Refresh"</button>
                        <button on:click=move |_| ctx.sign_out()>"Sign out"</button>
                    </div>
                }.into_any(),
                None => view! {
                    <form class="session-form" on:submit=on_submit>
                        <input
                            type="text"
                            placeholder="User ID"
                            prop:value=move || user_id.get()
                            on:input=move |ev| set_user_id.set(event_target_value(&ev))
                        />
                        <input
                            type="password"
                            placeholder="Access token"
                            prop:value=move || token.get()
                            on:input=move |ev| set_token.set(event_target_value(&ev))
                        />
                        <button type="submit">"Sign in"</button>
                    </form>
                }.into_any(),
            }}
        </header>
    }
}

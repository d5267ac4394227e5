//! Finance Dashboard App
//!
//! Builds the store, installs persistence and realtime sync, and lays out
//! the dashboard.

use leptos::prelude::*;

use finance_store::persist::AuthPersistence;
use finance_store::{FinanceEffects, RealtimeSync, Store};

use crate::commands::HttpFinanceApi;
use crate::components::{AccountsList, PaidDebtsList, SessionBar, SnackbarHost};
use crate::config;
use crate::context::AppContext;
use crate::realtime::{TimerScheduler, WebSocketTransport};
use crate::storage::BrowserStorage;
use crate::store::{sync_view, use_view_store, ViewState, ViewStateStoreFields, ViewStore};

#[component]
pub fn App() -> impl IntoView {
    let config = config::load();
    let store = Store::new();

    // Mirror the core store into the reactive graph
    let view = ViewStore::new(ViewState::default());
    provide_context(view);
    sync_view(&view, &store.state());
    store.subscribe(move |state| sync_view(&view, state));

    let persistence = AuthPersistence::new(BrowserStorage);
    persistence.install(&store);
    RealtimeSync::install(&store, WebSocketTransport, TimerScheduler, config.realtime.clone());

    let api = HttpFinanceApi::new(config.api.clone(), store.downgrade());
    let ctx = AppContext::new(store.clone(), FinanceEffects::new(api, store));
    provide_context(ctx);

    if let Some(session) = persistence.restore_session() {
        log::info!("[APP] restoring session for user {}", session.user_id);
        ctx.sign_in(session, true);
    }

    view! {
        <div class="app-layout">
            <SessionBar />
            <Show
                when=move || view.user_id().get().is_some()
                fallback=|| view! { <p class="signed-out">"Sign in to see your finances."</p> }
            >
                <main class="dashboard">
                    <StatusLine />
                    <AccountsList />
                    <PaidDebtsList />
                </main>
            </Show>
            <SnackbarHost />
        </div>
    }
}

/// Loading indicator and the last error
#[component]
fn StatusLine() -> impl IntoView {
    let view = use_view_store();

    view! {
        <div class="status-line">
            <Show when=move || view.loading().get()>
                <span class="loading">"Loading…"</span>
            </Show>
            {move || {
                view.error().get().map(|message| view! { <span class="error">{message}</span> })
            }}
        </div>
    }
}

//! Connection Badge Component
//!
//! Live-update status of the realtime connection.

use leptos::prelude::*;

use finance_store::ConnectionStatus;

use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn ConnectionBadge() -> impl IntoView {
    let view = use_view_store();

    let label = move || match view.connection().get() {
        ConnectionStatus::Connected => "Live",
        ConnectionStatus::Connecting => "Connecting…",
        ConnectionStatus::Disconnected => "Offline",
        ConnectionStatus::Error => "Reconnecting…",
        ConnectionStatus::Failed => "Live updates paused",
    };

    view! {
        <span class=move || format!("connection-badge {}", view.connection().get().as_str())>
            {label}
        </span>
    }
}

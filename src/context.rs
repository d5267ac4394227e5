//! Application Context
//!
//! The core store and effect layer, provided via Leptos Context API.
//! Both are single-threaded (`Rc` inside), so they live in local storage.

use leptos::prelude::*;
use leptos::task::spawn_local;

use finance_store::domain::PaidKey;
use finance_store::store::{AuthAction, Session};
use finance_store::{Action, FinanceEffects, Store};

use crate::commands::HttpFinanceApi;

pub type Effects = FinanceEffects<HttpFinanceApi>;

#[derive(Clone, Copy)]
pub struct AppContext {
    store: StoredValue<Store, LocalStorage>,
    effects: StoredValue<Effects, LocalStorage>,
}

impl AppContext {
    pub fn new(store: Store, effects: Effects) -> Self {
        Self {
            store: StoredValue::new_local(store),
            effects: StoredValue::new_local(effects),
        }
    }

    pub fn store(&self) -> Store {
        self.store.get_value()
    }

    pub fn effects(&self) -> Effects {
        self.effects.get_value()
    }

    pub fn dispatch(&self, action: impl Into<Action>) {
        self.store.with_value(|store| store.dispatch(action));
    }

    /// Establish a session, then load everything for its user
    pub fn sign_in(&self, session: Session, restored: bool) {
        let user_id = session.user_id;
        if restored {
            self.dispatch(AuthAction::CheckAuthFulfilled(session));
        } else {
            self.dispatch(AuthAction::LoginFulfilled(session));
        }
        let effects = self.effects();
        spawn_local(async move {
            if let Err(err) = effects.fetch_initial_data(user_id).await {
                log::debug!("[APP] initial load failed: {}", err);
            }
        });
    }

    pub fn sign_out(&self) {
        self.dispatch(AuthAction::LogoutFulfilled);
    }

    /// Reload the finance data of the current user
    pub fn refresh(&self) {
        let Some(user_id) = self.store.with_value(|store| store.select(|s| s.auth.user_id)) else {
            return;
        };
        let effects = self.effects();
        spawn_local(async move {
            let _ = effects.fetch_initial_data(user_id).await;
        });
    }

    pub fn toggle_paid(&self, key: PaidKey) {
        let effects = self.effects();
        spawn_local(async move {
            if let Err(err) = effects.toggle_paid_debt(key).await {
                log::debug!("[APP] toggle {} failed: {}", key, err);
            }
        });
    }

    pub fn delete_account(&self, id: u32) {
        let effects = self.effects();
        spawn_local(async move {
            let _ = effects.delete_account(id).await;
        });
    }
}

/// Get the app context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

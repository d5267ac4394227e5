//! Durable Session State
//!
//! Only the auth slice is persisted (allow-list); finance data is always
//! rebuilt from the API. Storage is a plain key-value seam so the browser's
//! localStorage and an in-memory map are interchangeable.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::domain::{FinanceError, FinanceResult};
use crate::store::{AuthState, Session, Store, SubscriptionId};

pub const AUTH_KEY: &str = "persist:auth";

/// Bumped when the persisted shape changes; older payloads are discarded
const PERSIST_VERSION: u32 = 1;

pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> FinanceResult<()>;

    fn remove(&self, key: &str);
}

/// Shared in-memory storage; clones see the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> FinanceResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedAuth {
    version: u32,
    auth: AuthState,
}

pub struct AuthPersistence<S> {
    storage: Rc<S>,
}

impl<S> Clone for AuthPersistence<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<S: KeyValueStorage + 'static> AuthPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Rc::new(storage),
        }
    }

    /// Stored auth slice; unreadable or outdated payloads are dropped
    pub fn restore(&self) -> Option<AuthState> {
        let raw = self.storage.get(AUTH_KEY)?;
        match serde_json::from_str::<PersistedAuth>(&raw) {
            Ok(persisted) if persisted.version == PERSIST_VERSION => Some(persisted.auth),
            Ok(persisted) => {
                log::info!("[PERSIST] discarding auth state v{}", persisted.version);
                self.storage.remove(AUTH_KEY);
                None
            }
            Err(err) => {
                log::warn!("[PERSIST] corrupt auth state: {}", err);
                self.storage.remove(AUTH_KEY);
                None
            }
        }
    }

    /// Restored credentials as a session, ready for a check-auth round trip
    pub fn restore_session(&self) -> Option<Session> {
        let auth = self.restore()?;
        let (token, user_id) = auth.credentials()?;
        Some(Session {
            token: token.to_string(),
            user_id,
            username: auth.username.clone(),
        })
    }

    pub fn save(&self, auth: &AuthState) {
        if !auth.is_authenticated() {
            self.storage.remove(AUTH_KEY);
            return;
        }
        let persisted = PersistedAuth {
            version: PERSIST_VERSION,
            auth: auth.clone(),
        };
        let result = serde_json::to_string(&persisted)
            .map_err(FinanceError::from)
            .and_then(|json| self.storage.set(AUTH_KEY, &json));
        if let Err(err) = result {
            log::warn!("[PERSIST] failed to save auth state: {}", err);
        }
    }

    /// Write the auth slice whenever it changes
    pub fn install(&self, store: &Store) -> SubscriptionId {
        let last = RefCell::new(store.select(|s| s.auth.clone()));
        let persistence = self.clone();
        store.subscribe(move |state| {
            if *last.borrow() == state.auth {
                return;
            }
            persistence.save(&state.auth);
            *last.borrow_mut() = state.auth.clone();
        })
    }
}

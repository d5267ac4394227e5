//! Global Application Store
//!
//! One `Store` is created by the application root and handed to every consumer
//! by cloning the handle. All writes go through `dispatch`: the reducer runs to
//! completion, then middleware, then subscribers. No borrow of the state is
//! held while middleware or subscribers run, so they may dispatch again.

mod normalized;
mod finance;
mod catalog;
mod state;
pub mod selectors;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};

pub use normalized::{Applied, EntityOp, Normalized, Touched};
pub use finance::{reduce_finance, FinanceAction, FinanceState, PaidProjection};
pub use catalog::{reduce_catalog, CatalogAction, CatalogState};
pub use state::{
    reduce_root, Action, AuthAction, AuthState, RealtimeState, RootState, Session, Severity,
    Snackbar, UiState,
};

/// Observer notified with the state after every dispatch
pub type Listener = Rc<dyn Fn(&RootState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Hook run after each reduction, with the action that caused it
pub trait Middleware {
    fn after_dispatch(&self, store: &Store, action: &Action);
}

struct StoreInner {
    state: RefCell<RootState>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    middleware: RefCell<Vec<Rc<dyn Middleware>>>,
    next_id: Cell<u64>,
    clock: Box<dyn Fn() -> DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

/// Non-owning handle, held by callbacks that must not keep the store alive
#[derive(Clone)]
pub struct WeakStore {
    inner: Weak<StoreInner>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(RootState::default())
    }

    pub fn with_state(state: RootState) -> Self {
        Self::with_clock(state, Utc::now)
    }

    /// Store with an injected clock for `last_updated` stamps
    pub fn with_clock(state: RootState, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                middleware: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                clock: Box::new(clock),
            }),
        }
    }

    /// Snapshot of the whole state
    pub fn state(&self) -> RootState {
        self.inner.state.borrow().clone()
    }

    /// Read part of the state without cloning the rest
    pub fn select<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        let now = (self.inner.clock)();
        reduce_root(&mut self.inner.state.borrow_mut(), action.clone(), now);

        let middleware: Vec<Rc<dyn Middleware>> = self.inner.middleware.borrow().clone();
        for m in middleware {
            m.after_dispatch(self, &action);
        }

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        if listeners.is_empty() {
            return;
        }
        let snapshot = self.state();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&RootState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn add_middleware(&self, middleware: Rc<dyn Middleware>) {
        self.inner.middleware.borrow_mut().push(middleware);
    }

    pub fn downgrade(&self) -> WeakStore {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakStore {
    pub fn upgrade(&self) -> Option<Store> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

//! Realtime Sync Middleware
//!
//! Opens one connection per authenticated session, maps server pushes onto
//! store mutations and drives reconnects through `ReconnectPolicy`.
//!
//! All mutable connection state lives in one `Shared` value reached through
//! `Rc`; transport callbacks and timers hold only a `Weak` to it. RefCell
//! borrows are never held across a store dispatch or a transport call, since
//! both may call straight back into this type.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::{json, Value};

use crate::config::RealtimeConfig;
use crate::store::{Action, AuthAction, Middleware, Snackbar, Store, WeakStore};
use super::events::{is_owned_by, to_action, RealtimeEvent};
use super::policy::{ConnectionStatus, DisconnectReason, ReconnectDecision, ReconnectPolicy};
use super::slot::ConnectionSlot;
use super::transport::{Connection, EventSink, Scheduler, Transport, TransportEvent};

/// Event announcing the session's user once connected
pub const PRESENCE_EVENT: &str = "join";

struct Shared<T: Transport> {
    store: WeakStore,
    transport: T,
    scheduler: Box<dyn Scheduler>,
    config: RealtimeConfig,
    slot: RefCell<ConnectionSlot<T::Conn>>,
    policy: RefCell<ReconnectPolicy>,
}

pub struct RealtimeSync<T: Transport> {
    shared: Rc<Shared<T>>,
}

impl<T: Transport> Clone for RealtimeSync<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Transport + 'static> RealtimeSync<T> {
    pub fn new(
        store: &Store,
        transport: T,
        scheduler: impl Scheduler + 'static,
        config: RealtimeConfig,
    ) -> Self {
        let policy = ReconnectPolicy::new(&config);
        Self {
            shared: Rc::new(Shared {
                store: store.downgrade(),
                transport,
                scheduler: Box::new(scheduler),
                config,
                slot: RefCell::new(ConnectionSlot::new()),
                policy: RefCell::new(policy),
            }),
        }
    }

    /// Create and register as store middleware
    pub fn install(
        store: &Store,
        transport: T,
        scheduler: impl Scheduler + 'static,
        config: RealtimeConfig,
    ) -> Self {
        let sync = Self::new(store, transport, scheduler, config);
        store.add_middleware(Rc::new(sync.clone()));
        sync
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.policy.borrow().status()
    }

    pub fn attempts(&self) -> u32 {
        self.shared.policy.borrow().attempts()
    }

    pub fn is_open(&self) -> bool {
        self.shared.slot.borrow().is_open()
    }

    /// Send on the open connection; false if there is none
    pub fn emit(&self, event: &str, payload: Value) -> bool {
        self.shared.slot.borrow().with(|conn| conn.emit(event, payload)).is_some()
    }

    /// Open a connection if none exists and the session has credentials
    fn connect(&self) {
        if self.is_open() {
            log::debug!("[REALTIME] connection already open, skipping");
            return;
        }
        let Some(store) = self.shared.store.upgrade() else {
            return;
        };
        let token = store.select(|s| s.auth.credentials().map(|(token, _)| token.to_string()));
        let Some(token) = token else {
            log::debug!("[REALTIME] no credentials, not connecting");
            return;
        };

        let generation = self.shared.slot.borrow_mut().reserve();
        self.shared.policy.borrow_mut().on_open();
        self.publish_status(&store);
        log::info!("[REALTIME] connecting to {}", self.shared.config.url);

        let weak = Rc::downgrade(&self.shared);
        let sink: EventSink = Rc::new(move |event| {
            if let Some(shared) = Weak::upgrade(&weak) {
                RealtimeSync { shared }.handle_event(generation, event);
            }
        });

        match self.shared.transport.open(&self.shared.config.url, &token, sink) {
            Ok(conn) => {
                if !self.shared.slot.borrow_mut().attach(generation, conn) {
                    log::debug!("[REALTIME] connection superseded while opening");
                }
            }
            Err(err) => {
                self.handle_event(generation, TransportEvent::ConnectError(err.to_string()))
            }
        }
    }

    /// Logout: unconditional teardown and a clean attempt counter
    fn disconnect(&self) {
        let closed = self.shared.slot.borrow_mut().close();
        self.shared.policy.borrow_mut().reset();
        if closed {
            log::info!("[REALTIME] disconnected on logout");
        }
        if let Some(store) = self.shared.store.upgrade() {
            self.publish_status(&store);
        }
    }

    fn handle_event(&self, generation: u64, event: TransportEvent) {
        if self.shared.slot.borrow().generation() != generation {
            log::debug!("[REALTIME] ignoring event from a closed connection");
            return;
        }
        let Some(store) = self.shared.store.upgrade() else {
            return;
        };

        match event {
            TransportEvent::Connect { id } => {
                self.shared.policy.borrow_mut().on_connect();
                log::info!("[REALTIME] connected (id={:?})", id);
                if let Some(user_id) = store.select(|s| s.auth.user_id) {
                    self.emit(PRESENCE_EVENT, json!({ "user_id": user_id }));
                }
                self.publish_status(&store);
            }
            TransportEvent::ConnectError(message) => {
                log::warn!("[REALTIME] connect error: {}", message);
                self.shared.slot.borrow_mut().close();
                let decision = self.shared.policy.borrow_mut().on_connect_error();
                self.publish_status(&store);
                self.apply(&store, decision);
            }
            TransportEvent::Disconnect(reason) => {
                log::info!("[REALTIME] disconnected: {:?}", reason);
                self.shared.slot.borrow_mut().close();
                let decision = self.shared.policy.borrow_mut().on_disconnect(&reason);
                self.publish_status(&store);
                self.apply(&store, decision);
            }
            TransportEvent::Message { event, payload } => {
                self.handle_message(&store, &event, payload)
            }
        }
    }

    fn handle_message(&self, store: &Store, name: &str, payload: Value) {
        let Some(event) = RealtimeEvent::parse(name) else {
            log::debug!("[REALTIME] unhandled event '{}'", name);
            return;
        };
        let user_id = store.select(|s| s.auth.user_id);
        if !is_owned_by(&payload, user_id) {
            log::debug!("[REALTIME] {} for another user ignored", event);
            return;
        }
        match store.select(|s| to_action(event, &payload, s)) {
            Ok(Some((action, message))) => {
                store.dispatch(action);
                store.dispatch(Snackbar::info(message));
            }
            Ok(None) => log::debug!("[REALTIME] {} had nothing to apply", event),
            Err(err) => log::warn!("[REALTIME] {} rejected: {}", event, err),
        }
    }

    fn apply(&self, store: &Store, decision: ReconnectDecision) {
        match decision {
            ReconnectDecision::Retry(delay) => {
                log::info!(
                    "[REALTIME] reconnecting in {:?} (attempt {}/{})",
                    delay,
                    self.attempts(),
                    self.shared.config.max_reconnect_attempts
                );
                let weak = Rc::downgrade(&self.shared);
                self.shared.scheduler.schedule(
                    delay,
                    Box::new(move || {
                        if let Some(shared) = weak.upgrade() {
                            RealtimeSync { shared }.reconnect();
                        }
                    }),
                );
            }
            ReconnectDecision::GiveUp => {
                log::warn!("[REALTIME] giving up after {} attempts", self.attempts());
                let message = "Realtime connection failed. Live updates are paused.";
                store.dispatch(Snackbar::error(message));
            }
            ReconnectDecision::Stay => {}
        }
    }

    /// Timer callback: only reopen when nothing else already did
    fn reconnect(&self) {
        if self.status() == ConnectionStatus::Failed {
            return;
        }
        self.connect();
    }

    fn publish_status(&self, store: &Store) {
        let (status, attempts) = {
            let policy = self.shared.policy.borrow();
            (policy.status(), policy.attempts())
        };
        let connection_id = self.shared.slot.borrow().with(|conn| conn.id()).flatten();
        store.dispatch(Action::RealtimeStatus {
            status,
            attempts,
            connection_id,
        });
    }
}

impl<T: Transport + 'static> Middleware for RealtimeSync<T> {
    fn after_dispatch(&self, _store: &Store, action: &Action) {
        match action {
            Action::Auth(AuthAction::LoginFulfilled(_))
            | Action::Auth(AuthAction::CheckAuthFulfilled(_)) => {
                if self.status() == ConnectionStatus::Failed {
                    self.shared.policy.borrow_mut().reset();
                }
                self.connect();
            }
            Action::Auth(AuthAction::LogoutFulfilled) => self.disconnect(),
            _ => {}
        }
    }
}

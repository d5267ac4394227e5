//! Finance Store
//!
//! Client-side core of the finance dashboard:
//! - domain: entities, paid-debt keys, patches and the error taxonomy
//! - store: normalized slices, reducers, the `Store` object and selectors
//! - effects: async operations against the remote API
//! - realtime: connection state machine and push-event middleware
//! - persist: allow-listed durable auth state
//! - config: API and realtime settings

pub mod domain;
pub mod store;
pub mod effects;
pub mod realtime;
pub mod persist;
pub mod config;

#[cfg(test)]
mod tests;

pub use config::{ApiConfig, AppConfig, RealtimeConfig};
pub use domain::{ErrorKind, FinanceError, FinanceResult};
pub use effects::{FinanceApi, FinanceEffects};
pub use realtime::{ConnectionStatus, RealtimeSync};
pub use store::{Action, RootState, Store};

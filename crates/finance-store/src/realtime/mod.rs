//! Realtime Sync Layer
//!
//! Connection state machine, transport seams and the store middleware that
//! mirrors server pushes into the store.

mod policy;
mod transport;
mod slot;
mod events;
mod middleware;

pub use policy::{ConnectionStatus, DisconnectReason, ReconnectDecision, ReconnectPolicy};
pub use transport::{Connection, EventSink, Scheduler, Transport, TransportEvent};
pub use slot::ConnectionSlot;
pub use events::{is_owned_by, to_action, EventEntity, EventKind, RealtimeEvent};
pub use middleware::{RealtimeSync, PRESENCE_EVENT};

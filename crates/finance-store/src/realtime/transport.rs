//! Realtime Transport Seams
//!
//! The transport library is a black-box event source. The middleware only
//! sees these traits; the browser crate supplies a WebSocket implementation
//! and tests supply in-memory fakes.

use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use crate::domain::FinanceResult;
use super::policy::DisconnectReason;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connect { id: Option<String> },
    ConnectError(String),
    Disconnect(DisconnectReason),
    Message { event: String, payload: Value },
}

/// Callback the transport invokes for every event of one connection
pub type EventSink = Rc<dyn Fn(TransportEvent)>;

/// An open connection handle
pub trait Connection {
    fn emit(&self, event: &str, payload: Value);

    fn is_connected(&self) -> bool;

    fn id(&self) -> Option<String>;

    /// Tear down; later events from this handle are ignored by the middleware
    fn close(&self);
}

pub trait Transport {
    type Conn: Connection + 'static;

    /// Start connecting; the outcome arrives through `sink`
    fn open(&self, url: &str, token: &str, sink: EventSink) -> FinanceResult<Self::Conn>;
}

/// Delayed one-shot task runner (browser timer, test queue)
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

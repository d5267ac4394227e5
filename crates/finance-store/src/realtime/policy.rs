//! Reconnect Policy
//!
//! Pure connection state machine:
//! `disconnected -> connecting -> connected -> {disconnected | error | failed}`.
//! It decides whether to retry; the middleware performs the side effects.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::config::RealtimeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
    Failed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
            ConnectionStatus::Failed => "failed",
        }
    }
}

/// Why the transport closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    ServerDisconnect,
    TransportClose,
    TransportError,
    PingTimeout,
    ClientDisconnect,
    Other(String),
}

impl DisconnectReason {
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "io server disconnect" => DisconnectReason::ServerDisconnect,
            "transport close" => DisconnectReason::TransportClose,
            "transport error" => DisconnectReason::TransportError,
            "ping timeout" => DisconnectReason::PingTimeout,
            "io client disconnect" => DisconnectReason::ClientDisconnect,
            other => DisconnectReason::Other(other.to_string()),
        }
    }

    /// Only server-initiated and transport-level closes auto-reconnect
    pub fn should_reconnect(&self) -> bool {
        matches!(self, DisconnectReason::ServerDisconnect | DisconnectReason::TransportClose)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reopen after the delay
    Retry(Duration),
    /// Attempts exhausted; status is now `Failed`
    GiveUp,
    /// Nothing to do
    Stay,
}

#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
    status: ConnectionStatus,
}

impl ReconnectPolicy {
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.max_reconnect_attempts,
            delay: config.reconnect_delay(),
            attempts: 0,
            status: ConnectionStatus::Disconnected,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn on_open(&mut self) {
        self.status = ConnectionStatus::Connecting;
    }

    pub fn on_connect(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.attempts = 0;
    }

    pub fn on_connect_error(&mut self) -> ReconnectDecision {
        if self.status == ConnectionStatus::Failed {
            return ReconnectDecision::Stay;
        }
        self.status = ConnectionStatus::Error;
        self.schedule()
    }

    pub fn on_disconnect(&mut self, reason: &DisconnectReason) -> ReconnectDecision {
        if self.status == ConnectionStatus::Failed {
            return ReconnectDecision::Stay;
        }
        self.status = ConnectionStatus::Disconnected;
        if reason.should_reconnect() {
            self.schedule()
        } else {
            ReconnectDecision::Stay
        }
    }

    /// Explicit logout: back to a clean slate
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.status = ConnectionStatus::Disconnected;
    }

    fn schedule(&mut self) -> ReconnectDecision {
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            self.status = ConnectionStatus::Failed;
            ReconnectDecision::GiveUp
        } else {
            ReconnectDecision::Retry(self.delay)
        }
    }
}

//! Root State
//!
//! Every slice of the client plus the tagged action routed to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::realtime::ConnectionStatus;
use super::catalog::{reduce_catalog, CatalogAction, CatalogState};
use super::finance::{reduce_finance, FinanceAction, FinanceState};

// ========================
// Session
// ========================

/// Credentials issued by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: u32,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub token: Option<String>,
    pub user_id: Option<u32>,
    pub username: Option<String>,
}

impl AuthState {
    /// Token and user id, only when both are present
    pub fn credentials(&self) -> Option<(&str, u32)> {
        match (&self.token, self.user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() => Some((token.as_str(), user_id)),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    LoginFulfilled(Session),
    CheckAuthFulfilled(Session),
    LogoutFulfilled,
}

// ========================
// Notifications
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snackbar {
    pub message: String,
    pub severity: Severity,
    pub duration_ms: u32,
}

impl Snackbar {
    pub const DEFAULT_DURATION_MS: u32 = 3000;

    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            duration_ms: 5000,
            ..Self::new(message, Severity::Error)
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiState {
    pub snackbar: Option<Snackbar>,
}

/// Mirror of the realtime middleware's connection, for rendering
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RealtimeState {
    pub status: ConnectionStatus,
    pub attempts: u32,
    pub connection_id: Option<String>,
}

// ========================
// Root
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RootState {
    pub auth: AuthState,
    /// Advanced by every login and logout; responses from an older session
    /// are discarded
    #[serde(default)]
    pub session_epoch: u64,
    pub finance: FinanceState,
    pub catalog: CatalogState,
    pub ui: UiState,
    pub realtime: RealtimeState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Auth(AuthAction),
    Finance(FinanceAction),
    Catalog(CatalogAction),
    SetSnackbar(Snackbar),
    CloseSnackbar,
    RealtimeStatus {
        status: ConnectionStatus,
        attempts: u32,
        connection_id: Option<String>,
    },
}

impl From<FinanceAction> for Action {
    fn from(action: FinanceAction) -> Self {
        Action::Finance(action)
    }
}

impl From<CatalogAction> for Action {
    fn from(action: CatalogAction) -> Self {
        Action::Catalog(action)
    }
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}

impl From<Snackbar> for Action {
    fn from(snackbar: Snackbar) -> Self {
        Action::SetSnackbar(snackbar)
    }
}

pub fn reduce_root(state: &mut RootState, action: Action, now: DateTime<Utc>) {
    match action {
        Action::Auth(AuthAction::LoginFulfilled(session))
        | Action::Auth(AuthAction::CheckAuthFulfilled(session)) => {
            state.session_epoch += 1;
            state.auth = AuthState {
                token: Some(session.token),
                user_id: Some(session.user_id),
                username: session.username,
            };
        }
        Action::Auth(AuthAction::LogoutFulfilled) => {
            state.session_epoch += 1;
            state.auth = AuthState::default();
            reduce_finance(&mut state.finance, FinanceAction::ResetFinance, now);
            reduce_catalog(&mut state.catalog, CatalogAction::Reset, now);
        }
        Action::Finance(action) => reduce_finance(&mut state.finance, action, now),
        Action::Catalog(action) => reduce_catalog(&mut state.catalog, action, now),
        Action::SetSnackbar(snackbar) => state.ui.snackbar = Some(snackbar),
        Action::CloseSnackbar => state.ui.snackbar = None,
        Action::RealtimeStatus { status, attempts, connection_id } => {
            state.realtime = RealtimeState { status, attempts, connection_id };
        }
    }
}

//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all finance entities kept in the
//! normalized store, plus the error taxonomy shared by every layer.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Core trait for all entities held in a normalized slice
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Human-readable singular label used in store messages ("Account", "Loan")
    const LABEL: &'static str;

    /// Returns the entity's unique (server-assigned) identifier
    fn id(&self) -> u32;

    /// Owning user, if the record carries one
    fn owner(&self) -> Option<u32>;
}

/// Common result type for store and effect operations
pub type FinanceResult<T> = Result<T, FinanceError>;

/// Closed set of failure kinds so callers branch on kind, not on text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    NotFound,
    Conflict,
    Validation,
    Unauthorized,
}

/// Finance-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FinanceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl FinanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinanceError::Network(_) => ErrorKind::Network,
            FinanceError::NotFound(_) => ErrorKind::NotFound,
            FinanceError::Conflict(_) => ErrorKind::Conflict,
            FinanceError::Validation(_) => ErrorKind::Validation,
            FinanceError::Unauthorized(_) => ErrorKind::Unauthorized,
        }
    }

    /// The bare message without the kind prefix, as shown in a snackbar
    pub fn message(&self) -> &str {
        match self {
            FinanceError::Network(msg)
            | FinanceError::NotFound(msg)
            | FinanceError::Conflict(msg)
            | FinanceError::Validation(msg)
            | FinanceError::Unauthorized(msg) => msg,
        }
    }

    /// Replace an empty message with a fixed fallback
    pub fn or_fallback(self, fallback: &str) -> Self {
        if !self.message().trim().is_empty() {
            return self;
        }
        let msg = fallback.to_string();
        match self.kind() {
            ErrorKind::Network => FinanceError::Network(msg),
            ErrorKind::NotFound => FinanceError::NotFound(msg),
            ErrorKind::Conflict => FinanceError::Conflict(msg),
            ErrorKind::Validation => FinanceError::Validation(msg),
            ErrorKind::Unauthorized => FinanceError::Unauthorized(msg),
        }
    }
}

impl From<serde_json::Error> for FinanceError {
    fn from(err: serde_json::Error) -> Self {
        FinanceError::Validation(err.to_string())
    }
}

//! Client Configuration
//!
//! API and realtime settings. Every field has a default so a partial JSON
//! document (or none at all) yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::domain::{FinanceError, FinanceResult};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, without trailing slash
    pub base_url: String,
    /// Extra attempts for network failures on idempotent requests
    pub max_retries: u32,
    /// Delay before retry `n` is `n * retry_step_ms`
    pub retry_step_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            max_retries: 3,
            retry_step_ms: 500,
        }
    }
}

impl ApiConfig {
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_step_ms.saturating_mul(attempt as u64))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub url: String,
    /// Failed connection attempts tolerated before giving up
    pub max_reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:5000/ws".to_string(),
            max_reconnect_attempts: 5,
            reconnect_delay_ms: 2000,
        }
    }
}

impl RealtimeConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> FinanceResult<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FinanceResult<()> {
        let api_url = &self.api.base_url;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            let message = format!("API URL must be http(s): {}", api_url);
            return Err(FinanceError::Validation(message));
        }
        let ws_url = &self.realtime.url;
        if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
            let message = format!("Realtime URL must be ws(s): {}", ws_url);
            return Err(FinanceError::Validation(message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.realtime.max_reconnect_attempts, 5);
        assert_eq!(config.realtime.reconnect_delay(), Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{"realtime":{"max_reconnect_attempts":3}}"#).unwrap();
        assert_eq!(config.realtime.max_reconnect_attempts, 3);
        assert_eq!(config.realtime.reconnect_delay_ms, 2000);
        assert_eq!(config.api.max_retries, 3);
    }

    #[test]
    fn test_invalid_urls() {
        let err = AppConfig::from_json(r#"{"realtime":{"url":"http://x"}}"#).unwrap_err();
        assert_eq!(err.kind(), crate::domain::ErrorKind::Validation);
    }

    #[test]
    fn test_endpoint_and_linear_backoff() {
        let api = ApiConfig {
            base_url: "https://example.test/api/".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(api.endpoint("/finance/accounts"), "https://example.test/api/finance/accounts");
        assert_eq!(api.retry_delay(1), Duration::from_millis(500));
        assert_eq!(api.retry_delay(3), Duration::from_millis(1500));
    }
}

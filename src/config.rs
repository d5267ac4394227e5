//! Build-time Configuration
//!
//! Endpoint URLs come from `FINANCE_API_URL` / `FINANCE_WS_URL` at compile
//! time; everything else keeps the library defaults.

use finance_store::AppConfig;

pub fn load() -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(url) = option_env!("FINANCE_API_URL") {
        config.api.base_url = url.to_string();
    }
    if let Some(url) = option_env!("FINANCE_WS_URL") {
        config.realtime.url = url.to_string();
    }

    match config.validate() {
        Ok(()) => config,
        Err(err) => {
            log::warn!("[APP] {}; using default endpoints", err);
            AppConfig::default()
        }
    }
}

//! Browser Storage
//!
//! `localStorage` behind the persistence seam.

use finance_store::persist::KeyValueStorage;
use finance_store::{FinanceError, FinanceResult};

pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> FinanceResult<()> {
        let storage = Self::storage()
            .ok_or_else(|| FinanceError::Network("localStorage unavailable".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| FinanceError::Network(format!("localStorage write failed: {:?}", e)))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

//! Backend Command Bindings
//!
//! REST bindings for the finance backend, organized by concern.

mod http;
mod finance;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use finance_store::store::WeakStore;
use finance_store::{ApiConfig, FinanceResult};

use http::HttpClient;

/// `FinanceApi` over HTTP; the bearer token is read from the store per request
pub struct HttpFinanceApi {
    http: HttpClient,
    store: WeakStore,
}

impl HttpFinanceApi {
    pub fn new(config: ApiConfig, store: WeakStore) -> Self {
        Self {
            http: HttpClient::new(config),
            store,
        }
    }

    fn token(&self) -> Option<String> {
        self.store.upgrade().and_then(|store| store.select(|s| s.auth.token.clone()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> FinanceResult<T> {
        let token = self.token();
        self.http.json(Method::GET, path, token.as_deref(), None).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> FinanceResult<T> {
        let body = serde_json::to_value(body)?;
        let token = self.token();
        self.http.json(method, path, token.as_deref(), Some(&body)).await
    }

    async fn delete(&self, path: &str) -> FinanceResult<()> {
        let token = self.token();
        self.http.empty(Method::DELETE, path, token.as_deref()).await
    }
}

//! HTTP Transport
//!
//! JSON requests against the finance backend. Idempotent requests that fail
//! at the network level are retried with a linearly growing delay.

use gloo_timers::future::TimeoutFuture;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use finance_store::{ApiConfig, FinanceError, FinanceResult};

pub struct HttpClient {
    client: Client,
    config: ApiConfig,
}

impl HttpClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Send and decode a JSON response body
    pub async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> FinanceResult<T> {
        let response = self.send(method, path, token, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| {
                FinanceError::Validation(format!("Unexpected response for {}: {}", path, e))
            })
    }

    /// Send and ignore the response body
    pub async fn empty(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> FinanceResult<()> {
        self.send(method, path, token, None).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> FinanceResult<Response> {
        let url = self.config.endpoint(path);
        let retries = if is_idempotent(&method) { self.config.max_retries } else { 0 };
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), &url, token, body).await {
                Err(FinanceError::Network(message)) if attempt < retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    log::warn!(
                        "[API] {} {} failed ({}), retry {}/{} in {:?}",
                        method, url, message, attempt, retries, delay
                    );
                    TimeoutFuture::new(delay.as_millis() as u32).await;
                }
                result => return result,
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> FinanceResult<Response> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        log::debug!("[API] {} {}", method, url);
        let response = request
            .send()
            .await
            .map_err(|e| FinanceError::Network(e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from(response).await)
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::PUT | Method::DELETE)
}

/// Map an error status onto the error taxonomy; the server's `message` (or
/// `error`) field becomes the text, empty when there is none
async fn error_from(response: Response) -> FinanceError {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FinanceError::Unauthorized(message),
        StatusCode::NOT_FOUND => FinanceError::NotFound(message),
        StatusCode::CONFLICT => FinanceError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            FinanceError::Validation(message)
        }
        _ => FinanceError::Network(message),
    }
}

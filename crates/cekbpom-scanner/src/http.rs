//! HTTP client collaborator.
//!
//! The engine only needs plain GETs against a cookie-bearing client that is
//! shared by every request of a run. [`HttpFetcher`] is the seam; the
//! production implementation wraps `reqwest`.

use async_trait::async_trait;
use cekbpom_core::HttpConfig;
use std::time::Duration;
use thiserror::Error;

/// Transport failure below the HTTP status layer (connect, TLS, timeout, body read).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be completed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Build(String),
}

/// A completed HTTP exchange, whatever its status class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status
    pub reason: String,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx class.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET-only HTTP client shared across one run.
///
/// Implementations must keep cookies between calls: the upstream session is
/// bound to both the token in the URL and the cookie jar.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Issue a GET and return the response, including non-2xx ones.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// `reqwest`-backed fetcher with an in-memory cookie store.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher from the HTTP settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Build(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{FetchError, HttpFetcher, HttpResponse};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned responses by exact URL and records every request.
    #[derive(Debug, Default)]
    pub(crate) struct StubFetcher {
        routes: HashMap<String, HttpResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub(crate) fn route(mut self, url: impl Into<String>, status: u16, body: &str) -> Self {
            self.routes.insert(
                url.into(),
                HttpResponse {
                    status,
                    reason: if status == 200 { "OK" } else { "Error" }.to_string(),
                    body: body.to_string(),
                },
            );
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl HttpFetcher for StubFetcher {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.calls.lock().expect("calls lock").push(url.to_string());
            Ok(self.routes.get(url).cloned().unwrap_or(HttpResponse {
                status: 404,
                reason: "Not Found".to_string(),
                body: String::new(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fetcher() {
        let fetcher = ReqwestFetcher::new(&HttpConfig::default());
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_success_class() {
        let ok = HttpResponse {
            status: 204,
            reason: "No Content".to_string(),
            body: String::new(),
        };
        assert!(ok.is_success());

        let redirect = HttpResponse {
            status: 302,
            ..ok.clone()
        };
        assert!(!redirect.is_success());
    }
}

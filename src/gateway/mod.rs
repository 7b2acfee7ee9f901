//! Remote data gateway for the dispatch backend.
//!
//! Every network call the console makes goes through this module. Reads are
//! served from a short-lived cache where allowed, spaced by a per-endpoint
//! throttle, and collapsed into a small set of typed outcomes: callers never
//! see a raw transport error. An expired admin session surfaces as an
//! explicit [`Fetch::AuthExpired`] / [`WriteOutcome::AuthExpired`] value that
//! the session controller reacts to; the gateway itself has no side effects
//! beyond logging.

pub mod cache;
pub mod throttle;

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{Config, token_header_value};
use crate::error::{Result, RideopsError};

use cache::{TtlCache, is_cacheable};
use throttle::Throttle;

/// Outcome of a gateway read.
///
/// `RateLimited` means "try again next cycle" and is never a hard failure.
/// `Failed` covers transport errors and unexpected statuses, already logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Data(T),
    RateLimited,
    AuthExpired,
    Failed,
}

impl<T> Fetch<T> {
    /// Collapse to the data, treating every miss the same way.
    pub fn into_option(self) -> Option<T> {
        match self {
            Fetch::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Fetch::AuthExpired)
    }
}

/// Outcome of a gateway write. Errors come back as values so callers can
/// render them inline without exception plumbing.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Ok(Value),
    Error(String),
    AuthExpired,
}

impl WriteOutcome {
    pub fn error(&self) -> Option<&str> {
        match self {
            WriteOutcome::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, WriteOutcome::Ok(_))
    }
}

pub struct Gateway {
    client: Client,
    base_url: String,
    cache: TtlCache,
    throttle: Throttle,
}

impl Gateway {
    /// Build a gateway from configuration. Fails only on malformed
    /// credentials or base URL; transport problems are deferred to calls.
    pub fn new(config: &Config) -> Result<Self> {
        url::Url::parse(&config.api_base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = config.session_token() {
            let value = HeaderValue::from_str(&token_header_value(&token))
                .map_err(|_| RideopsError::Config("session token is not a valid header value".to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(config.cache_ttl()),
            throttle: Throttle::new(config.throttle_window()),
        })
    }

    fn url_for(&self, endpoint: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/{}", self.base_url, endpoint)
        } else {
            format!("{}/{}?{}", self.base_url, endpoint, query)
        }
    }

    /// Read a resource, deserializing the JSON payload into `T`.
    ///
    /// Order of operations: cache lookup, throttle, network. Responses for
    /// allow-listed endpoints are written back to the cache; 429 responses
    /// are never cached.
    pub async fn read<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> Fetch<T> {
        match self.read_value(endpoint, query).await {
            Fetch::Data(value) => match serde_json::from_value(value) {
                Ok(data) => Fetch::Data(data),
                Err(e) => {
                    tracing::warn!(endpoint, %e, "response did not match expected shape");
                    Fetch::Failed
                }
            },
            Fetch::RateLimited => Fetch::RateLimited,
            Fetch::AuthExpired => Fetch::AuthExpired,
            Fetch::Failed => Fetch::Failed,
        }
    }

    /// Untyped read used by `read` and by callers that pass the payload
    /// straight through (e.g. ride detail modals).
    pub async fn read_value(&self, endpoint: &str, query: &str) -> Fetch<Value> {
        if let Some(cached) = self.cache.get(endpoint, query) {
            tracing::debug!(endpoint, "serving cached payload");
            return Fetch::Data(cached);
        }

        let key = format!("{}?{}", endpoint, query);
        self.throttle.acquire(&key).await;

        let response = match self
            .client
            .get(self.url_for(endpoint, query))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, %e, "fetch failed");
                return Fetch::Failed;
            }
        };

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(endpoint, "rate limited, retrying next cycle");
                return Fetch::RateLimited;
            }
            StatusCode::UNAUTHORIZED => return Fetch::AuthExpired,
            status if !status.is_success() => {
                tracing::warn!(endpoint, %status, "unexpected response status");
                return Fetch::Failed;
            }
            _ => {}
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(endpoint, %e, "response body was not JSON");
                return Fetch::Failed;
            }
        };

        if is_cacheable(endpoint) {
            self.cache.put(endpoint, query, payload.clone());
        }

        Fetch::Data(payload)
    }

    /// Send a JSON-bodied mutation.
    pub async fn write<P: Serialize>(
        &self,
        endpoint: &str,
        payload: &P,
        method: Method,
    ) -> WriteOutcome {
        let response = match self
            .client
            .request(method, self.url_for(endpoint, ""))
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, %e, "write failed");
                return WriteOutcome::Error(e.to_string());
            }
        };

        Self::finish_write(endpoint, response, false).await
    }

    /// Send a multipart mutation (driver documents, profile pictures).
    /// Tolerates an HTML error body, which the backend produces when the
    /// admin session has expired mid-upload.
    pub async fn write_multipart(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> WriteOutcome {
        let response = match self
            .client
            .post(self.url_for(endpoint, ""))
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, %e, "multipart write failed");
                return WriteOutcome::Error(e.to_string());
            }
        };

        Self::finish_write(endpoint, response, true).await
    }

    async fn finish_write(
        endpoint: &str,
        response: reqwest::Response,
        tolerate_html: bool,
    ) -> WriteOutcome {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return WriteOutcome::AuthExpired;
        }

        if !status.is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => body
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP error {}", status.as_u16())),
                Err(_) if tolerate_html => format!(
                    "Server error ({}). Please check your session and try again.",
                    status.as_u16()
                ),
                Err(_) => format!("HTTP error {}", status.as_u16()),
            };
            tracing::warn!(endpoint, %status, %message, "write rejected");
            return WriteOutcome::Error(message);
        }

        match response.json::<Value>().await {
            Ok(body) => WriteOutcome::Ok(body),
            Err(e) => {
                tracing::warn!(endpoint, %e, "write response body was not JSON");
                WriteOutcome::Error(e.to_string())
            }
        }
    }

    /// Download a binary export (CSV). Never cached.
    pub async fn export(&self, endpoint: &str, query: &str) -> Fetch<Vec<u8>> {
        let response = match self
            .client
            .get(self.url_for(endpoint, query))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, %e, "export failed");
                return Fetch::Failed;
            }
        };

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Fetch::RateLimited,
            StatusCode::UNAUTHORIZED => return Fetch::AuthExpired,
            status if !status.is_success() => {
                tracing::warn!(endpoint, %status, "export rejected");
                return Fetch::Failed;
            }
            _ => {}
        }

        match response.bytes().await {
            Ok(bytes) => Fetch::Data(bytes.to_vec()),
            Err(e) => {
                tracing::warn!(endpoint, %e, "export body read failed");
                Fetch::Failed
            }
        }
    }

    /// Drop all cached reads so the next cycle hits the network. Called
    /// on forced refreshes, where serving a sub-TTL snapshot would hide
    /// the effect of the action that triggered them.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

//! HTTP client utilities for the storefront engine.
//!
//! A thin builder over `reqwest` with automatic JSON handling, a base URL
//! and default headers. Responses come back fully buffered so callers can
//! inspect status and body without holding a connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_data::FetchClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Envelope {
//!     success: bool,
//! }
//!
//! let client = FetchClient::new().with_base_url("http://localhost:5000/api");
//!
//! let envelope: Envelope = client
//!     .post("/cart")
//!     .json(&serde_json::json!({ "product_id": 7, "quantity": 1 }))?
//!     .bearer_auth("token")
//!     .send()
//!     .await?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;

use std::collections::HashMap;
use std::time::Duration;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;

/// Client for the storefront backend.
///
/// Clones share one connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: reqwest::Client,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: None,
            default_headers: HashMap::new(),
        }
    }

    /// Replace the underlying client with one that gives up after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, FetchError> {
        self.inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Resolve relative request paths against `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Send `key: value` on every request.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// The configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Start a request; `path` may be relative to the base URL or absolute.
    pub fn request(&self, method: Method, path: impl Into<String>) -> ClientRequestBuilder {
        let builder = self
            .default_headers
            .iter()
            .fold(RequestBuilder::new(method, self.resolve(path.into())), |b, (k, v)| {
                b.header(k.as_str(), v.as_str())
            });
        ClientRequestBuilder {
            client: self.inner.clone(),
            builder,
        }
    }

    fn resolve(&self, path: String) -> String {
        let absolute = ["http://", "https://"].iter().any(|scheme| path.starts_with(scheme));
        match &self.base_url {
            Some(base) if !absolute => {
                format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
            }
            _ => path,
        }
    }
}

/// A request waiting to be sent.
#[derive(Debug)]
pub struct ClientRequestBuilder {
    client: reqwest::Client,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Serialize `value` as the JSON body.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// The request as it will be sent.
    pub fn request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request and buffer the response.
    ///
    /// Non-2xx statuses are returned as a normal [`Response`]; use
    /// [`Response::error_for_status`] to turn them into errors.
    pub async fn send(self) -> Result<Response, FetchError> {
        let RequestBuilder {
            method,
            url,
            headers,
            body,
        } = self.builder;

        tracing::trace!(method = method.as_str(), %url, "sending request");

        let mut request = self.client.request(method.into(), &url);
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(status, bytes = body.len(), "received response");
        Ok(Response::new(status, headers, body))
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_join() {
        let client = FetchClient::new().with_base_url("http://localhost:5000/api/");
        assert_eq!(
            client.get("/cart").request().url(),
            "http://localhost:5000/api/cart"
        );
        assert_eq!(
            client.get("wishlist/7").request().url(),
            "http://localhost:5000/api/wishlist/7"
        );
    }

    #[test]
    fn test_absolute_url_bypasses_base() {
        let client = FetchClient::new().with_base_url("http://localhost:5000/api");
        assert_eq!(
            client.get("https://cdn.test/p.json").request().url(),
            "https://cdn.test/p.json"
        );
    }

    #[test]
    fn test_default_headers_applied() {
        let client = FetchClient::new().with_default_header("Accept", "application/json");
        let req = client.delete("http://x/cart");
        assert_eq!(req.request().method(), Method::Delete);
        assert_eq!(req.request().header_value("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = FetchClient::new()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        let err = client.get("http://127.0.0.1:1/cart").send().await.unwrap_err();
        assert!(err.is_transport());
    }
}

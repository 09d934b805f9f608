//! Network fetchers.

use async_trait::async_trait;
use edge_core::{Request, Response, Url};

use crate::timeout::{with_timeout, TimeoutConfig};

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Timeout: {0}")]
    Timeout(#[from] crate::timeout::TimeoutError),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl FetchError {
    /// Whether the failure means the network is unreachable.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout(_))
    }
}

/// Something that can put a request on the network.
///
/// A returned `Ok` may carry any status; only transport failures are errors.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Fetcher: Send + Sync {
    /// Issue the request.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Fetch with a total timeout. Expiry surfaces as [`FetchError::Timeout`].
pub async fn fetch_with_timeout(
    fetcher: &dyn Fetcher,
    request: &Request,
    timeout: &TimeoutConfig,
) -> Result<Response, FetchError> {
    with_timeout(timeout.total, fetcher.fetch(request)).await?
}

/// Native fetcher backed by `reqwest`.
#[cfg(not(target_arch = "wasm32"))]
pub struct HttpFetcher {
    client: reqwest::Client,
    scope: Url,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpFetcher {
    /// Create a fetcher classifying responses against `scope`.
    pub fn new(scope: Url, timeout: &TimeoutConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().connect_timeout(timeout.connect);
        if let Some(total) = timeout.total {
            builder = builder.timeout(total);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client, scope })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Connection {
                    url: request.url.to_string(),
                    message: format!("timed out: {}", e),
                }
            } else if e.is_connect() {
                FetchError::Connection {
                    url: request.url.to_string(),
                    message: e.to_string(),
                }
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let final_url = resp.url().clone();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = resp.bytes().await.map_err(|e| FetchError::InvalidResponse {
            url: final_url.to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!(url = %request.url, status, "network response");

        Ok(Response::new(status, headers, body)
            .with_type(edge_core::ResponseType::for_origin(&self.scope, &final_url))
            .with_url(final_url))
    }
}

/// Fetcher using Spin's outbound HTTP.
#[cfg(target_arch = "wasm32")]
pub struct SpinFetcher {
    scope: Url,
}

#[cfg(target_arch = "wasm32")]
impl SpinFetcher {
    /// Create a fetcher classifying responses against `scope`.
    pub fn new(scope: Url) -> Self {
        Self { scope }
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Fetcher for SpinFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if request.method != edge_core::Method::GET {
            return Err(FetchError::Request(format!(
                "unsupported method {}",
                request.method
            )));
        }

        let req = spin_sdk::http::Request::get(request.url.as_str());
        let resp: spin_sdk::http::Response = spin_sdk::http::send(req)
            .await
            .map_err(|e| FetchError::Connection {
                url: request.url.to_string(),
                message: e.to_string(),
            })?;

        let status = *resp.status();
        let headers = resp
            .headers()
            .filter_map(|(k, v)| Some((k.to_string(), v.as_str()?.to_string())))
            .collect();
        let body = resp.body().to_vec();

        Ok(Response::new(status, headers, body)
            .with_type(edge_core::ResponseType::for_origin(&self.scope, &request.url))
            .with_url(request.url.clone()))
    }
}

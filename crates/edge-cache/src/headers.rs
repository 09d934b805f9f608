//! Cache debugging headers.

use edge_core::Response;
use serde::{Deserialize, Serialize};

use crate::key::CacheKey;

/// Header names for cache debugging.
pub mod header_names {
    /// How the response was produced (HIT, MISS, BYPASS, OFFLINE).
    pub const X_CACHE_STATUS: &str = "X-Cache-Status";
    /// Cache key used for lookup.
    pub const X_CACHE_KEY: &str = "X-Cache-Key";
    /// Bucket that held the entry.
    pub const X_CACHE_BUCKET: &str = "X-Cache-Bucket";
}

/// How a fetch was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from a cache bucket.
    Hit,
    /// Served from the network.
    Miss,
    /// Not intercepted.
    Bypass,
    /// Network failed, served a fallback.
    Offline,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Bypass => write!(f, "BYPASS"),
            Self::Offline => write!(f, "OFFLINE"),
        }
    }
}

/// Cache explain headers for debugging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheExplainHeaders {
    /// Overall cache status.
    pub status: Option<CacheStatus>,
    /// Cache key used.
    pub cache_key: Option<String>,
    /// Bucket that answered.
    pub bucket: Option<String>,
}

impl CacheExplainHeaders {
    /// Create new explain headers.
    pub fn new(status: CacheStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Set cache key.
    pub fn with_key(mut self, key: &CacheKey) -> Self {
        self.cache_key = Some(key.as_str().to_string());
        self
    }

    /// Set the bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Convert to HTTP headers.
    pub fn to_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        if let Some(status) = &self.status {
            headers.push((header_names::X_CACHE_STATUS.to_string(), status.to_string()));
        }

        if let Some(key) = &self.cache_key {
            headers.push((header_names::X_CACHE_KEY.to_string(), key.clone()));
        }

        if let Some(bucket) = &self.bucket {
            headers.push((header_names::X_CACHE_BUCKET.to_string(), bucket.clone()));
        }

        headers
    }

    /// Attach the headers to a response.
    pub fn apply(&self, mut response: Response) -> Response {
        response.headers.extend(self.to_headers());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_core::Url;

    #[test]
    fn test_status_display() {
        assert_eq!(CacheStatus::Hit.to_string(), "HIT");
        assert_eq!(CacheStatus::Offline.to_string(), "OFFLINE");
    }

    #[test]
    fn test_to_headers_skips_unset() {
        let headers = CacheExplainHeaders::new(CacheStatus::Miss).to_headers();
        assert_eq!(
            headers,
            vec![("X-Cache-Status".to_string(), "MISS".to_string())]
        );
    }

    #[test]
    fn test_apply_adds_headers() {
        let key = CacheKey::get(&Url::parse("https://apexnos.example/logo.png").unwrap());
        let resp = CacheExplainHeaders::new(CacheStatus::Hit)
            .with_key(&key)
            .with_bucket("apexnos-static-v1.0.0")
            .apply(Response::ok("png"));

        assert_eq!(resp.header("x-cache-status"), Some("HIT"));
        assert_eq!(
            resp.header("X-Cache-Key"),
            Some("GET https://apexnos.example/logo.png")
        );
        assert_eq!(resp.header("X-Cache-Bucket"), Some("apexnos-static-v1.0.0"));
        assert_eq!(resp.bytes(), b"png");
    }
}

//! Cache key composition.

use edge_core::{Method, Request, Url};
use serde::{Deserialize, Serialize};

/// Request identity under which a response is cached.
///
/// Composed of the method and the absolute URL without its fragment, so
/// `/index.html#top` and `/index.html` share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// The computed key string.
    key: String,
    /// Upper-case method.
    method: String,
    /// Normalized URL.
    url: String,
}

impl CacheKey {
    /// Create a key for a method and URL.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);

        let method = method.as_str().to_ascii_uppercase();
        Self {
            key: format!("{} {}", method, url),
            method,
            url: url.into(),
        }
    }

    /// Create a GET key.
    pub fn get(url: &Url) -> Self {
        Self::new(&Method::GET, url)
    }

    /// Key for an intercepted request.
    pub fn for_request(request: &Request) -> Self {
        Self::new(&request.method, &request.url)
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the method component.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the URL component.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

//! Interception and caching eligibility.

use edge_core::{Method, Request, Response, ResponseType};
use serde::{Deserialize, Serialize};

/// Why a request was not intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassReason {
    /// Only GET requests are intercepted.
    NonGetMethod,
    /// Only http and https URLs are intercepted.
    NonHttpScheme,
    /// The worker is not controlling clients yet.
    NotActive,
}

impl BypassReason {
    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonGetMethod => "non_get_method",
            Self::NonHttpScheme => "non_http_scheme",
            Self::NotActive => "not_active",
        }
    }
}

/// Caching rules applied by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Status a network response needs to be written to the dynamic cache.
    pub cacheable_status: u16,
    /// Response types eligible for the dynamic cache.
    pub cacheable_types: Vec<ResponseType>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            cacheable_status: 200,
            cacheable_types: vec![ResponseType::Basic],
        }
    }
}

impl CachePolicy {
    /// Create the default policy: 200 same-origin responses only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a request is intercepted at all.
    pub fn check_intercept(&self, request: &Request) -> Result<(), BypassReason> {
        if request.method != Method::GET {
            return Err(BypassReason::NonGetMethod);
        }
        if !request.is_http() {
            return Err(BypassReason::NonHttpScheme);
        }
        Ok(())
    }

    /// Whether a request is intercepted.
    pub fn should_intercept(&self, request: &Request) -> bool {
        self.check_intercept(request).is_ok()
    }

    /// Whether a network response may be written to the dynamic cache.
    pub fn is_cacheable(&self, response: &Response) -> bool {
        response.status == self.cacheable_status
            && self.cacheable_types.contains(&response.response_type)
    }

    /// Whether a response is acceptable for the static cache during install.
    pub fn accepts_install_response(&self, response: &Response) -> bool {
        response.is_success()
    }
}

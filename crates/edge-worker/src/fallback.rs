//! Responses served when the network is unreachable.

use chrono::{DateTime, SecondsFormat, Utc};
use edge_core::Response;
use serde::{Deserialize, Serialize};

/// Status of the synthesized offline response.
pub const OFFLINE_STATUS: u16 = 503;

/// Value of the `error` field in the offline body.
pub const OFFLINE_ERROR: &str = "Offline";

/// Body of the synthesized offline response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineBody {
    pub error: String,
    pub message: String,
    /// ISO-8601 UTC time the response was built.
    pub timestamp: String,
}

impl OfflineBody {
    /// Build a body stamped with `now`.
    pub fn new(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            error: OFFLINE_ERROR.to_string(),
            message: message.into(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Render as a `503 Service Unavailable` JSON response.
    pub fn into_response(self) -> Response {
        match Response::json(OFFLINE_STATUS, &self) {
            Ok(response) => response,
            // Three string fields always serialize; keep the status regardless.
            Err(_) => Response::new(OFFLINE_STATUS, Default::default(), self.message)
                .with_header("Content-Type", "text/plain"),
        }
    }
}

/// Which fallback a failed fetch gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Navigation: serve the cached root document.
    RootDocument,
    /// Anything else: synthesize the offline JSON response.
    OfflineJson,
}

impl FallbackKind {
    /// Pick the fallback for a request.
    pub fn for_navigation(is_navigation: bool) -> Self {
        if is_navigation {
            Self::RootDocument
        } else {
            Self::OfflineJson
        }
    }
}

/// Synthesize the offline response for `message`, stamped with the current time.
pub fn offline_response(message: &str) -> Response {
    OfflineBody::new(message, Utc::now()).into_response()
}

//! Worker errors.

use edge_cache::CacheError;
use edge_core::{ConfigError, LifecycleError};

/// Errors returned by the worker's lifecycle and event handlers.
///
/// Network failures during fetch never show up here; they are answered with
/// an offline fallback instead.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A static asset could not be precached. Nothing was written.
    #[error("install failed for {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// A push or message payload could not be read or written as JSON.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Failure reported by the hosting runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation}: {message}")]
pub struct HostError {
    pub operation: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

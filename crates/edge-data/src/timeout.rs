//! Timeout configuration for network fetches.

use std::future::Future;
use std::time::Duration;

/// Timeout configuration for a fetch operation.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total operation timeout. `None` waits indefinitely.
    pub total: Option<Duration>,
}

impl TimeoutConfig {
    /// Create a new timeout configuration.
    pub fn new(connect: Duration, total: Option<Duration>) -> Self {
        Self { connect, total }
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: std::cmp::min(total, Duration::from_secs(5)),
            total: Some(total),
        }
    }

    /// No total timeout.
    pub fn unbounded() -> Self {
        Self {
            connect: Duration::from_secs(5),
            total: None,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(Duration::from_secs(10))
    }
}

/// Error when a timeout is exceeded.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimeoutError {
    #[error("Total timeout after {0:?}")]
    Total(Duration),
}

/// Run `fut` under an optional total timeout.
#[cfg(not(target_arch = "wasm32"))]
pub async fn with_timeout<F, T>(limit: Option<Duration>, fut: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| TimeoutError::Total(limit)),
        None => Ok(fut.await),
    }
}

/// Run `fut` to completion. The Spin host enforces its own outbound limits.
#[cfg(target_arch = "wasm32")]
pub async fn with_timeout<F, T>(_limit: Option<Duration>, fut: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    Ok(fut.await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total_caps_connect() {
        let config = TimeoutConfig::from_total(Duration::from_secs(30));
        assert_eq!(config.connect, Duration::from_secs(5));
        assert_eq!(config.total, Some(Duration::from_secs(30)));

        let config = TimeoutConfig::from_total(Duration::from_millis(200));
        assert_eq!(config.connect, Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_fast_future() {
        let out = with_timeout(Some(Duration::from_secs(1)), async { 7 }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let out = with_timeout(Some(Duration::from_millis(50)), std::future::pending::<()>()).await;
        assert!(matches!(out, Err(TimeoutError::Total(d)) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_unbounded_waits() {
        let out = with_timeout(None, async { "done" }).await;
        assert_eq!(out.unwrap(), "done");
    }
}

//! Observability infrastructure for the offline edge worker.
//!
//! This crate provides:
//! - `StructuredLogger` - JSON/human log lines tagged with the worker version
//! - `LifecycleLogger` - Logs every lifecycle transition
//! - `init_tracing` - Installs the `tracing` subscriber used by binaries
//! - `WorkerMetrics` - Counters for cache hits, network use and fallbacks

mod logging;
mod metrics;
mod subscriber;

pub use logging::*;
pub use metrics::*;
pub use subscriber::*;

// Re-export RequestId from edge-core for convenience
pub use edge_core::RequestId;

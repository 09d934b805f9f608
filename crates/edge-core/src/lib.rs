//! Core abstractions for the offline edge worker.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `WorkerConfig` - Generation tags, static asset list and fallbacks
//! - `Request` / `Response` - Fetch snapshots passed through the worker
//! - `RequestId` - Correlation id for logs
//! - `WorkerState` / `Lifecycle` - Install/activate state machine

mod config;
mod context;
mod lifecycle;
mod response;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
pub use response::*;

// Re-exported so downstream crates agree on the same types.
pub use http::{Method, StatusCode};
pub use url::Url;

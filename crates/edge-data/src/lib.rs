//! Network access for the offline edge worker.
//!
//! This crate provides:
//! - `Fetcher` - The network seam the worker falls back to on a cache miss
//! - `HttpFetcher` / `SpinFetcher` - Native and Spin implementations
//! - `TimeoutConfig` - Connect and total timeouts
//! - `fetch_with_timeout` - Turns a hung request into a `FetchError::Timeout`

mod client;
mod timeout;

pub use client::*;
pub use timeout::*;

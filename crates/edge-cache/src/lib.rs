//! Caching infrastructure for the offline edge worker.
//!
//! This crate provides:
//! - `CacheKey` - Request identity (method + URL)
//! - `CacheStorage` / `CacheBucket` - Named buckets, one per generation
//! - `MemoryCacheStorage` - Concurrent in-memory backend
//! - `CachePolicy` - Which requests are intercepted and which responses are kept
//! - `CacheExplainHeaders` - Debug headers for cache behavior
//!
//! # Example
//!
//! ```ignore
//! use edge_cache::{CacheKey, CacheStorage, MemoryCacheStorage};
//!
//! let storage = MemoryCacheStorage::new();
//! let bucket = storage.open("apexnos-static-v1.0.0").await?;
//! bucket.put(CacheKey::get(&url), response).await?;
//!
//! let hit = storage.match_request(&CacheKey::get(&url)).await?;
//! ```

mod headers;
mod key;
mod policy;
mod storage;

pub use headers::*;
pub use key::*;
pub use policy::*;
pub use storage::*;

//! Offline cache manager for a static site.
//!
//! This crate provides the worker that sits between the site and the network:
//! - `OfflineWorker` - Install, activate and fetch handlers over a cache storage
//! - `FetchOutcome` - How an intercepted request was answered
//! - `ControlMessage` - `SKIP_WAITING` / `GET_VERSION` page messages
//! - `Notification` - Push notification built from a push payload
//! - `WorkerHost` - What the worker asks of the hosting runtime
//! - `OfflineBody` - The synthesized 503 response body

mod error;
mod fallback;
mod host;
mod message;
mod notification;
mod worker;

pub use error::*;
pub use fallback::*;
pub use host::*;
pub use message::*;
pub use notification::*;
pub use worker::*;

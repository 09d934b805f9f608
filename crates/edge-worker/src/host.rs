//! The hosting runtime as seen by the worker.

use async_trait::async_trait;
use edge_core::Url;

use crate::error::HostError;
use crate::notification::Notification;

/// Runtime services the worker calls out to.
///
/// Implemented by the platform binding; tests use a recording host.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WorkerHost: Send + Sync {
    /// Activate this worker without waiting for old clients to close.
    async fn skip_waiting(&self) -> Result<(), HostError>;

    /// Take control of every open client.
    async fn claim_clients(&self) -> Result<(), HostError>;

    /// Display a notification.
    async fn show_notification(&self, notification: &Notification) -> Result<(), HostError>;

    /// Open a browser window at `url`.
    async fn open_window(&self, url: &Url) -> Result<(), HostError>;

    /// Dismiss a displayed notification.
    async fn close_notification(&self, notification: &Notification) -> Result<(), HostError>;
}

/// Host for environments without clients, such as the CLI. Every call logs
/// and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WorkerHost for HeadlessHost {
    async fn skip_waiting(&self) -> Result<(), HostError> {
        tracing::debug!("skip_waiting requested");
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), HostError> {
        tracing::debug!("claim_clients requested");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), HostError> {
        tracing::debug!(title = %notification.title, "show_notification requested");
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), HostError> {
        tracing::debug!(%url, "open_window requested");
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), HostError> {
        tracing::debug!(title = %notification.title, "close_notification requested");
        Ok(())
    }
}

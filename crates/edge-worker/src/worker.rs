//! The offline cache manager.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use edge_cache::{
    BypassReason, CacheExplainHeaders, CacheKey, CachePolicy, CacheResult, CacheStatus,
    CacheStorage,
};
use edge_core::{
    Lifecycle, LifecycleError, LifecycleObserver, Request, Response, Url, WorkerConfig,
    WorkerState,
};
use edge_data::{fetch_with_timeout, Fetcher, TimeoutConfig};
use edge_observability::{MetricsSnapshot, WorkerMetrics};

use crate::error::WorkerError;
use crate::fallback::{offline_response, FallbackKind};
use crate::host::WorkerHost;
use crate::message::{ControlMessage, MessagePort, VersionReply};
use crate::notification::{Notification, NotificationClick, PushPayload};

/// Sync tag the worker acknowledges.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// How an intercepted fetch was handled.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted. The host performs the request itself.
    PassThrough(BypassReason),
    /// Answered by the worker.
    Respond {
        response: Response,
        status: CacheStatus,
    },
}

impl FetchOutcome {
    /// The response, unless the request passed through.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::PassThrough(_) => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::PassThrough(_) => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    /// Where the answer came from.
    pub fn cache_status(&self) -> CacheStatus {
        match self {
            Self::PassThrough(_) => CacheStatus::Bypass,
            Self::Respond { status, .. } => *status,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough(_))
    }
}

/// Offline cache manager for one deployed version.
///
/// Shared behind `Arc`; every handler takes `&self` and fetches may run
/// concurrently. The lifecycle orders install before activate and activate
/// before any fetch is answered.
pub struct OfflineWorker {
    config: WorkerConfig,
    static_assets: Vec<Url>,
    offline_document: Url,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn WorkerHost>,
    policy: CachePolicy,
    timeout: TimeoutConfig,
    lifecycle: Mutex<Lifecycle>,
    metrics: Arc<WorkerMetrics>,
    #[cfg(not(target_arch = "wasm32"))]
    pending_writes: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl OfflineWorker {
    /// Create a worker in the `Installing` state.
    ///
    /// Fails when the configuration does not validate.
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn WorkerHost>,
    ) -> Result<Self, WorkerError> {
        config.validate()?;
        let static_assets = config.static_asset_urls()?;
        let offline_document = config.offline_document_url()?;
        let timeout = config
            .network_timeout()
            .map(TimeoutConfig::from_total)
            .unwrap_or_else(TimeoutConfig::unbounded);

        Ok(Self {
            config,
            static_assets,
            offline_document,
            storage,
            fetcher,
            host,
            policy: CachePolicy::default(),
            timeout,
            lifecycle: Mutex::new(Lifecycle::new()),
            metrics: Arc::new(WorkerMetrics::new()),
            #[cfg(not(target_arch = "wasm32"))]
            pending_writes: Mutex::new(Vec::new()),
        })
    }

    /// Replace the caching policy.
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share counters with another owner.
    pub fn with_metrics(mut self, metrics: Arc<WorkerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Observe lifecycle transitions.
    pub fn with_observer(self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle().observe(observer);
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.lifecycle().state()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Precache the static asset list.
    ///
    /// All assets are fetched before anything is stored; a transport error
    /// or non-2xx status on any of them leaves the static cache unwritten
    /// and the worker redundant.
    pub async fn on_install(&self) -> Result<(), WorkerError> {
        let state = self.state();
        if state != WorkerState::Installing {
            return Err(LifecycleError {
                from: state,
                to: WorkerState::Waiting,
            }
            .into());
        }

        tracing::info!(version = %self.config.worker_version(), "installing");

        if let Err(err) = self.precache().await {
            tracing::error!(error = %err, "install failed");
            self.transition(WorkerState::Redundant)?;
            return Err(err);
        }

        self.transition(WorkerState::Waiting)?;
        tracing::info!(
            cache = %self.config.static_cache_name(),
            assets = self.static_assets.len(),
            "static assets cached"
        );

        if let Err(err) = self.host.skip_waiting().await {
            tracing::warn!(error = %err, "skip_waiting rejected by host");
        }
        Ok(())
    }

    async fn precache(&self) -> Result<(), WorkerError> {
        let entries =
            futures::future::try_join_all(self.static_assets.iter().map(|url| self.fetch_asset(url)))
                .await?;

        let name = self.config.static_cache_name();
        // A candidate may reuse the live tag; its bucket is not ours to drop.
        let existed = self.storage.has(&name).await?;
        let bucket = self.storage.open(&name).await?;
        if let Err(err) = bucket.put_all(entries).await {
            if !existed {
                self.storage.delete(&name).await?;
            }
            return Err(err.into());
        }
        Ok(())
    }

    async fn fetch_asset(&self, url: &Url) -> Result<(CacheKey, Response), WorkerError> {
        let request = Request::get(url.clone());
        self.metrics.record_network_fetch();

        let response = fetch_with_timeout(self.fetcher.as_ref(), &request, &self.timeout)
            .await
            .map_err(|err| {
                self.metrics.record_network_failure();
                WorkerError::InstallFailed {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            })?;

        if !self.policy.accepts_install_response(&response) {
            return Err(WorkerError::InstallFailed {
                url: url.to_string(),
                reason: format!("status {}", response.status),
            });
        }

        tracing::debug!(%url, status = response.status, "fetched static asset");
        Ok((CacheKey::get(url), response))
    }

    /// Purge stale generations and take control of clients.
    ///
    /// Returns the names of the deleted buckets. A failed purge is logged
    /// and does not stop activation.
    pub async fn on_activate(&self) -> Result<Vec<String>, WorkerError> {
        self.transition(WorkerState::Activating)?;
        tracing::info!(version = %self.config.worker_version(), "activating");

        let purged = match self.purge_stale().await {
            Ok(purged) => purged,
            Err(err) => {
                tracing::warn!(error = %err, "failed to purge stale caches");
                Vec::new()
            }
        };

        self.transition(WorkerState::Active)?;
        self.host.claim_clients().await?;
        Ok(purged)
    }

    async fn purge_stale(&self) -> CacheResult<Vec<String>> {
        let current = self.config.current_generations();
        let mut purged = Vec::new();

        for name in self.storage.keys().await? {
            if current.contains(&name) {
                continue;
            }
            if self.storage.delete(&name).await? {
                tracing::info!(cache = %name, "deleted stale cache");
                purged.push(name);
            }
        }
        Ok(purged)
    }

    /// Mark this version redundant, e.g. once a newer one has activated.
    pub fn retire(&self) -> Result<(), WorkerError> {
        self.transition(WorkerState::Redundant)?;
        Ok(())
    }

    /// Answer a fetch: cache first, then network, then offline fallback.
    ///
    /// Never fails. Requests the worker does not intercept come back as
    /// [`FetchOutcome::PassThrough`] without touching the cache.
    pub async fn on_fetch(&self, request: &Request) -> FetchOutcome {
        if let Err(reason) = self.check_intercept(request) {
            self.metrics.record_pass_through();
            tracing::trace!(
                request_id = %request.request_id,
                url = %request.url,
                reason = reason.as_str(),
                "passing through"
            );
            return FetchOutcome::PassThrough(reason);
        }

        let key = CacheKey::for_request(request);

        match self.storage.match_request(&key).await {
            Ok(Some(hit)) => {
                self.metrics.record_cache_hit();
                tracing::debug!(
                    request_id = %request.request_id,
                    url = %request.url,
                    cache = %hit.bucket,
                    "serving from cache"
                );
                return self.respond(hit.response, CacheStatus::Hit, &key, Some(hit.bucket));
            }
            Ok(None) => self.metrics.record_cache_miss(),
            Err(err) => {
                self.metrics.record_cache_miss();
                tracing::warn!(
                    request_id = %request.request_id,
                    url = %request.url,
                    error = %err,
                    "cache lookup failed"
                );
            }
        }

        self.metrics.record_network_fetch();
        match fetch_with_timeout(self.fetcher.as_ref(), request, &self.timeout).await {
            Ok(response) => {
                if self.policy.is_cacheable(&response) {
                    self.write_dynamic(key.clone(), response.clone()).await;
                }
                self.respond(response, CacheStatus::Miss, &key, None)
            }
            Err(err) => {
                self.metrics.record_network_failure();
                tracing::warn!(
                    request_id = %request.request_id,
                    url = %request.url,
                    error = %err,
                    "network request failed"
                );
                let response = self.offline_fallback(request).await;
                self.respond(response, CacheStatus::Offline, &key, None)
            }
        }
    }

    fn check_intercept(&self, request: &Request) -> Result<(), BypassReason> {
        self.policy.check_intercept(request)?;
        if !self.state().is_serving() {
            return Err(BypassReason::NotActive);
        }
        Ok(())
    }

    async fn offline_fallback(&self, request: &Request) -> Response {
        self.metrics.record_offline_fallback();

        if FallbackKind::for_navigation(request.is_navigation()) == FallbackKind::RootDocument {
            match self
                .storage
                .match_request(&CacheKey::get(&self.offline_document))
                .await
            {
                Ok(Some(hit)) => return hit.response,
                Ok(None) => tracing::warn!(
                    request_id = %request.request_id,
                    document = %self.offline_document,
                    "root document not cached"
                ),
                Err(err) => tracing::warn!(
                    request_id = %request.request_id,
                    error = %err,
                    "root document lookup failed"
                ),
            }
        }

        offline_response(&self.config.offline_message)
    }

    fn respond(
        &self,
        response: Response,
        status: CacheStatus,
        key: &CacheKey,
        bucket: Option<String>,
    ) -> FetchOutcome {
        let response = if self.config.explain_headers {
            let mut explain = CacheExplainHeaders::new(status).with_key(key);
            if let Some(bucket) = bucket {
                explain = explain.with_bucket(bucket);
            }
            explain.apply(response)
        } else {
            response
        };
        FetchOutcome::Respond { response, status }
    }

    async fn write_dynamic(&self, key: CacheKey, response: Response) {
        let write = store_dynamic(
            self.storage.clone(),
            self.config.dynamic_cache_name(),
            key,
            response,
            self.metrics.clone(),
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            if !self.config.await_cache_writes {
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let handle = runtime.spawn(write);
                    let mut pending = lock(&self.pending_writes);
                    pending.retain(|h| !h.is_finished());
                    pending.push(handle);
                    return;
                }
            }
        }

        write.await;
    }

    /// Wait for background cache writes started by earlier fetches.
    pub async fn settle(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let handles = std::mem::take(&mut *lock(&self.pending_writes));
            for handle in handles {
                if let Err(err) = handle.await {
                    tracing::warn!(error = %err, "cache write task failed");
                }
            }
        }
    }

    /// Handle a message posted by the page.
    ///
    /// Unknown and untyped messages are ignored. A `GET_VERSION` without a
    /// reply port is logged and dropped.
    pub async fn on_message(
        &self,
        data: &serde_json::Value,
        port: Option<&dyn MessagePort>,
    ) -> Result<(), WorkerError> {
        let Some(message) = ControlMessage::parse(data) else {
            tracing::debug!("ignoring untyped message");
            return Ok(());
        };

        match message {
            ControlMessage::SkipWaiting => {
                tracing::info!("skip waiting requested by page");
                self.host.skip_waiting().await?;
            }
            ControlMessage::GetVersion => {
                let Some(port) = port else {
                    tracing::warn!(message = message.as_str(), "no reply port, dropping message");
                    return Ok(());
                };
                let reply = VersionReply {
                    version: self.config.static_cache_name(),
                };
                let value = serde_json::to_value(&reply).map_err(WorkerError::InvalidPayload)?;
                port.post_message(value)?;
            }
            ControlMessage::Unknown => tracing::debug!("ignoring unknown message"),
        }
        Ok(())
    }

    /// Handle a background sync. Returns whether the tag was recognized.
    pub async fn on_sync(&self, tag: &str) -> bool {
        if tag == BACKGROUND_SYNC_TAG {
            tracing::info!(tag, "background sync triggered");
            true
        } else {
            tracing::debug!(tag, "ignoring sync tag");
            false
        }
    }

    /// Show a notification for a push message.
    ///
    /// A push without data shows nothing and returns `None`.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<Option<Notification>, WorkerError> {
        let Some(data) = data else {
            return Ok(None);
        };

        let payload = PushPayload::from_slice(data).map_err(WorkerError::InvalidPayload)?;
        let notification = Notification::from_push(&self.config.notifications, payload, Utc::now());
        self.host.show_notification(&notification).await?;
        Ok(Some(notification))
    }

    /// Close the clicked notification, opening the site for `explore`.
    pub async fn on_notification_click(&self, click: &NotificationClick) -> Result<(), WorkerError> {
        self.host.close_notification(&click.notification).await?;

        if click.is_explore() {
            let url = self.config.resolve_url(&self.config.notifications.explore_url)?;
            self.host.open_window(&url).await?;
        }
        Ok(())
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        lock(&self.lifecycle)
    }

    fn transition(&self, next: WorkerState) -> Result<(), LifecycleError> {
        self.lifecycle().transition(next)
    }
}

impl fmt::Debug for OfflineWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineWorker")
            .field("version", &self.config.worker_version())
            .field("state", &self.state())
            .field("static_assets", &self.static_assets.len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn store_dynamic(
    storage: Arc<dyn CacheStorage>,
    name: String,
    key: CacheKey,
    response: Response,
    metrics: Arc<WorkerMetrics>,
) {
    let url = key.url().to_string();
    match put_entry(storage.as_ref(), &name, key, response).await {
        Ok(()) => {
            metrics.record_cache_write();
            tracing::debug!(%url, cache = %name, "cached network response");
        }
        Err(err) => {
            metrics.record_cache_write_failure();
            tracing::warn!(%url, cache = %name, error = %err, "failed to cache response");
        }
    }
}

async fn put_entry(
    storage: &dyn CacheStorage,
    name: &str,
    key: CacheKey,
    response: Response,
) -> CacheResult<()> {
    storage.open(name).await?.put(key, response).await
}

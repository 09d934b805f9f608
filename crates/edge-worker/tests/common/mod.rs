//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edge_cache::{CacheBucket, CacheKey, CacheMatch, CacheResult, CacheStorage, MemoryCacheStorage};
use edge_core::{Request, Response, ResponseType, Url, WorkerConfig};
use edge_data::{FetchError, Fetcher};
use edge_worker::{HostError, Notification, OfflineWorker, WorkerHost};

pub const SCOPE: &str = "https://apexnos.test/";
pub const ROOT_DOCUMENT: &str = "<!doctype html><title>ApeXNOS</title>";

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, body: String },
    Fail,
    Hang,
}

/// Fetcher answering from a route table and counting every call.
///
/// Unrouted URLs answer 404.
pub struct ScriptedFetcher {
    scope: Url,
    routes: Mutex<HashMap<String, Route>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            scope: Url::parse(SCOPE).unwrap(),
            routes: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve every default static asset with 200.
    pub fn serving_site(config: &WorkerConfig) -> Self {
        let fetcher = Self::new();
        for asset in &config.static_assets {
            let body = if asset == "/" || asset == "/index.html" {
                ROOT_DOCUMENT.to_string()
            } else {
                format!("asset {}", asset)
            };
            fetcher.respond(&absolute(asset), 200, &body);
        }
        fetcher
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.insert(
            url,
            Route::Respond {
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn fail(&self, url: &str) {
        self.insert(url, Route::Fail);
    }

    pub fn hang(&self, url: &str) {
        self.insert(url, Route::Hang);
    }

    /// Fail every request regardless of routes.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    fn insert(&self, url: &str, route: Route) {
        let url = Url::parse(url).unwrap();
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let offline_error = || FetchError::Connection {
            url: request.url.to_string(),
            message: "network unreachable".to_string(),
        };
        if self.offline.load(Ordering::SeqCst) {
            return Err(offline_error());
        }

        let route = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        let response = match route {
            Some(Route::Respond { status, body }) => Response::new(status, HashMap::new(), body),
            Some(Route::Fail) => return Err(offline_error()),
            Some(Route::Hang) => std::future::pending().await,
            None => Response::new(404, HashMap::new(), "not found"),
        };

        Ok(response
            .with_type(ResponseType::for_origin(&self.scope, &request.url))
            .with_url(request.url.clone()))
    }
}

/// Storage wrapper counting every call.
#[derive(Default)]
pub struct CountingStorage {
    pub inner: MemoryCacheStorage,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn new(inner: MemoryCacheStorage) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn open(&self, name: &str) -> CacheResult<Arc<dyn CacheBucket>> {
        self.tick();
        self.inner.open(name).await
    }

    async fn has(&self, name: &str) -> CacheResult<bool> {
        self.tick();
        self.inner.has(name).await
    }

    async fn delete(&self, name: &str) -> CacheResult<bool> {
        self.tick();
        self.inner.delete(name).await
    }

    async fn keys(&self) -> CacheResult<Vec<String>> {
        self.tick();
        self.inner.keys().await
    }

    async fn match_request(&self, key: &CacheKey) -> CacheResult<Option<CacheMatch>> {
        self.tick();
        self.inner.match_request(key).await
    }
}

/// A call the worker made on its host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SkipWaiting,
    ClaimClients,
    ShowNotification(Notification),
    OpenWindow(Url),
    CloseNotification(String),
}

#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HostCall) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl WorkerHost for RecordingHost {
    async fn skip_waiting(&self) -> Result<(), HostError> {
        self.record(HostCall::SkipWaiting)
    }

    async fn claim_clients(&self) -> Result<(), HostError> {
        self.record(HostCall::ClaimClients)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), HostError> {
        self.record(HostCall::ShowNotification(notification.clone()))
    }

    async fn open_window(&self, url: &Url) -> Result<(), HostError> {
        self.record(HostCall::OpenWindow(url.clone()))
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), HostError> {
        self.record(HostCall::CloseNotification(notification.title.clone()))
    }
}

/// Everything a test needs to drive and inspect one worker.
pub struct Harness {
    pub worker: OfflineWorker,
    pub fetcher: Arc<ScriptedFetcher>,
    pub storage: Arc<CountingStorage>,
    pub host: Arc<RecordingHost>,
}

impl Harness {
    /// Build a worker over a site serving every static asset.
    pub fn new(config: WorkerConfig) -> Self {
        let fetcher = Arc::new(ScriptedFetcher::serving_site(&config));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: WorkerConfig, fetcher: Arc<ScriptedFetcher>) -> Self {
        Self::with_storage(config, fetcher, Arc::new(CountingStorage::default()))
    }

    pub fn with_storage(
        config: WorkerConfig,
        fetcher: Arc<ScriptedFetcher>,
        storage: Arc<CountingStorage>,
    ) -> Self {
        let host = Arc::new(RecordingHost::default());
        let worker = OfflineWorker::new(config, storage.clone(), fetcher.clone(), host.clone())
            .unwrap();
        Self {
            worker,
            fetcher,
            storage,
            host,
        }
    }

    /// Install and activate, then forget the network calls made so far.
    pub async fn activated(config: WorkerConfig) -> Self {
        let harness = Self::new(config);
        harness.worker.on_install().await.unwrap();
        harness.worker.on_activate().await.unwrap();
        harness.fetcher.reset_calls();
        harness
    }
}

/// Default configuration scoped to the test origin.
pub fn config() -> WorkerConfig {
    WorkerConfig::new("apexnos", "2.0.0").with_scope(SCOPE)
}

/// Resolve a path against the test scope.
pub fn absolute(path: &str) -> String {
    Url::parse(SCOPE).unwrap().join(path).unwrap().to_string()
}

pub fn url(path: &str) -> Url {
    Url::parse(&absolute(path)).unwrap()
}

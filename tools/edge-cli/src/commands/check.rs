//! Run the install phase against a live origin.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edge_cache::MemoryCacheStorage;
use edge_core::{Request, Response, WorkerConfig};
use edge_data::{FetchError, Fetcher, HttpFetcher, TimeoutConfig};
use edge_observability::{LifecycleLogger, LogFormat, StructuredLogger};
use edge_worker::{HeadlessHost, OfflineWorker};
use indicatif::ProgressBar;
use serde::Serialize;

use super::CheckArgs;
use crate::context::Context;
use crate::output::{format_bytes, status_badge};

/// Outcome of fetching one static asset.
#[derive(Debug, Clone, Serialize)]
struct AssetResult {
    url: String,
    status: Option<u16>,
    bytes: u64,
    elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Full report printed by `edge check --json`.
#[derive(Debug, Serialize)]
struct CheckReport {
    origin: String,
    static_cache: String,
    checked_at: DateTime<Utc>,
    passed: bool,
    cached_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    assets: Vec<AssetResult>,
}

/// Fetcher that remembers what happened to every request.
struct RecordingFetcher {
    inner: Arc<dyn Fetcher>,
    results: Mutex<Vec<AssetResult>>,
    progress: ProgressBar,
}

impl RecordingFetcher {
    fn new(inner: Arc<dyn Fetcher>, progress: ProgressBar) -> Self {
        Self {
            inner,
            results: Mutex::new(Vec::new()),
            progress,
        }
    }

    /// Recorded results in the order of `urls`.
    ///
    /// Assets abandoned after another asset failed are reported without a
    /// status.
    fn results_for(&self, urls: &[String]) -> Vec<AssetResult> {
        let recorded = match self.results.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        urls.iter()
            .map(|url| {
                recorded
                    .iter()
                    .find(|r| &r.url == url)
                    .cloned()
                    .unwrap_or_else(|| AssetResult {
                        url: url.clone(),
                        status: None,
                        bytes: 0,
                        elapsed_ms: 0,
                        error: Some("not attempted".to_string()),
                    })
            })
            .collect()
    }

    fn record(&self, result: AssetResult) {
        self.progress.inc(1);
        self.progress.set_message(result.url.clone());
        match self.results.lock() {
            Ok(mut guard) => guard.push(result),
            Err(poisoned) => poisoned.into_inner().push(result),
        }
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let start = Instant::now();
        let result = self.inner.fetch(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let url = request.url.to_string();
        match &result {
            Ok(response) => self.record(AssetResult {
                url,
                status: Some(response.status),
                bytes: response.body.len() as u64,
                elapsed_ms,
                error: None,
            }),
            Err(err) => self.record(AssetResult {
                url,
                status: None,
                bytes: 0,
                elapsed_ms,
                error: Some(err.to_string()),
            }),
        }
        result
    }
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let worker_config = check_config(&ctx.config, &args);
    worker_config
        .validate()
        .context("Invalid worker configuration")?;

    let scope = worker_config.scope_url()?;
    let urls: Vec<String> = worker_config
        .static_asset_urls()?
        .iter()
        .map(|url| url.to_string())
        .collect();

    ctx.output.header(&format!("Checking {}", scope));
    ctx.output.kv("Static cache", &worker_config.static_cache_name());
    ctx.output.kv("Assets", &urls.len().to_string());

    let timeout = worker_config
        .network_timeout()
        .map(TimeoutConfig::from_total)
        .unwrap_or_else(TimeoutConfig::unbounded);
    let http = HttpFetcher::new(scope.clone(), &timeout).context("Failed to build HTTP client")?;

    let progress = ctx.output.progress(urls.len() as u64, "fetching");
    let fetcher = Arc::new(RecordingFetcher::new(Arc::new(http), progress.clone()));
    let storage = Arc::new(MemoryCacheStorage::new());

    let mut worker = OfflineWorker::new(
        worker_config.clone(),
        storage.clone(),
        fetcher.clone(),
        Arc::new(HeadlessHost),
    )?;
    if ctx.output.is_verbose() {
        let logger = StructuredLogger::new(worker_config.worker_version()).with_format(
            if ctx.output.is_json() { LogFormat::Json } else { LogFormat::Human },
        );
        worker = worker.with_observer(Arc::new(LifecycleLogger::new(logger)));
    }

    let install = worker.on_install().await;
    progress.finish_and_clear();

    let static_cache = worker_config.static_cache_name();
    let cached_entries = match storage.bucket(&static_cache).await {
        Some(bucket) => bucket.len().await,
        None => 0,
    };

    let report = CheckReport {
        origin: scope.to_string(),
        static_cache,
        checked_at: Utc::now(),
        passed: install.is_ok(),
        cached_entries,
        error: install.as_ref().err().map(|e| e.to_string()),
        assets: fetcher.results_for(&urls),
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else {
        print_report(&report, ctx);
    }

    if let Err(e) = install {
        bail!("Install would fail: {}", e);
    }

    Ok(())
}

/// Worker configuration with the check overrides applied.
fn check_config(config: &crate::config::CliConfig, args: &CheckArgs) -> WorkerConfig {
    let mut worker = config.worker.clone();
    if let Some(origin) = args.origin.as_ref().or(config.check.origin.as_ref()) {
        worker.scope = origin.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        worker = worker.with_network_timeout(Duration::from_millis(timeout_ms));
    }
    worker
}

fn print_report(report: &CheckReport, ctx: &Context) {
    ctx.output.info("");
    ctx.output
        .table_row(&["STATUS", "SIZE", "TIME", "URL"], &[8, 10, 8, 0]);
    for asset in &report.assets {
        let size = format_bytes(asset.bytes);
        let time = format!("{}ms", asset.elapsed_ms);
        ctx.output.table_row(
            &[status_badge(asset.status).as_str(), size.as_str(), time.as_str(), asset.url.as_str()],
            &[8, 10, 8, 0],
        );
        if let Some(ref error) = asset.error {
            ctx.output.debug(&format!("{}: {}", asset.url, error));
        }
    }

    ctx.output.info("");
    if report.passed {
        ctx.output.success(&format!(
            "{} entries cached in {}",
            report.cached_entries, report.static_cache
        ));
    } else {
        let failed = report
            .assets
            .iter()
            .filter(|a| !matches!(a.status, Some(200..=299)))
            .count();
        ctx.output
            .warn(&format!("{} of {} assets failed", failed, report.assets.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckConfig, CliConfig};

    struct Fixed(u16);

    #[async_trait]
    impl Fetcher for Fixed {
        async fn fetch(&self, _request: &Request) -> Result<Response, FetchError> {
            Ok(Response::new(self.0, Default::default(), "body"))
        }
    }

    fn args(origin: Option<&str>, timeout_ms: Option<u64>) -> CheckArgs {
        CheckArgs {
            origin: origin.map(String::from),
            timeout_ms,
        }
    }

    #[test]
    fn test_origin_precedence() {
        let mut config = CliConfig::default();
        assert_eq!(check_config(&config, &args(None, None)).scope, "http://localhost/");

        config.check = CheckConfig {
            origin: Some("https://staging.apexnos.test/".to_string()),
        };
        assert_eq!(
            check_config(&config, &args(None, None)).scope,
            "https://staging.apexnos.test/"
        );
        assert_eq!(
            check_config(&config, &args(Some("https://apexnos.test/"), None)).scope,
            "https://apexnos.test/"
        );
    }

    #[test]
    fn test_timeout_override() {
        let config = CliConfig::default();
        let worker = check_config(&config, &args(None, Some(250)));
        assert_eq!(worker.network_timeout(), Some(Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn test_recording_fetcher_orders_results() {
        let fetcher = RecordingFetcher::new(Arc::new(Fixed(200)), ProgressBar::hidden());
        let url = edge_core::Url::parse("https://apexnos.test/styles.css").unwrap();
        fetcher.fetch(&Request::get(url)).await.unwrap();

        let urls = vec![
            "https://apexnos.test/".to_string(),
            "https://apexnos.test/styles.css".to_string(),
        ];
        let results = fetcher.results_for(&urls);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, None);
        assert_eq!(results[0].error.as_deref(), Some("not attempted"));
        assert_eq!(results[1].status, Some(200));
        assert_eq!(results[1].bytes, 4);
    }
}

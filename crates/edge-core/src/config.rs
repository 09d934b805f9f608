//! Worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Assets precached by the default configuration.
pub const DEFAULT_STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/script.js",
    "/logo.png",
    "/favicon.ico",
    "https://fonts.googleapis.com/css2?family=Orbitron:wght@400;700;900&family=Rajdhani:wght@300;400;600;700&display=swap",
];

/// Errors raised while validating a [`WorkerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cache prefix must not be empty")]
    EmptyPrefix,

    #[error("version must not be empty")]
    EmptyVersion,

    #[error("invalid scope URL '{url}': {source}")]
    InvalidScope {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("scope must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("static and dynamic caches share the name '{0}'")]
    GenerationClash(String),
}

/// Configuration for one deployed worker version.
///
/// Replaces hard-coded cache names: every tag the worker compares against is
/// derived from here, so tests can run with fixture values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Prefix shared by every cache bucket this site owns.
    pub cache_prefix: String,

    /// Deployment version, part of every generation tag.
    pub version: String,

    /// Origin and base path the worker controls. Relative URLs resolve here.
    pub scope: String,

    /// Explicit static generation tag (derived when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_cache: Option<String>,

    /// Explicit dynamic generation tag (derived when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_cache: Option<String>,

    /// URLs that must be in the static cache after install, in order.
    pub static_assets: Vec<String>,

    /// Root document served to navigations while offline.
    pub offline_document: String,

    /// Message placed in the synthesized offline response.
    pub offline_message: String,

    /// Network timeout in milliseconds. Zero waits forever.
    pub network_timeout_ms: u64,

    /// Await dynamic cache writes before responding.
    pub await_cache_writes: bool,

    /// Attach `X-Cache-*` debug headers to served responses.
    pub explain_headers: bool,

    /// Push notification presentation.
    pub notifications: NotificationConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_prefix: "apexnos".to_string(),
            version: "1.0.0".to_string(),
            scope: "http://localhost/".to_string(),
            static_cache: None,
            dynamic_cache: None,
            static_assets: DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_document: "/index.html".to_string(),
            offline_message: "ApeXNOS is currently offline. Please check your connection."
                .to_string(),
            network_timeout_ms: 10_000,
            await_cache_writes: false,
            explain_headers: false,
            notifications: NotificationConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create a configuration for a prefix and version with default assets.
    pub fn new(cache_prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            cache_prefix: cache_prefix.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Set the scope URL.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Replace the static asset list.
    pub fn with_static_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the offline root document.
    pub fn with_offline_document(mut self, path: impl Into<String>) -> Self {
        self.offline_document = path.into();
        self
    }

    /// Set the network timeout. `Duration::ZERO` disables it.
    pub fn with_network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Await dynamic cache writes before responding.
    pub fn with_awaited_cache_writes(mut self, awaited: bool) -> Self {
        self.await_cache_writes = awaited;
        self
    }

    /// Enable explain headers.
    pub fn with_explain_headers(mut self, enabled: bool) -> Self {
        self.explain_headers = enabled;
        self
    }

    /// Version tag reported for the worker as a whole.
    pub fn worker_version(&self) -> String {
        format!("{}-v{}", self.cache_prefix, self.version)
    }

    /// Current static generation tag.
    pub fn static_cache_name(&self) -> String {
        self.static_cache
            .clone()
            .unwrap_or_else(|| format!("{}-static-v{}", self.cache_prefix, self.version))
    }

    /// Current dynamic generation tag.
    pub fn dynamic_cache_name(&self) -> String {
        self.dynamic_cache
            .clone()
            .unwrap_or_else(|| format!("{}-dynamic-v{}", self.cache_prefix, self.version))
    }

    /// Both current generation tags, static first.
    pub fn current_generations(&self) -> [String; 2] {
        [self.static_cache_name(), self.dynamic_cache_name()]
    }

    /// Network timeout, `None` when disabled.
    pub fn network_timeout(&self) -> Option<Duration> {
        (self.network_timeout_ms > 0).then(|| Duration::from_millis(self.network_timeout_ms))
    }

    /// Parse the scope URL.
    pub fn scope_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.scope).map_err(|source| ConfigError::InvalidScope {
            url: self.scope.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Resolve a possibly relative URL against the scope.
    pub fn resolve_url(&self, raw: &str) -> Result<Url, ConfigError> {
        let scope = self.scope_url()?;
        scope.join(raw).map_err(|source| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source,
        })
    }

    /// Resolve every static asset, preserving order.
    pub fn static_asset_urls(&self) -> Result<Vec<Url>, ConfigError> {
        self.static_assets
            .iter()
            .map(|asset| self.resolve_url(asset))
            .collect()
    }

    /// Resolve the offline root document.
    pub fn offline_document_url(&self) -> Result<Url, ConfigError> {
        self.resolve_url(&self.offline_document)
    }

    /// Check the configuration for values the worker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }

        self.static_asset_urls()?;
        self.offline_document_url()?;

        let static_name = self.static_cache_name();
        if static_name == self.dynamic_cache_name() {
            return Err(ConfigError::GenerationClash(static_name));
        }

        Ok(())
    }
}

/// How push messages are presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Notification title.
    pub site_name: String,
    /// Body used when the push payload carries none.
    pub default_body: String,
    /// Notification icon.
    pub icon: String,
    /// Monochrome badge.
    pub badge: String,
    /// Label of the "explore" action.
    pub explore_title: String,
    /// Window opened by the "explore" action.
    pub explore_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            site_name: "ApeXNOS Gaming Clan".to_string(),
            default_body: "ApeXNOS has a new update!".to_string(),
            icon: "/logo.png".to_string(),
            badge: "/favicon.ico".to_string(),
            explore_title: "Visit ApeXNOS".to_string(),
            explore_url: "/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_tags_derived_from_prefix_and_version() {
        let config = WorkerConfig::new("apexnos", "1.0.0");
        assert_eq!(config.worker_version(), "apexnos-v1.0.0");
        assert_eq!(config.static_cache_name(), "apexnos-static-v1.0.0");
        assert_eq!(config.dynamic_cache_name(), "apexnos-dynamic-v1.0.0");
    }

    #[test]
    fn test_explicit_generation_tags_win() {
        let config = WorkerConfig {
            static_cache: Some("fixture-static".to_string()),
            dynamic_cache: Some("fixture-dynamic".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.current_generations(),
            ["fixture-static".to_string(), "fixture-dynamic".to_string()]
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.static_assets.len(), 7);
    }

    #[test]
    fn test_resolve_relative_and_absolute_urls() {
        let config = WorkerConfig::default().with_scope("https://apexnos.example/");
        let urls = config.static_asset_urls().unwrap();

        assert_eq!(urls[0].as_str(), "https://apexnos.example/");
        assert_eq!(urls[1].as_str(), "https://apexnos.example/index.html");
        assert_eq!(urls[6].host_str(), Some("fonts.googleapis.com"));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = WorkerConfig::new(" ", "1");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPrefix)));
    }

    #[test]
    fn test_validate_rejects_bad_scope() {
        let config = WorkerConfig::default().with_scope("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidScope { .. })
        ));

        let config = WorkerConfig::default().with_scope("ftp://example.com/");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_validate_rejects_generation_clash() {
        let config = WorkerConfig {
            static_cache: Some("same".to_string()),
            dynamic_cache: Some("same".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GenerationClash(name)) if name == "same"
        ));
    }

    #[test]
    fn test_network_timeout_zero_disables() {
        let config = WorkerConfig::default().with_network_timeout(Duration::ZERO);
        assert_eq!(config.network_timeout(), None);

        let config = WorkerConfig::default().with_network_timeout(Duration::from_secs(3));
        assert_eq!(config.network_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: WorkerConfig = toml::from_str(
            r#"
cache_prefix = "clan"
version = "2.1.0"
static_assets = ["/", "/app.js"]

[notifications]
site_name = "Clan"
"#,
        )
        .unwrap();

        assert_eq!(config.static_cache_name(), "clan-static-v2.1.0");
        assert_eq!(config.static_assets, vec!["/", "/app.js"]);
        assert_eq!(config.offline_document, "/index.html");
        assert_eq!(config.notifications.site_name, "Clan");
        assert_eq!(config.notifications.icon, "/logo.png");
    }
}

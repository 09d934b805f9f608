//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use edge_core::WorkerConfig;
use serde::{Deserialize, Serialize};

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["offline.toml", ".offline.toml", "offline.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Pre-flight check settings.
    #[serde(default)]
    pub check: CheckConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            generate_config(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

/// Settings for `edge check`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Origin to precache from instead of the worker scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Render a config as a commented `offline.toml`.
pub fn generate_config(config: &CliConfig) -> Result<String> {
    let body = toml::to_string_pretty(config).context("Failed to serialize config")?;
    Ok(format!(
        "# Offline worker configuration\n\
         #\n\
         # Cache buckets are named {{cache_prefix}}-static-v{{version}} and\n\
         # {{cache_prefix}}-dynamic-v{{version}}. Bump `version` on every deploy so\n\
         # activation purges the previous generation.\n\
         \n{}",
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("edge-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config_parses_back() {
        let content = generate_config(&CliConfig::default()).unwrap();
        assert!(content.starts_with("# Offline worker configuration"));

        let parsed: CliConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, CliConfig::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: CliConfig = toml::from_str(
            r#"
[worker]
version = "2.1.0"
static_assets = ["/", "/app.js"]

[check]
origin = "https://staging.example/"
"#,
        )
        .unwrap();

        assert_eq!(parsed.worker.cache_prefix, "apexnos");
        assert_eq!(parsed.worker.static_cache_name(), "apexnos-static-v2.1.0");
        assert_eq!(parsed.worker.static_assets, vec!["/", "/app.js"]);
        assert_eq!(parsed.check.origin.as_deref(), Some("https://staging.example/"));
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = scratch_dir("json");
        let path = dir.join("offline.json");

        let mut config = CliConfig::default();
        config.worker.version = "3.0.0".to_string();
        config.save(&path).unwrap();

        assert_eq!(CliConfig::load(&path).unwrap(), config);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_load_reports_bad_toml() {
        let dir = scratch_dir("bad");
        let path = dir.join("offline.toml");
        std::fs::write(&path, "[worker\nversion = ").unwrap();

        let err = CliConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML config"));
        std::fs::remove_dir_all(dir).unwrap();
    }
}

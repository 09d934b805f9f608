//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let path = match config_path {
            Some(path) => Some(resolve_path(&cwd, path)),
            // Try to find config in current directory or parent directories
            None => find_config(&cwd),
        };

        let config = match &path {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        if let Some(path) = &path {
            output.debug(&format!("Using config: {}", path.display()));
        }

        Ok(Self {
            config,
            config_path: path,
            output,
            cwd,
        })
    }
}

/// Find a config file in the directory tree, starting at `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("edge-cli-find-{}", std::process::id()));
        let nested = root.join("site").join("assets");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".offline.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.join(".offline.toml")));

        // The visible name wins within one directory.
        std::fs::write(root.join("offline.toml"), "").unwrap();
        assert_eq!(find_config(&nested), Some(root.join("offline.toml")));

        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_resolve_path() {
        let cwd = Path::new("/srv/site");
        assert_eq!(resolve_path(cwd, "offline.toml"), cwd.join("offline.toml"));
        assert_eq!(resolve_path(cwd, "/etc/offline.toml"), PathBuf::from("/etc/offline.toml"));
    }
}

//! CLI command implementations.

pub mod check;
pub mod config;
pub mod init;
pub mod manifest;

use clap::{Args, Subcommand};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing offline.toml.
    #[arg(short, long)]
    pub force: bool,

    /// Prompt for prefix, version and scope.
    #[arg(short, long)]
    pub interactive: bool,

    /// Cache name prefix.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Deployment version.
    #[arg(long = "worker-version")]
    pub version: Option<String>,

    /// Origin the worker controls.
    #[arg(long)]
    pub scope: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated, e.g. worker.version).
        key: String,
    },
    /// Validate the config file.
    Validate,
}

/// Arguments for the manifest command.
#[derive(Args)]
pub struct ManifestArgs {
    /// Print only the static asset URLs, one per line.
    #[arg(long)]
    pub urls: bool,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Origin to precache from (default: check.origin, then worker.scope).
    #[arg(short, long)]
    pub origin: Option<String>,

    /// Network timeout in milliseconds (default: worker.network_timeout_ms).
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

//! Edge CLI - Command line tool for the offline edge worker.
//!
//! Commands:
//! - `edge init` - Write a starter offline.toml
//! - `edge config` - Show, query or validate configuration
//! - `edge manifest` - Print generation tags and the precache list
//! - `edge check` - Run the install phase against a live origin

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edge_observability::{init_tracing, LogFormat};

use commands::{CheckArgs, ConfigArgs, InitArgs, ManifestArgs};

/// Edge CLI - Configure and verify the offline edge worker
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter offline.toml
    Init(InitArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Print cache generations and the precache list
    Manifest(ManifestArgs),

    /// Precache from a live origin and report per-asset results
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json { LogFormat::Json } else { LogFormat::Human };
    init_tracing(format, cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
        Commands::Manifest(args) => commands::manifest::run(args, &ctx).await,
        Commands::Check(args) => commands::check::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

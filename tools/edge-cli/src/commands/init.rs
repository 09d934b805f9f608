//! Write a starter offline.toml.

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Input};

use super::InitArgs;
use crate::config::CliConfig;
use crate::context::Context;

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("offline.toml");

    ctx.output.header("Initializing offline worker config");

    if config_path.exists() && !args.force {
        let overwrite = args.interactive
            && Confirm::new()
                .with_prompt(format!("{} exists. Overwrite?", config_path.display()))
                .default(false)
                .interact()?;

        if !overwrite {
            bail!(
                "Config file already exists: {}. Use --force to overwrite.",
                config_path.display()
            );
        }
    }

    let mut config = CliConfig::default();
    if let Some(prefix) = args.prefix {
        config.worker.cache_prefix = prefix;
    }
    if let Some(version) = args.version {
        config.worker.version = version;
    }
    if let Some(scope) = args.scope {
        config.worker.scope = scope;
    }

    if args.interactive {
        config.worker.cache_prefix = Input::new()
            .with_prompt("Cache prefix")
            .default(config.worker.cache_prefix)
            .interact_text()?;
        config.worker.version = Input::new()
            .with_prompt("Version")
            .default(config.worker.version)
            .interact_text()?;
        config.worker.scope = Input::new()
            .with_prompt("Scope (site origin)")
            .default(config.worker.scope)
            .interact_text()?;
    }

    config
        .worker
        .validate()
        .context("Refusing to write an invalid config")?;

    ctx.output.step(1, 2, "Writing offline.toml");
    config.save(&config_path)?;

    ctx.output.step(2, 2, "Done!");
    ctx.output.success(&format!("Created: {}", config_path.display()));
    ctx.output.kv("Static cache", &config.worker.static_cache_name());
    ctx.output.kv("Dynamic cache", &config.worker.dynamic_cache_name());
    ctx.output.info("");
    ctx.output.info("Next steps:");
    ctx.output.list_item("edit static_assets to match the site");
    ctx.output.list_item("edge config validate");
    ctx.output.list_item("edge check --origin https://your-site.example/");

    Ok(())
}

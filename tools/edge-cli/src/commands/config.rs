//! Configuration inspection commands.

use anyhow::{bail, Result};
use edge_core::WorkerConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::config::CliConfig;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Get { key } => get_config(&key, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    let worker = &ctx.config.worker;
    ctx.output.info("");
    ctx.output.info("[worker]");
    ctx.output.kv("cache_prefix", &worker.cache_prefix);
    ctx.output.kv("version", &worker.version);
    ctx.output.kv("scope", &worker.scope);
    ctx.output.kv("static_cache", &worker.static_cache_name());
    ctx.output.kv("dynamic_cache", &worker.dynamic_cache_name());
    ctx.output.kv("offline_document", &worker.offline_document);
    ctx.output.kv("offline_message", &worker.offline_message);
    ctx.output.kv("network_timeout_ms", &worker.network_timeout_ms.to_string());
    ctx.output.kv("await_cache_writes", &worker.await_cache_writes.to_string());
    ctx.output.kv("explain_headers", &worker.explain_headers.to_string());

    ctx.output.info("");
    ctx.output.info("[worker.notifications]");
    ctx.output.kv("site_name", &worker.notifications.site_name);
    ctx.output.kv("default_body", &worker.notifications.default_body);

    ctx.output.info("");
    ctx.output.info(&format!("static_assets ({})", worker.static_assets.len()));
    for asset in &worker.static_assets {
        ctx.output.list_item(asset);
    }

    if let Some(ref origin) = ctx.config.check.origin {
        ctx.output.info("");
        ctx.output.info("[check]");
        ctx.output.kv("origin", origin);
    }

    Ok(())
}

async fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let worker = &ctx.config.worker;
    if let Err(e) = worker.validate() {
        ctx.output.error(&format!("Error: {}", e));
        bail!("Configuration is invalid");
    }

    let warnings = config_warnings(worker);
    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Look up a dot-separated key, derived values included.
fn get_config_value(config: &CliConfig, key: &str) -> Result<serde_json::Value> {
    match key {
        "worker.static_cache" => return Ok(config.worker.static_cache_name().into()),
        "worker.dynamic_cache" => return Ok(config.worker.dynamic_cache_name().into()),
        "worker.worker_version" => return Ok(config.worker.worker_version().into()),
        _ => {}
    }

    let mut value = serde_json::to_value(config)?;
    for part in key.split('.') {
        value = match value {
            serde_json::Value::Object(mut map) => match map.remove(part) {
                Some(inner) => inner,
                None => bail!("Unknown config key: {}", key),
            },
            serde_json::Value::Array(items) => match part.parse::<usize>().ok().and_then(|i| items.into_iter().nth(i)) {
                Some(inner) => inner,
                None => bail!("Unknown config key: {}", key),
            },
            _ => bail!("Unknown config key: {}", key),
        };
    }
    Ok(value)
}

/// Things that validate but are likely mistakes.
fn config_warnings(worker: &WorkerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if worker.static_assets.is_empty() {
        warnings.push("static_assets is empty; nothing is available offline".to_string());
    }

    let root = worker.offline_document_url().ok();
    let root_precached = worker
        .static_asset_urls()
        .map(|urls| root.as_ref().is_some_and(|root| urls.contains(root)))
        .unwrap_or(false);
    if !root_precached {
        warnings.push(format!(
            "offline_document '{}' is not in static_assets; offline navigations get a 503",
            worker.offline_document
        ));
    }

    if worker.network_timeout_ms == 0 {
        warnings.push("network_timeout_ms is 0; a hung request never falls back".to_string());
    }

    if worker.version.split('.').count() != 3 {
        warnings.push("version should follow semver (e.g., 1.0.0)".to_string());
    }

    if worker.explain_headers {
        warnings.push("explain_headers exposes cache keys to the page".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_value() {
        let config = CliConfig::default();
        assert_eq!(
            get_config_value(&config, "worker.version").unwrap(),
            serde_json::json!("1.0.0")
        );
        assert_eq!(
            get_config_value(&config, "worker.static_assets.2").unwrap(),
            serde_json::json!("/styles.css")
        );
        assert_eq!(
            get_config_value(&config, "worker.notifications.site_name").unwrap(),
            serde_json::json!("ApeXNOS Gaming Clan")
        );
        assert_eq!(
            get_config_value(&config, "worker.static_cache").unwrap(),
            serde_json::json!("apexnos-static-v1.0.0")
        );
        assert!(get_config_value(&config, "worker.nope").is_err());
        assert!(get_config_value(&config, "worker.version.major").is_err());
    }

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(config_warnings(&WorkerConfig::default()).is_empty());
    }

    #[test]
    fn test_warnings() {
        let worker = WorkerConfig::default()
            .with_static_assets(["/styles.css"])
            .with_network_timeout(std::time::Duration::ZERO);

        let warnings = config_warnings(&worker);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("offline_document"));
        assert!(warnings[1].contains("network_timeout_ms"));
    }
}

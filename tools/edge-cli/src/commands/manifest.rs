//! Print what a deployment precaches.

use anyhow::Result;
use edge_core::{ResponseType, WorkerConfig};
use serde::Serialize;

use super::ManifestArgs;
use crate::context::Context;

/// Generation tags and resolved precache list.
#[derive(Debug, Serialize)]
struct Manifest {
    version: String,
    static_cache: String,
    dynamic_cache: String,
    scope: String,
    offline_document: String,
    assets: Vec<ManifestAsset>,
}

#[derive(Debug, Serialize)]
struct ManifestAsset {
    url: String,
    same_origin: bool,
}

impl Manifest {
    fn build(config: &WorkerConfig) -> Result<Self> {
        config.validate()?;
        let scope = config.scope_url()?;

        let assets = config
            .static_asset_urls()?
            .into_iter()
            .map(|url| ManifestAsset {
                same_origin: ResponseType::for_origin(&scope, &url) == ResponseType::Basic,
                url: url.to_string(),
            })
            .collect();

        Ok(Self {
            version: config.worker_version(),
            static_cache: config.static_cache_name(),
            dynamic_cache: config.dynamic_cache_name(),
            scope: scope.to_string(),
            offline_document: config.offline_document_url()?.to_string(),
            assets,
        })
    }
}

/// Run the manifest command.
pub async fn run(args: ManifestArgs, ctx: &Context) -> Result<()> {
    let manifest = Manifest::build(&ctx.config.worker)?;

    if ctx.output.is_json() {
        ctx.output.json(&manifest);
        return Ok(());
    }

    if args.urls {
        for asset in &manifest.assets {
            println!("{}", asset.url);
        }
        return Ok(());
    }

    ctx.output.header(&format!("Manifest for {}", manifest.version));
    ctx.output.kv("Scope", &manifest.scope);
    ctx.output.kv("Static cache", &manifest.static_cache);
    ctx.output.kv("Dynamic cache", &manifest.dynamic_cache);
    ctx.output.kv("Offline document", &manifest.offline_document);

    ctx.output.info("");
    ctx.output.info(&format!("Precached assets ({}):", manifest.assets.len()));
    for asset in &manifest.assets {
        let origin = if asset.same_origin { "same-origin" } else { "cross-origin" };
        ctx.output.table_row(&[origin, asset.url.as_str()], &[12, 0]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_default_config() {
        let config = WorkerConfig::default().with_scope("https://apexnos.test/");
        let manifest = Manifest::build(&config).unwrap();

        assert_eq!(manifest.version, "apexnos-v1.0.0");
        assert_eq!(manifest.static_cache, "apexnos-static-v1.0.0");
        assert_eq!(manifest.dynamic_cache, "apexnos-dynamic-v1.0.0");
        assert_eq!(manifest.offline_document, "https://apexnos.test/index.html");
        assert_eq!(manifest.assets.len(), config.static_assets.len());

        assert_eq!(manifest.assets[0].url, "https://apexnos.test/");
        assert!(manifest.assets[0].same_origin);

        let font = manifest.assets.last().unwrap();
        assert!(font.url.starts_with("https://fonts.googleapis.com/"));
        assert!(!font.same_origin);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WorkerConfig::default().with_scope("ftp://apexnos.test/");
        assert!(Manifest::build(&config).is_err());
    }
}

//! Theatre catalog loading.
//!
//! The catalog is a flat list of display names fetched once at startup,
//! either from a local JSON file or an HTTP endpoint serving a JSON array
//! of strings. Any failure (unreachable source, bad payload, empty list)
//! falls back to a single hardcoded entry so the form stays usable.

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Fallback shown when no catalog source is reachable.
pub const DEFAULT_THEATRE: &str = "Sangam Cinemas 4K RGB Laser Dolby Atmos, Chennai";

static FALLBACK: Lazy<Vec<String>> = Lazy::new(|| vec![DEFAULT_THEATRE.to_string()]);

/// Immutable snapshot of the theatre list for this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Theatre display names in source order.
    pub names: Vec<String>,
    /// When the snapshot was loaded.
    pub loaded_at: DateTime<Utc>,
    /// True when the hardcoded fallback was used.
    pub is_fallback: bool,
}

impl Catalog {
    fn new(names: Vec<String>, is_fallback: bool) -> Self {
        Self {
            names,
            loaded_at: Utc::now(),
            is_fallback,
        }
    }

    /// The single-entry fallback catalog.
    pub fn fallback() -> Self {
        Self::new(FALLBACK.clone(), true)
    }
}

/// Thread-safe loader that fetches the catalog once and caches it.
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<RwLock<Inner>>,
    client: reqwest::Client,
}

struct Inner {
    config: AppConfig,
    cache: Option<Catalog>,
}

impl CatalogLoader {
    /// Build a loader from configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                config,
                cache: None,
            })),
            client: reqwest::Client::new(),
        }
    }

    /// Cached catalog, if a fetch has completed.
    pub fn catalog(&self) -> Option<Catalog> {
        self.inner.read().cache.clone()
    }

    /// Fetch the catalog, populating the cache. Never fails: any source
    /// error is logged and the fallback list is returned instead.
    pub async fn fetch(&self) -> Catalog {
        let config = self.inner.read().config.clone();
        let catalog = match self.load_from_sources(&config).await {
            Ok(names) => {
                info!(total = names.len(), "Theatre catalog loaded");
                Catalog::new(names, false)
            }
            Err(err) => {
                warn!("Falling back to default theatre list: {err:#}");
                Catalog::fallback()
            }
        };
        self.inner.write().cache = Some(catalog.clone());
        catalog
    }

    async fn load_from_sources(&self, config: &AppConfig) -> Result<Vec<String>> {
        if let Some(path) = &config.catalog_path {
            return load_file(path);
        }
        if let Some(url) = &config.catalog_url {
            return self.load_url(url).await;
        }
        anyhow::bail!("no catalog source configured")
    }

    async fn load_url(&self, url: &str) -> Result<Vec<String>> {
        let names: Vec<String> = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch catalog from {url}"))?
            .error_for_status()
            .with_context(|| format!("catalog endpoint {url} returned an error"))?
            .json()
            .await
            .with_context(|| format!("failed to parse catalog from {url}"))?;
        validate(names)
    }
}

fn load_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let names: Vec<String> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    validate(names)
}

fn validate(names: Vec<String>) -> Result<Vec<String>> {
    let names: Vec<String> = names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        anyhow::bail!("catalog source yielded no theatres");
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config_with_path(path: PathBuf) -> AppConfig {
        AppConfig {
            catalog_path: Some(path),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn loads_names_from_a_json_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("theatres.json");
        fs::write(&path, r#"["Alpha", " Beta ", ""]"#)?;

        let loader = CatalogLoader::new(config_with_path(path));
        let catalog = loader.fetch().await;
        assert!(!catalog.is_fallback);
        assert_eq!(catalog.names, vec!["Alpha".to_string(), "Beta".to_string()]);
        assert_eq!(loader.catalog().unwrap().names, catalog.names);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_the_default_entry() {
        let loader = CatalogLoader::new(config_with_path(PathBuf::from("/nonexistent.json")));
        let catalog = loader.fetch().await;
        assert!(catalog.is_fallback);
        assert_eq!(catalog.names, vec![DEFAULT_THEATRE.to_string()]);
    }

    #[tokio::test]
    async fn empty_list_falls_back_to_the_default_entry() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("theatres.json");
        fs::write(&path, "[]")?;

        let loader = CatalogLoader::new(config_with_path(path));
        let catalog = loader.fetch().await;
        assert!(catalog.is_fallback);
        Ok(())
    }

    #[tokio::test]
    async fn no_source_configured_falls_back() {
        let loader = CatalogLoader::new(AppConfig::default());
        let catalog = loader.fetch().await;
        assert!(catalog.is_fallback);
    }
}

//! Catalog sources and the shared, load-once catalog handle.

use crate::composio::ComposioCatalog;
use crate::error::{CatalogError, Result};
use crate::types::{CatalogDocument, CatalogTable};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use toolscout_core::CatalogConfig;
use tracing::{info, warn};

/// Something that can produce a catalog table.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the complete catalog.
    async fn fetch(&self) -> Result<CatalogTable>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Catalog read from a JSON document on disk.
pub struct StaticCatalog {
    path: PathBuf,
}

impl StaticCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> Result<CatalogTable> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let document: CatalogDocument = serde_json::from_str(&content)?;
        let table = CatalogTable::from(document);
        info!(
            "Loaded {} catalog tools from {}",
            table.len(),
            self.path.display()
        );
        Ok(table)
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Pick the catalog source described by `config`.
///
/// Returns `Ok(None)` when the catalog is disabled, or when no file is set and
/// no API key is available.
pub fn source_from_config(config: &CatalogConfig) -> Result<Option<Arc<dyn CatalogSource>>> {
    if !config.enabled {
        return Ok(None);
    }
    if let Some(path) = &config.static_path {
        return Ok(Some(Arc::new(StaticCatalog::new(path))));
    }
    match ComposioCatalog::new(config) {
        Ok(catalog) => Ok(Some(Arc::new(catalog))),
        Err(CatalogError::Config(message)) => {
            warn!("External catalog unavailable: {}", message);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Catalog fetched on first use and shared read-only afterwards.
///
/// A failed fetch is not cached; the next call tries again.
pub struct SharedCatalog {
    source: Arc<dyn CatalogSource>,
    table: OnceCell<Arc<CatalogTable>>,
}

impl SharedCatalog {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            table: OnceCell::new(),
        }
    }

    /// Wrap an already loaded table.
    pub fn preloaded(source: Arc<dyn CatalogSource>, table: CatalogTable) -> Self {
        Self {
            source,
            table: OnceCell::new_with(Some(Arc::new(table))),
        }
    }

    pub async fn get(&self) -> Result<Arc<CatalogTable>> {
        self.table
            .get_or_try_init(|| async { self.source.fetch().await.map(Arc::new) })
            .await
            .cloned()
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

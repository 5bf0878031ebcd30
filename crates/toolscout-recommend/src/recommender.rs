//! The ranking backend abstraction.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use toolscout_catalog::CatalogTable;
use toolscout_core::ToolTable;

#[cfg(test)]
use mockall::automock;

/// Whether an existing tool can be adapted to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAssessment {
    pub can_update: bool,
    #[serde(default)]
    pub reasoning: String,
}

/// Backend that ranks tools against a free-text request.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Names from `tools` most relevant to `query`, best first, at most `top_k`.
    async fn rank_tools(&self, query: &str, tools: &ToolTable, top_k: usize) -> Result<Vec<String>>;

    /// Decide whether the tool implemented by `code` can be updated for `query`.
    async fn assess_update(&self, query: &str, code: &str, tool_name: &str) -> Result<UpdateAssessment>;

    /// Slug of the catalog tool most relevant to `query`, if any.
    async fn pick_catalog_tool(&self, query: &str, catalog: &CatalogTable) -> Result<Option<String>>;
}

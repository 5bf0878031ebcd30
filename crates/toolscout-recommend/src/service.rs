//! Recommendation orchestration over the local tool table and the catalog.

use crate::recommender::Recommender;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use toolscout_catalog::{CatalogTable, SharedCatalog};
use toolscout_core::{ToolRecord, ToolTable};
use tracing::{debug, info, warn};

pub const NO_TOOLS_MESSAGE: &str =
    "No tools available. Please scan a directory first using scan_tools_directory.";

/// The best local tool, with its code excerpt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeToolMatch {
    pub tool_name: String,
    pub description: String,
    pub file_path: PathBuf,
    pub class_name: String,
    pub code: String,
}

impl From<&ToolRecord> for CodeToolMatch {
    fn from(record: &ToolRecord) -> Self {
        Self {
            tool_name: record.name.clone(),
            description: record.description.clone(),
            file_path: record.file_path.clone(),
            class_name: record.class_name.clone(),
            code: record.code.clone(),
        }
    }
}

/// The best hosted tool from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogToolMatch {
    pub tool_name: String,
    pub description: String,
    pub toolkit_name: String,
    pub auth_schemes: Vec<String>,
    pub input_parameters: Value,
    pub output_parameters: Value,
}

/// Reply to a recommendation request.
///
/// Absent matches serialize as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_available_tools: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations_requested: Option<usize>,
    #[serde(serialize_with = "object_or_empty")]
    pub tool_from_code: Option<CodeToolMatch>,
    pub tool_create: bool,
    #[serde(serialize_with = "object_or_empty")]
    pub catalog_tool: Option<CatalogToolMatch>,
}

impl RecommendationResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            query: None,
            total_available_tools: None,
            recommendations_requested: None,
            tool_from_code: None,
            tool_create: false,
            catalog_tool: None,
        }
    }
}

fn object_or_empty<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

/// Combines a [`Recommender`] with the tool table and an optional catalog.
pub struct RecommendationService {
    recommender: Arc<dyn Recommender>,
    catalog: Option<Arc<SharedCatalog>>,
}

impl RecommendationService {
    pub fn new(recommender: Arc<dyn Recommender>) -> Self {
        Self {
            recommender,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<SharedCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Recommend tools for `query`.
    ///
    /// Ranking failures yield no local match; assessment failures default to
    /// creating a new tool; catalog failures yield no catalog match.
    pub async fn recommend(&self, tools: &ToolTable, query: &str, top_k: usize) -> RecommendationResponse {
        if tools.is_empty() {
            return RecommendationResponse::failure(NO_TOOLS_MESSAGE);
        }
        let top_k = top_k.max(1);

        info!("Checking query against {} indexed tools: {}", tools.len(), query);
        let ranked = match self.recommender.rank_tools(query, tools, top_k).await {
            Ok(ranked) => ranked,
            Err(e) => {
                warn!("Tool ranking failed: {}", e);
                Vec::new()
            }
        };

        let best = ranked.first().and_then(|name| tools.get(name));
        let mut tool_create = false;
        if let Some(record) = best {
            debug!("Assessing whether '{}' can be updated", record.name);
            tool_create = match self
                .recommender
                .assess_update(query, &record.code, &record.name)
                .await
            {
                Ok(assessment) => !assessment.can_update,
                Err(e) => {
                    warn!("Update assessment failed for '{}': {}", record.name, e);
                    true
                }
            };
        }

        let catalog_tool = self.match_catalog(query).await;

        RecommendationResponse {
            success: true,
            error: None,
            query: Some(query.to_string()),
            total_available_tools: Some(tools.len()),
            recommendations_requested: Some(top_k),
            tool_from_code: best.map(CodeToolMatch::from),
            tool_create,
            catalog_tool,
        }
    }

    async fn match_catalog(&self, query: &str) -> Option<CatalogToolMatch> {
        let shared = self.catalog.as_ref()?;
        let catalog = match shared.get().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Catalog unavailable ({}): {}", shared.source_name(), e);
                return None;
            }
        };
        if catalog.is_empty() {
            return None;
        }

        debug!("Matching query against {} catalog tools", catalog.len());
        match self.recommender.pick_catalog_tool(query, &catalog).await {
            Ok(Some(slug)) => catalog_match(&catalog, &slug),
            Ok(None) => None,
            Err(e) => {
                warn!("Catalog matching failed: {}", e);
                None
            }
        }
    }
}

fn catalog_match(catalog: &CatalogTable, slug: &str) -> Option<CatalogToolMatch> {
    let tool = catalog.tool(slug)?;
    let toolkit = catalog.toolkit_of(tool);

    Some(CatalogToolMatch {
        tool_name: tool.slug.clone(),
        description: tool.description.clone(),
        toolkit_name: toolkit.map(|k| k.name.clone()).unwrap_or_default(),
        auth_schemes: toolkit.map(|k| k.auth_schemes.clone()).unwrap_or_default(),
        input_parameters: tool.input_parameters.clone(),
        output_parameters: tool.output_parameters.clone(),
    })
}

//! Google Gemini backend.

use crate::error::{RecommendError, Result};
use crate::prompts;
use crate::recommender::{Recommender, UpdateAssessment};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolscout_catalog::CatalogTable;
use toolscout_core::{RecommendConfig, ToolTable};
use tracing::{debug, info};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Recommender backed by the Gemini `generateContent` API.
pub struct GeminiRecommender {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GeminiRecommender {
    pub fn new(config: &RecommendConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RecommendError::Config("GEMINI_API_KEY must be set".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(api_key)
                .map_err(|e| RecommendError::Config(format!("Invalid Gemini API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        info!("Initialized Gemini recommender with model: {}", config.model);

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send one prompt and return the reply text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending {} byte prompt to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(self.url())
            .json(&build_request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(RecommendError::Provider(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        extract_text(&body)
    }
}

/// Request body for a single-turn prompt.
pub fn build_request(prompt: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

/// Concatenated text parts of the first candidate.
pub fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| RecommendError::InvalidResponse("no candidates in reply".to_string()))?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(RecommendError::InvalidResponse("empty reply".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn rank_tools(&self, query: &str, tools: &ToolTable, top_k: usize) -> Result<Vec<String>> {
        if tools.is_empty() {
            return Ok(Vec::new());
        }
        let reply = self.generate(&prompts::ranking_prompt(query, tools, top_k)).await?;
        prompts::parse_ranking(&reply, tools, top_k)
    }

    async fn assess_update(&self, query: &str, code: &str, tool_name: &str) -> Result<UpdateAssessment> {
        let reply = self
            .generate(&prompts::update_prompt(query, code, tool_name))
            .await?;
        prompts::parse_update(&reply)
    }

    async fn pick_catalog_tool(&self, query: &str, catalog: &CatalogTable) -> Result<Option<String>> {
        if catalog.is_empty() {
            return Ok(None);
        }
        let reply = self.generate(&prompts::catalog_prompt(query, catalog)).await?;
        prompts::parse_catalog_pick(&reply, catalog)
    }
}

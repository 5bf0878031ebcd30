//! Composio REST catalog.

use crate::error::{CatalogError, Result};
use crate::source::CatalogSource;
use crate::types::{CatalogTable, CatalogTool, Toolkit};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use toolscout_core::CatalogConfig;
use tracing::{debug, info};

const API_KEY_HEADER: &str = "x-api-key";

/// Catalog fetched from the Composio v3 API.
pub struct ComposioCatalog {
    client: Client,
    base_url: String,
    tool_limit: u32,
    toolkit_limit: u32,
}

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct WireTool {
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_parameters: Option<Value>,
    #[serde(default)]
    output_parameters: Option<Value>,
    #[serde(default)]
    toolkit: Option<WireToolkitRef>,
}

#[derive(Deserialize)]
struct WireToolkitRef {
    slug: String,
}

#[derive(Deserialize)]
struct WireToolkit {
    slug: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    auth_schemes: Option<Vec<String>>,
}

impl ComposioCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CatalogError::Config("Composio API key not configured".to_string()))?;

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(api_key)
            .map_err(|e| CatalogError::Config(format!("Invalid Composio API key: {}", e)))?;
        headers.insert(API_KEY_HEADER, value);

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .build()?;

        info!("Initialized Composio catalog at {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tool_limit: config.tool_limit,
            toolkit_limit: config.toolkit_limit,
        })
    }

    pub fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn get_page(&self, resource: &str, limit: u32) -> Result<String> {
        let url = self.endpoint(resource);
        debug!("Fetching {} (limit {})", url, limit);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogSource for ComposioCatalog {
    async fn fetch(&self) -> Result<CatalogTable> {
        let (toolkits, tools) = tokio::try_join!(
            self.get_page("toolkits", self.toolkit_limit),
            self.get_page("tools", self.tool_limit),
        )?;

        let table = CatalogTable::new(parse_tools_page(&tools)?, parse_toolkits_page(&toolkits)?);
        info!(
            "Loaded {} catalog tools across {} toolkits",
            table.len(),
            table.toolkit_count()
        );
        Ok(table)
    }

    fn name(&self) -> &str {
        "composio"
    }
}

/// Decode one `GET /tools` response body.
pub fn parse_tools_page(body: &str) -> Result<Vec<CatalogTool>> {
    let page: Page<WireTool> =
        serde_json::from_str(body).map_err(|e| CatalogError::Format(e.to_string()))?;

    Ok(page
        .items
        .into_iter()
        .map(|item| CatalogTool {
            slug: item.slug,
            description: item.description.unwrap_or_default(),
            input_parameters: item.input_parameters.unwrap_or_else(|| Value::Object(Default::default())),
            output_parameters: item.output_parameters.unwrap_or_else(|| Value::Object(Default::default())),
            toolkit: item.toolkit.map(|t| t.slug).unwrap_or_default(),
        })
        .collect())
}

/// Decode one `GET /toolkits` response body.
pub fn parse_toolkits_page(body: &str) -> Result<Vec<Toolkit>> {
    let page: Page<WireToolkit> =
        serde_json::from_str(body).map_err(|e| CatalogError::Format(e.to_string()))?;

    Ok(page
        .items
        .into_iter()
        .map(|item| Toolkit {
            slug: item.slug,
            name: item.name.unwrap_or_default(),
            auth_schemes: item.auth_schemes.unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tools_page() {
        let body = r#"{
            "items": [
                {
                    "slug": "GITHUB_CREATE_ISSUE",
                    "name": "Create issue",
                    "description": "Open a GitHub issue",
                    "input_parameters": {"type": "object", "properties": {"title": {"type": "string"}}},
                    "output_parameters": {"type": "object"},
                    "toolkit": {"slug": "github", "name": "GitHub"}
                },
                {"slug": "BARE"}
            ],
            "next_cursor": null
        }"#;

        let tools = parse_tools_page(body).unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].toolkit, "github");
        assert_eq!(tools[0].input_parameters["properties"]["title"]["type"], "string");
        assert_eq!(tools[1].description, "");
        assert_eq!(tools[1].toolkit, "");
    }

    #[test]
    fn test_parse_toolkits_page() {
        let body = r#"{"items": [{"slug": "github", "name": "GitHub", "auth_schemes": ["OAUTH2", "API_KEY"]}]}"#;
        let toolkits = parse_toolkits_page(body).unwrap();
        assert_eq!(toolkits[0].auth_schemes, vec!["OAUTH2", "API_KEY"]);
    }

    #[test]
    fn test_malformed_page() {
        assert!(matches!(
            parse_tools_page("{\"items\": 3}"),
            Err(CatalogError::Format(_))
        ));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = CatalogConfig::default();
        assert!(matches!(
            ComposioCatalog::new(&config),
            Err(CatalogError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = CatalogConfig {
            api_key: Some("key".into()),
            base_url: "https://example.test/api/v3/".into(),
            ..CatalogConfig::default()
        };
        let catalog = ComposioCatalog::new(&config).unwrap();
        assert_eq!(catalog.endpoint("tools"), "https://example.test/api/v3/tools");
    }
}

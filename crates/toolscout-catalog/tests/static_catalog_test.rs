//! Integration tests for file-backed catalogs.

use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use toolscout_catalog::{CatalogError, CatalogSource, SharedCatalog, StaticCatalog};

fn catalog_json() -> serde_json::Value {
    json!({
        "toolkits": [
            {"slug": "slack", "name": "Slack", "auth_schemes": ["OAUTH2"]},
            {"slug": "github", "name": "GitHub", "auth_schemes": ["OAUTH2", "API_KEY"]}
        ],
        "tools": [
            {
                "slug": "SLACK_POST_MESSAGE",
                "description": "Post a message to a channel",
                "input_parameters": {"type": "object", "required": ["channel", "text"]},
                "output_parameters": {"type": "object"},
                "toolkit": "slack"
            },
            {
                "slug": "GITHUB_STAR_REPO",
                "description": "Star a repository",
                "toolkit": "github"
            }
        ]
    })
}

#[tokio::test]
async fn test_static_catalog_loads_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.json");
    std::fs::write(&path, catalog_json().to_string()).unwrap();

    let table = StaticCatalog::new(&path).fetch().await.unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.toolkit_count(), 2);

    let tool = table.tool("SLACK_POST_MESSAGE").unwrap();
    assert_eq!(tool.input_parameters["required"][1], "text");
    assert_eq!(table.toolkit_of(tool).unwrap().auth_schemes, vec!["OAUTH2"]);

    let star = table.tool("GITHUB_STAR_REPO").unwrap();
    assert_eq!(star.output_parameters, json!({}));
}

#[tokio::test]
async fn test_static_catalog_errors() {
    let temp = TempDir::new().unwrap();

    let missing = StaticCatalog::new(temp.path().join("missing.json"));
    assert!(matches!(missing.fetch().await, Err(CatalogError::Io(_))));

    let broken_path = temp.path().join("broken.json");
    std::fs::write(&broken_path, "{ not json").unwrap();
    let broken = StaticCatalog::new(&broken_path);
    assert!(matches!(broken.fetch().await, Err(CatalogError::Json(_))));
}

#[tokio::test]
async fn test_shared_catalog_over_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.json");
    std::fs::write(&path, catalog_json().to_string()).unwrap();

    let shared = SharedCatalog::new(Arc::new(StaticCatalog::new(&path)));
    let first = shared.get().await.unwrap();

    // Later edits are not observed: the catalog is loaded once.
    std::fs::write(&path, json!({"tools": []}).to_string()).unwrap();
    let second = shared.get().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 2);
    assert_eq!(shared.source_name(), "static");
}

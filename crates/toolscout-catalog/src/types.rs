//! Read-only catalog of externally hosted tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A hosted tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTool {
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object")]
    pub input_parameters: Value,
    #[serde(default = "empty_object")]
    pub output_parameters: Value,
    /// Slug of the owning toolkit
    #[serde(default)]
    pub toolkit: String,
}

/// A group of hosted tools sharing authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolkit {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub auth_schemes: Vec<String>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Tools and toolkits keyed by slug. Built once, then only read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTable {
    tools: BTreeMap<String, CatalogTool>,
    toolkits: BTreeMap<String, Toolkit>,
}

/// Serialized form, shared by static catalog files.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub toolkits: Vec<Toolkit>,
    #[serde(default)]
    pub tools: Vec<CatalogTool>,
}

impl CatalogTable {
    pub fn new(
        tools: impl IntoIterator<Item = CatalogTool>,
        toolkits: impl IntoIterator<Item = Toolkit>,
    ) -> Self {
        Self {
            tools: tools.into_iter().map(|t| (t.slug.clone(), t)).collect(),
            toolkits: toolkits.into_iter().map(|k| (k.slug.clone(), k)).collect(),
        }
    }

    pub fn tool(&self, slug: &str) -> Option<&CatalogTool> {
        self.tools.get(slug)
    }

    pub fn toolkit(&self, slug: &str) -> Option<&Toolkit> {
        self.toolkits.get(slug)
    }

    /// Toolkit owning `tool`, if it is known.
    pub fn toolkit_of(&self, tool: &CatalogTool) -> Option<&Toolkit> {
        self.toolkits.get(&tool.toolkit)
    }

    pub fn tools(&self) -> impl Iterator<Item = &CatalogTool> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn toolkit_count(&self) -> usize {
        self.toolkits.len()
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            toolkits: self.toolkits.values().cloned().collect(),
            tools: self.tools.values().cloned().collect(),
        }
    }
}

impl From<CatalogDocument> for CatalogTable {
    fn from(doc: CatalogDocument) -> Self {
        Self::new(doc.tools, doc.toolkits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_by_slug() {
        let table = CatalogTable::new(
            vec![CatalogTool {
                slug: "GMAIL_SEND_EMAIL".into(),
                description: "Send an email".into(),
                input_parameters: json!({"type": "object"}),
                output_parameters: json!({}),
                toolkit: "gmail".into(),
            }],
            vec![Toolkit {
                slug: "gmail".into(),
                name: "Gmail".into(),
                auth_schemes: vec!["OAUTH2".into()],
            }],
        );

        let tool = table.tool("GMAIL_SEND_EMAIL").unwrap();
        assert_eq!(table.toolkit_of(tool).unwrap().name, "Gmail");
        assert_eq!(table.len(), 1);
        assert_eq!(table.toolkit_count(), 1);
        assert!(table.tool("missing").is_none());
    }

    #[test]
    fn test_document_defaults() {
        let doc: CatalogDocument =
            serde_json::from_value(json!({"tools": [{"slug": "X"}]})).unwrap();
        let table = CatalogTable::from(doc);

        let tool = table.tool("X").unwrap();
        assert_eq!(tool.description, "");
        assert_eq!(tool.input_parameters, json!({}));
        assert!(table.toolkit_of(tool).is_none());
    }
}

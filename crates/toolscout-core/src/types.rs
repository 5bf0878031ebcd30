//! Tool table types produced by a directory scan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A discovered tool: literal metadata plus its self-contained code excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Literal returned by `get_name`; unique key in the table
    pub name: String,
    /// Literal returned by `get_description`, empty if none
    pub description: String,
    /// File the tool was found in
    pub file_path: PathBuf,
    /// Name of the declaring class
    pub class_name: String,
    /// Name returned by `get_input_schema`, if it returns a name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<String>,
    /// Name returned by `get_output_schema`, if it returns a name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<String>,
    /// Imports, the class itself, and every declaration it directly references
    pub code: String,
}

impl ToolRecord {
    /// Lightweight view without the code excerpt.
    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
        }
    }
}

/// Listing entry exposed to transports that do not need code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<String>,
}

/// Immutable snapshot mapping tool name to its record.
///
/// A table is built in one go from an ordered sequence of records; when two
/// records share a name the later one wins. Iteration is in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolTable {
    tools: BTreeMap<String, ToolRecord>,
}

impl ToolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records in traversal order (last write wins).
    pub fn from_records(records: impl IntoIterator<Item = ToolRecord>) -> Self {
        let mut tools = BTreeMap::new();
        for record in records {
            tools.insert(record.name.clone(), record);
        }
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolRecord> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Iterate over records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolRecord> {
        self.tools.values()
    }

    /// Tool names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Lightweight listing without code excerpts.
    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.tools.values().map(ToolRecord::summary).collect()
    }
}

impl FromIterator<ToolRecord> for ToolTable {
    fn from_iter<I: IntoIterator<Item = ToolRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl<'a> IntoIterator for &'a ToolTable {
    type Item = &'a ToolRecord;
    type IntoIter = std::collections::btree_map::Values<'a, String, ToolRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.values()
    }
}

//! Prompt construction and lenient parsing of model replies.
//!
//! Models are asked for bare JSON but often wrap it in a Markdown fence, so
//! every reply goes through [`strip_code_fences`] before decoding.

use crate::error::{RecommendError, Result};
use crate::recommender::UpdateAssessment;
use serde::Deserialize;
use toolscout_catalog::CatalogTable;
use toolscout_core::ToolTable;

/// One `- name: description` line per tool. Code is never sent.
pub fn format_tools(tools: &ToolTable) -> String {
    tools
        .iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same listing for catalog tools, keyed by slug.
pub fn format_catalog(catalog: &CatalogTable) -> String {
    catalog
        .tools()
        .map(|tool| format!("- {}: {}", tool.slug, tool.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn ranking_prompt(query: &str, tools: &ToolTable, top_k: usize) -> String {
    format!(
        r#"You are a tool recommendation system. Given a user's request description and a list of available tools,
return the top {top_k} most relevant tools.

User Request: "{query}"

Available Tools:
{tools}

Please analyze the user's request and return the most relevant tools in the following JSON format:
{{
    "recommendations": [
        {{
            "tool_name": "exact_tool_name_from_list",
            "reasoning": "Brief explanation of why this tool is relevant"
        }}
    ]
}}

Only return the JSON response, no additional text."#,
        tools = format_tools(tools)
    )
}

pub fn update_prompt(query: &str, code: &str, tool_name: &str) -> String {
    format!(
        r#"You are reviewing an existing tool implementation. Decide whether the tool "{tool_name}"
can be updated to satisfy the user's request, or whether a new tool should be written instead.

User Request: "{query}"

Existing tool code:
```python
{code}
```

Return your decision in the following JSON format:
{{
    "can_update": true,
    "reasoning": "Brief explanation of the decision"
}}

Only return the JSON response, no additional text."#
    )
}

pub fn catalog_prompt(query: &str, catalog: &CatalogTable) -> String {
    format!(
        r#"You are matching a user's request against a registry of hosted integration tools.
Pick the single most relevant tool, or null if none of them applies.

User Request: "{query}"

Available Tools:
{tools}

Return the result in the following JSON format:
{{
    "tool_name": "EXACT_TOOL_SLUG_FROM_LIST",
    "reasoning": "Brief explanation of why this tool is relevant"
}}

Only return the JSON response, no additional text."#,
        tools = format_catalog(catalog)
    )
}

/// Remove a surrounding ```` ```json ```` or ```` ``` ```` fence, if present.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Deserialize)]
struct RankingReply {
    #[serde(default)]
    recommendations: Vec<RankedTool>,
}

#[derive(Deserialize)]
struct RankedTool {
    #[serde(default)]
    tool_name: Option<String>,
}

#[derive(Deserialize)]
struct CatalogReply {
    #[serde(default)]
    tool_name: Option<String>,
}

/// Tool names from a ranking reply: at most `top_k`, only names in `tools`.
pub fn parse_ranking(reply: &str, tools: &ToolTable, top_k: usize) -> Result<Vec<String>> {
    let parsed: RankingReply = serde_json::from_str(strip_code_fences(reply))?;

    let mut names: Vec<String> = Vec::new();
    for name in parsed
        .recommendations
        .into_iter()
        .take(top_k)
        .filter_map(|r| r.tool_name)
    {
        if tools.contains(&name) && !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

pub fn parse_update(reply: &str) -> Result<UpdateAssessment> {
    serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| RecommendError::InvalidResponse(format!("update assessment: {}", e)))
}

/// Catalog slug from a reply, if it names a known tool.
pub fn parse_catalog_pick(reply: &str, catalog: &CatalogTable) -> Result<Option<String>> {
    let parsed: CatalogReply = serde_json::from_str(strip_code_fences(reply))?;
    Ok(parsed
        .tool_name
        .filter(|slug| catalog.tool(slug).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use toolscout_catalog::{CatalogTool, Toolkit};
    use toolscout_core::ToolRecord;

    fn table(names: &[&str]) -> ToolTable {
        names
            .iter()
            .map(|name| ToolRecord {
                name: name.to_string(),
                description: format!("{} tool", name),
                file_path: PathBuf::from("tools.py"),
                class_name: "T".into(),
                input_schema: None,
                output_schema: None,
                code: "class T: ...".into(),
            })
            .collect()
    }

    #[test]
    fn test_format_tools_omits_code() {
        let listing = format_tools(&table(&["b", "a"]));
        assert_eq!(listing, "- a: a tool\n- b: b tool");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_ranking_filters_and_caps() {
        let tools = table(&["weather", "search"]);
        let reply = r#"```json
{"recommendations": [
    {"tool_name": "ghost", "reasoning": "made up"},
    {"tool_name": "weather", "reasoning": "asks about rain"},
    {"tool_name": "search", "reasoning": "fallback"}
]}
```"#;
        assert_eq!(parse_ranking(reply, &tools, 2).unwrap(), vec!["weather"]);
        assert_eq!(
            parse_ranking(reply, &tools, 5).unwrap(),
            vec!["weather", "search"]
        );
        assert!(parse_ranking("not json", &tools, 1).is_err());
    }

    #[test]
    fn test_parse_update() {
        let assessment = parse_update("{\"can_update\": true, \"reasoning\": \"small change\"}").unwrap();
        assert!(assessment.can_update);
        assert_eq!(assessment.reasoning, "small change");
        assert!(parse_update("{}").is_err());
    }

    #[test]
    fn test_parse_catalog_pick() {
        let catalog = CatalogTable::new(
            vec![CatalogTool {
                slug: "SLACK_POST_MESSAGE".into(),
                description: "Post".into(),
                input_parameters: serde_json::json!({}),
                output_parameters: serde_json::json!({}),
                toolkit: "slack".into(),
            }],
            Vec::<Toolkit>::new(),
        );
        assert_eq!(
            parse_catalog_pick("{\"tool_name\": \"SLACK_POST_MESSAGE\"}", &catalog).unwrap(),
            Some("SLACK_POST_MESSAGE".to_string())
        );
        assert_eq!(parse_catalog_pick("{\"tool_name\": null}", &catalog).unwrap(), None);
        assert_eq!(parse_catalog_pick("{\"tool_name\": \"OTHER\"}", &catalog).unwrap(), None);
    }

    #[test]
    fn test_prompts_mention_query() {
        let tools = table(&["weather"]);
        let prompt = ranking_prompt("will it rain", &tools, 3);
        assert!(prompt.contains("top 3 most relevant"));
        assert!(prompt.contains("\"will it rain\""));
        assert!(prompt.contains("- weather: weather tool"));
        assert!(!prompt.contains("class T"));

        let prompt = update_prompt("add units", "class W: ...", "weather");
        assert!(prompt.contains("class W: ..."));
        assert!(prompt.contains("\"weather\""));
    }
}

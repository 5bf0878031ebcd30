//! Tool classification and literal metadata extraction.

use crate::declaration::{Declaration, DeclarationKind};
use crate::extractor::{strip_parens, walk_preorder, NodeExtractor};
use crate::literal::string_value;
use tree_sitter::Node;

/// Methods a class must declare directly to be considered a tool.
pub const REQUIRED_METHODS: [&str; 3] = ["get_name", "get_description", "execute"];

/// Literal metadata extracted from a qualifying class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub input_schema: Option<String>,
    pub output_schema: Option<String>,
}

/// Why a declaration produced no tool. Expected and frequent; never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationSkip {
    NotAClass,
    MissingMethods(Vec<&'static str>),
    NoLiteralName,
}

/// Decide whether `decl` is a tool and, if so, extract its metadata.
pub fn classify(decl: &Declaration<'_>, source: &str) -> Result<ToolMetadata, ClassificationSkip> {
    if decl.kind != DeclarationKind::Class {
        return Err(ClassificationSkip::NotAClass);
    }

    let missing: Vec<&'static str> = REQUIRED_METHODS
        .iter()
        .copied()
        .filter(|required| decl.method(required).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ClassificationSkip::MissingMethods(missing));
    }

    let literal_return = |method: &str| {
        decl.method(method)
            .and_then(|m| first_literal_return(m.node, source))
    };

    let name = literal_return("get_name")
        .filter(|name| !name.is_empty())
        .ok_or(ClassificationSkip::NoLiteralName)?;
    let description = literal_return("get_description").unwrap_or_default();

    let schema_ref = |method: &str| {
        decl.method(method)
            .and_then(|m| first_return_value(m.node))
            .and_then(|value| schema_name(value, source))
    };

    Ok(ToolMetadata {
        name,
        description,
        input_schema: schema_ref("get_input_schema"),
        output_schema: schema_ref("get_output_schema"),
    })
}

/// Value of the first `return <str literal>` in depth-first order.
fn first_literal_return(function: Node<'_>, source: &str) -> Option<String> {
    let body = function.child_by_field_name("body")?;
    let mut found = None;
    walk_preorder(body, |node, _| {
        if found.is_some() {
            return false;
        }
        if node.kind() == "return_statement" {
            found = node
                .value_child()
                .and_then(|value| string_value(value, source));
            return false;
        }
        true
    });
    found
}

/// Expression of the first `return` that carries a value.
fn first_return_value(function: Node<'_>) -> Option<Node<'_>> {
    let body = function.child_by_field_name("body")?;
    let mut found = None;
    walk_preorder(body, |node, _| {
        if found.is_some() {
            return false;
        }
        if node.kind() == "return_statement" {
            found = node.value_child();
            return false;
        }
        true
    });
    found
}

fn schema_name(value: Node<'_>, source: &str) -> Option<String> {
    let value = strip_parens(value);
    match value.kind() {
        "identifier" => Some(value.text(source).to_string()),
        "attribute" => value
            .child_text(source, "attribute")
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ParsedModule;
    use crate::tree_sitter_wrapper::PythonParser;

    fn classify_first(source: &str) -> Result<ToolMetadata, ClassificationSkip> {
        let tree = PythonParser::new().unwrap().parse(source).unwrap();
        let module = ParsedModule::from_tree(&tree, source);
        let (_, class) = module.classes().next().unwrap();
        classify(class, source)
    }

    #[test]
    fn test_literal_tool() {
        let source = r#"
class Weather:
    def get_name(self):
        return "weather"

    def get_description(self):
        return ("Current weather "
                "for a city")

    def get_input_schema(self):
        return WeatherInput

    def get_output_schema(self):
        return schemas.WeatherOutput

    def execute(self, city):
        return city
"#;
        let meta = classify_first(source).unwrap();
        assert_eq!(meta.name, "weather");
        assert_eq!(meta.description, "Current weather for a city");
        assert_eq!(meta.input_schema.as_deref(), Some("WeatherInput"));
        assert_eq!(meta.output_schema.as_deref(), Some("WeatherOutput"));
    }

    #[test]
    fn test_missing_methods_reported() {
        let source = r#"
class Half:
    def get_name(self):
        return "half"
"#;
        assert_eq!(
            classify_first(source),
            Err(ClassificationSkip::MissingMethods(vec![
                "get_description",
                "execute"
            ]))
        );
    }

    #[test]
    fn test_computed_name_rejected() {
        let source = r#"
class Computed:
    def get_name(self):
        return "tool_" + self.suffix

    def get_description(self):
        return "d"

    def execute(self):
        pass
"#;
        assert_eq!(classify_first(source), Err(ClassificationSkip::NoLiteralName));
    }

    #[test]
    fn test_empty_name_rejected() {
        let source = r#"
class Blank:
    def get_name(self):
        return ""

    def get_description(self):
        return "d"

    def execute(self):
        pass
"#;
        assert_eq!(classify_first(source), Err(ClassificationSkip::NoLiteralName));
    }

    #[test]
    fn test_async_execute_is_not_a_method() {
        let source = r#"
class Pending:
    def get_name(self):
        return "pending"

    def get_description(self):
        return "d"

    async def execute(self):
        pass
"#;
        assert_eq!(
            classify_first(source),
            Err(ClassificationSkip::MissingMethods(vec!["execute"]))
        );
    }

    #[test]
    fn test_first_literal_return_skips_computed_branch() {
        let source = r#"
class Branchy:
    def get_name(self):
        if self.legacy:
            return self.legacy_name
        return "branchy"

    def get_description(self):
        return f"formatted {self}"

    def execute(self):
        pass
"#;
        let meta = classify_first(source).unwrap();
        assert_eq!(meta.name, "branchy");
        assert_eq!(meta.description, "");
    }

    #[test]
    fn test_schema_from_call_is_absent() {
        let source = r#"
class Tool:
    def get_name(self):
        return "t"

    def get_description(self):
        return "d"

    def get_input_schema(self):
        return build_schema()

    def execute(self):
        pass
"#;
        let meta = classify_first(source).unwrap();
        assert_eq!(meta.input_schema, None);
        assert_eq!(meta.output_schema, None);
    }
}

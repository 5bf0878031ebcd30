//! Tree-sitter wrapper for parsing Python source.

use tree_sitter::{Node, Parser, Tree};

/// Python parser backed by tree-sitter.
///
/// Unlike a plain tree-sitter parse, a tree containing error recovery nodes is
/// treated as a failure: a file that would not compile contributes nothing.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    /// Create a new parser.
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| format!("Failed to set parser language: {}", e))?;

        Ok(Self { parser })
    }

    /// Parse source code and return the syntax tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, String> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| "Parser produced no tree".to_string())?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(match first_error(root) {
                Some(node) => format!(
                    "syntax error at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "syntax error".to_string(),
            });
        }

        Ok(tree)
    }
}

/// Locate the first ERROR or MISSING node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    let mut children = Vec::new();

    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        children.extend(node.children(&mut cursor));
        stack.extend(children.drain(..).rev());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_parser_creation() {
        assert!(PythonParser::new().is_ok());
    }

    #[test]
    fn test_parse_simple_python() {
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse("def main():\n    return 1\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let mut parser = PythonParser::new().unwrap();
        let err = parser.parse("def broken(:\n    pass\n").unwrap_err();
        assert!(err.contains("syntax error"), "unexpected message: {}", err);
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = PythonParser::new().unwrap();
        assert!(parser.parse("class A:\n    pass\n").is_ok());
        assert!(parser.parse("x = (\n").is_err());
        assert!(parser.parse("import os\n").is_ok());
    }
}

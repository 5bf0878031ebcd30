//! Common node extraction helpers.

use tree_sitter::{Node, Point};

/// Trait for extracting information from tree-sitter nodes.
pub trait NodeExtractor<'tree> {
    /// Get the text content of a node.
    fn text<'s>(&self, source: &'s str) -> &'s str;

    /// Get the text of a named child.
    fn child_text<'s>(&self, source: &'s str, field_name: &str) -> Option<&'s str>;

    /// First named child that is not a comment.
    fn value_child(&self) -> Option<Node<'tree>>;

    /// Half-open, 0-based line range `[start, end)` covered by the node.
    fn line_span(&self) -> (usize, usize);
}

impl<'tree> NodeExtractor<'tree> for Node<'tree> {
    fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start_byte()..self.end_byte()]
    }

    fn child_text<'s>(&self, source: &'s str, field_name: &str) -> Option<&'s str> {
        self.child_by_field_name(field_name)
            .map(|node| node.text(source))
    }

    fn value_child(&self) -> Option<Node<'tree>> {
        let mut cursor = self.walk();
        self.named_children(&mut cursor)
            .find(|child| child.kind() != "comment")
    }

    fn line_span(&self) -> (usize, usize) {
        let start = self.start_position().row;
        let end = content_end(*self);
        // An end at column 0 means the node stops right after a newline.
        let end_line = if end.column == 0 && end.row > start {
            end.row
        } else {
            end.row + 1
        };
        (start, end_line)
    }
}

/// End of the last non-comment token under `node`.
///
/// tree-sitter-python attaches comments that trail a block to the block
/// itself; those lines do not belong to the declaration.
fn content_end(node: Node<'_>) -> Point {
    let mut current = node;
    loop {
        let count = current.child_count();
        let last = (0..count)
            .rev()
            .filter_map(|i| current.child(i as _))
            .find(|child| child.kind() != "comment");
        match last {
            Some(child) => current = child,
            None => return current.end_position(),
        }
    }
}

/// Unwrap any number of enclosing parentheses.
pub fn strip_parens(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match current.value_child() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Depth-first pre-order visit of every node under `root`, including `root`.
///
/// The callback returns `false` to skip a node's subtree.
pub fn walk_preorder<'tree, F>(root: Node<'tree>, mut visit: F)
where
    F: FnMut(Node<'tree>, Option<&'static str>) -> bool,
{
    let mut cursor = root.walk();
    let mut stack = vec![(root, None)];
    let mut children = Vec::new();

    while let Some((node, field)) = stack.pop() {
        if !visit(node, field) {
            continue;
        }
        cursor.reset(node);
        if cursor.goto_first_child() {
            loop {
                children.push((cursor.node(), cursor.field_name()));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            stack.extend(children.drain(..).rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_sitter_wrapper::PythonParser;

    fn first_of_kind<'t>(root: Node<'t>, kind: &str) -> Option<Node<'t>> {
        let mut found = None;
        walk_preorder(root, |node, _| {
            if found.is_none() && node.kind() == kind {
                found = Some(node);
            }
            found.is_none()
        });
        found
    }

    #[test]
    fn test_line_span_of_class() {
        let source = "import os\n\nclass A:\n    x = 1\n    y = 2\n\nz = 3\n";
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse(source).unwrap();

        let class = first_of_kind(tree.root_node(), "class_definition").unwrap();
        assert_eq!(class.line_span(), (2, 5));
        assert_eq!(class.child_text(source, "name"), Some("A"));
    }

    #[test]
    fn test_line_span_ignores_trailing_comment() {
        let source = "class A:\n    x = 1\n    # trailing note\n\nz = 3\n";
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse(source).unwrap();

        let class = first_of_kind(tree.root_node(), "class_definition").unwrap();
        assert_eq!(class.line_span(), (0, 2));
    }

    #[test]
    fn test_strip_parens() {
        let source = "v = ((name))\n";
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse(source).unwrap();

        let paren = first_of_kind(tree.root_node(), "parenthesized_expression").unwrap();
        let inner = strip_parens(paren);
        assert_eq!(inner.kind(), "identifier");
        assert_eq!(inner.text(source), "name");
    }

    #[test]
    fn test_walk_preorder_reports_fields() {
        let source = "obj.attr\n";
        let mut parser = PythonParser::new().unwrap();
        let tree = parser.parse(source).unwrap();

        let mut seen = Vec::new();
        walk_preorder(tree.root_node(), |node, field| {
            if node.kind() == "identifier" {
                seen.push((node.text(source).to_string(), field));
            }
            true
        });

        assert_eq!(
            seen,
            vec![
                ("obj".to_string(), Some("object")),
                ("attr".to_string(), Some("attribute")),
            ]
        );
    }
}

//! Identifier references used by a declaration.

use crate::extractor::{walk_preorder, NodeExtractor};
use std::collections::HashSet;
use tree_sitter::Node;

/// Names mentioned in expression position anywhere under a declaration.
///
/// Flat by construction: no scoping, no read/write distinction. Attribute
/// accesses contribute both the object's names and the trailing attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet<'a> {
    names: HashSet<&'a str>,
}

impl<'a> ReferenceSet<'a> {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// True if any of `names` is referenced.
    pub fn mentions_any<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> bool {
        names.into_iter().any(|name| self.contains(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.names.iter().copied()
    }
}

/// Collect the references under `node`.
pub fn collect_references<'a>(node: Node<'a>, source: &'a str) -> ReferenceSet<'a> {
    let mut names = HashSet::new();
    collect_into(node, source, &mut names);
    ReferenceSet { names }
}

/// Collect the references of a class or function definition, including its
/// decorators. Decorators hang off the enclosing `decorated_definition`.
pub fn collect_definition_references<'a>(node: Node<'a>, source: &'a str) -> ReferenceSet<'a> {
    let mut names = HashSet::new();
    collect_into(node, source, &mut names);
    if let Some(parent) = node.parent().filter(|p| p.kind() == "decorated_definition") {
        let mut cursor = parent.walk();
        for decorator in parent
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
        {
            collect_into(decorator, source, &mut names);
        }
    }
    ReferenceSet { names }
}

fn collect_into<'a>(root: Node<'a>, source: &'a str, names: &mut HashSet<&'a str>) {
    walk_preorder(root, |node, field| match node.kind() {
        "identifier" => {
            // `name` fields hold definition, keyword-argument and default-parameter names.
            if field != Some("name") {
                names.insert(node.text(source));
            }
            false
        }
        "import_statement" | "import_from_statement" | "future_import_statement"
        | "global_statement" | "nonlocal_statement" => false,
        "parameters" | "lambda_parameters" => {
            let mut cursor = node.walk();
            for parameter in node.named_children(&mut cursor) {
                collect_parameter(parameter, source, names);
            }
            false
        }
        _ => true,
    });
}

/// Annotations and default values of a parameter are references; its name is not.
fn collect_parameter<'a>(parameter: Node<'a>, source: &'a str, names: &mut HashSet<&'a str>) {
    match parameter.kind() {
        "default_parameter" | "typed_default_parameter" => {
            for field in ["type", "value"] {
                if let Some(child) = parameter.child_by_field_name(field) {
                    collect_into(child, source, names);
                }
            }
        }
        "typed_parameter" => {
            if let Some(annotation) = parameter.child_by_field_name("type") {
                collect_into(annotation, source, names);
            }
        }
        _ => {}
    }
}

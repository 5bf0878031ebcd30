//! Declaration discovery over a parsed Python module.
//!
//! Every import, class, function and plain assignment is recorded, at any
//! nesting depth, in depth-first pre-order. Each declaration keeps a handle to
//! its syntax node so later passes can walk its subtree without reparsing.

use crate::extractor::{walk_preorder, NodeExtractor};
use serde::Serialize;
use tree_sitter::{Node, Tree};

/// Kind of a recorded declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Import,
    Class,
    Function,
    Assignment,
}

/// Whether a declaration sits inside a class or function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Module,
    Nested,
}

/// A method declared directly in a class body.
#[derive(Debug, Clone, Copy)]
pub struct Method<'a> {
    pub name: &'a str,
    pub node: Node<'a>,
}

/// One declaration with its half-open, 0-based line span.
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
    pub kind: DeclarationKind,
    /// Bound names. Assignments may bind several; imports bind their alias or
    /// top-level module name, `*` for wildcard imports.
    pub names: Vec<&'a str>,
    pub scope: Scope,
    pub start_line: usize,
    pub end_line: usize,
    /// Source lines `[start_line, end_line)` joined by their original newlines.
    pub raw_text: &'a str,
    /// Directly declared methods, in source order. Empty unless `kind` is `Class`.
    pub methods: Vec<Method<'a>>,
    pub node: Node<'a>,
}

impl<'a> Declaration<'a> {
    /// The primary name, if the declaration binds any.
    pub fn name(&self) -> Option<&'a str> {
        self.names.first().copied()
    }

    pub fn binds(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.methods.iter().map(|m| m.name)
    }

    /// The last method declared under `name`; later definitions shadow earlier ones.
    pub fn method(&self, name: &str) -> Option<&Method<'a>> {
        self.methods.iter().rev().find(|m| m.name == name)
    }
}

/// A source file together with its declarations.
#[derive(Debug)]
pub struct ParsedModule<'a> {
    source: &'a str,
    declarations: Vec<Declaration<'a>>,
}

impl<'a> ParsedModule<'a> {
    /// Collect declarations from a tree parsed out of `source`.
    pub fn from_tree(tree: &'a Tree, source: &'a str) -> Self {
        let lines = LineIndex::new(source);
        let mut declarations = Vec::new();

        walk_preorder(tree.root_node(), |node, _| {
            let kind = match node.kind() {
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    DeclarationKind::Import
                }
                "class_definition" => DeclarationKind::Class,
                "function_definition" => DeclarationKind::Function,
                "expression_statement" if assignment_of(node).is_some() => {
                    DeclarationKind::Assignment
                }
                _ => return true,
            };

            let names = match kind {
                DeclarationKind::Import => import_names(node, source),
                DeclarationKind::Class | DeclarationKind::Function => {
                    node.child_text(source, "name").into_iter().collect()
                }
                DeclarationKind::Assignment => assignment_of(node)
                    .map(|assignment| assignment_targets(assignment, source))
                    .unwrap_or_default(),
            };
            let methods = if kind == DeclarationKind::Class {
                class_methods(node, source)
            } else {
                Vec::new()
            };
            let (start_line, end_line) = node.line_span();

            declarations.push(Declaration {
                kind,
                names,
                scope: scope_of(node),
                start_line,
                end_line,
                raw_text: lines.slice(source, start_line, end_line),
                methods,
                node,
            });

            // Nothing below an import is a declaration.
            kind != DeclarationKind::Import
        });

        Self {
            source,
            declarations,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn declarations(&self) -> &[Declaration<'a>] {
        &self.declarations
    }

    pub fn get(&self, index: usize) -> Option<&Declaration<'a>> {
        self.declarations.get(index)
    }

    /// Class declarations with their discovery index.
    pub fn classes(&self) -> impl Iterator<Item = (usize, &Declaration<'a>)> + '_ {
        self.declarations
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.kind == DeclarationKind::Class)
    }
}

/// Byte offsets of line starts, for slicing whole lines out of the source.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    fn slice<'s>(&self, source: &'s str, start: usize, end: usize) -> &'s str {
        let from = self.starts.get(start).copied().unwrap_or(source.len());
        // Stop before the newline that terminates line `end - 1`.
        let to = self
            .starts
            .get(end)
            .map(|next| next - 1)
            .unwrap_or(source.len())
            .max(from);
        &source[from..to]
    }
}

fn scope_of(node: Node<'_>) -> Scope {
    let mut current = node.parent();
    while let Some(parent) = current {
        if matches!(parent.kind(), "class_definition" | "function_definition") {
            return Scope::Nested;
        }
        current = parent.parent();
    }
    Scope::Module
}

/// The `assignment` of a plain `target = value` statement.
fn assignment_of(statement: Node<'_>) -> Option<Node<'_>> {
    if statement.named_child_count() != 1 {
        return None;
    }
    let assignment = statement.named_child(0)?;
    let plain = assignment.kind() == "assignment"
        && assignment.child_by_field_name("right").is_some()
        && assignment.child_by_field_name("type").is_none();
    plain.then_some(assignment)
}

/// Target names of a possibly chained assignment.
fn assignment_targets<'a>(assignment: Node<'a>, source: &'a str) -> Vec<&'a str> {
    let mut names = Vec::new();
    let mut current = Some(assignment);
    while let Some(node) = current {
        if let Some(left) = node.child_by_field_name("left") {
            target_names(left, source, &mut names);
        }
        current = node
            .child_by_field_name("right")
            .filter(|right| right.kind() == "assignment");
    }
    names
}

fn target_names<'a>(target: Node<'a>, source: &'a str, names: &mut Vec<&'a str>) {
    match target.kind() {
        "identifier" => names.push(target.text(source)),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern"
        | "parenthesized_expression" => {
            let mut cursor = target.walk();
            for child in target.named_children(&mut cursor) {
                target_names(child, source, names);
            }
        }
        // Attribute and subscript targets bind no new name.
        _ => {}
    }
}

fn import_names<'a>(node: Node<'a>, source: &'a str) -> Vec<&'a str> {
    let from_import = node.kind() != "import_statement";
    let mut names = Vec::new();
    let mut cursor = node.walk();

    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "aliased_import" => names.extend(child.child_text(source, "alias")),
            "dotted_name" if from_import => names.push(child.text(source)),
            // `import a.b.c` binds `a`.
            "dotted_name" => names.extend(child.named_child(0).map(|first| first.text(source))),
            _ => {}
        }
    }

    let mut cursor = node.walk();
    if node
        .named_children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import")
    {
        names.push("*");
    }
    names
}

fn class_methods<'a>(class: Node<'a>, source: &'a str) -> Vec<Method<'a>> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter_map(|statement| match statement.kind() {
            "function_definition" => Some(statement),
            "decorated_definition" => statement
                .child_by_field_name("definition")
                .filter(|def| def.kind() == "function_definition"),
            _ => None,
        })
        .filter(|function| !is_async(*function))
        .filter_map(|function| {
            function.child_text(source, "name").map(|name| Method {
                name,
                node: function,
            })
        })
        .collect()
}

/// `async def` methods do not count as methods of a tool class.
fn is_async(function: Node<'_>) -> bool {
    function.child(0).is_some_and(|token| token.kind() == "async")
}

//! Excerpt assembly.

use crate::declaration::ParsedModule;

/// Join the selected declarations into one excerpt.
///
/// Declarations are ordered by start line (discovery order breaks ties),
/// each index is emitted once, and slices are separated by exactly one blank
/// line. The result depends only on the module and the selection.
pub fn assemble(module: &ParsedModule<'_>, selection: &[usize]) -> String {
    let declarations = module.declarations();

    let mut ordered: Vec<usize> = selection
        .iter()
        .copied()
        .filter(|index| *index < declarations.len())
        .collect();
    ordered.sort_by_key(|index| (declarations[*index].start_line, *index));
    ordered.dedup();

    ordered
        .into_iter()
        .map(|index| declarations[index].raw_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_sitter_wrapper::PythonParser;

    const SOURCE: &str = "import os\nimport sys\n\n\n\nclass A:\n    pass\nx = 1\n";

    #[test]
    fn test_sorted_deduplicated_and_separated() {
        let tree = PythonParser::new().unwrap().parse(SOURCE).unwrap();
        let module = ParsedModule::from_tree(&tree, SOURCE);

        let excerpt = assemble(&module, &[3, 2, 0, 2, 1]);
        assert_eq!(
            excerpt,
            "import os\n\nimport sys\n\nclass A:\n    pass\n\nx = 1"
        );
    }

    #[test]
    fn test_empty_selection() {
        let tree = PythonParser::new().unwrap().parse(SOURCE).unwrap();
        let module = ParsedModule::from_tree(&tree, SOURCE);

        assert_eq!(assemble(&module, &[]), "");
    }
}

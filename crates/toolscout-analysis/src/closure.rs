//! Selection of the declarations bundled with a tool.

use crate::declaration::{DeclarationKind, ParsedModule, Scope};
use crate::references::ReferenceSet;

/// Indices of the declarations that make up the excerpt of the tool at
/// `tool`, in discovery order.
///
/// Included are every import, the tool itself, any other class it names, and
/// any module-level function or assignment it names. Selected declarations are
/// not expanded further: a helper's own dependencies are only included when
/// the tool mentions them directly.
pub fn select_closure(module: &ParsedModule<'_>, tool: usize, refs: &ReferenceSet<'_>) -> Vec<usize> {
    module
        .declarations()
        .iter()
        .enumerate()
        .filter(|(index, decl)| {
            if *index == tool {
                return true;
            }
            let named = || refs.mentions_any(decl.names.iter().copied());
            match decl.kind {
                DeclarationKind::Import => true,
                DeclarationKind::Class => named(),
                DeclarationKind::Function | DeclarationKind::Assignment => {
                    decl.scope == Scope::Module && named()
                }
            }
        })
        .map(|(index, _)| index)
        .collect()
}

//! Top-level structure: class definitions and the source file they live in.

use crate::stmt::Stmt;
use phd_common::Ident;
use phd_source::{FileId, Span};
use serde::{Deserialize, Serialize};

/// A `class Name(Base): body` definition.
///
/// At the top level this is a module (`Base` is `Module`) or an enum type
/// (`Base` is `Enum`). Nested inside a module body, it is always an enum
/// type. Which is which is decided during elaboration from `bases`, not
/// recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// The class name.
    pub name: Ident,
    /// Base class names, in source order (`class Counter(Module):` → `[Module]`).
    pub bases: Vec<Ident>,
    /// The class body.
    pub body: Vec<Stmt>,
    /// The source span of the whole class definition.
    pub span: Span,
}

/// One parsed `.phd` source file: a flat list of top-level class definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// The file this was parsed from.
    pub file: FileId,
    /// Top-level class definitions, in source order.
    pub items: Vec<ClassDef>,
}

impl SourceFile {
    /// Creates an empty source file for `file`.
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_file_starts_empty() {
        let sf = SourceFile::new(FileId::from_raw(0));
        assert!(sf.items.is_empty());
    }

    #[test]
    fn class_def_construction() {
        let class = ClassDef {
            name: Ident::from_raw(1),
            bases: vec![Ident::from_raw(2)],
            body: vec![],
            span: Span::DUMMY,
        };
        assert_eq!(class.bases.len(), 1);
    }

    #[test]
    fn source_file_with_items() {
        let mut sf = SourceFile::new(FileId::from_raw(0));
        sf.items.push(ClassDef {
            name: Ident::from_raw(1),
            bases: vec![Ident::from_raw(2)],
            body: vec![],
            span: Span::DUMMY,
        });
        assert_eq!(sf.items.len(), 1);
    }
}

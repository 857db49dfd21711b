//! Module registry: scans parsed source files and maps module names to
//! their class definitions.
//!
//! Every `class Name(Module): ...` across every compiled file is collected
//! into one registry, keyed by name, so a submodule instantiation in one
//! file can reference a module defined in another. `class Name(Enum): ...`
//! at the top level is rejected — enum types are only meaningful nested
//! inside a module body — but is still recorded so a reference to it
//! produces a clearer diagnostic than "undeclared name".

use std::collections::HashMap;

use phd_ast::{ClassDef, Expr, SourceFile, Stmt};
use phd_common::{Ident, Interner};
use phd_diagnostics::DiagnosticSink;
use phd_source::Span;

use crate::errors::error_duplicate_definition;

/// All module definitions collected from a compilation's source files.
pub struct ModuleRegistry {
    modules: HashMap<Ident, ClassDef>,
    first_span: HashMap<Ident, Span>,
}

impl ModuleRegistry {
    /// Scans every source file's top-level class definitions and collects
    /// the ones that extend `Module`. Duplicate names are reported and the
    /// first definition wins.
    pub fn from_source_files(
        files: &[SourceFile],
        interner: &Interner,
        sink: &DiagnosticSink,
    ) -> Self {
        let module_base = interner.get_or_intern("Module");
        let mut modules = HashMap::new();
        let mut first_span = HashMap::new();

        for file in files {
            for class in &file.items {
                if !class.bases.contains(&module_base) {
                    continue;
                }
                if let Some(&prev) = first_span.get(&class.name) {
                    sink.emit(error_duplicate_definition(
                        "module",
                        interner.resolve(class.name),
                        class.span,
                        prev,
                    ));
                    continue;
                }
                first_span.insert(class.name, class.span);
                modules.insert(class.name, class.clone());
            }
        }

        Self { modules, first_span }
    }

    /// Looks up a module's class definition by name.
    pub fn lookup(&self, name: Ident) -> Option<&ClassDef> {
        self.modules.get(&name)
    }

    /// The span of a module's (first) definition.
    pub fn span_of(&self, name: Ident) -> Option<Span> {
        self.first_span.get(&name).copied()
    }

    /// Names of every registered module, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = Ident> + '_ {
        self.modules.keys().copied()
    }

    /// Names of modules never instantiated as a submodule by another
    /// registered module — the independent emission roots the driver
    /// elaborates directly, each under its own declared parameter defaults.
    /// Modules reachable only via instantiation are elaborated solely
    /// through monomorphization at their call sites.
    pub fn root_modules(&self) -> Vec<Ident> {
        let mut instantiated = std::collections::HashSet::new();
        for class in self.modules.values() {
            collect_instantiation_targets(&class.body, &self.modules, &mut instantiated);
        }
        self.modules
            .keys()
            .copied()
            .filter(|name| !instantiated.contains(name))
            .collect()
    }
}

fn collect_instantiation_targets(
    body: &[Stmt],
    modules: &HashMap<Ident, ClassDef>,
    out: &mut std::collections::HashSet<Ident>,
) {
    for stmt in body {
        if let Stmt::Assign { value: Expr::Call { func, .. }, .. } = stmt {
            if let Expr::Name { name, .. } = func.as_ref() {
                if modules.contains_key(name) {
                    out.insert(*name);
                }
            }
        }
    }
}

//! Top-level design container.
//!
//! A [`Design`] holds every module emitted from one compiled input file:
//! every concrete module as written, plus one entry per distinct
//! monomorphization of every template instantiated (directly or
//! transitively) from those concrete modules.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use serde::{Deserialize, Serialize};

/// All modules produced by elaborating one `.phd` file.
///
/// Unlike a netlist with a single selected top, every entry here is an
/// independent emission unit: the driver writes one `.sv` file per module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// Every emittable module, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self {
            modules: Arena::new(),
        }
    }

    /// Returns the number of modules in the design.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use phd_common::{ContentHash, Ident};
    use phd_source::Span;

    fn make_module(id: u32, name: Ident) -> Module {
        Module {
            id: ModuleId::from_raw(id),
            name,
            span: Span::DUMMY,
            params: Vec::new(),
            ports: Vec::new(),
            signals: Arena::new(),
            enums: Vec::new(),
            instances: Vec::new(),
            processes: Vec::new(),
            content_hash: ContentHash::from_bytes(b"m"),
        }
    }

    #[test]
    fn design_construction() {
        let mut design = Design::new();
        design.modules.alloc(make_module(0, Ident::from_raw(1)));
        assert_eq!(design.module_count(), 1);
    }

    #[test]
    fn design_with_multiple_modules() {
        let mut design = Design::new();
        design.modules.alloc(make_module(0, Ident::from_raw(1)));
        design.modules.alloc(make_module(1, Ident::from_raw(2)));
        assert_eq!(design.module_count(), 2);
    }

    #[test]
    fn design_serde_roundtrip() {
        let mut design = Design::new();
        design.modules.alloc(make_module(0, Ident::from_raw(1)));
        let json = serde_json::to_string(&design).unwrap();
        let restored: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.module_count(), 1);
    }
}

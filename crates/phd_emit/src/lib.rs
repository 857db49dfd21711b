//! Lowering and emission: turns an elaborated [`phd_ir::Design`] into one
//! synthesizable SystemVerilog source string per module.
//!
//! Emission is a pure text-rendering pass over an already-complete IR — no
//! further analysis or diagnostics are produced here. Every invariant this
//! crate depends on (bucket-per-signal discipline, width resolution, trailing
//! `default:` arms) was already enforced during elaboration.

#![warn(missing_docs)]

mod expr;
mod module;
mod process;
mod stmt;

use phd_common::{Interner, PhdResult};
use phd_ir::{Design, Module};

pub use module::emit_module;

/// One module's emitted SystemVerilog, paired with the file name it should
/// be written under (the module's emitted name plus `.sv`).
#[derive(Debug, Clone)]
pub struct EmittedFile {
    /// File name, e.g. `Adder_width8.sv`.
    pub file_name: String,
    /// Full SystemVerilog source text.
    pub source: String,
}

/// Emits every module in `design` to its own [`EmittedFile`], in allocation
/// order (concrete modules first, then each monomorphization in the order it
/// was first instantiated).
///
/// # Errors
///
/// Returns `Err` if a submodule instance references a template module that
/// was never elaborated into `design` — an internal inconsistency, not a
/// user-facing diagnostic.
pub fn emit_design(design: &Design, interner: &Interner) -> PhdResult<Vec<EmittedFile>> {
    design
        .modules
        .iter()
        .map(|(_, module): (_, &Module)| {
            let source = emit_module(module, design, interner)?;
            let file_name = format!("{}.sv", interner.resolve(module.name));
            Ok(EmittedFile { file_name, source })
        })
        .collect::<PhdResult<Vec<_>>>()
}

//! Parses `.phd` source text into [`phd_ast`].
//!
//! The dialect is Python syntax carrying hardware semantics, so grammar
//! parsing is delegated entirely to `rustpython-parser`; this crate only
//! lowers the resulting tree into our own AST and attaches diagnostics.

#![warn(missing_docs)]

mod errors;
mod lower;

pub use lower::parse_file;

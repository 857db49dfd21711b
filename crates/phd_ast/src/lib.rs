//! phd-ast — the parsed, unresolved abstract syntax tree for `.phd` sources.
//!
//! This tree mirrors the subset of Python syntax the dialect reuses. No
//! name has been resolved to a port, signal, parameter, or submodule yet —
//! that classification happens in `phd_elaborate`, which reads the shape of
//! each [`stmt::Stmt::Assign`] to decide what it declares.

#![warn(missing_docs)]

pub mod expr;
pub mod module;
pub mod stmt;

pub use expr::{BinaryOp, BoolOp, CompareOp, Expr, Keyword, SliceExpr, UnaryOp};
pub use module::{ClassDef, SourceFile};
pub use stmt::{MatchCase, Pattern, Stmt};

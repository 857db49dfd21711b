//! phd-ir — the intermediate representation shared between elaboration and emission.
//!
//! This crate defines the core IR types — [`design::Design`], [`module::Module`],
//! [`signal::Signal`], [`process::Process`] — that make up the lingua franca between
//! the elaborator and the SystemVerilog emitter.

#![warn(missing_docs)]

pub mod arena;
pub mod design;
pub mod expr;
pub mod ids;
pub mod module;
pub mod port;
pub mod process;
pub mod shape;
pub mod signal;
pub mod stmt;

pub use design::Design;
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use ids::{ModuleId, SignalId};
pub use module::{EnumType, Module, Parameter, PortConnection, SubmoduleInstance};
pub use port::{Port, PortDirection};
pub use process::{Edge, EdgeSensitivity, Process, ProcessKind};
pub use shape::Shape;
pub use signal::{Signal, SignalOrigin, SignalType};
pub use stmt::{CaseArm, Lvalue, Stmt};

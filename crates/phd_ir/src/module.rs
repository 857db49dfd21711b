//! Module definitions — the primary organizational unit of the IR.
//!
//! A [`Module`] is one emittable unit: a concrete module as written, or one
//! monomorphization of a template. It owns its ports, signals, enum types,
//! submodule instances, and the processes assignments were classified into.

use crate::arena::Arena;
use crate::expr::Expr;
use crate::ids::{ModuleId, SignalId};
use crate::port::{Port, PortDirection};
use crate::process::Process;
use crate::signal::Signal;
use phd_common::{ContentHash, Ident};
use phd_source::Span;
use serde::{Deserialize, Serialize};

/// A resolved module parameter, e.g. `width = 8` after monomorphization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// The parameter name.
    pub name: Ident,
    /// The resolved integer value.
    pub value: i64,
    /// The source span of the parameter's defining assignment.
    pub span: Span,
}

/// An enum type defined inside a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumType {
    /// The enum type name.
    pub name: Ident,
    /// Members in declaration order, each with its resolved integer value.
    pub members: Vec<(Ident, i64)>,
    /// Derived width: `ceil(log2(max_value + 1))`, minimum 1.
    pub width: u32,
    /// The source span of the enum class definition.
    pub span: Span,
}

impl EnumType {
    /// Computes an enum's derived width from its member values.
    pub fn derive_width(members: &[(Ident, i64)]) -> u32 {
        let max_value = members.iter().map(|(_, v)| *v).max().unwrap_or(0);
        crate::expr::min_literal_width(max_value).max(1)
    }
}

/// A single port connection in a submodule instantiation's wiring table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConnection {
    /// The template's port name being connected.
    pub port: Ident,
    /// The template port's direction (copied for emission convenience).
    pub direction: PortDirection,
    /// The expression wired to this port: an arbitrary expression for an
    /// input, or the auto-generated intermediate wire signal for an output.
    pub value: Expr,
}

/// A submodule instance: `name = Template(k=v, ...)` plus its subsequent
/// `name.port = expr` / `target = name.port` wiring assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmoduleInstance {
    /// The local instance name.
    pub name: Ident,
    /// The monomorphized (or concrete) module this instance is of.
    pub template: ModuleId,
    /// Every port of the template, connected to its wired expression.
    pub connections: Vec<PortConnection>,
    /// The source span of the instantiation statement.
    pub span: Span,
}

/// A single emittable hardware module: a concrete module as written, or one
/// monomorphization of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The unique ID of this module in the design.
    pub id: ModuleId,
    /// The emitted module name (mangled with bound parameter values for a
    /// monomorphized template, e.g. `ParamAdder_width8`).
    pub name: Ident,
    /// The source span of the module's class definition.
    pub span: Span,
    /// Resolved parameters, emitted as `localparam`.
    pub params: Vec<Parameter>,
    /// The module's external port interface, in declaration order.
    pub ports: Vec<Port>,
    /// All signals declared or first-assigned within this module.
    pub signals: Arena<SignalId, Signal>,
    /// Enum types defined in this module, in declaration order.
    pub enums: Vec<EnumType>,
    /// Submodule instances, in declaration order.
    pub instances: Vec<SubmoduleInstance>,
    /// The classified `always_comb`/`always_ff` processes, in first-seen
    /// order (one combinational process, plus one per distinct edge tuple).
    pub processes: Vec<Process>,
    /// Content hash of this module's source body (used to key the
    /// monomorphization cache and detect redundant re-elaboration).
    pub content_hash: ContentHash,
}

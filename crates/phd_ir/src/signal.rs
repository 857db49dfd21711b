//! Signal definitions.
//!
//! A [`Signal`] represents a named wire or register within a module. Unlike
//! a general-purpose HDL IR, there is no separate wire/reg storage tag here:
//! every declaration emits as `logic`, and the distinction between
//! combinational and edge-triggered behavior lives on the [`Process`](crate::process::Process)
//! that assigns it, not on the signal declaration itself.

use crate::ids::SignalId;
use crate::shape::Shape;
use phd_common::Ident;
use phd_source::Span;
use serde::{Deserialize, Serialize};

/// Where a signal's declaration comes from, which determines where (if at
/// all) it is emitted in the module's declaration section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalOrigin {
    /// Backs a port; declared as part of the port list, not re-declared.
    Port,
    /// An ordinary internal signal declared or first-assigned in the body.
    Internal,
    /// Auto-generated between a submodule output port and its consumer.
    IntermediateWire,
}

/// The type carried by a signal: a plain bit vector, or an enum-typed state
/// variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    /// A plain `logic` vector.
    Plain,
    /// An enum-typed variable; `name` is the enum type's name.
    Enum {
        /// The enum type name (used to render `{Name}_t`).
        name: Ident,
    },
}

/// A signal (wire or register) within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// The unique ID of this signal within its module.
    pub id: SignalId,
    /// The signal name.
    pub name: Ident,
    /// The signal's shape (width, or memory width/depth).
    pub shape: Shape,
    /// Plain bit vector or enum-typed.
    pub ty: SignalType,
    /// Where this signal's declaration originates.
    pub origin: SignalOrigin,
    /// The source span where this signal was declared or first assigned.
    pub span: Span,
}

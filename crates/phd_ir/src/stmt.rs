//! Behavioral statements for process bodies.
//!
//! A process body is a list of [`Stmt`]; edge-guard frames that selected
//! which process a statement belongs to are consumed during elaboration and
//! do not appear here — only control structure that survives into the
//! emitted `always_comb`/`always_ff` body remains (`if`/`elif`/`else` chains,
//! `match`/`case`).

use crate::expr::Expr;
use crate::ids::SignalId;
use phd_source::Span;
use serde::{Deserialize, Serialize};

/// An assignment target: a signal, a bit-slice, a single-bit index, a
/// memory word, or a concatenation of any of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Lvalue {
    /// A full signal.
    Signal(SignalId),
    /// A bit-slice `signal[hi:lo]`.
    Slice {
        /// The signal being sliced.
        base: SignalId,
        /// High bit index, inclusive.
        hi: u32,
        /// Low bit index, inclusive.
        lo: u32,
    },
    /// A single-bit index `signal[i]`.
    Index {
        /// The signal being indexed.
        base: SignalId,
        /// The bit index.
        index: u32,
    },
    /// A memory word write `signal[i] = ...`.
    MemoryWrite {
        /// The memory signal.
        base: SignalId,
        /// The word index expression.
        index: Box<Expr>,
    },
    /// A concatenation target `(a, b) = expr`.
    Concat(Vec<Lvalue>),
}

/// One arm of a `match`/`case` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArm {
    /// The case label expression (an enum member or integer literal).
    pub label: Expr,
    /// The statements executed when the selector matches this label.
    pub body: Vec<Stmt>,
}

/// A behavioral statement inside a process body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `target = value`.
    Assign {
        /// The assignment target.
        target: Lvalue,
        /// The value expression.
        value: Expr,
        /// The source span of the assignment.
        span: Span,
    },
    /// `if cond: then_branch else: else_branch`.
    If {
        /// The branch condition.
        cond: Expr,
        /// Statements executed when `cond` is true.
        then_branch: Vec<Stmt>,
        /// Statements executed otherwise (empty if there is no `else`).
        else_branch: Vec<Stmt>,
        /// The source span of the `if`.
        span: Span,
    },
    /// `match selector: case ...`, lowered to `unique case`.
    Case {
        /// The case selector expression.
        selector: Expr,
        /// The case arms, in source order. A trailing `default: ;` is always
        /// injected at emission and is not represented here.
        arms: Vec<CaseArm>,
        /// The source span of the `match`.
        span: Span,
    },
}

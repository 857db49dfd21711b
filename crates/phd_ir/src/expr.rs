//! Expression trees for behavioral IR, and the bit-width inference rules
//! used both to diagnose width mismatches during elaboration and to size
//! literals and concatenations during emission.

use crate::ids::SignalId;
use crate::module::Module;
use phd_common::Ident;
use serde::{Deserialize, Serialize};

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `~x` (bitwise complement)
    BitNot,
    /// `not x` (logical negation)
    Not,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `and`
    And,
    /// `or`
    Or,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinaryOp {
    /// `true` for the comparison operators, which always produce a 1-bit result.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Neq
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or
        )
    }

    /// `true` for `+`/`-`, the only operators whose result may widen by one
    /// bit beyond the wider operand, driven by the lvalue width.
    pub fn may_widen(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub)
    }
}

/// A behavioral expression, already resolved to signal references — by the
/// time an `Expr` is constructed, names have been looked up, submodule port
/// reads have been rewritten to their intermediate wire, and loop indices
/// have been substituted by the unroller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// An integer literal. Its emitted width comes from context (the
    /// enclosing lvalue, or, failing that, the smallest width that holds it).
    Literal(i64),
    /// A full signal reference.
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
    /// A memory word read `signal[i]` where `signal` is a memory.
    MemoryRead {
        /// The memory signal.
        base: SignalId,
        /// The word index expression.
        index: Box<Expr>,
    },
    /// A tuple concatenation `(a, b, c)`, emitted as `{a, b, c}`.
    Concat(Vec<Expr>),
    /// A unary operation.
    Unary(UnaryOp, Box<Expr>),
    /// A binary operation.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A reference to a named member of an enum type, e.g. `State.RED`.
    /// Emitted as the bare member name, never with a width prefix.
    EnumMember {
        /// The enum type name.
        ty: Ident,
        /// The member name.
        member: Ident,
        /// The member's resolved integer value.
        value: i64,
    },
}

/// Computes the bit width of an expression per the lvalue-agnostic rules:
/// name → declared width; `{a, b, ...}` → sum of parts; slice `x[hi:lo]` →
/// `hi - lo + 1`; single-bit index → 1; comparison → 1; binary op (other
/// than compare) → the wider operand's width. Literals have no intrinsic
/// width and report `None` — callers size them from the lvalue instead.
pub fn expr_width(expr: &Expr, module: &Module) -> Option<u32> {
    match expr {
        Expr::Literal(_) => None,
        Expr::Signal(id) => Some(module.signals.get(*id).shape.width()),
        Expr::Slice { hi, lo, .. } => Some(hi - lo + 1),
        Expr::Index { .. } => Some(1),
        Expr::MemoryRead { base, .. } => Some(module.signals.get(*base).shape.width()),
        Expr::Concat(parts) => {
            let mut total = 0u32;
            for p in parts {
                total += expr_width(p, module).unwrap_or(1);
            }
            Some(total)
        }
        Expr::Unary(_, inner) => expr_width(inner, module),
        Expr::Binary(op, lhs, rhs) => {
            if op.is_comparison() {
                Some(1)
            } else {
                let lw = expr_width(lhs, module);
                let rw = expr_width(rhs, module);
                match (lw, rw) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (Some(a), None) | (None, Some(a)) => Some(a),
                    (None, None) => None,
                }
            }
        }
        Expr::EnumMember { .. } => None,
    }
}

/// Smallest width (minimum 1) that can hold `value` as an unsigned literal,
/// used when no lvalue width is available to size a literal.
pub fn min_literal_width(value: i64) -> u32 {
    if value == 0 {
        return 1;
    }
    let v = value.unsigned_abs();
    (u64::BITS - v.leading_zeros()).max(1)
}

//! Expression nodes.
//!
//! These mirror the subset of Python expression syntax the dialect actually
//! uses. Names are not yet resolved to signals or parameters — that happens
//! during elaboration.

use phd_common::Ident;
use phd_source::Span;
use serde::{Deserialize, Serialize};

/// A unary prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`.
    Neg,
    /// `+x`.
    Pos,
    /// `~x`.
    BitNot,
    /// `not x`.
    Not,
}

/// A binary infix operator.
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
}

/// A boolean combinator: Python `and`/`or` applied to two or more operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
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

/// A subscript index: either a single element or a `hi:lo` range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SliceExpr {
    /// `x[i]`.
    Index(Box<Expr>),
    /// `x[hi:lo]`.
    Range {
        /// The high bound, inclusive.
        hi: Box<Expr>,
        /// The low bound, inclusive.
        lo: Box<Expr>,
    },
}

/// A single `key=value` keyword argument in a call, e.g. `width=8`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    /// The argument name.
    pub name: Ident,
    /// The argument value expression.
    pub value: Expr,
}

/// An expression.
///
/// Covers the subset of Python expression syntax the dialect reuses:
/// names, integer literals, arithmetic, comparisons used as 0/1 values,
/// attribute access (`clk.posedge`, `inst.port`), subscripting (width
/// declarations and bit-slices), calls (port wrappers, submodule
/// instantiation, `range(...)`), and tuples (concatenation RHS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A bare name reference.
    Name {
        /// The referenced name.
        name: Ident,
        /// The source span.
        span: Span,
    },
    /// An integer literal.
    Constant {
        /// The literal's value.
        value: i64,
        /// The source span.
        span: Span,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// The source span.
        span: Span,
    },
    /// A binary operation.
    Binary {
        /// The left operand.
        left: Box<Expr>,
        /// The operator.
        op: BinaryOp,
        /// The right operand.
        right: Box<Expr>,
        /// The source span.
        span: Span,
    },
    /// A Python `and`/`or` boolean chain, e.g. `clk.posedge or rst_n.negedge`.
    BoolOp {
        /// The combinator.
        op: BoolOp,
        /// The operands, in source order (at least two).
        values: Vec<Expr>,
        /// The source span.
        span: Span,
    },
    /// A single comparison, e.g. `x == 1`.
    Compare {
        /// The left operand.
        left: Box<Expr>,
        /// The comparison operator.
        op: CompareOp,
        /// The right operand.
        right: Box<Expr>,
        /// The source span.
        span: Span,
    },
    /// Attribute access: `value.attr`. Used for edge predicates
    /// (`clk.posedge`) and submodule port references (`inst.port`).
    Attribute {
        /// The base expression.
        value: Box<Expr>,
        /// The attribute name.
        attr: Ident,
        /// The source span.
        span: Span,
    },
    /// Subscripting: `value[slice]`. Used for width declarations
    /// (`bit[8]`), bit-slices, single-bit indices, and memory word access.
    Subscript {
        /// The base expression.
        value: Box<Expr>,
        /// The subscript index.
        slice: SliceExpr,
        /// The source span.
        span: Span,
    },
    /// A function/constructor call: `In(bit[8])`, `Template(width=8)`,
    /// `range(8)`.
    Call {
        /// The callee expression (usually a bare name).
        func: Box<Expr>,
        /// Positional arguments, in source order.
        args: Vec<Expr>,
        /// Keyword arguments, in source order.
        keywords: Vec<Keyword>,
        /// The source span.
        span: Span,
    },
    /// A tuple literal, used as a concatenation RHS: `(a, b, c)`.
    Tuple {
        /// The tuple elements, in source order.
        elements: Vec<Expr>,
        /// The source span.
        span: Span,
    },
    /// A node the parser could not lower, retained for error recovery.
    Error(Span),
}

impl Expr {
    /// Returns this expression's source span.
    pub fn span(&self) -> Span {
        match self {
            Expr::Name { span, .. }
            | Expr::Constant { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::BoolOp { span, .. }
            | Expr::Compare { span, .. }
            | Expr::Attribute { span, .. }
            | Expr::Subscript { span, .. }
            | Expr::Call { span, .. }
            | Expr::Tuple { span, .. } => *span,
            Expr::Error(span) => *span,
        }
    }
}

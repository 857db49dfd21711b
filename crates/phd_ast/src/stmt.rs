//! Statement nodes.

use crate::expr::Expr;
use crate::module::ClassDef;
use phd_common::Ident;
use phd_source::Span;
use serde::{Deserialize, Serialize};

/// A single `case` arm of a `match` statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCase {
    /// The case pattern: `case VALUE:` or the wildcard `case _:`.
    pub pattern: Pattern,
    /// The statements executed for this arm.
    pub body: Vec<Stmt>,
    /// The source span of the arm.
    pub span: Span,
}

/// A `match` case pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pattern {
    /// `case <expr>:` — an enum member or literal value.
    Value(Expr),
    /// `case _:` — the default arm.
    Wildcard,
}

/// A statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `target = value`. The sole form of assignment the dialect uses;
    /// whether it declares a port, a parameter, a signal, or wires a
    /// submodule is determined during elaboration from the shape of
    /// `value` and the declaration context, not at parse time.
    Assign {
        /// The assignment target.
        target: Expr,
        /// The assigned value.
        value: Expr,
        /// The source span.
        span: Span,
    },
    /// `if test: body [elif ...] [else: orelse]`. `elif` chains are
    /// represented as a single nested `If` as the sole element of `orelse`.
    If {
        /// The guard expression.
        test: Expr,
        /// Statements run when `test` holds.
        body: Vec<Stmt>,
        /// Statements run otherwise (empty if there is no `else`).
        orelse: Vec<Stmt>,
        /// The source span.
        span: Span,
    },
    /// `for target in iter: body`. Only `range(...)` iterables are
    /// statically unrollable; anything else is rejected during elaboration.
    For {
        /// The loop variable.
        target: Ident,
        /// The iterable expression, expected to be a `range(...)` call.
        iter: Expr,
        /// The loop body.
        body: Vec<Stmt>,
        /// The source span.
        span: Span,
    },
    /// `match subject: case ...`.
    Match {
        /// The matched expression.
        subject: Expr,
        /// The case arms, in source order.
        cases: Vec<MatchCase>,
        /// The source span.
        span: Span,
    },
    /// A nested class definition — an enum type declared inside a module.
    ClassDef(ClassDef),
    /// `pass`, or a bare expression statement (e.g. a docstring), which
    /// carries no hardware meaning and is otherwise ignored.
    Pass(Span),
    /// A statement the parser could not lower, retained for error recovery.
    Error(Span),
}

impl Stmt {
    /// Returns this statement's source span.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Match { span, .. } => *span,
            Stmt::ClassDef(class) => class.span,
            Stmt::Pass(span) | Stmt::Error(span) => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_span() {
        let s = Stmt::Assign {
            target: Expr::Name {
                name: Ident::from_raw(1),
                span: Span::DUMMY,
            },
            value: Expr::Constant {
                value: 0,
                span: Span::DUMMY,
            },
            span: Span::DUMMY,
        };
        assert_eq!(s.span(), Span::DUMMY);
    }

    #[test]
    fn if_with_empty_orelse() {
        let s = Stmt::If {
            test: Expr::Name {
                name: Ident::from_raw(1),
                span: Span::DUMMY,
            },
            body: vec![Stmt::Pass(Span::DUMMY)],
            orelse: vec![],
            span: Span::DUMMY,
        };
        if let Stmt::If { orelse, .. } = s {
            assert!(orelse.is_empty());
        } else {
            panic!("expected If");
        }
    }

    #[test]
    fn for_loop_construction() {
        let s = Stmt::For {
            target: Ident::from_raw(1),
            iter: Expr::Call {
                func: Box::new(Expr::Name {
                    name: Ident::from_raw(2),
                    span: Span::DUMMY,
                }),
                args: vec![Expr::Constant {
                    value: 8,
                    span: Span::DUMMY,
                }],
                keywords: vec![],
                span: Span::DUMMY,
            },
            body: vec![],
            span: Span::DUMMY,
        };
        assert!(matches!(s, Stmt::For { .. }));
    }

    #[test]
    fn match_with_wildcard_arm() {
        let s = Stmt::Match {
            subject: Expr::Name {
                name: Ident::from_raw(1),
                span: Span::DUMMY,
            },
            cases: vec![MatchCase {
                pattern: Pattern::Wildcard,
                body: vec![],
                span: Span::DUMMY,
            }],
            span: Span::DUMMY,
        };
        if let Stmt::Match { cases, .. } = s {
            assert!(matches!(cases[0].pattern, Pattern::Wildcard));
        } else {
            panic!("expected Match");
        }
    }
}

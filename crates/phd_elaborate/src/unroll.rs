//! Loop unrolling: expands `for i in range(...): body` into one copy of
//! `body` per iteration, with the loop variable substituted by its constant
//! value. Runs once per module body, outside-in, before statement
//! classification.

use phd_ast::{Expr, MatchCase, Pattern, SliceExpr, Stmt};
use phd_common::Ident;
use phd_diagnostics::DiagnosticSink;

use crate::const_eval::{eval_range, ConstEnv};

/// Expands every `for` loop in `stmts` (recursively, including loops nested
/// inside `if`/`match` bodies) into its unrolled statement sequence.
pub fn unroll_stmts(stmts: &[Stmt], env: &ConstEnv, sink: &DiagnosticSink) -> Vec<Stmt> {
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            Stmt::For { target, iter, body, .. } => {
                let Some(values) = eval_range(iter, env, sink) else {
                    continue;
                };
                for v in values {
                    let substituted: Vec<Stmt> = body.iter().map(|s| subst_stmt(s, *target, v)).collect();
                    out.extend(unroll_stmts(&substituted, env, sink));
                }
            }
            Stmt::If { test, body, orelse, span } => {
                out.push(Stmt::If {
                    test: test.clone(),
                    body: unroll_stmts(body, env, sink),
                    orelse: unroll_stmts(orelse, env, sink),
                    span: *span,
                });
            }
            Stmt::Match { subject, cases, span } => {
                let cases = cases
                    .iter()
                    .map(|c| MatchCase {
                        pattern: c.pattern.clone(),
                        body: unroll_stmts(&c.body, env, sink),
                        span: c.span,
                    })
                    .collect();
                out.push(Stmt::Match {
                    subject: subject.clone(),
                    cases,
                    span: *span,
                });
            }
            other => out.push(other.clone()),
        }
    }
    out
}

fn subst_expr(expr: &Expr, var: Ident, val: i64) -> Expr {
    match expr {
        Expr::Name { name, span } if *name == var => Expr::Constant { value: val, span: *span },
        Expr::Name { .. } | Expr::Constant { .. } | Expr::Error(_) => expr.clone(),
        Expr::Unary { op, operand, span } => Expr::Unary {
            op: *op,
            operand: Box::new(subst_expr(operand, var, val)),
            span: *span,
        },
        Expr::Binary { left, op, right, span } => Expr::Binary {
            left: Box::new(subst_expr(left, var, val)),
            op: *op,
            right: Box::new(subst_expr(right, var, val)),
            span: *span,
        },
        Expr::BoolOp { op, values, span } => Expr::BoolOp {
            op: *op,
            values: values.iter().map(|v| subst_expr(v, var, val)).collect(),
            span: *span,
        },
        Expr::Compare { left, op, right, span } => Expr::Compare {
            left: Box::new(subst_expr(left, var, val)),
            op: *op,
            right: Box::new(subst_expr(right, var, val)),
            span: *span,
        },
        Expr::Attribute { value, attr, span } => Expr::Attribute {
            value: Box::new(subst_expr(value, var, val)),
            attr: *attr,
            span: *span,
        },
        Expr::Subscript { value, slice, span } => Expr::Subscript {
            value: Box::new(subst_expr(value, var, val)),
            slice: subst_slice(slice, var, val),
            span: *span,
        },
        Expr::Call { func, args, keywords, span } => Expr::Call {
            func: Box::new(subst_expr(func, var, val)),
            args: args.iter().map(|a| subst_expr(a, var, val)).collect(),
            keywords: keywords
                .iter()
                .map(|k| phd_ast::Keyword {
                    name: k.name,
                    value: subst_expr(&k.value, var, val),
                })
                .collect(),
            span: *span,
        },
        Expr::Tuple { elements, span } => Expr::Tuple {
            elements: elements.iter().map(|e| subst_expr(e, var, val)).collect(),
            span: *span,
        },
    }
}

fn subst_slice(slice: &SliceExpr, var: Ident, val: i64) -> SliceExpr {
    match slice {
        SliceExpr::Index(e) => SliceExpr::Index(Box::new(subst_expr(e, var, val))),
        SliceExpr::Range { hi, lo } => SliceExpr::Range {
            hi: Box::new(subst_expr(hi, var, val)),
            lo: Box::new(subst_expr(lo, var, val)),
        },
    }
}

fn subst_pattern(pattern: &Pattern, var: Ident, val: i64) -> Pattern {
    match pattern {
        Pattern::Value(e) => Pattern::Value(subst_expr(e, var, val)),
        Pattern::Wildcard => Pattern::Wildcard,
    }
}

fn subst_stmt(stmt: &Stmt, var: Ident, val: i64) -> Stmt {
    match stmt {
        Stmt::Assign { target, value, span } => Stmt::Assign {
            target: subst_expr(target, var, val),
            value: subst_expr(value, var, val),
            span: *span,
        },
        Stmt::If { test, body, orelse, span } => Stmt::If {
            test: subst_expr(test, var, val),
            body: body.iter().map(|s| subst_stmt(s, var, val)).collect(),
            orelse: orelse.iter().map(|s| subst_stmt(s, var, val)).collect(),
            span: *span,
        },
        Stmt::For { target, iter, body, span } => {
            // a nested `for` re-binding the same name shadows the outer
            // loop variable; its body is left untouched.
            let iter = subst_expr(iter, var, val);
            let body = if *target == var {
                body.clone()
            } else {
                body.iter().map(|s| subst_stmt(s, var, val)).collect()
            };
            Stmt::For { target: *target, iter, body, span: *span }
        }
        Stmt::Match { subject, cases, span } => Stmt::Match {
            subject: subst_expr(subject, var, val),
            cases: cases
                .iter()
                .map(|c| MatchCase {
                    pattern: subst_pattern(&c.pattern, var, val),
                    body: c.body.iter().map(|s| subst_stmt(s, var, val)).collect(),
                    span: c.span,
                })
                .collect(),
            span: *span,
        },
        Stmt::ClassDef(_) | Stmt::Pass(_) | Stmt::Error(_) => stmt.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_source::Span;

    fn name(n: u32) -> Expr {
        Expr::Name { name: Ident::from_raw(n), span: Span::DUMMY }
    }

    fn call_range(stop: i64) -> Expr {
        Expr::Call {
            func: Box::new(name(100)),
            args: vec![Expr::Constant { value: stop, span: Span::DUMMY }],
            keywords: vec![],
            span: Span::DUMMY,
        }
    }

    #[test]
    fn unrolls_simple_loop() {
        let sink = DiagnosticSink::new();
        let var = Ident::from_raw(1);
        let body = vec![Stmt::Assign {
            target: name(2),
            value: name(1),
            span: Span::DUMMY,
        }];
        let stmts = vec![Stmt::For {
            target: var,
            iter: call_range(3),
            body,
            span: Span::DUMMY,
        }];
        let unrolled = unroll_stmts(&stmts, &ConstEnv::new(), &sink);
        assert_eq!(unrolled.len(), 3);
        if let Stmt::Assign { value: Expr::Constant { value, .. }, .. } = &unrolled[1] {
            assert_eq!(*value, 1);
        } else {
            panic!("expected substituted constant");
        }
    }

    #[test]
    fn nested_for_shadows_outer_var() {
        let sink = DiagnosticSink::new();
        let outer = Ident::from_raw(1);
        let inner_body = vec![Stmt::Assign {
            target: name(2),
            value: name(1),
            span: Span::DUMMY,
        }];
        let outer_body = vec![Stmt::For {
            target: outer,
            iter: call_range(2),
            body: inner_body,
            span: Span::DUMMY,
        }];
        let stmts = vec![Stmt::For {
            target: outer,
            iter: call_range(1),
            body: outer_body,
            span: Span::DUMMY,
        }];
        let unrolled = unroll_stmts(&stmts, &ConstEnv::new(), &sink);
        assert_eq!(unrolled.len(), 2);
    }

    #[test]
    fn recurses_into_if_body() {
        let sink = DiagnosticSink::new();
        let var = Ident::from_raw(1);
        let loop_stmt = Stmt::For {
            target: var,
            iter: call_range(2),
            body: vec![Stmt::Pass(Span::DUMMY)],
            span: Span::DUMMY,
        };
        let stmts = vec![Stmt::If {
            test: name(9),
            body: vec![loop_stmt],
            orelse: vec![],
            span: Span::DUMMY,
        }];
        let unrolled = unroll_stmts(&stmts, &ConstEnv::new(), &sink);
        if let Stmt::If { body, .. } = &unrolled[0] {
            assert_eq!(body.len(), 2);
        } else {
            panic!("expected If");
        }
    }
}

//! Compile-time constant evaluation over [`phd_ast::Expr`].
//!
//! Covers exactly the grammar the dialect allows in a constant context:
//! integer literals, names bound in the environment, unary `- + ~`, binary
//! `+ - * / % << >> & | ^`, comparisons (yielding 0/1), and `range(...)`
//! for loop bounds. Anything else is [`NonStaticExpression`](crate::errors::error_non_static_expression).

use std::collections::HashMap;

use phd_ast::{BinaryOp, CompareOp, Expr, UnaryOp};
use phd_common::Ident;
use phd_diagnostics::DiagnosticSink;

use crate::errors::{error_non_static_expression, error_undeclared_name};

/// A name-to-value binding available to constant evaluation: parameter
/// values and, inside a `for` loop body, the current loop index.
pub type ConstEnv = HashMap<Ident, i64>;

/// Evaluates `expr` to a constant `i64`, or emits a diagnostic and returns
/// `None` if it isn't one.
pub fn eval_const_expr(expr: &Expr, env: &ConstEnv, sink: &DiagnosticSink) -> Option<i64> {
    match expr {
        Expr::Constant { value, .. } => Some(*value),
        Expr::Name { name, span } => match env.get(name) {
            Some(v) => Some(*v),
            None => {
                sink.emit(error_undeclared_name("<name>", *span));
                None
            }
        },
        Expr::Unary { op, operand, .. } => {
            let v = eval_const_expr(operand, env, sink)?;
            Some(match op {
                UnaryOp::Neg => -v,
                UnaryOp::Pos => v,
                UnaryOp::BitNot => !v,
                UnaryOp::Not => i64::from(v == 0),
            })
        }
        Expr::Binary {
            left, op, right, span,
        } => {
            let l = eval_const_expr(left, env, sink)?;
            let r = eval_const_expr(right, env, sink)?;
            apply_binary_op(*op, l, r, *span, sink)
        }
        Expr::Compare {
            left, op, right, ..
        } => {
            let l = eval_const_expr(left, env, sink)?;
            let r = eval_const_expr(right, env, sink)?;
            Some(i64::from(apply_compare_op(*op, l, r)))
        }
        Expr::BoolOp { span, .. } => {
            sink.emit(error_non_static_expression(
                "`and`/`or` are not allowed in constant expressions",
                *span,
            ));
            None
        }
        other => {
            sink.emit(error_non_static_expression(
                "only literals, names, and arithmetic are constant",
                other.span(),
            ));
            None
        }
    }
}

fn apply_binary_op(
    op: BinaryOp,
    l: i64,
    r: i64,
    span: phd_source::Span,
    sink: &DiagnosticSink,
) -> Option<i64> {
    match op {
        BinaryOp::Add => Some(l.wrapping_add(r)),
        BinaryOp::Sub => Some(l.wrapping_sub(r)),
        BinaryOp::Mul => Some(l.wrapping_mul(r)),
        BinaryOp::Div => {
            if r == 0 {
                sink.emit(error_non_static_expression("division by zero", span));
                None
            } else {
                Some(l / r)
            }
        }
        BinaryOp::Mod => {
            if r == 0 {
                sink.emit(error_non_static_expression("modulo by zero", span));
                None
            } else {
                Some(l % r)
            }
        }
        BinaryOp::Shl => Some(l << r),
        BinaryOp::Shr => Some(l >> r),
        BinaryOp::BitAnd => Some(l & r),
        BinaryOp::BitOr => Some(l | r),
        BinaryOp::BitXor => Some(l ^ r),
    }
}

fn apply_compare_op(op: CompareOp, l: i64, r: i64) -> bool {
    match op {
        CompareOp::Eq => l == r,
        CompareOp::Neq => l != r,
        CompareOp::Lt => l < r,
        CompareOp::Le => l <= r,
        CompareOp::Gt => l > r,
        CompareOp::Ge => l >= r,
    }
}

/// Evaluates a `range(...)` call to the sequence of values it produces,
/// using Python's `range` semantics (exclusive stop).
pub fn eval_range(expr: &Expr, env: &ConstEnv, sink: &DiagnosticSink) -> Option<Vec<i64>> {
    let Expr::Call { func, args, span, .. } = expr else {
        sink.emit(crate::errors::error_non_static_loop(expr.span()));
        return None;
    };
    let Expr::Name { name: _, .. } = func.as_ref() else {
        sink.emit(crate::errors::error_non_static_loop(*span));
        return None;
    };
    let values: Vec<i64> = args
        .iter()
        .map(|a| eval_const_expr(a, env, sink))
        .collect::<Option<Vec<_>>>()?;
    let (start, stop, step) = match values.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            sink.emit(error_non_static_expression(
                "range() takes one to three arguments",
                *span,
            ));
            return None;
        }
    };
    if step == 0 {
        sink.emit(error_non_static_expression("range() step must not be zero", *span));
        return None;
    }
    let mut out = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            out.push(i);
            i += step;
        }
    } else {
        while i > stop {
            out.push(i);
            i += step;
        }
    }
    Some(out)
}

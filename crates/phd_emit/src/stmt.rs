//! Statement rendering: assignments, conditionals, and `unique case` blocks
//! inside a process body.

use std::fmt::Write as _;

use phd_common::Interner;
use phd_ir::stmt::Stmt;
use phd_ir::Module;

use crate::expr::{lvalue_width, render_expr, render_lvalue};

const INDENT: &str = "    ";

fn pad(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// Renders one statement (and, recursively, everything it nests) at `depth`
/// levels of indentation into `out`. `sequential` selects the assignment
/// operator: non-blocking (`<=`) inside `always_ff`, blocking (`=`) inside
/// `always_comb`.
pub fn render_stmt(stmt: &Stmt, module: &Module, interner: &Interner, depth: usize, sequential: bool, out: &mut String) {
    match stmt {
        Stmt::Assign { target, value, .. } => {
            let op = if sequential { "<=" } else { "=" };
            let hint = lvalue_width(target, module);
            let lhs = render_lvalue(target, module, interner);
            let rhs = render_expr(value, module, interner, Some(hint));
            let _ = writeln!(out, "{}{} {} {};", pad(depth), lhs, op, rhs);
        }
        Stmt::If { cond, then_branch, else_branch, .. } => {
            let cond_str = render_expr(cond, module, interner, None);
            let _ = writeln!(out, "{}if ({}) begin", pad(depth), cond_str);
            for s in then_branch {
                render_stmt(s, module, interner, depth + 1, sequential, out);
            }
            if else_branch.is_empty() {
                let _ = writeln!(out, "{}end", pad(depth));
            } else {
                let _ = writeln!(out, "{}end else begin", pad(depth));
                for s in else_branch {
                    render_stmt(s, module, interner, depth + 1, sequential, out);
                }
                let _ = writeln!(out, "{}end", pad(depth));
            }
        }
        Stmt::Case { selector, arms, .. } => {
            let sel_width = phd_ir::expr::expr_width(selector, module);
            let sel_str = render_expr(selector, module, interner, None);
            let _ = writeln!(out, "{}unique case ({})", pad(depth), sel_str);
            for arm in arms {
                let label = render_expr(&arm.label, module, interner, sel_width);
                if arm.body.len() == 1 {
                    let mut body = String::new();
                    render_stmt(&arm.body[0], module, interner, 0, sequential, &mut body);
                    let _ = writeln!(out, "{}{}: {}", pad(depth + 1), label, body.trim());
                } else {
                    let _ = writeln!(out, "{}{}: begin", pad(depth + 1), label);
                    for s in &arm.body {
                        render_stmt(s, module, interner, depth + 2, sequential, out);
                    }
                    let _ = writeln!(out, "{}end", pad(depth + 1));
                }
            }
            let _ = writeln!(out, "{}default: ;", pad(depth + 1));
            let _ = writeln!(out, "{}endcase", pad(depth));
        }
    }
}

/// Renders a full process body (already a flat statement list from the
/// elaborator) at `depth` levels of indentation.
pub fn render_body(stmts: &[Stmt], module: &Module, interner: &Interner, depth: usize, sequential: bool) -> String {
    let mut out = String::new();
    for s in stmts {
        render_stmt(s, module, interner, depth, sequential, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_common::ContentHash;
    use phd_ir::arena::Arena;
    use phd_ir::ids::{ModuleId, SignalId};
    use phd_ir::shape::Shape;
    use phd_ir::signal::{Signal, SignalOrigin, SignalType};
    use phd_ir::stmt::{CaseArm, Lvalue};
    use phd_ir::Expr;
    use phd_source::Span;

    fn test_module() -> (Module, SignalId, Interner) {
        let interner = Interner::new();
        let name = interner.get_or_intern("a");
        let mut signals = Arena::new();
        let id = signals.alloc(Signal {
            id: SignalId::from_raw(0),
            name,
            shape: Shape::Bits(4),
            ty: SignalType::Plain,
            origin: SignalOrigin::Internal,
            span: Span::DUMMY,
        });
        let module = Module {
            id: ModuleId::from_raw(0),
            name: interner.get_or_intern("M"),
            span: Span::DUMMY,
            params: vec![],
            ports: vec![],
            signals,
            enums: vec![],
            instances: vec![],
            processes: vec![],
            content_hash: ContentHash::from_bytes(b"m"),
        };
        (module, id, interner)
    }

    #[test]
    fn renders_plain_assign() {
        let (module, sig, interner) = test_module();
        let stmt = Stmt::Assign {
            target: Lvalue::Signal(sig),
            value: Expr::Literal(0),
            span: Span::DUMMY,
        };
        let out = render_body(&[stmt], &module, &interner, 0, false);
        assert_eq!(out, "a = 4'd0;\n");
    }

    #[test]
    fn sequential_assign_uses_nonblocking_operator() {
        let (module, sig, interner) = test_module();
        let stmt = Stmt::Assign {
            target: Lvalue::Signal(sig),
            value: Expr::Literal(0),
            span: Span::DUMMY,
        };
        let out = render_body(&[stmt], &module, &interner, 0, true);
        assert_eq!(out, "a <= 4'd0;\n");
    }

    #[test]
    fn renders_if_else() {
        let (module, sig, interner) = test_module();
        let then_stmt = Stmt::Assign {
            target: Lvalue::Signal(sig),
            value: Expr::Literal(1),
            span: Span::DUMMY,
        };
        let else_stmt = Stmt::Assign {
            target: Lvalue::Signal(sig),
            value: Expr::Literal(0),
            span: Span::DUMMY,
        };
        let stmt = Stmt::If {
            cond: Expr::Signal(sig),
            then_branch: vec![then_stmt],
            else_branch: vec![else_stmt],
            span: Span::DUMMY,
        };
        let out = render_body(&[stmt], &module, &interner, 0, false);
        assert!(out.starts_with("if (a) begin\n"));
        assert!(out.contains("end else begin\n"));
        assert!(out.trim_end().ends_with("end"));
    }

    #[test]
    fn case_has_trailing_default() {
        let (module, sig, interner) = test_module();
        let arm = CaseArm {
            label: Expr::Literal(0),
            body: vec![Stmt::Assign {
                target: Lvalue::Signal(sig),
                value: Expr::Literal(1),
                span: Span::DUMMY,
            }],
        };
        let stmt = Stmt::Case {
            selector: Expr::Signal(sig),
            arms: vec![arm],
            span: Span::DUMMY,
        };
        let out = render_body(&[stmt], &module, &interner, 0, false);
        assert!(out.contains("unique case (a)"));
        assert!(out.contains("default: ;"));
        assert!(out.trim_end().ends_with("endcase"));
    }
}

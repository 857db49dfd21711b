//! `always_comb` / `always_ff` block rendering.

use std::fmt::Write as _;

use phd_common::Interner;
use phd_ir::process::{Edge, EdgeSensitivity, Process, ProcessKind};
use phd_ir::Module;

use crate::stmt::render_body;

fn edge_text(edge: Edge) -> &'static str {
    match edge {
        Edge::Posedge => "posedge",
        Edge::Negedge => "negedge",
    }
}

fn edge_clause(e: EdgeSensitivity, module: &Module, interner: &Interner) -> String {
    let name = interner.resolve(module.signals.get(e.signal).name);
    format!("{} {name}", edge_text(e.edge))
}

/// Renders one process as a complete `always_comb`/`always_ff` block,
/// indented two levels in (inside `module ... endmodule`).
pub fn render_process(process: &Process, module: &Module, interner: &Interner, out: &mut String) {
    match &process.kind {
        ProcessKind::Combinational => {
            let _ = writeln!(out, "    always_comb begin");
            out.push_str(&render_body(&process.body, module, interner, 2, false));
            let _ = writeln!(out, "    end");
        }
        ProcessKind::Sequential { clock, reset } => {
            let header = match reset {
                Some(r) => format!(
                    "always_ff @({} or {})",
                    edge_clause(*clock, module, interner),
                    edge_clause(*r, module, interner),
                ),
                None => format!("always_ff @({})", edge_clause(*clock, module, interner)),
            };
            let _ = writeln!(out, "    {header} begin");
            out.push_str(&render_body(&process.body, module, interner, 2, true));
            let _ = writeln!(out, "    end");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_common::ContentHash;
    use phd_ir::arena::Arena;
    use phd_ir::ids::{ModuleId, SignalId};
    use phd_ir::shape::Shape;
    use phd_ir::signal::{Signal, SignalOrigin, SignalType};
    use phd_ir::stmt::{Lvalue, Stmt};
    use phd_ir::Expr;
    use phd_source::Span;

    fn module_with_two_signals() -> (Module, SignalId, SignalId, Interner) {
        let interner = Interner::new();
        let clk_name = interner.get_or_intern("clk");
        let rst_name = interner.get_or_intern("rst_n");
        let mut signals = Arena::new();
        let clk = signals.alloc(Signal {
            id: SignalId::from_raw(0),
            name: clk_name,
            shape: Shape::Bits(1),
            ty: SignalType::Plain,
            origin: SignalOrigin::Port,
            span: Span::DUMMY,
        });
        let rst = signals.alloc(Signal {
            id: SignalId::from_raw(1),
            name: rst_name,
            shape: Shape::Bits(1),
            ty: SignalType::Plain,
            origin: SignalOrigin::Port,
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
        (module, clk, rst, interner)
    }

    #[test]
    fn comb_process_header() {
        let (module, clk, _, interner) = module_with_two_signals();
        let process = Process {
            kind: ProcessKind::Combinational,
            body: vec![Stmt::Assign {
                target: Lvalue::Signal(clk),
                value: Expr::Literal(0),
                span: Span::DUMMY,
            }],
        };
        let mut out = String::new();
        render_process(&process, &module, &interner, &mut out);
        assert!(out.starts_with("    always_comb begin\n"));
        assert!(out.trim_end().ends_with("end"));
    }

    #[test]
    fn seq_process_with_reset_header_order() {
        let (module, clk, rst, interner) = module_with_two_signals();
        let process = Process {
            kind: ProcessKind::Sequential {
                clock: EdgeSensitivity { signal: clk, edge: Edge::Posedge },
                reset: Some(EdgeSensitivity { signal: rst, edge: Edge::Negedge }),
            },
            body: vec![],
        };
        let mut out = String::new();
        render_process(&process, &module, &interner, &mut out);
        assert!(out.contains("always_ff @(posedge clk or negedge rst_n) begin"));
    }

    #[test]
    fn seq_process_body_uses_nonblocking_assignment() {
        let (module, clk, _, interner) = module_with_two_signals();
        let process = Process {
            kind: ProcessKind::Sequential {
                clock: EdgeSensitivity { signal: clk, edge: Edge::Posedge },
                reset: None,
            },
            body: vec![Stmt::Assign {
                target: Lvalue::Signal(clk),
                value: Expr::Literal(0),
                span: Span::DUMMY,
            }],
        };
        let mut out = String::new();
        render_process(&process, &module, &interner, &mut out);
        assert!(out.contains("<="));
        assert!(!out.contains(" = "));
    }

    #[test]
    fn seq_process_without_reset() {
        let (module, clk, _, interner) = module_with_two_signals();
        let process = Process {
            kind: ProcessKind::Sequential {
                clock: EdgeSensitivity { signal: clk, edge: Edge::Posedge },
                reset: None,
            },
            body: vec![],
        };
        let mut out = String::new();
        render_process(&process, &module, &interner, &mut out);
        assert!(out.contains("always_ff @(posedge clk) begin"));
    }
}

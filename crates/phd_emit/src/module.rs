//! Whole-module emission: header, parameters, enum typedefs, signal and
//! wire declarations, submodule instantiations, and process bodies, in that
//! fixed order.

use std::fmt::Write as _;

use phd_common::{Interner, InternalError, PhdResult};
use phd_ir::expr::min_literal_width;
use phd_ir::port::PortDirection;
use phd_ir::shape::Shape;
use phd_ir::signal::{Signal, SignalOrigin, SignalType};
use phd_ir::process::{Process, ProcessKind};
use phd_ir::{Design, Module, SubmoduleInstance};

use crate::expr::render_expr;
use crate::process::render_process;

/// Orders `processes` so the combinational block (if any) emits before every
/// sequential block, matching this module's documented emission order.
/// Stable within each group, preserving the elaborator's encounter order.
fn ordered_processes(processes: &[Process]) -> Vec<&Process> {
    let (mut comb, mut seq): (Vec<&Process>, Vec<&Process>) =
        processes.iter().partition(|p| matches!(p.kind, ProcessKind::Combinational));
    comb.append(&mut seq);
    comb
}

fn port_decl(direction: PortDirection, shape: Shape, name: &str) -> String {
    let dir = match direction {
        PortDirection::Input => "input",
        PortDirection::Output => "output",
    };
    match shape {
        Shape::Bits(1) => format!("{dir} logic {name}"),
        Shape::Bits(w) => format!("{dir} logic [{}:0] {name}", w - 1),
        Shape::Memory { width, depth } => {
            format!("{dir} logic [{}:0] {name} [0:{}]", width.saturating_sub(1), depth.saturating_sub(1))
        }
    }
}

fn signal_decl(signal: &Signal, interner: &Interner) -> String {
    let name = interner.resolve(signal.name);
    match &signal.ty {
        SignalType::Enum { name: enum_name } => {
            format!("{}_t {name};", interner.resolve(*enum_name))
        }
        SignalType::Plain => match signal.shape {
            Shape::Bits(1) => format!("logic {name};"),
            Shape::Bits(w) => format!("logic [{}:0] {name};", w - 1),
            Shape::Memory { width, depth } => {
                format!("logic [{}:0] {name} [0:{}];", width.saturating_sub(1), depth.saturating_sub(1))
            }
        },
    }
}

fn enum_typedef(decl: &phd_ir::EnumType, interner: &Interner) -> String {
    let members: Vec<String> = decl
        .members
        .iter()
        .map(|(name, value)| format!("{} = {}", interner.resolve(*name), value))
        .collect();
    format!(
        "typedef enum logic [{}:0] {{ {} }} {}_t;",
        decl.width.saturating_sub(1),
        members.join(", "),
        interner.resolve(decl.name),
    )
}

fn instance_decl(instance: &SubmoduleInstance, design: &Design, module: &Module, interner: &Interner) -> PhdResult<String> {
    let template = design.modules.try_get(instance.template).ok_or_else(|| {
        InternalError::new(format!(
            "submodule instance `{}` references a template module that was never elaborated",
            interner.resolve(instance.name)
        ))
    })?;
    let template_name = interner.resolve(template.name);
    let inst_name = interner.resolve(instance.name);
    let conns: Vec<String> = instance
        .connections
        .iter()
        .map(|c| {
            let port = interner.resolve(c.port);
            format!(".{port}({})", render_expr(&c.value, module, interner, None))
        })
        .collect();
    let mut out = format!("{template_name} {inst_name} (\n");
    for (i, c) in conns.iter().enumerate() {
        let sep = if i + 1 == conns.len() { "" } else { "," };
        let _ = writeln!(out, "    {c}{sep}");
    }
    out.push_str(");");
    Ok(out)
}

/// Renders `module` as a complete `.sv` source: one `module`/`endmodule`
/// block, with ports, parameters, enum typedefs, signal declarations,
/// submodule instances, and process bodies in that order.
pub fn emit_module(module: &Module, design: &Design, interner: &Interner) -> PhdResult<String> {
    let mut out = String::new();
    let name = interner.resolve(module.name);

    let _ = writeln!(out, "module {name} (");
    for (i, port) in module.ports.iter().enumerate() {
        let sep = if i + 1 == module.ports.len() { "" } else { "," };
        let decl = port_decl(port.direction, port.shape, interner.resolve(port.name));
        let _ = writeln!(out, "    {decl}{sep}");
    }
    let _ = writeln!(out, ");");
    out.push('\n');

    for param in &module.params {
        let width = min_literal_width(param.value);
        let _ = writeln!(
            out,
            "    localparam {} = {};",
            interner.resolve(param.name),
            render_literal_bare(param.value, width),
        );
    }
    if !module.params.is_empty() {
        out.push('\n');
    }

    for decl in &module.enums {
        let _ = writeln!(out, "    {}", enum_typedef(decl, interner));
    }
    if !module.enums.is_empty() {
        out.push('\n');
    }

    for (_, signal) in module.signals.iter() {
        if signal.origin == SignalOrigin::Internal {
            let _ = writeln!(out, "    {}", signal_decl(signal, interner));
        }
    }
    for (_, signal) in module.signals.iter() {
        if signal.origin == SignalOrigin::IntermediateWire {
            let _ = writeln!(out, "    {}", signal_decl(signal, interner));
        }
    }
    out.push('\n');

    for instance in &module.instances {
        let decl = instance_decl(instance, design, module, interner)?;
        for line in decl.lines() {
            let _ = writeln!(out, "    {line}");
        }
        out.push('\n');
    }

    for process in ordered_processes(&module.processes) {
        render_process(process, module, interner, &mut out);
        out.push('\n');
    }

    out.push_str("endmodule\n");
    Ok(out)
}

fn render_literal_bare(value: i64, width: u32) -> String {
    if value < 0 {
        let mask: u128 = if width >= 128 { u128::MAX } else { (1u128 << width) - 1 };
        let bits = (value as i128 as u128) & mask;
        bits.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_common::ContentHash;
    use phd_ir::arena::Arena;
    use phd_ir::ids::{ModuleId, SignalId};
    use phd_ir::port::Port;
    use phd_ir::signal::Signal;
    use phd_source::Span;

    fn make_module(interner: &Interner) -> Module {
        let clk = interner.get_or_intern("clk");
        let out_sig = interner.get_or_intern("q");
        let mut signals = Arena::new();
        let clk_id = signals.alloc(Signal {
            id: SignalId::from_raw(0),
            name: clk,
            shape: Shape::Bits(1),
            ty: SignalType::Plain,
            origin: SignalOrigin::Port,
            span: Span::DUMMY,
        });
        let out_id = signals.alloc(Signal {
            id: SignalId::from_raw(1),
            name: out_sig,
            shape: Shape::Bits(8),
            ty: SignalType::Plain,
            origin: SignalOrigin::Port,
            span: Span::DUMMY,
        });
        Module {
            id: ModuleId::from_raw(0),
            name: interner.get_or_intern("Counter"),
            span: Span::DUMMY,
            params: vec![],
            ports: vec![
                Port { name: clk, direction: PortDirection::Input, shape: Shape::Bits(1), signal: clk_id, span: Span::DUMMY },
                Port { name: out_sig, direction: PortDirection::Output, shape: Shape::Bits(8), signal: out_id, span: Span::DUMMY },
            ],
            signals,
            enums: vec![],
            instances: vec![],
            processes: vec![],
            content_hash: ContentHash::from_bytes(b"Counter"),
        }
    }

    #[test]
    fn port_widths_render_correctly() {
        assert_eq!(port_decl(PortDirection::Input, Shape::Bits(1), "clk"), "input logic clk");
        assert_eq!(port_decl(PortDirection::Output, Shape::Bits(8), "q"), "output logic [7:0] q");
    }

    #[test]
    fn memory_decl_renders_depth() {
        let interner = Interner::new();
        let name = interner.get_or_intern("mem");
        let signal = Signal {
            id: SignalId::from_raw(0),
            name,
            shape: Shape::Memory { width: 8, depth: 16 },
            ty: SignalType::Plain,
            origin: SignalOrigin::Internal,
            span: Span::DUMMY,
        };
        assert_eq!(signal_decl(&signal, &interner), "logic [7:0] mem [0:15];");
    }

    #[test]
    fn emits_module_header_and_footer() {
        let interner = Interner::new();
        let module = make_module(&interner);
        let design = Design::new();
        let text = emit_module(&module, &design, &interner).unwrap();
        assert!(text.starts_with("module Counter (\n"));
        assert!(text.contains("input logic clk,"));
        assert!(text.contains("output logic [7:0] q"));
        assert!(text.trim_end().ends_with("endmodule"));
    }

    #[test]
    fn sequential_process_emitted_before_combinational_reorders_to_comb_first() {
        let interner = Interner::new();
        let mut module = make_module(&interner);
        let clk_id = module.ports[0].signal;
        module.processes = vec![
            Process {
                kind: ProcessKind::Sequential {
                    clock: phd_ir::process::EdgeSensitivity { signal: clk_id, edge: phd_ir::process::Edge::Posedge },
                    reset: None,
                },
                body: vec![],
            },
            Process { kind: ProcessKind::Combinational, body: vec![] },
        ];
        let design = Design::new();
        let text = emit_module(&module, &design, &interner).unwrap();
        let comb_pos = text.find("always_comb").unwrap();
        let seq_pos = text.find("always_ff").unwrap();
        assert!(comb_pos < seq_pos, "combinational block must emit before sequential blocks regardless of source order");
    }

    #[test]
    fn enum_typedef_lists_members() {
        let interner = Interner::new();
        let ty = interner.get_or_intern("State");
        let red = interner.get_or_intern("RED");
        let green = interner.get_or_intern("GREEN");
        let decl = phd_ir::EnumType {
            name: ty,
            members: vec![(red, 0), (green, 1)],
            width: 1,
            span: Span::DUMMY,
        };
        assert_eq!(enum_typedef(&decl, &interner), "typedef enum logic [0:0] { RED = 0, GREEN = 1 } State_t;");
    }
}

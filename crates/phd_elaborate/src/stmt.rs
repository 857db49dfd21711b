//! Declaration scanning, submodule wiring, and statement classification.
//!
//! A module's (already loop-unrolled) body is processed in two passes:
//! [`collect_declarations`] picks out ports, parameters, internal signal
//! declarations, nested enum types, and submodule instantiations/wiring
//! from the top-level statements, leaving behind the genuinely behavioral
//! statements; those are then classified into the combinational process or
//! the appropriate sequential process by [`lower_behavior_top`].

use std::collections::HashMap;

use phd_ast::{Expr as AstExpr, Pattern, SliceExpr, Stmt as AstStmt};
use phd_common::Ident;
use phd_diagnostics::DiagnosticSink;
use phd_ir::arena::Arena;
use phd_ir::expr::Expr as IrExpr;
use phd_ir::process::{Edge, EdgeSensitivity, ProcessKind};
use phd_ir::signal::{Signal, SignalOrigin, SignalType};
use phd_ir::stmt::{CaseArm, Lvalue, Stmt as IrStmt};
use phd_ir::{EnumType, Parameter, Port, PortConnection, PortDirection, Shape, SignalId};
use phd_source::Span;

use crate::const_eval::{eval_const_expr, ConstEnv};
use crate::context::{Bucket, CompilationEnv, EnumInfo, ModuleBuilder};
use crate::errors::{error_non_static_expression, error_unknown_port, warn_possible_latch, warn_width_mismatch};
use crate::expr::{lower_phd_expr, lower_phd_lvalue};
use crate::unroll::unroll_stmts;

/// Unrolls, declares, and classifies a module's parsed body into `builder`.
pub fn elaborate_body(body: &[AstStmt], builder: &mut ModuleBuilder, env: &CompilationEnv) {
    let unrolled = unroll_stmts(body, &builder.params, env.sink);
    let behavior = collect_declarations(&unrolled, builder, env);
    lower_behavior_top(&behavior, builder, env.sink);
    check_latch_avoidance(builder, env.sink);
}

/// Warns about combinational signals driven only from inside conditional
/// branches with no unconditional default assignment ahead of them in the
/// same `always_comb` block — synthesis would infer a latch for these.
fn check_latch_avoidance(builder: &ModuleBuilder, sink: &DiagnosticSink) {
    let Some(comb) = builder.processes.iter().find(|p| matches!(p.kind, ProcessKind::Combinational)) else {
        return;
    };
    let mut defaulted: std::collections::HashSet<SignalId> = std::collections::HashSet::new();
    let mut warned: std::collections::HashSet<SignalId> = std::collections::HashSet::new();
    for stmt in &comb.body {
        match stmt {
            IrStmt::Assign { target, .. } => {
                defaulted.extend(lvalue_base_signals(target));
            }
            IrStmt::If { .. } | IrStmt::Case { .. } => {
                let mut conditional = Vec::new();
                collect_conditionally_assigned(stmt, &mut conditional);
                for (sid, span) in conditional {
                    if !defaulted.contains(&sid) && warned.insert(sid) {
                        let name = builder.ctx.interner.resolve(builder.signals.get(sid).name).to_string();
                        sink.emit(warn_possible_latch(&name, span));
                    }
                }
            }
        }
    }
}

/// Recursively collects every `(signal, span)` assigned anywhere inside a
/// conditional statement's branches.
fn collect_conditionally_assigned(stmt: &IrStmt, out: &mut Vec<(SignalId, Span)>) {
    match stmt {
        IrStmt::Assign { target, span, .. } => {
            out.extend(lvalue_base_signals(target).into_iter().map(|sid| (sid, *span)));
        }
        IrStmt::If { then_branch, else_branch, .. } => {
            for s in then_branch.iter().chain(else_branch.iter()) {
                collect_conditionally_assigned(s, out);
            }
        }
        IrStmt::Case { arms, .. } => {
            for arm in arms {
                for s in &arm.body {
                    collect_conditionally_assigned(s, out);
                }
            }
        }
    }
}

fn expr_is_bare_name(e: &AstExpr, builder: &ModuleBuilder, expected: &str) -> bool {
    matches!(e, AstExpr::Name { name, .. } if builder.ctx.interner.resolve(*name) == expected)
}

/// Evaluates a `bit[width]` or `bit[width][depth]` shape expression.
fn eval_shape_expr(e: &AstExpr, builder: &ModuleBuilder, sink: &DiagnosticSink) -> Option<Shape> {
    match e {
        AstExpr::Subscript {
            value,
            slice: SliceExpr::Index(w),
            ..
        } if expr_is_bare_name(value, builder, "bit") => {
            let width = eval_const_expr(w, &builder.params, sink)?;
            Some(Shape::Bits(width.max(1) as u32))
        }
        AstExpr::Subscript {
            value,
            slice: SliceExpr::Index(d),
            ..
        } => {
            if let AstExpr::Subscript {
                value: inner,
                slice: SliceExpr::Index(w),
                ..
            } = value.as_ref()
            {
                if expr_is_bare_name(inner, builder, "bit") {
                    let width = eval_const_expr(w, &builder.params, sink)?;
                    let depth = eval_const_expr(d, &builder.params, sink)?;
                    return Some(Shape::Memory {
                        width: width.max(1) as u32,
                        depth: depth.max(1) as u32,
                    });
                }
            }
            None
        }
        _ => None,
    }
}

/// Scans top-level `name = value` assignments for bare-constant parameter
/// declarations, so a submodule instantiation can fill in parameters it
/// doesn't explicitly override.
pub(crate) fn extract_param_defaults(body: &[AstStmt]) -> ConstEnv {
    let mut defaults = ConstEnv::new();
    for stmt in body {
        if let AstStmt::Assign {
            target: AstExpr::Name { name, .. },
            value: AstExpr::Constant { value, .. },
            ..
        } = stmt
        {
            defaults.insert(*name, *value);
        }
    }
    defaults
}

fn next_signal_id(builder: &ModuleBuilder) -> SignalId {
    SignalId::from_raw(builder.signals.len() as u32)
}

fn declare_nested_enum(class: &phd_ast::ClassDef, builder: &mut ModuleBuilder, sink: &DiagnosticSink) {
    let mut members = Vec::new();
    let mut member_map = HashMap::new();
    for stmt in &class.body {
        if let AstStmt::Assign {
            target: AstExpr::Name { name, .. },
            value,
            ..
        } = stmt
        {
            let Some(v) = eval_const_expr(value, &ConstEnv::new(), sink) else {
                continue;
            };
            members.push((*name, v));
            member_map.insert(*name, v);
        }
    }
    let width = EnumType::derive_width(&members);
    let decl = EnumType {
        name: class.name,
        members,
        width,
        span: class.span,
    };
    builder.declare_enum(
        EnumInfo {
            name: class.name,
            members: member_map,
        },
        decl,
    );
}

/// Tries to interpret `value` as a declaration for the not-yet-seen name
/// `name`. Returns `true` if it was handled (declared, or a diagnostic was
/// emitted for a malformed declaration), `false` if `value` doesn't look
/// like a declaration and the assignment should be treated as behavior.
fn try_declare(
    name: Ident,
    name_span: Span,
    value: &AstExpr,
    builder: &mut ModuleBuilder,
    env: &CompilationEnv,
) -> bool {
    // `target = inst.port`: alias a name to an already-instantiated output wire.
    if let AstExpr::Attribute { value: base, attr, .. } = value {
        if let AstExpr::Name { name: inst_name, .. } = base.as_ref() {
            if let Some(wire) = builder.lookup_instance_output(*inst_name, *attr) {
                builder.declare_signal(name, clone_signal_as_alias(builder, wire));
                return true;
            }
        }
    }

    if let AstExpr::Call { func, args, keywords, span } = value {
        if let AstExpr::Name { name: fname, .. } = func.as_ref() {
            let fname_str = builder.ctx.interner.resolve(*fname).to_string();
            if fname_str == "In" || fname_str == "Out" {
                match args.first().and_then(|a| eval_shape_expr(a, builder, env.sink)) {
                    Some(shape) => {
                        let direction = if fname_str == "In" {
                            PortDirection::Input
                        } else {
                            PortDirection::Output
                        };
                        let sig_id = next_signal_id(builder);
                        builder.declare_signal(
                            name,
                            Signal {
                                id: sig_id,
                                name,
                                shape,
                                ty: SignalType::Plain,
                                origin: SignalOrigin::Port,
                                span: name_span,
                            },
                        );
                        builder.ports.push(Port {
                            name,
                            direction,
                            shape,
                            signal: sig_id,
                            span: name_span,
                        });
                    }
                    None => {
                        env.sink.emit(error_non_static_expression(
                            "In()/Out() require a constant bit[...] width",
                            *span,
                        ));
                    }
                }
                return true;
            }
            if let Some(class) = env.registry.lookup(*fname) {
                instantiate_submodule(name, name_span, *fname, keywords, class, builder, env, *span);
                return true;
            }
        }
        return false;
    }

    if let Some(shape) = eval_shape_expr(value, builder, env.sink) {
        let sig_id = next_signal_id(builder);
        builder.declare_signal(
            name,
            Signal {
                id: sig_id,
                name,
                shape,
                ty: SignalType::Plain,
                origin: SignalOrigin::Internal,
                span: name_span,
            },
        );
        return true;
    }

    if let AstExpr::Constant { value: v, .. } = value {
        builder.param_decls.push(Parameter {
            name,
            value: *v,
            span: name_span,
        });
        builder.params.insert(name, *v);
        return true;
    }

    false
}

fn clone_signal_as_alias(builder: &ModuleBuilder, existing: SignalId) -> Signal {
    let src = builder.signals.get(existing);
    Signal {
        id: existing,
        name: src.name,
        shape: src.shape,
        ty: src.ty.clone(),
        origin: src.origin,
        span: src.span,
    }
}

fn instantiate_submodule(
    name: Ident,
    name_span: Span,
    template_name: Ident,
    keywords: &[phd_ast::Keyword],
    class: &phd_ast::ClassDef,
    builder: &mut ModuleBuilder,
    env: &CompilationEnv,
    span: Span,
) {
    let mut overrides = ConstEnv::new();
    for kw in keywords {
        if let Some(v) = eval_const_expr(&kw.value, &builder.params, env.sink) {
            overrides.insert(kw.name, v);
        }
    }
    let mut params = extract_param_defaults(&class.body);
    params.extend(overrides);

    let Some(module_id) = crate::elaborate_module(builder.ctx, env, template_name, params) else {
        return;
    };

    let ports: Vec<(Ident, PortDirection, Shape)> = builder.ctx.design.modules[module_id]
        .ports
        .iter()
        .map(|p| (p.name, p.direction, p.shape))
        .collect();

    let mut connections = Vec::new();
    let mut output_wires = Vec::new();
    let inst_label = builder.ctx.interner.resolve(name).to_string();
    for (port_name, direction, shape) in ports {
        match direction {
            PortDirection::Output => {
                let port_label = builder.ctx.interner.resolve(port_name).to_string();
                let wire_name = builder
                    .ctx
                    .interner
                    .get_or_intern(&format!("{inst_label}_{port_label}"));
                let wire_id = next_signal_id(builder);
                builder.declare_signal(
                    wire_name,
                    Signal {
                        id: wire_id,
                        name: wire_name,
                        shape,
                        ty: SignalType::Plain,
                        origin: SignalOrigin::IntermediateWire,
                        span: name_span,
                    },
                );
                connections.push(PortConnection {
                    port: port_name,
                    direction,
                    value: IrExpr::Signal(wire_id),
                });
                output_wires.push((port_name, wire_id));
            }
            PortDirection::Input => {
                connections.push(PortConnection {
                    port: port_name,
                    direction,
                    value: IrExpr::Literal(0),
                });
            }
        }
    }

    let instance = phd_ir::SubmoduleInstance {
        name,
        template: module_id,
        connections,
        span,
    };
    builder.declare_instance(name, instance, output_wires);
}

fn wire_instance_input(
    inst_name: Ident,
    port_name: Ident,
    value_expr: &AstExpr,
    builder: &mut ModuleBuilder,
    sink: &DiagnosticSink,
    span: Span,
) {
    let Some(idx) = builder.instance_index(inst_name) else {
        return;
    };
    let conn_idx = builder.instances[idx].connections.iter().position(|c| c.port == port_name);
    let is_input = conn_idx.is_some_and(|ci| builder.instances[idx].connections[ci].direction == PortDirection::Input);
    if conn_idx.is_none() || !is_input {
        let template_id = builder.instances[idx].template;
        let template_name = builder.ctx.design.modules[template_id].name;
        let port_label = builder.ctx.interner.resolve(port_name).to_string();
        let template_label = builder.ctx.interner.resolve(template_name).to_string();
        sink.emit(error_unknown_port(&port_label, &template_label, span));
        return;
    }
    let Some(value) = lower_phd_expr(value_expr, builder, sink) else {
        return;
    };
    let ci = conn_idx.unwrap();
    builder.instances[idx].connections[ci].value = value;
}

fn collect_declarations(body: &[AstStmt], builder: &mut ModuleBuilder, env: &CompilationEnv) -> Vec<AstStmt> {
    let mut behavior = Vec::new();
    for stmt in body {
        match stmt {
            AstStmt::ClassDef(class) => declare_nested_enum(class, builder, env.sink),
            AstStmt::Pass(_) => {}
            AstStmt::Assign { target, value, span } => {
                if let AstExpr::Attribute { value: base, attr, .. } = target {
                    if let AstExpr::Name { name: inst_name, .. } = base.as_ref() {
                        if builder.instance_index(*inst_name).is_some() {
                            wire_instance_input(*inst_name, *attr, value, builder, env.sink, *span);
                            continue;
                        }
                    }
                }
                if let AstExpr::Name { name, span: name_span } = target {
                    let already_known = builder.lookup_signal(*name).is_some()
                        || builder.params.contains_key(name)
                        || builder.instance_index(*name).is_some();
                    if !already_known && try_declare(*name, *name_span, value, builder, env) {
                        continue;
                    }
                }
                behavior.push(stmt.clone());
            }
            other => behavior.push(other.clone()),
        }
    }
    behavior
}

fn edge_sensitivity_of(expr: &AstExpr, builder: &ModuleBuilder) -> Option<EdgeSensitivity> {
    let AstExpr::Attribute { value, attr, .. } = expr else {
        return None;
    };
    let AstExpr::Name { name, .. } = value.as_ref() else {
        return None;
    };
    let attr_str = builder.ctx.interner.resolve(*attr);
    let edge = match attr_str {
        "posedge" => Edge::Posedge,
        "negedge" => Edge::Negedge,
        _ => return None,
    };
    let signal = builder.lookup_signal(*name)?;
    Some(EdgeSensitivity { signal, edge })
}

fn detect_edge_guard(test: &AstExpr, builder: &ModuleBuilder) -> Option<(EdgeSensitivity, Option<EdgeSensitivity>)> {
    match test {
        AstExpr::BoolOp { op: phd_ast::BoolOp::Or, values, .. } if values.len() >= 2 => {
            if !values.iter().all(|v| edge_sensitivity_of(v, builder).is_some()) {
                return None;
            }
            let clock = edge_sensitivity_of(&values[0], builder)?;
            let reset = edge_sensitivity_of(&values[1], builder);
            Some((clock, reset))
        }
        other => edge_sensitivity_of(other, builder).map(|clk| (clk, None)),
    }
}

fn local_expr_width(expr: &IrExpr, signals: &Arena<SignalId, Signal>) -> Option<u32> {
    match expr {
        IrExpr::Literal(_) => None,
        IrExpr::Signal(id) => Some(signals.get(*id).shape.width()),
        IrExpr::Slice { hi, lo, .. } => Some(hi - lo + 1),
        IrExpr::Index { .. } => Some(1),
        IrExpr::MemoryRead { base, .. } => Some(signals.get(*base).shape.width()),
        IrExpr::Concat(parts) => Some(parts.iter().map(|p| local_expr_width(p, signals).unwrap_or(1)).sum()),
        IrExpr::Unary(_, inner) => local_expr_width(inner, signals),
        IrExpr::Binary(op, l, r) => {
            if op.is_comparison() {
                Some(1)
            } else {
                match (local_expr_width(l, signals), local_expr_width(r, signals)) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (Some(a), None) | (None, Some(a)) => Some(a),
                    (None, None) => None,
                }
            }
        }
        IrExpr::EnumMember { .. } => None,
    }
}

fn lvalue_width(lvalue: &Lvalue, signals: &Arena<SignalId, Signal>) -> Option<u32> {
    match lvalue {
        Lvalue::Signal(id) => Some(signals.get(*id).shape.width()),
        Lvalue::Slice { hi, lo, .. } => Some(hi - lo + 1),
        Lvalue::Index { .. } => Some(1),
        Lvalue::MemoryWrite { base, .. } => Some(signals.get(*base).shape.width()),
        Lvalue::Concat(parts) => Some(parts.iter().map(|p| lvalue_width(p, signals).unwrap_or(1)).sum()),
    }
}

/// Determines the declared shape and type for a freshly-seen signal from the
/// value first assigned to it: an enum member gives it that enum's type and
/// derived width; anything else falls back to width inference over the
/// lowered expression, defaulting to the smallest width that holds a literal.
fn shape_and_type_for_value(ir_value: &IrExpr, builder: &ModuleBuilder) -> (Shape, SignalType) {
    if let IrExpr::EnumMember { ty, .. } = ir_value {
        if let Some(decl) = builder.enum_decls.iter().find(|e| e.name == *ty) {
            return (Shape::Bits(decl.width), SignalType::Enum { name: *ty });
        }
    }
    let width = local_expr_width(ir_value, &builder.signals)
        .or_else(|| match ir_value {
            IrExpr::Literal(v) => Some(phd_ir::expr::min_literal_width(*v)),
            _ => None,
        })
        .unwrap_or(1);
    (Shape::Bits(width), SignalType::Plain)
}

fn lvalue_base_signals(lvalue: &Lvalue) -> Vec<SignalId> {
    match lvalue {
        Lvalue::Signal(id) | Lvalue::Slice { base: id, .. } | Lvalue::Index { base: id, .. } => vec![*id],
        Lvalue::MemoryWrite { base, .. } => vec![*base],
        Lvalue::Concat(parts) => parts.iter().flat_map(lvalue_base_signals).collect(),
    }
}

fn lower_one_stmt(stmt: &AstStmt, bucket: Bucket, builder: &mut ModuleBuilder, sink: &DiagnosticSink) -> Option<IrStmt> {
    match stmt {
        AstStmt::Assign { target, value, span } => {
            if let AstExpr::Name { name, span: name_span } = target {
                let unknown = builder.lookup_signal(*name).is_none() && builder.params.get(name).is_none();
                if unknown {
                    let ir_value = lower_phd_expr(value, builder, sink)?;
                    let (shape, ty) = shape_and_type_for_value(&ir_value, builder);
                    let sig_id = next_signal_id(builder);
                    builder.declare_signal(
                        *name,
                        Signal {
                            id: sig_id,
                            name: *name,
                            shape,
                            ty,
                            origin: SignalOrigin::Internal,
                            span: *name_span,
                        },
                    );
                    builder.record_assignment_bucket(sig_id, bucket, *span, sink);
                    return Some(IrStmt::Assign {
                        target: Lvalue::Signal(sig_id),
                        value: ir_value,
                        span: *span,
                    });
                }
            }
            let lvalue = lower_phd_lvalue(target, builder, sink)?;
            let ir_value = lower_phd_expr(value, builder, sink)?;
            if let (Some(lhs_w), Some(rhs_w)) = (
                lvalue_width(&lvalue, &builder.signals),
                local_expr_width(&ir_value, &builder.signals),
            ) {
                if lhs_w != rhs_w {
                    sink.emit(warn_width_mismatch(lhs_w, rhs_w, *span));
                }
            }
            for sid in lvalue_base_signals(&lvalue) {
                builder.record_assignment_bucket(sid, bucket, *span, sink);
            }
            Some(IrStmt::Assign {
                target: lvalue,
                value: ir_value,
                span: *span,
            })
        }
        AstStmt::If { test, body, orelse, span } => {
            let cond = lower_phd_expr(test, builder, sink)?;
            let then_branch = lower_nested_stmts(body, bucket, builder, sink);
            let else_branch = lower_nested_stmts(orelse, bucket, builder, sink);
            Some(IrStmt::If {
                cond,
                then_branch,
                else_branch,
                span: *span,
            })
        }
        AstStmt::Match { subject, cases, span } => {
            let selector = lower_phd_expr(subject, builder, sink)?;
            let arms = cases
                .iter()
                .filter_map(|c| match &c.pattern {
                    Pattern::Value(e) => {
                        let label = lower_phd_expr(e, builder, sink)?;
                        let body = lower_nested_stmts(&c.body, bucket, builder, sink);
                        Some(CaseArm { label, body })
                    }
                    Pattern::Wildcard => None,
                })
                .collect();
            Some(IrStmt::Case {
                selector,
                arms,
                span: *span,
            })
        }
        AstStmt::ClassDef(_) | AstStmt::Pass(_) | AstStmt::Error(_) | AstStmt::For { .. } => None,
    }
}

fn lower_nested_stmts(stmts: &[AstStmt], bucket: Bucket, builder: &mut ModuleBuilder, sink: &DiagnosticSink) -> Vec<IrStmt> {
    stmts.iter().filter_map(|s| lower_one_stmt(s, bucket, builder, sink)).collect()
}

fn lower_behavior_top(stmts: &[AstStmt], builder: &mut ModuleBuilder, sink: &DiagnosticSink) {
    for stmt in stmts {
        if let AstStmt::If { test, body, orelse, .. } = stmt {
            if let Some((clock, reset)) = detect_edge_guard(test, builder) {
                let bucket = Bucket::Seq(clock, reset);
                let then_ir = lower_nested_stmts(body, bucket, builder, sink);
                let else_ir = lower_nested_stmts(orelse, bucket, builder, sink);
                let idx = builder.ensure_process(bucket);
                builder.processes[idx].body.extend(then_ir);
                builder.processes[idx].body.extend(else_ir);
                continue;
            }
        }
        if let Some(ir_stmt) = lower_one_stmt(stmt, Bucket::Comb, builder, sink) {
            let idx = builder.ensure_process(Bucket::Comb);
            builder.processes[idx].body.push(ir_stmt);
        }
    }
}

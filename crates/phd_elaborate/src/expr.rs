//! Lowers [`phd_ast::Expr`] into [`phd_ir::Expr`]/[`phd_ir::Lvalue`], resolving
//! names against the signal table, enum types, and bound parameters.

use phd_ast::{BinaryOp as AstBinOp, BoolOp, CompareOp, Expr as AstExpr, SliceExpr, UnaryOp as AstUnOp};
use phd_diagnostics::DiagnosticSink;
use phd_ir::expr::{BinaryOp as IrBinOp, UnaryOp as IrUnOp};
use phd_ir::shape::Shape;
use phd_ir::{Expr as IrExpr, Lvalue};

use crate::const_eval::eval_const_expr;
use crate::context::ModuleBuilder;
use crate::errors::{error_index_out_of_bounds, error_non_static_expression, error_undeclared_name};

fn map_unary_op(op: AstUnOp) -> IrUnOp {
    match op {
        AstUnOp::Neg => IrUnOp::Neg,
        AstUnOp::Pos => IrUnOp::Pos,
        AstUnOp::BitNot => IrUnOp::BitNot,
        AstUnOp::Not => IrUnOp::Not,
    }
}

fn map_binary_op(op: AstBinOp) -> IrBinOp {
    match op {
        AstBinOp::Add => IrBinOp::Add,
        AstBinOp::Sub => IrBinOp::Sub,
        AstBinOp::Mul => IrBinOp::Mul,
        AstBinOp::Div => IrBinOp::Div,
        AstBinOp::Mod => IrBinOp::Mod,
        AstBinOp::Shl => IrBinOp::Shl,
        AstBinOp::Shr => IrBinOp::Shr,
        AstBinOp::BitAnd => IrBinOp::BitAnd,
        AstBinOp::BitOr => IrBinOp::BitOr,
        AstBinOp::BitXor => IrBinOp::BitXor,
    }
}

fn map_compare_op(op: CompareOp) -> IrBinOp {
    match op {
        CompareOp::Eq => IrBinOp::Eq,
        CompareOp::Neq => IrBinOp::Neq,
        CompareOp::Lt => IrBinOp::Lt,
        CompareOp::Le => IrBinOp::Le,
        CompareOp::Gt => IrBinOp::Gt,
        CompareOp::Ge => IrBinOp::Ge,
    }
}

fn map_bool_op(op: BoolOp) -> IrBinOp {
    match op {
        BoolOp::And => IrBinOp::And,
        BoolOp::Or => IrBinOp::Or,
    }
}

/// Resolves `value` (expected to be a bare name) to the signal it refers to,
/// along with that signal's shape.
fn resolve_base_signal(
    value: &AstExpr,
    builder: &ModuleBuilder,
    sink: &DiagnosticSink,
) -> Option<(phd_ir::SignalId, Shape)> {
    let AstExpr::Name { name, span } = value else {
        sink.emit(error_non_static_expression(
            "only a plain signal name can be sliced or indexed",
            value.span(),
        ));
        return None;
    };
    match builder.lookup_signal(*name) {
        Some(id) => Some((id, builder.signals.get(id).shape)),
        None => {
            let label = builder.ctx.interner.resolve(*name);
            sink.emit(error_undeclared_name(label, *span));
            None
        }
    }
}

/// Lowers a subscript `value[slice]` to either a bit-select/slice of a plain
/// signal (both bounds must be constant) or a memory word read/write (the
/// index may be an arbitrary expression).
enum SubscriptTarget {
    Index(phd_ir::SignalId, u32),
    Slice(phd_ir::SignalId, u32, u32),
    MemoryAccess(phd_ir::SignalId, IrExpr),
}

fn lower_subscript(
    value: &AstExpr,
    slice: &SliceExpr,
    builder: &mut ModuleBuilder,
    sink: &DiagnosticSink,
) -> Option<SubscriptTarget> {
    let (base, shape) = resolve_base_signal(value, builder, sink)?;
    match shape {
        Shape::Memory { .. } => {
            let SliceExpr::Index(idx) = slice else {
                sink.emit(error_non_static_expression(
                    "a memory only supports single-word indexing, not a range",
                    value.span(),
                ));
                return None;
            };
            let index = lower_phd_expr(idx, builder, sink)?;
            Some(SubscriptTarget::MemoryAccess(base, index))
        }
        Shape::Bits(width) => match slice {
            SliceExpr::Index(idx) => {
                let i = eval_const_expr(idx, &builder.params, sink)?;
                if i < 0 || i as u32 >= width {
                    let name = builder.ctx.interner.resolve(builder.signals.get(base).name);
                    sink.emit(error_index_out_of_bounds(name, i, width, idx.span()));
                    return None;
                }
                Some(SubscriptTarget::Index(base, i as u32))
            }
            SliceExpr::Range { hi, lo } => {
                let hi_v = eval_const_expr(hi, &builder.params, sink)?;
                let lo_v = eval_const_expr(lo, &builder.params, sink)?;
                if hi_v < lo_v || hi_v as u32 >= width {
                    let name = builder.ctx.interner.resolve(builder.signals.get(base).name);
                    sink.emit(error_index_out_of_bounds(name, hi_v, width, hi.span()));
                    return None;
                }
                Some(SubscriptTarget::Slice(base, hi_v as u32, lo_v as u32))
            }
        },
    }
}

/// Lowers an `inst.port` attribute access to the output port's intermediate
/// wire, if `value` names a declared submodule instance.
fn try_lower_instance_read(
    value: &AstExpr,
    attr: phd_common::Ident,
    builder: &ModuleBuilder,
) -> Option<phd_ir::SignalId> {
    let AstExpr::Name { name, .. } = value else {
        return None;
    };
    builder.lookup_instance_output(*name, attr)
}

/// Lowers a `phd_ast` expression to a read-context [`phd_ir::Expr`].
pub fn lower_phd_expr(expr: &AstExpr, builder: &mut ModuleBuilder, sink: &DiagnosticSink) -> Option<IrExpr> {
    match expr {
        AstExpr::Constant { value, .. } => Some(IrExpr::Literal(*value)),
        AstExpr::Name { name, span } => {
            if let Some(id) = builder.lookup_signal(*name) {
                return Some(IrExpr::Signal(id));
            }
            if let Some(value) = builder.params.get(name) {
                return Some(IrExpr::Literal(*value));
            }
            let label = builder.ctx.interner.resolve(*name);
            sink.emit(error_undeclared_name(label, *span));
            None
        }
        AstExpr::Unary { op, operand, .. } => {
            let inner = lower_phd_expr(operand, builder, sink)?;
            Some(IrExpr::Unary(map_unary_op(*op), Box::new(inner)))
        }
        AstExpr::Binary { left, op, right, .. } => {
            let l = lower_phd_expr(left, builder, sink)?;
            let r = lower_phd_expr(right, builder, sink)?;
            Some(IrExpr::Binary(map_binary_op(*op), Box::new(l), Box::new(r)))
        }
        AstExpr::Compare { left, op, right, .. } => {
            let l = lower_phd_expr(left, builder, sink)?;
            let r = lower_phd_expr(right, builder, sink)?;
            Some(IrExpr::Binary(map_compare_op(*op), Box::new(l), Box::new(r)))
        }
        AstExpr::BoolOp { op, values, .. } => {
            let mut iter = values.iter();
            let first = lower_phd_expr(iter.next()?, builder, sink)?;
            iter.try_fold(first, |acc, v| {
                let rhs = lower_phd_expr(v, builder, sink)?;
                Some(IrExpr::Binary(map_bool_op(*op), Box::new(acc), Box::new(rhs)))
            })
        }
        AstExpr::Attribute { value, attr, span } => {
            if let AstExpr::Name { name: base_name, .. } = value.as_ref() {
                if let Some(enum_info) = builder.enums.get(base_name) {
                    if let Some(member_value) = enum_info.members.get(attr) {
                        return Some(IrExpr::EnumMember {
                            ty: enum_info.name,
                            member: *attr,
                            value: *member_value,
                        });
                    }
                }
            }
            if let Some(wire) = try_lower_instance_read(value, *attr, builder) {
                return Some(IrExpr::Signal(wire));
            }
            sink.emit(error_non_static_expression(
                "attribute access must be an enum member or a submodule output port",
                *span,
            ));
            None
        }
        AstExpr::Subscript { value, slice, .. } => match lower_subscript(value, slice, builder, sink)? {
            SubscriptTarget::Index(base, index) => Some(IrExpr::Index { base, index }),
            SubscriptTarget::Slice(base, hi, lo) => Some(IrExpr::Slice { base, hi, lo }),
            SubscriptTarget::MemoryAccess(base, index) => Some(IrExpr::MemoryRead {
                base,
                index: Box::new(index),
            }),
        },
        AstExpr::Tuple { elements, .. } => {
            let parts = elements
                .iter()
                .map(|e| lower_phd_expr(e, builder, sink))
                .collect::<Option<Vec<_>>>()?;
            Some(IrExpr::Concat(parts))
        }
        AstExpr::Call { span, .. } => {
            sink.emit(error_non_static_expression(
                "a call is only valid as a port wrapper, submodule instantiation, or range(...) bound",
                *span,
            ));
            None
        }
        AstExpr::Error(_) => None,
    }
}

/// Lowers a `phd_ast` expression used as an assignment target to a
/// [`phd_ir::Lvalue`].
pub fn lower_phd_lvalue(expr: &AstExpr, builder: &mut ModuleBuilder, sink: &DiagnosticSink) -> Option<Lvalue> {
    match expr {
        AstExpr::Name { name, span } => match builder.lookup_signal(*name) {
            Some(id) => Some(Lvalue::Signal(id)),
            None => {
                let label = builder.ctx.interner.resolve(*name);
                sink.emit(error_undeclared_name(label, *span));
                None
            }
        },
        AstExpr::Subscript { value, slice, .. } => match lower_subscript(value, slice, builder, sink)? {
            SubscriptTarget::Index(base, index) => Some(Lvalue::Index { base, index }),
            SubscriptTarget::Slice(base, hi, lo) => Some(Lvalue::Slice { base, hi, lo }),
            SubscriptTarget::MemoryAccess(base, index) => Some(Lvalue::MemoryWrite {
                base,
                index: Box::new(index),
            }),
        },
        AstExpr::Tuple { elements, .. } => {
            let parts = elements
                .iter()
                .map(|e| lower_phd_lvalue(e, builder, sink))
                .collect::<Option<Vec<_>>>()?;
            Some(Lvalue::Concat(parts))
        }
        other => {
            sink.emit(error_non_static_expression(
                "not a valid assignment target",
                other.span(),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ElaborationContext;
    use phd_common::{Ident, Interner};
    use phd_ir::signal::{Signal, SignalOrigin, SignalType};
    use phd_source::Span;

    fn setup() -> (ElaborationContext, DiagnosticSink) {
        (ElaborationContext::new(Interner::new()), DiagnosticSink::new())
    }

    fn lit(v: i64) -> AstExpr {
        AstExpr::Constant { value: v, span: Span::DUMMY }
    }

    #[test]
    fn lowers_literal() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let e = lower_phd_expr(&lit(5), &mut builder, &sink).unwrap();
        assert!(matches!(e, IrExpr::Literal(5)));
    }

    #[test]
    fn lowers_signal_name() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let name = Ident::from_raw(0);
        let sig = Signal {
            id: phd_ir::SignalId::from_raw(0),
            name,
            shape: Shape::Bits(8),
            ty: SignalType::Plain,
            origin: SignalOrigin::Internal,
            span: Span::DUMMY,
        };
        builder.declare_signal(name, sig);
        let e = AstExpr::Name { name, span: Span::DUMMY };
        let lowered = lower_phd_expr(&e, &mut builder, &sink).unwrap();
        assert!(matches!(lowered, IrExpr::Signal(_)));
    }

    #[test]
    fn undeclared_name_errors() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let e = AstExpr::Name { name: Ident::from_raw(5), span: Span::DUMMY };
        assert!(lower_phd_expr(&e, &mut builder, &sink).is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn slice_with_constant_bounds() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let name = Ident::from_raw(0);
        let sig = Signal {
            id: phd_ir::SignalId::from_raw(0),
            name,
            shape: Shape::Bits(8),
            ty: SignalType::Plain,
            origin: SignalOrigin::Internal,
            span: Span::DUMMY,
        };
        builder.declare_signal(name, sig);
        let e = AstExpr::Subscript {
            value: Box::new(AstExpr::Name { name, span: Span::DUMMY }),
            slice: SliceExpr::Range { hi: Box::new(lit(3)), lo: Box::new(lit(0)) },
            span: Span::DUMMY,
        };
        let lowered = lower_phd_expr(&e, &mut builder, &sink).unwrap();
        assert!(matches!(lowered, IrExpr::Slice { hi: 3, lo: 0, .. }));
    }

    #[test]
    fn out_of_bounds_index_errors() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let name = Ident::from_raw(0);
        let sig = Signal {
            id: phd_ir::SignalId::from_raw(0),
            name,
            shape: Shape::Bits(8),
            ty: SignalType::Plain,
            origin: SignalOrigin::Internal,
            span: Span::DUMMY,
        };
        builder.declare_signal(name, sig);
        let e = AstExpr::Subscript {
            value: Box::new(AstExpr::Name { name, span: Span::DUMMY }),
            slice: SliceExpr::Index(Box::new(lit(9))),
            span: Span::DUMMY,
        };
        assert!(lower_phd_expr(&e, &mut builder, &sink).is_none());
        assert!(sink.has_errors());
    }

    #[test]
    fn tuple_lowers_to_concat() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let e = AstExpr::Tuple {
            elements: vec![lit(1), lit(0)],
            span: Span::DUMMY,
        };
        let lowered = lower_phd_expr(&e, &mut builder, &sink).unwrap();
        assert!(matches!(lowered, IrExpr::Concat(parts) if parts.len() == 2));
    }

    #[test]
    fn enum_member_attribute_resolves() {
        let (mut ctx, sink) = setup();
        let mut builder = ModuleBuilder::new(&mut ctx, Default::default(), vec![]);
        let ty_name = Ident::from_raw(1);
        let member_name = Ident::from_raw(2);
        let mut members = std::collections::HashMap::new();
        members.insert(member_name, 0);
        builder.declare_enum(
            crate::context::EnumInfo { name: ty_name, members },
            phd_ir::EnumType { name: ty_name, members: vec![(member_name, 0)], width: 1, span: Span::DUMMY },
        );
        let e = AstExpr::Attribute {
            value: Box::new(AstExpr::Name { name: ty_name, span: Span::DUMMY }),
            attr: member_name,
            span: Span::DUMMY,
        };
        let lowered = lower_phd_expr(&e, &mut builder, &sink).unwrap();
        assert!(matches!(lowered, IrExpr::EnumMember { .. }));
    }
}

//! Expression and lvalue rendering, including the width inference that
//! sizes bare integer literals against their surrounding context.

use phd_common::Interner;
use phd_ir::expr::{min_literal_width, BinaryOp, UnaryOp};
use phd_ir::stmt::Lvalue;
use phd_ir::{Expr, Module};

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Pos => "+",
        UnaryOp::BitNot => "~",
        UnaryOp::Not => "!",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Eq => "==",
        BinaryOp::Neq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
    }
}

/// Width an expression resolves to on its own, ignoring any hint from an
/// enclosing lvalue or sibling operand. Mirrors [`phd_ir::expr::expr_width`];
/// duplicated here because this crate renders straight from `&Module`
/// without re-deriving the elaborator's in-progress arena.
fn intrinsic_width(expr: &Expr, module: &Module) -> Option<u32> {
    phd_ir::expr::expr_width(expr, module)
}

/// Renders `value` sized under `hint` (the width an enclosing lvalue or
/// sibling operand suggests), falling back to the smallest width that holds
/// a bare literal when no hint is available.
pub fn render_expr(expr: &Expr, module: &Module, interner: &Interner, hint: Option<u32>) -> String {
    match expr {
        Expr::Literal(v) => {
            let width = hint.unwrap_or_else(|| min_literal_width(*v));
            render_literal(*v, width)
        }
        Expr::Signal(id) => interner.resolve(module.signals.get(*id).name).to_string(),
        Expr::Slice { base, hi, lo } => {
            format!("{}[{hi}:{lo}]", interner.resolve(module.signals.get(*base).name))
        }
        Expr::Index { base, index } => {
            format!("{}[{index}]", interner.resolve(module.signals.get(*base).name))
        }
        Expr::MemoryRead { base, index } => {
            let idx = render_expr(index, module, interner, None);
            format!("{}[{idx}]", interner.resolve(module.signals.get(*base).name))
        }
        Expr::Concat(parts) => {
            let rendered: Vec<String> = parts.iter().map(|p| render_expr(p, module, interner, None)).collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Expr::Unary(op, inner) => {
            format!("({}{})", unary_symbol(*op), render_expr(inner, module, interner, hint))
        }
        Expr::Binary(op, lhs, rhs) => {
            let (l_hint, r_hint) = operand_hints(lhs, rhs, module, hint);
            format!(
                "({} {} {})",
                render_expr(lhs, module, interner, l_hint),
                binary_symbol(*op),
                render_expr(rhs, module, interner, r_hint),
            )
        }
        Expr::EnumMember { member, .. } => interner.resolve(*member).to_string(),
    }
}

/// Picks the width each binary operand should render its own literals under:
/// the operand's own intrinsic width if it has one, else its sibling's, else
/// whatever hint the enclosing context supplied.
fn operand_hints(lhs: &Expr, rhs: &Expr, module: &Module, outer: Option<u32>) -> (Option<u32>, Option<u32>) {
    let lw = intrinsic_width(lhs, module);
    let rw = intrinsic_width(rhs, module);
    let l_hint = lw.or(rw).or(outer);
    let r_hint = rw.or(lw).or(outer);
    (l_hint, r_hint)
}

fn render_literal(value: i64, width: u32) -> String {
    if value < 0 {
        let mask: u128 = if width >= 128 { u128::MAX } else { (1u128 << width) - 1 };
        let bits = (value as i128 as u128) & mask;
        format!("{width}'d{bits}")
    } else {
        format!("{width}'d{value}")
    }
}

/// Renders an assignment target. Unlike [`render_expr`], lvalues never need
/// a width hint: every variant already carries its own concrete width.
pub fn render_lvalue(lvalue: &Lvalue, module: &Module, interner: &Interner) -> String {
    match lvalue {
        Lvalue::Signal(id) => interner.resolve(module.signals.get(*id).name).to_string(),
        Lvalue::Slice { base, hi, lo } => {
            format!("{}[{hi}:{lo}]", interner.resolve(module.signals.get(*base).name))
        }
        Lvalue::Index { base, index } => {
            format!("{}[{index}]", interner.resolve(module.signals.get(*base).name))
        }
        Lvalue::MemoryWrite { base, index } => {
            let idx = render_expr(index, module, interner, None);
            format!("{}[{idx}]", interner.resolve(module.signals.get(*base).name))
        }
        Lvalue::Concat(parts) => {
            let rendered: Vec<String> = parts.iter().map(|p| render_lvalue(p, module, interner)).collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

/// Width of an assignment target, used to size a literal assigned directly
/// to it. A [`Lvalue::MemoryWrite`] reports the memory's element width; if
/// the base signal's shape were ever something other than a memory (it never
/// is, by construction) this would silently fall back to that shape's own
/// width rather than failing, which is the one documented gap in literal
/// sizing for memory writes.
pub fn lvalue_width(lvalue: &Lvalue, module: &Module) -> u32 {
    match lvalue {
        Lvalue::Signal(id) => module.signals.get(*id).shape.width(),
        Lvalue::Slice { hi, lo, .. } => hi - lo + 1,
        Lvalue::Index { .. } => 1,
        Lvalue::MemoryWrite { base, .. } => module.signals.get(*base).shape.width(),
        Lvalue::Concat(parts) => parts.iter().map(|p| lvalue_width(p, module)).sum(),
    }
}

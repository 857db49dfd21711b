//! Lowers a `rustpython_parser` AST into [`phd_ast`].
//!
//! The dialect reuses Python's grammar wholesale, so parsing is delegated
//! to `rustpython-parser`. This module's only job is translating the
//! resulting tree into our own tagged-variant AST and attaching spans.

use phd_ast::{
    BinaryOp, BoolOp, ClassDef, CompareOp, Expr, Keyword, MatchCase, Pattern, SliceExpr,
    SourceFile, Stmt, UnaryOp,
};
use phd_common::Interner;
use phd_diagnostics::DiagnosticSink;
use phd_source::{FileId, Span};
use rustpython_ast::{self as py, Ranged};
use rustpython_parser::Parse;

use crate::errors::error_parse;

struct Lowerer<'a> {
    file: FileId,
    interner: &'a Interner,
    sink: &'a DiagnosticSink,
}

fn span(file: FileId, range: rustpython_ast::TextRange) -> Span {
    Span::new(file, range.start().to_u32(), range.end().to_u32())
}

impl<'a> Lowerer<'a> {
    fn span(&self, range: rustpython_ast::TextRange) -> Span {
        span(self.file, range)
    }

    fn lower_body(&self, body: Vec<py::Stmt>) -> Vec<Stmt> {
        body.into_iter().map(|s| self.lower_stmt(s)).collect()
    }

    fn lower_stmt(&self, stmt: py::Stmt) -> Stmt {
        let range = stmt.range();
        match stmt {
            py::Stmt::ClassDef(class) => Stmt::ClassDef(self.lower_class_def(class)),
            py::Stmt::Assign(assign) => {
                if assign.targets.len() != 1 {
                    self.sink.emit(error_parse(
                        "only single-target assignment is supported",
                        self.span(range),
                    ));
                    return Stmt::Error(self.span(range));
                }
                Stmt::Assign {
                    target: self.lower_expr(assign.targets.into_iter().next().unwrap()),
                    value: self.lower_expr(*assign.value),
                    span: self.span(range),
                }
            }
            py::Stmt::If(if_stmt) => Stmt::If {
                test: self.lower_expr(*if_stmt.test),
                body: self.lower_body(if_stmt.body),
                orelse: self.lower_body(if_stmt.orelse),
                span: self.span(range),
            },
            py::Stmt::For(for_stmt) => {
                let target = match *for_stmt.target {
                    py::Expr::Name(name) => self.interner.get_or_intern(name.id.as_str()),
                    other => {
                        self.sink.emit(error_parse(
                            "loop variable must be a plain name",
                            self.span(other.range()),
                        ));
                        self.interner.get_or_intern("<error>")
                    }
                };
                Stmt::For {
                    target,
                    iter: self.lower_expr(*for_stmt.iter),
                    body: self.lower_body(for_stmt.body),
                    span: self.span(range),
                }
            }
            py::Stmt::Match(match_stmt) => Stmt::Match {
                subject: self.lower_expr(*match_stmt.subject),
                cases: match_stmt
                    .cases
                    .into_iter()
                    .map(|c| self.lower_match_case(c))
                    .collect(),
                span: self.span(range),
            },
            py::Stmt::Pass(p) => Stmt::Pass(self.span(p.range)),
            py::Stmt::Expr(_) => Stmt::Pass(self.span(range)),
            other => {
                self.sink.emit(error_parse(
                    "statement is not supported by the dialect",
                    self.span(other.range()),
                ));
                Stmt::Error(self.span(other.range()))
            }
        }
    }

    fn lower_match_case(&self, case: py::MatchCase) -> MatchCase {
        let span = self.span(case.pattern.range());
        let pattern = match case.pattern {
            py::Pattern::MatchValue(v) => Pattern::Value(self.lower_expr(*v.value)),
            py::Pattern::MatchAs(a) if a.pattern.is_none() => Pattern::Wildcard,
            other => {
                self.sink.emit(error_parse(
                    "match patterns must be a constant value or `_`",
                    self.span(other.range()),
                ));
                Pattern::Wildcard
            }
        };
        MatchCase {
            pattern,
            body: self.lower_body(case.body),
            span,
        }
    }

    fn lower_class_def(&self, class: py::StmtClassDef) -> ClassDef {
        let span = self.span(class.range);
        let bases = class
            .bases
            .into_iter()
            .filter_map(|b| match b {
                py::Expr::Name(name) => Some(self.interner.get_or_intern(name.id.as_str())),
                other => {
                    self.sink.emit(error_parse(
                        "base class must be a plain name",
                        self.span(other.range()),
                    ));
                    None
                }
            })
            .collect();
        ClassDef {
            name: self.interner.get_or_intern(class.name.as_str()),
            bases,
            body: self.lower_body(class.body),
            span,
        }
    }

    fn lower_expr(&self, expr: py::Expr) -> Expr {
        let range = expr.range();
        let span = self.span(range);
        match expr {
            py::Expr::Name(n) => Expr::Name {
                name: self.interner.get_or_intern(n.id.as_str()),
                span,
            },
            py::Expr::Constant(c) => match c.value {
                py::Constant::Int(big) => match big.to_string().parse::<i64>() {
                    Ok(value) => Expr::Constant { value, span },
                    Err(_) => {
                        self.sink
                            .emit(error_parse("integer literal out of range", span));
                        Expr::Error(span)
                    }
                },
                py::Constant::Bool(b) => Expr::Constant {
                    value: b as i64,
                    span,
                },
                _ => {
                    self.sink
                        .emit(error_parse("only integer literals are supported", span));
                    Expr::Error(span)
                }
            },
            py::Expr::UnaryOp(u) => {
                let op = match u.op {
                    py::UnaryOp::USub => UnaryOp::Neg,
                    py::UnaryOp::UAdd => UnaryOp::Pos,
                    py::UnaryOp::Invert => UnaryOp::BitNot,
                    py::UnaryOp::Not => UnaryOp::Not,
                };
                Expr::Unary {
                    op,
                    operand: Box::new(self.lower_expr(*u.operand)),
                    span,
                }
            }
            py::Expr::BinOp(b) => match self.map_binary_op(b.op) {
                Some(op) => Expr::Binary {
                    left: Box::new(self.lower_expr(*b.left)),
                    op,
                    right: Box::new(self.lower_expr(*b.right)),
                    span,
                },
                None => {
                    self.sink.emit(error_parse("unsupported operator", span));
                    Expr::Error(span)
                }
            },
            py::Expr::BoolOp(b) => {
                let op = match b.op {
                    py::BoolOp::And => BoolOp::And,
                    py::BoolOp::Or => BoolOp::Or,
                };
                Expr::BoolOp {
                    op,
                    values: b.values.into_iter().map(|v| self.lower_expr(v)).collect(),
                    span,
                }
            }
            py::Expr::Compare(c) => {
                if c.ops.len() != 1 || c.comparators.len() != 1 {
                    self.sink
                        .emit(error_parse("chained comparisons are not supported", span));
                    return Expr::Error(span);
                }
                let op = match c.ops[0] {
                    py::CmpOp::Eq => CompareOp::Eq,
                    py::CmpOp::NotEq => CompareOp::Neq,
                    py::CmpOp::Lt => CompareOp::Lt,
                    py::CmpOp::LtE => CompareOp::Le,
                    py::CmpOp::Gt => CompareOp::Gt,
                    py::CmpOp::GtE => CompareOp::Ge,
                    _ => {
                        self.sink
                            .emit(error_parse("unsupported comparison operator", span));
                        return Expr::Error(span);
                    }
                };
                Expr::Compare {
                    left: Box::new(self.lower_expr(*c.left)),
                    op,
                    right: Box::new(self.lower_expr(c.comparators.into_iter().next().unwrap())),
                    span,
                }
            }
            py::Expr::Attribute(a) => Expr::Attribute {
                value: Box::new(self.lower_expr(*a.value)),
                attr: self.interner.get_or_intern(a.attr.as_str()),
                span,
            },
            py::Expr::Subscript(s) => {
                let slice = match *s.slice {
                    py::Expr::Slice(sl) => {
                        let lo = sl.lower.map(|e| self.lower_expr(*e)).unwrap_or(Expr::Error(span));
                        let hi = sl.upper.map(|e| self.lower_expr(*e)).unwrap_or(Expr::Error(span));
                        SliceExpr::Range {
                            hi: Box::new(hi),
                            lo: Box::new(lo),
                        }
                    }
                    other => SliceExpr::Index(Box::new(self.lower_expr(other))),
                };
                Expr::Subscript {
                    value: Box::new(self.lower_expr(*s.value)),
                    slice,
                    span,
                }
            }
            py::Expr::Call(c) => Expr::Call {
                func: Box::new(self.lower_expr(*c.func)),
                args: c.args.into_iter().map(|a| self.lower_expr(a)).collect(),
                keywords: c
                    .keywords
                    .into_iter()
                    .filter_map(|k| {
                        let name = k.arg.as_ref().map(|a| self.interner.get_or_intern(a.as_str()));
                        match name {
                            Some(name) => Some(Keyword {
                                name,
                                value: self.lower_expr(k.value),
                            }),
                            None => {
                                self.sink.emit(error_parse(
                                    "`**kwargs` is not supported",
                                    self.span(k.range()),
                                ));
                                None
                            }
                        }
                    })
                    .collect(),
                span,
            },
            py::Expr::Tuple(t) => Expr::Tuple {
                elements: t.elts.into_iter().map(|e| self.lower_expr(e)).collect(),
                span,
            },
            other => {
                self.sink.emit(error_parse(
                    "expression is not supported by the dialect",
                    span,
                ));
                let _ = other;
                Expr::Error(span)
            }
        }
    }

    fn map_binary_op(&self, op: py::Operator) -> Option<BinaryOp> {
        Some(match op {
            py::Operator::Add => BinaryOp::Add,
            py::Operator::Sub => BinaryOp::Sub,
            py::Operator::Mult => BinaryOp::Mul,
            py::Operator::Div | py::Operator::FloorDiv => BinaryOp::Div,
            py::Operator::Mod => BinaryOp::Mod,
            py::Operator::LShift => BinaryOp::Shl,
            py::Operator::RShift => BinaryOp::Shr,
            py::Operator::BitAnd => BinaryOp::BitAnd,
            py::Operator::BitOr => BinaryOp::BitOr,
            py::Operator::BitXor => BinaryOp::BitXor,
            _ => return None,
        })
    }
}

/// Parses `.phd` source text into a [`SourceFile`].
///
/// Delegates grammar parsing to `rustpython-parser`, then lowers the
/// resulting tree into our own AST. Parse errors and unsupported
/// constructs are reported to `sink`; the corresponding node becomes an
/// `Error` node so the rest of the file can still be lowered.
pub fn parse_file(
    file_id: FileId,
    source: &str,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> SourceFile {
    let mut out = SourceFile::new(file_id);
    let suite = match py::Suite::parse(source, "<phd>") {
        Ok(suite) => suite,
        Err(err) => {
            sink.emit(error_parse(err.to_string(), Span::DUMMY));
            return out;
        }
    };

    let lowerer = Lowerer {
        file: file_id,
        interner,
        sink,
    };

    for stmt in suite {
        match stmt {
            py::Stmt::ClassDef(class) => out.items.push(lowerer.lower_class_def(class)),
            py::Stmt::Import(_) | py::Stmt::ImportFrom(_) | py::Stmt::Pass(_) => {}
            py::Stmt::Expr(e) if matches!(*e.value, py::Expr::Constant(_)) => {}
            other => {
                sink.emit(error_parse(
                    "only class definitions are allowed at the top level",
                    lowerer.span(other.range()),
                ));
            }
        }
    }

    out
}

//! AST-to-IR elaboration: module collection, monomorphization, constant
//! folding, loop unrolling, and statement classification.
//!
//! [`elaborate`] is the single entry point. It builds a [`ModuleRegistry`]
//! from every parsed source file, elaborates each independently-emitted
//! root module (one not instantiated as a submodule anywhere else), and
//! recursively monomorphizes every submodule template it instantiates
//! along the way, memoized by `(template, bound parameters)`.

#![warn(missing_docs)]

mod const_eval;
mod context;
mod errors;
mod expr;
mod registry;
mod stmt;
mod unroll;

use phd_ast::SourceFile;
use phd_common::{ContentHash, Ident, Interner};
use phd_diagnostics::DiagnosticSink;
use phd_ir::{ModuleId, Parameter};

pub use const_eval::ConstEnv;
pub use context::{Bucket, CompilationEnv, ElaborationContext, EnumInfo, ModuleBuilder};
pub use registry::ModuleRegistry;

/// Elaborates every root module discovered across `files` into a populated
/// [`ElaborationContext`] (design plus the interner that names its signals).
pub fn elaborate(files: &[SourceFile], interner: Interner, sink: &DiagnosticSink) -> ElaborationContext {
    let registry = ModuleRegistry::from_source_files(files, &interner, sink);
    let mut ctx = ElaborationContext::new(interner);
    let env = CompilationEnv { registry: &registry, sink };
    for root in registry.root_modules() {
        if let Some(class) = registry.lookup(root) {
            let defaults = stmt::extract_param_defaults(&class.body);
            elaborate_module(&mut ctx, &env, root, defaults);
        }
    }
    ctx
}

/// Elaborates (or returns the cached monomorphization of) `name` bound
/// under `params`. Returns `None` if `name` isn't a registered module or
/// its body could not be elaborated without error.
pub(crate) fn elaborate_module(
    ctx: &mut ElaborationContext,
    env: &CompilationEnv,
    name: Ident,
    params: ConstEnv,
) -> Option<ModuleId> {
    let key = ElaborationContext::cache_key(name, &params);
    if let Some(id) = ctx.get_cached(&key) {
        return Some(id);
    }
    let class = env.registry.lookup(name)?.clone();
    let span = class.span;

    let param_names: Vec<Ident> = class
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            phd_ast::Stmt::Assign {
                target: phd_ast::Expr::Name { name: pname, .. },
                value: phd_ast::Expr::Constant { .. },
                ..
            } => Some(*pname),
            _ => None,
        })
        .collect();
    let param_decls: Vec<Parameter> = param_names
        .iter()
        .map(|pname| Parameter {
            name: *pname,
            value: params.get(pname).copied().unwrap_or(0),
            span,
        })
        .collect();

    let mangled = ctx.mangle_name(name, &param_decls.iter().map(|p| (p.name, p.value)).collect::<Vec<_>>());
    let content_hash = ContentHash::from_bytes(ctx.interner.resolve(mangled).as_bytes());

    let mut builder = ModuleBuilder::new(ctx, params, param_decls);
    stmt::elaborate_body(&class.body, &mut builder, env);
    Some(builder.finish(mangled, span, content_hash, key))
}

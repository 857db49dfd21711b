//! Mutable elaboration state: the design under construction, the
//! monomorphization cache, and the per-module environment threaded through
//! expression and statement lowering.

use std::collections::HashMap;

use phd_common::{ContentHash, Ident, Interner};
use phd_diagnostics::DiagnosticSink;
use phd_ir::arena::Arena;
use phd_ir::ids::{ModuleId, SignalId};
use phd_ir::process::{Edge, EdgeSensitivity, Process, ProcessKind};
use phd_ir::{Design, EnumType, Module, Parameter, Port, Signal, SubmoduleInstance};
use phd_source::Span;

use crate::const_eval::ConstEnv;
use crate::errors::error_mixed_storage_class;
use crate::registry::ModuleRegistry;

/// A resolved enum type, tracked by name so member access (`State.RED`)
/// can be resolved during expression lowering.
#[derive(Debug, Clone)]
pub struct EnumInfo {
    /// The enum type name.
    pub name: Ident,
    /// Member name to resolved integer value.
    pub members: HashMap<Ident, i64>,
}

/// Which process bucket an assignment belongs to: the single combinational
/// process, or a specific sequential edge tuple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bucket {
    /// Belongs to the module's `always_comb` process.
    Comb,
    /// Belongs to an `always_ff` process under this clock/reset edge tuple.
    Seq(EdgeSensitivity, Option<EdgeSensitivity>),
}

fn edge_eq(a: EdgeSensitivity, b: EdgeSensitivity) -> bool {
    a.signal == b.signal && a.edge == b.edge
}

fn bucket_eq(a: Bucket, b: Bucket) -> bool {
    match (a, b) {
        (Bucket::Comb, Bucket::Comb) => true,
        (Bucket::Seq(ca, ra), Bucket::Seq(cb, rb)) => {
            edge_eq(ca, cb)
                && match (ra, rb) {
                    (Some(ra), Some(rb)) => edge_eq(ra, rb),
                    (None, None) => true,
                    _ => false,
                }
        }
        _ => false,
    }
}

/// Accumulates one module's signals, ports, enums, instances, and processes
/// while its body is being elaborated.
pub struct ModuleBuilder<'a> {
    /// Global elaboration state (design, registry, cache).
    pub ctx: &'a mut ElaborationContext,
    /// Bound parameter values for this (possibly monomorphized) instantiation.
    pub params: ConstEnv,
    /// Resolved parameters, in declaration order, emitted as `localparam`.
    pub param_decls: Vec<Parameter>,
    /// Name to signal ID, covering ports and internal signals alike.
    pub signals: Arena<SignalId, Signal>,
    sig_env: HashMap<Ident, SignalId>,
    /// Name to enum type info, for resolving `Type.MEMBER` access.
    pub enums: HashMap<Ident, EnumInfo>,
    /// Enum type declarations, in declaration order.
    pub enum_decls: Vec<EnumType>,
    /// Port declarations, in declaration order.
    pub ports: Vec<Port>,
    /// Submodule instances, in declaration order.
    pub instances: Vec<SubmoduleInstance>,
    /// Classified processes, one combinational plus one per edge tuple.
    pub processes: Vec<Process>,
    first_assigned: HashMap<SignalId, (Bucket, Span)>,
    /// Instance name to index into `instances`, for patching input
    /// connections in as their wiring assignments are encountered.
    instance_index: HashMap<Ident, usize>,
    /// Instance name + output port name to the intermediate wire signal
    /// created for it at instantiation time, for resolving `inst.port` reads.
    instance_outputs: HashMap<(Ident, Ident), SignalId>,
}

impl<'a> ModuleBuilder<'a> {
    /// Creates a builder for a module bound under `params`.
    pub fn new(ctx: &'a mut ElaborationContext, params: ConstEnv, param_decls: Vec<Parameter>) -> Self {
        Self {
            ctx,
            params,
            param_decls,
            signals: Arena::new(),
            sig_env: HashMap::new(),
            enums: HashMap::new(),
            enum_decls: Vec::new(),
            ports: Vec::new(),
            instances: Vec::new(),
            processes: Vec::new(),
            first_assigned: HashMap::new(),
            instance_index: HashMap::new(),
            instance_outputs: HashMap::new(),
        }
    }

    /// Registers a newly created submodule instance, along with the
    /// intermediate wire signals already created for its output ports.
    pub fn declare_instance(
        &mut self,
        name: Ident,
        instance: SubmoduleInstance,
        output_wires: Vec<(Ident, SignalId)>,
    ) {
        let idx = self.instances.len();
        self.instances.push(instance);
        self.instance_index.insert(name, idx);
        for (port, sig) in output_wires {
            self.instance_outputs.insert((name, port), sig);
        }
    }

    /// Looks up the intermediate wire backing an instance's output port.
    pub fn lookup_instance_output(&self, instance: Ident, port: Ident) -> Option<SignalId> {
        self.instance_outputs.get(&(instance, port)).copied()
    }

    /// Returns the index of a previously declared instance, for patching its
    /// input connections.
    pub fn instance_index(&self, instance: Ident) -> Option<usize> {
        self.instance_index.get(&instance).copied()
    }

    /// Declares a new signal, binding `name` to it for later lookup.
    pub fn declare_signal(&mut self, name: Ident, signal: Signal) -> SignalId {
        let id = self.signals.alloc(signal);
        self.sig_env.insert(name, id);
        id
    }

    /// Looks up a previously declared signal by name.
    pub fn lookup_signal(&self, name: Ident) -> Option<SignalId> {
        self.sig_env.get(&name).copied()
    }

    /// Registers an enum type, making its members resolvable as `Type.MEMBER`.
    pub fn declare_enum(&mut self, info: EnumInfo, decl: EnumType) {
        self.enums.insert(info.name, info);
        self.enum_decls.push(decl);
    }

    /// Finds the signal/bucket a process's body statements should be
    /// appended to, creating a new process if this bucket hasn't been seen.
    pub fn ensure_process(&mut self, bucket: Bucket) -> usize {
        let kind_matches = |p: &Process| match (&p.kind, bucket) {
            (ProcessKind::Combinational, Bucket::Comb) => true,
            (ProcessKind::Sequential { clock, reset }, Bucket::Seq(c, r)) => {
                p_matches(*clock, *reset, c, r)
            }
            _ => false,
        };
        fn p_matches(
            clock: EdgeSensitivity,
            reset: Option<EdgeSensitivity>,
            c: EdgeSensitivity,
            r: Option<EdgeSensitivity>,
        ) -> bool {
            edge_eq(clock, c)
                && match (reset, r) {
                    (Some(a), Some(b)) => edge_eq(a, b),
                    (None, None) => true,
                    _ => false,
                }
        }
        if let Some(i) = self.processes.iter().position(kind_matches) {
            return i;
        }
        let kind = match bucket {
            Bucket::Comb => ProcessKind::Combinational,
            Bucket::Seq(clock, reset) => ProcessKind::Sequential { clock, reset },
        };
        self.processes.push(Process { kind, body: Vec::new() });
        self.processes.len() - 1
    }

    /// Records that `signal` was assigned under `bucket` at `span`, checking
    /// for a storage-class conflict against any earlier assignment to the
    /// same signal. Does not touch the process list; call [`Self::ensure_process`]
    /// separately to find where the statement itself should be appended.
    pub fn record_assignment_bucket(&mut self, signal: SignalId, bucket: Bucket, span: Span, sink: &DiagnosticSink) {
        if let Some((prev_bucket, prev_span)) = self.first_assigned.get(&signal).copied() {
            if !bucket_eq(prev_bucket, bucket) {
                let name = self.ctx.interner.resolve(self.signals.get(signal).name);
                sink.emit(error_mixed_storage_class(name, span, prev_span));
            }
        } else {
            self.first_assigned.insert(signal, (bucket, span));
        }
    }

    /// Convenience for the common single-signal case: records the
    /// assignment bucket and returns the process index to append to.
    pub fn classify_assignment(
        &mut self,
        signal: SignalId,
        bucket: Bucket,
        span: Span,
        sink: &DiagnosticSink,
    ) -> usize {
        self.record_assignment_bucket(signal, bucket, span, sink);
        self.ensure_process(bucket)
    }

    /// Finalizes this builder into a [`Module`], allocating it in the
    /// design and caching it under `cache_key` for reuse.
    pub fn finish(
        self,
        name: Ident,
        span: Span,
        content_hash: ContentHash,
        cache_key: (Ident, Vec<(Ident, i64)>),
    ) -> ModuleId {
        let id = self.ctx.next_module_id();
        let module = Module {
            id,
            name,
            span,
            params: self.param_decls,
            ports: self.ports,
            signals: self.signals,
            enums: self.enum_decls,
            instances: self.instances,
            processes: self.processes,
            content_hash,
        };
        self.ctx.design.modules.alloc(module);
        self.ctx.cache.insert(cache_key, id);
        id
    }
}

/// Global, mutable state threaded through elaboration of every root module
/// and every monomorphized template it transitively instantiates.
pub struct ElaborationContext {
    /// The design being assembled, one module at a time.
    pub design: Design,
    /// Shared string interner.
    pub interner: Interner,
    /// Cache of already-elaborated `(template name, sorted param values)`
    /// combinations, so repeated instantiations with identical parameters
    /// reuse the same emitted module.
    cache: HashMap<(Ident, Vec<(Ident, i64)>), ModuleId>,
}

impl ElaborationContext {
    /// Creates a fresh elaboration context.
    pub fn new(interner: Interner) -> Self {
        Self {
            design: Design::new(),
            interner,
            cache: HashMap::new(),
        }
    }

    fn next_module_id(&self) -> ModuleId {
        ModuleId::from_raw(self.design.modules.len() as u32)
    }

    /// Canonicalizes a set of bound parameters into a cache key: the
    /// template name paired with its parameters sorted by name, so
    /// argument order never produces a spurious cache miss.
    pub fn cache_key(template: Ident, params: &ConstEnv) -> (Ident, Vec<(Ident, i64)>) {
        let mut entries: Vec<(Ident, i64)> = params.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| k.as_raw());
        (template, entries)
    }

    /// Looks up a previously elaborated monomorphization.
    pub fn get_cached(&self, key: &(Ident, Vec<(Ident, i64)>)) -> Option<ModuleId> {
        self.cache.get(key).copied()
    }

    /// Derives the emitted name for a monomorphized template:
    /// `{Template}_{k1}{v1}{k2}{v2}...` in declaration order.
    pub fn mangle_name(&mut self, base: Ident, params: &[(Ident, i64)]) -> Ident {
        if params.is_empty() {
            return base;
        }
        let mut name = self.interner.resolve(base).to_string();
        for (k, v) in params {
            name.push('_');
            name.push_str(self.interner.resolve(*k));
            name.push_str(&v.to_string());
        }
        self.interner.get_or_intern(&name)
    }
}

/// Registry access bundled alongside the interner and sink for the duration
/// of one compilation, separate from [`ElaborationContext`] so the registry
/// (built once, up front) isn't duplicated per monomorphization.
pub struct CompilationEnv<'a> {
    /// All discovered module definitions.
    pub registry: &'a ModuleRegistry,
    /// Where elaboration diagnostics are reported.
    pub sink: &'a DiagnosticSink,
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_ir::shape::Shape;
    use phd_ir::signal::{SignalOrigin, SignalType};
    use phd_source::Span;

    fn dummy_signal(id: u32) -> Signal {
        Signal {
            id: SignalId::from_raw(id),
            name: Ident::from_raw(id),
            shape: Shape::Bits(8),
            ty: SignalType::Plain,
            origin: SignalOrigin::Internal,
            span: Span::DUMMY,
        }
    }

    #[test]
    fn mangle_name_no_params() {
        let mut ctx = ElaborationContext::new(Interner::new());
        let base = ctx.interner.get_or_intern("Adder");
        assert_eq!(ctx.mangle_name(base, &[]), base);
    }

    #[test]
    fn mangle_name_with_params() {
        let mut ctx = ElaborationContext::new(Interner::new());
        let base = ctx.interner.get_or_intern("Adder");
        let width = ctx.interner.get_or_intern("width");
        let mangled = ctx.mangle_name(base, &[(width, 8)]);
        assert_eq!(ctx.interner.resolve(mangled), "Adder_width8");
    }

    #[test]
    fn cache_key_is_order_independent() {
        let mut ctx = ElaborationContext::new(Interner::new());
        let name = ctx.interner.get_or_intern("Adder");
        let a = ctx.interner.get_or_intern("a");
        let b = ctx.interner.get_or_intern("b");
        let mut env1 = ConstEnv::new();
        env1.insert(a, 1);
        env1.insert(b, 2);
        let mut env2 = ConstEnv::new();
        env2.insert(b, 2);
        env2.insert(a, 1);
        assert_eq!(
            ElaborationContext::cache_key(name, &env1),
            ElaborationContext::cache_key(name, &env2)
        );
    }

    #[test]
    fn classify_assignment_first_use_records_bucket() {
        let mut ctx = ElaborationContext::new(Interner::new());
        let sink = DiagnosticSink::new();
        let mut builder = ModuleBuilder::new(&mut ctx, ConstEnv::new(), vec![]);
        let sig = builder.declare_signal(Ident::from_raw(0), dummy_signal(0));
        let idx = builder.classify_assignment(sig, Bucket::Comb, Span::DUMMY, &sink);
        assert_eq!(idx, 0);
        assert!(!sink.has_errors());
    }

    #[test]
    fn declare_instance_registers_output_wire() {
        let mut ctx = ElaborationContext::new(Interner::new());
        let sink = DiagnosticSink::new();
        let mut builder = ModuleBuilder::new(&mut ctx, ConstEnv::new(), vec![]);
        let inst_name = Ident::from_raw(10);
        let port_name = Ident::from_raw(11);
        let wire = builder.declare_signal(Ident::from_raw(12), dummy_signal(12));
        let instance = SubmoduleInstance {
            name: inst_name,
            template: phd_ir::ModuleId::from_raw(0),
            connections: vec![],
            span: Span::DUMMY,
        };
        builder.declare_instance(inst_name, instance, vec![(port_name, wire)]);
        assert_eq!(builder.lookup_instance_output(inst_name, port_name), Some(wire));
        assert!(!sink.has_errors());
    }

    #[test]
    fn classify_assignment_conflict_errors() {
        let mut ctx = ElaborationContext::new(Interner::new());
        let sink = DiagnosticSink::new();
        let mut builder = ModuleBuilder::new(&mut ctx, ConstEnv::new(), vec![]);
        let sig = builder.declare_signal(Ident::from_raw(0), dummy_signal(0));
        builder.classify_assignment(sig, Bucket::Comb, Span::DUMMY, &sink);
        let clk = EdgeSensitivity {
            signal: SignalId::from_raw(99),
            edge: Edge::Posedge,
        };
        builder.classify_assignment(sig, Bucket::Seq(clk, None), Span::DUMMY, &sink);
        assert!(sink.has_errors());
    }
}

//! Diagnostic codes and helper functions for elaboration errors and warnings.
//!
//! Parse failures are reported by `phd_parser` as `E100`. Everything from
//! here on is raised during elaboration: `E300`-`E307` cover the fatal
//! kinds, `W300`-`W301` the non-fatal warnings.

use phd_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use phd_source::Span;

/// Two definitions share a name in a scope that requires uniqueness.
pub const E300: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 300,
};

/// A name was referenced that was never declared.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// An expression required to be compile-time constant was not.
pub const E302: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 302,
};

/// A `for` loop's iterable was not a statically unrollable `range(...)`.
pub const E303: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 303,
};

/// The same signal was assigned from both combinational and sequential
/// context, or from two different sequential edge tuples.
pub const E304: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 304,
};

/// A constant index or slice bound fell outside a signal's declared range.
pub const E305: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 305,
};

/// A submodule wiring assignment referenced a port the template doesn't have.
pub const E306: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 306,
};

/// Reserved for future allocation in the fatal-error range.
pub const E307: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 307,
};

/// An assignment's right-hand side width didn't match its target's width.
pub const W300: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 300,
};

/// A combinational signal is assigned only inside conditional branches,
/// with no unconditional assignment preceding them in the same block.
pub const W301: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// Creates a diagnostic for a duplicate definition.
pub fn error_duplicate_definition(kind: &str, name: &str, span: Span, prev_span: Span) -> Diagnostic {
    Diagnostic::error(E300, format!("duplicate {kind} `{name}`"), span)
        .with_label(Label::secondary(prev_span, "previously defined here"))
}

/// Creates a diagnostic for a reference to an undeclared name.
pub fn error_undeclared_name(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E301, format!("undeclared name `{name}`"), span)
}

/// Creates a diagnostic for a non-constant expression where one was required.
pub fn error_non_static_expression(detail: &str, span: Span) -> Diagnostic {
    Diagnostic::error(E302, format!("expression is not compile-time constant: {detail}"), span)
}

/// Creates a diagnostic for a loop whose iterable can't be statically unrolled.
pub fn error_non_static_loop(span: Span) -> Diagnostic {
    Diagnostic::error(
        E303,
        "for loops must iterate over a constant `range(...)`",
        span,
    )
    .with_help("rewrite the loop bound as a constant expression")
}

/// Creates a diagnostic for a signal assigned under conflicting storage classes.
pub fn error_mixed_storage_class(name: &str, span: Span, prev_span: Span) -> Diagnostic {
    Diagnostic::error(
        E304,
        format!("`{name}` is assigned from both combinational and sequential logic"),
        span,
    )
    .with_label(Label::secondary(prev_span, "first assigned here"))
    .with_note("a signal must be driven entirely by one always_comb block or one clock edge")
}

/// Creates a diagnostic for an out-of-bounds constant index or slice.
pub fn error_index_out_of_bounds(name: &str, index: i64, width: u32, span: Span) -> Diagnostic {
    Diagnostic::error(
        E305,
        format!("index {index} is out of bounds for `{name}` (width {width})"),
        span,
    )
}

/// Creates a diagnostic for an unknown port on a submodule.
pub fn error_unknown_port(port_name: &str, template_name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E306,
        format!("unknown port `{port_name}` on module `{template_name}`"),
        span,
    )
}

/// Creates a warning for a width mismatch between an assignment's sides.
pub fn warn_width_mismatch(lhs_width: u32, rhs_width: u32, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W300,
        format!("assignment width mismatch: target is {lhs_width} bits, value is {rhs_width} bits"),
        span,
    )
    .with_note(if rhs_width > lhs_width {
        "the value will be truncated"
    } else {
        "the value will be zero-extended"
    })
}

/// Creates a warning for a combinational signal with no default assignment
/// ahead of the conditional branches that drive it, which synthesizes to an
/// inferred latch rather than combinational logic.
pub fn warn_possible_latch(name: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W301,
        format!("`{name}` is conditionally assigned in combinational logic without a preceding default"),
        span,
    )
    .with_note("every branch must assign this signal, or synthesis will infer a latch")
    .with_help(format!("assign `{name}` a default value before the conditional that sets it"))
}

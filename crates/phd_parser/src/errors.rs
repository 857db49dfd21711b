//! Diagnostic codes and helper functions for parse errors.
//!
//! Error code `E100` covers every parse failure: invalid Python syntax, or
//! a construct the dialect does not recognize at all.

use phd_diagnostics::{Category, Diagnostic, DiagnosticCode};
use phd_source::Span;

/// The source text failed to parse as Python syntax, or used a construct
/// the dialect does not recognize.
pub const E100: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 100,
};

/// Creates a diagnostic for a parse failure.
pub fn error_parse(detail: impl Into<String>, span: Span) -> Diagnostic {
    Diagnostic::error(E100, format!("parse error: {}", detail.into()), span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_formats() {
        assert_eq!(format!("{E100}"), "E100");
    }

    #[test]
    fn parse_error_diagnostic() {
        let d = error_parse("unexpected indent", Span::DUMMY);
        assert_eq!(d.code, E100);
        assert!(d.message.contains("unexpected indent"));
    }
}

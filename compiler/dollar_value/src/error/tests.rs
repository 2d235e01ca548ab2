use super::*;
use dollar_ir::{SourceText, Span};
use pretty_assertions::assert_eq;

#[test]
fn test_factory_sets_kind() {
    assert_eq!(invalid_cast("MAP", "RANGE").kind, ErrorKind::InvalidCast);
    assert_eq!(variable_not_found("x").message, "variable 'x' not found");
    assert!(recursion_limit_exceeded(100).is_fatal());
    assert!(!constraint_violation("x", "it > 0").is_fatal());
    assert_eq!(
        declared_type_mismatch("n", "INTEGER", "STRING").kind,
        ErrorKind::TypeMismatch
    );
}

#[test]
fn test_with_source_keeps_first() {
    let text = SourceText::new(Some("t.ds".into()), "a := b");
    let first = SourceSegment::new(text.clone(), Span::new(5, 6));
    let second = SourceSegment::new(text, Span::new(0, 1));
    let err = variable_not_found("b")
        .with_source(&first)
        .with_source(&second);
    assert_eq!(err.source, Some(first));
}

#[test]
fn test_unknown_source_is_ignored() {
    let err = exception("boom").with_source(&SourceSegment::unknown());
    assert_eq!(err.source, None);
}

#[test]
fn test_report_includes_location_and_excerpt() {
    let text = SourceText::new(Some("t.ds".into()), "a := b");
    let err = variable_not_found("b").with_source(&SourceSegment::new(text, Span::new(5, 6)));
    let report = err.report();
    assert!(report.starts_with("VARIABLE_NOT_FOUND: variable 'b' not found at t.ds(1:5)"));
    assert!(report.contains(" → b ← "));
}

#[test]
fn test_display_lists_kind() {
    let err = immutable_variable("x").with_cause(exception("inner"));
    assert_eq!(err.to_string(), "IMMUTABLE_VARIABLE: cannot re-assign const variable 'x'");
    assert!(err.report().contains("caused by EXCEPTION: inner"));
}

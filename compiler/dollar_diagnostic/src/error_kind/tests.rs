use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_only_structural_kinds_are_fatal() {
    let fatal: Vec<ErrorKind> = ErrorKind::ALL
        .into_iter()
        .filter(|k| k.is_fatal())
        .collect();
    assert_eq!(
        fatal,
        vec![
            ErrorKind::RecursionLimitExceeded,
            ErrorKind::ScopeStackCorrupted
        ]
    );
}

#[test]
fn test_codes_are_unique() {
    let mut codes: Vec<&str> = ErrorKind::ALL.into_iter().map(ErrorKind::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), ErrorKind::ALL.len());
}

#[test]
fn test_name_round_trip() {
    assert_eq!(
        ErrorKind::from_name("IMMUTABLE_VARIABLE"),
        Some(ErrorKind::ImmutableVariable)
    );
    assert_eq!(ErrorKind::from_name("immutable_variable"), None);
    assert_eq!(ErrorKind::InvalidCast.to_string(), "INVALID_CAST");
}

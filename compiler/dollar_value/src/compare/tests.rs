use super::*;
use crate::test_helpers::lazy;
use pretty_assertions::assert_eq;

#[test]
fn test_void_is_neither() {
    assert!(!Value::Void.is_true());
    assert!(!Value::Void.is_false());
}

#[test]
fn test_number_truthiness_truncates() {
    assert!(!Value::decimal(0.7).is_true());
    assert!(Value::decimal(0.7).is_false());
    assert!(Value::decimal(-1.2).is_true());
    assert!(Value::int(3).is_true());
}

#[test]
fn test_collection_truthiness() {
    assert!(Value::pair("a", Value::int(0)).is_true());
    assert!(Value::empty_map().is_false());
    assert!(Value::list(vec![]).is_false());
}

#[test]
fn test_cross_case_equality_uses_string_form() {
    assert!(Value::int(1).equals(&Value::string("1")).unwrap());
    assert!(Value::int(1).equals(&Value::decimal(1.0)).unwrap());
    assert!(!Value::bool(true).equals(&Value::string("yes")).unwrap());
}

#[test]
fn test_equality_unwraps_nodes() {
    assert!(lazy(Value::string("x")).equals(&Value::string("x")).unwrap());
    assert_eq!(
        lazy(Value::int(2)).equal_to(&lazy(Value::int(2))).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_metadata_is_ignored_by_equality() {
    let mut meta = crate::Metadata::new();
    meta.set("k", "v");
    assert_eq!(Value::int(4).with_metadata(meta), Value::int(4));
}

#[test]
fn test_ordering() {
    assert_eq!(Value::int(1).less_than(&Value::decimal(1.5)).unwrap(), Value::Bool(true));
    assert_eq!(
        Value::string("b").greater_equal(&Value::string("a")).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(Value::Void.less_than(&Value::int(1)).unwrap(), Value::Bool(false));
}

#[test]
fn test_logic_short_circuits() {
    let err = crate::error::exception("unreached").into_value();
    assert_eq!(Value::bool(false).and(&err).unwrap(), Value::Bool(false));
    assert_eq!(Value::bool(true).or(&err).unwrap(), Value::Bool(true));
    assert_eq!(Value::Void.not().unwrap(), Value::Void);
    assert_eq!(Value::int(0).not().unwrap(), Value::Bool(true));
}

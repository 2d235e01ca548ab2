use super::*;
use dollar_diagnostic::ErrorKind;
use pretty_assertions::assert_eq;

fn sample_map() -> Value {
    Value::map(
        [("a", Value::int(1)), ("b", Value::int(2))]
            .into_iter()
            .collect::<ValueMap>(),
    )
}

#[test]
fn test_map_to_map_is_identity() {
    let m = sample_map();
    assert_eq!(m.cast(Type::Map).unwrap(), m);
}

#[test]
fn test_map_to_list_gives_pairs() {
    let list = sample_map().cast(Type::List).unwrap();
    assert_eq!(
        list,
        Value::list(vec![
            Value::pair("a", Value::int(1)),
            Value::pair("b", Value::int(2)),
        ])
    );
    assert!(list.as_list().unwrap().iter().all(Value::is_pair));
}

#[test]
fn test_map_to_boolean_is_non_empty() {
    assert_eq!(sample_map().cast(Type::Boolean).unwrap(), Value::Bool(true));
    assert_eq!(Value::empty_map().cast(Type::Boolean).unwrap(), Value::Bool(false));
}

#[test]
fn test_unsupported_target_fails() {
    let err = sample_map().cast(Type::Range).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCast);
    assert_eq!(sample_map().cast(Type::Integer).unwrap_err().kind, ErrorKind::InvalidCast);
}

#[test]
fn test_string_numbers() {
    assert_eq!(Value::string(" 42 ").cast(Type::Integer).unwrap(), Value::Int(42));
    assert_eq!(Value::string("2.9").cast(Type::Integer).unwrap(), Value::Int(2));
    assert_eq!(Value::string("x").cast(Type::Decimal).unwrap_err().kind, ErrorKind::InvalidCast);
    assert_eq!(Value::string("false").cast(Type::Boolean).unwrap(), Value::Bool(false));
}

#[test]
fn test_to_string_and_void() {
    assert_eq!(Value::decimal(2.0).cast(Type::String).unwrap(), Value::string("2.0"));
    assert_eq!(Value::int(5).cast(Type::Void).unwrap(), Value::Void);
    assert_eq!(Value::range(1, 3).cast(Type::List).unwrap().as_list().unwrap().len(), 3);
}

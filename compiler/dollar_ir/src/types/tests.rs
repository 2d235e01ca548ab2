use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_is_case_insensitive() {
    assert_eq!("integer".parse::<Type>(), Ok(Type::Integer));
    assert_eq!(" Map ".parse::<Type>(), Ok(Type::Map));
    assert_eq!(
        "widget".parse::<Type>(),
        Err(UnknownType("widget".to_string()))
    );
}

#[test]
fn test_cast_targets() {
    let targets: Vec<Type> = Type::ALL
        .into_iter()
        .filter(|t| t.is_cast_target())
        .collect();
    assert_eq!(
        targets,
        vec![
            Type::Boolean,
            Type::String,
            Type::List,
            Type::Map,
            Type::Decimal,
            Type::Integer,
            Type::Void,
        ]
    );
}

#[test]
fn test_any_accepts_everything() {
    assert!(Type::ALL.into_iter().all(|t| Type::Any.accepts(t)));
    assert!(!Type::Integer.accepts(Type::Decimal));
}

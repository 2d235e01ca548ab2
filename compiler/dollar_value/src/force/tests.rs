use super::*;
use crate::ValueMap;
use pretty_assertions::assert_eq;

#[test]
fn test_fixing_concrete_is_noop() {
    let v = Value::list(vec![Value::int(1), Value::string("a")]);
    assert_eq!(v.fix(usize::MAX).unwrap(), v);
    assert_eq!(v.fix_deep().unwrap(), v);
    assert_eq!(v.fix_deep().unwrap(), v.fix_deep().unwrap());
}

#[test]
fn test_fix_keeps_metadata() {
    let mut meta = crate::Metadata::new();
    meta.set("k", "v");
    let v = Value::int(3).with_metadata(meta);
    let fixed = v.fix(2).unwrap();
    assert_eq!(fixed.metadata().and_then(|m| m.get("k")), Some("v"));
}

#[test]
fn test_fix_preserves_map_order() {
    let m: ValueMap = [("b", Value::int(2)), ("a", Value::int(1))]
        .into_iter()
        .collect();
    let fixed = Value::map(m).fix(3).unwrap();
    let keys: Vec<&str> = fixed.as_map().unwrap().keys().collect();
    assert_eq!(keys, vec!["b", "a"]);
}

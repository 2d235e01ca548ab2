use super::*;
use pretty_assertions::assert_eq;

fn map(entries: &[(&str, i64)]) -> ValueMap {
    entries.iter().map(|(k, v)| (*k, Value::int(*v))).collect()
}

#[test]
fn test_insert_keeps_position() {
    let mut m = map(&[("a", 1), ("b", 2)]);
    m.insert("a", Value::int(9));
    let keys: Vec<&str> = m.keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(m.get("a"), Some(&Value::int(9)));
}

#[test]
fn test_merge_right_wins() {
    let merged = map(&[("a", 1)]).merged(&map(&[("a", 2), ("b", 3)]));
    assert_eq!(merged, map(&[("a", 2), ("b", 3)]));
}

#[test]
fn test_reversed() {
    let m = map(&[("a", 1), ("b", 2), ("c", 3)]).reversed();
    let keys: Vec<&str> = m.keys().collect();
    assert_eq!(keys, vec!["c", "b", "a"]);
}

#[test]
fn test_remove_preserves_order() {
    let m = map(&[("a", 1), ("b", 2), ("c", 3)]).without_keys(["b"]);
    assert_eq!(m, map(&[("a", 1), ("c", 3)]));
}

#[test]
fn test_synthetic_key_skips_taken() {
    let m = map(&[("_1", 1)]);
    assert_eq!(m.synthetic_key(), "_2");
    assert_eq!(ValueMap::new().synthetic_key(), "_0");
}

#[test]
fn test_insert_first() {
    let mut m = map(&[("a", 1), ("b", 2)]);
    m.insert_first("b", Value::int(5));
    assert_eq!(m.get_index(0), Some(("b", &Value::int(5))));
    assert_eq!(m.len(), 2);
}

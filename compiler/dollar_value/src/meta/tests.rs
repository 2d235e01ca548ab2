use super::*;
use pretty_assertions::assert_eq;

#[derive(Debug, PartialEq)]
struct Tag(u32);

#[test]
fn test_string_entries() {
    let mut meta = Metadata::new();
    assert!(meta.is_empty());
    meta.set(keys::CONSTRAINT_FINGERPRINT, "it > 0");
    assert_eq!(meta.get(keys::CONSTRAINT_FINGERPRINT), Some("it > 0"));
    assert_eq!(meta.get(keys::PARAMETER_NAME), None);
}

#[test]
fn test_typed_entries() {
    let mut meta = Metadata::new();
    meta.set_typed(Tag(7));
    assert_eq!(meta.get_typed::<Tag>(), Some(&Tag(7)));
    assert_eq!(meta.get_typed::<String>(), None);
}

#[test]
fn test_extend_overrides() {
    let mut a = Metadata::new();
    a.set("k", "old");
    let mut b = Metadata::new();
    b.set("k", "new");
    b.set_typed(Tag(1));
    a.extend(&b);
    assert_eq!(a.get("k"), Some("new"));
    assert_eq!(a.get_typed::<Tag>(), Some(&Tag(1)));
}

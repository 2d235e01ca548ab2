use super::*;

#[test]
fn test_heap_shares_allocation() {
    let a = Heap::new(vec![1, 2, 3]);
    let b = a.clone();
    assert!(Heap::ptr_eq(&a, &b));
    assert_eq!(*a, *b);
}

#[test]
fn test_heap_eq_by_content() {
    assert_eq!(Heap::new("x".to_string()), Heap::new("x".to_string()));
    assert_ne!(Heap::new(1), Heap::new(2));
}

#[test]
fn test_into_inner_when_shared() {
    let a = Heap::new(vec![1]);
    let _b = a.clone();
    assert_eq!(a.into_inner(), vec![1]);
}

#[test]
fn test_heap_displays_payload() {
    assert_eq!(Heap::new(42).to_string(), "42");
}

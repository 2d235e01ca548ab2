use super::*;
use dollar_value::ErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn guards_pop_in_reverse_order() {
    let outer = ScopeRef::root("outer");
    let inner = outer.child("inner");
    {
        let _a = push_scope(outer.clone());
        let _b = push_scope(inner.clone());
        assert!(current_scope().is_some_and(|s| s.ptr_eq(&inner)));
        assert_eq!(scope_depth(), 2);
    }
    assert_eq!(scope_depth(), 0);
    assert!(take_corruption().is_none());
}

#[test]
fn popping_a_non_top_scope_is_fatal() {
    let a = ScopeRef::root("a");
    let b = ScopeRef::root("b");
    let guard_a = push_scope(a.clone());
    let guard_b = push_scope(b.clone());

    let err = pop_scope(&a).err();
    assert_eq!(err.as_ref().map(|e| e.kind), Some(ErrorKind::ScopeStackCorrupted));
    assert!(err.is_some_and(|e| e.is_fatal()));

    // `a` was removed anyway; dropping its guard now records the mismatch.
    drop(guard_a);
    assert!(take_corruption().is_some());
    drop(guard_b);
    assert_eq!(scope_depth(), 0);
}

#[test]
fn notify_guard_blocks_reentry() {
    let first = enter_notify(NodeId(1));
    assert!(first.is_some());
    assert!(enter_notify(NodeId(1)).is_none());
    assert!(enter_notify(NodeId(2)).is_some());
    drop(first);
    assert!(enter_notify(NodeId(1)).is_some());
}

#[test]
fn call_stack_enforces_limit() {
    let a = enter_node(NodeId(1), 2);
    let b = enter_node(NodeId(2), 2);
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(call_depth(), 2);
    let c = enter_node(NodeId(3), 2);
    assert_eq!(c.err().map(|e| e.kind), Some(ErrorKind::RecursionLimitExceeded));
    drop(b);
    drop(a);
    assert_eq!(call_depth(), 0);
}

#[test]
fn snapshot_attaches_on_another_thread() {
    let root = ScopeRef::root("root");
    let child = root.child("child");
    let snapshot = {
        let _a = push_scope(root);
        let _b = push_scope(child.clone());
        ScopeSnapshot::capture()
    };
    assert_eq!(scope_depth(), 0);

    let seen = std::thread::spawn(move || {
        let _attached = snapshot.attach();
        (scope_depth(), current_scope().map(|s| s.name()))
    })
    .join()
    .ok();
    assert_eq!(seen, Some((2, Some("child".to_string()))));
}

#[test]
fn attach_guard_restores_depth() {
    let snapshot = ScopeSnapshot::of(ScopeRef::root("x"));
    let base = push_scope(ScopeRef::root("base"));
    {
        let _attached = snapshot.attach();
        assert_eq!(scope_depth(), 2);
    }
    assert_eq!(scope_depth(), 1);
    drop(base);
    assert!(take_corruption().is_none());
}

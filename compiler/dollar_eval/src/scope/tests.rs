use super::*;
use dollar_value::ErrorKind;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

fn key(name: &str) -> VarKey {
    VarKey::new(name)
}

#[test]
fn lookups_walk_the_chain() {
    let root = ScopeRef::root("root");
    let child = root.child("child");
    assert!(root.set(&key("x"), Value::int(1), SetOptions::declaration()).is_ok());

    assert_eq!(child.get(&key("x")).ok(), Some(Value::int(1)));
    assert!(child.declaring(&key("x")).is_some_and(|s| s.ptr_eq(&root)));
    assert_eq!(
        child.get(&key("missing")).err().map(|e| e.kind),
        Some(ErrorKind::VariableNotFound)
    );
    assert_eq!(child.get_opt(&key("missing")), None);
}

#[test]
fn assignment_rebinds_in_the_declaring_scope() {
    let root = ScopeRef::root("root");
    let child = root.child("child");
    let _ = root.set(&key("x"), Value::int(1), SetOptions::declaration());
    let _ = child.set(&key("x"), Value::int(2), SetOptions::default());

    assert_eq!(root.get(&key("x")).ok(), Some(Value::int(2)));
    assert!(child.variables().is_empty());
}

#[test]
fn declaration_shadows_outer_binding() {
    let root = ScopeRef::root("root");
    let child = root.child("child");
    let _ = root.set(&key("x"), Value::int(1), SetOptions::declaration());
    let _ = child.set(&key("x"), Value::int(2), SetOptions::declaration());

    assert_eq!(root.get(&key("x")).ok(), Some(Value::int(1)));
    assert_eq!(child.get(&key("x")).ok(), Some(Value::int(2)));
}

#[test]
fn undeclared_assignment_binds_locally() {
    let root = ScopeRef::root("root");
    let child = root.child("child");
    let _ = child.set(&key("y"), Value::int(3), SetOptions::default());
    assert_eq!(child.variables(), vec![key("y")]);
    assert!(!root.has(&key("y")));
}

#[test]
fn const_bindings_reject_reassignment() {
    let scope = ScopeRef::root("root");
    let options = SetOptions {
        flags: BindingFlags::CONST,
        ..SetOptions::declaration()
    };
    assert!(scope.set(&key("c"), Value::int(1), options).is_ok());

    let err = scope.set(&key("c"), Value::int(2), SetOptions::default());
    assert_eq!(err.err().map(|e| e.kind), Some(ErrorKind::ImmutableVariable));
    assert_eq!(scope.get(&key("c")).ok(), Some(Value::int(1)));
}

#[test]
fn declared_type_is_enforced() {
    let scope = ScopeRef::root("root");
    let options = SetOptions {
        declared_type: Some(Type::Integer),
        ..SetOptions::declaration()
    };
    assert!(scope.set(&key("n"), Value::int(1), options).is_ok());
    assert_eq!(scope.declared_type_of(&key("n")), Some(Type::Integer));

    let err = scope.set(&key("n"), Value::string("one"), SetOptions::default());
    assert_eq!(err.err().map(|e| e.kind), Some(ErrorKind::TypeMismatch));
    assert!(scope.set(&key("n"), Value::Void, SetOptions::default()).is_ok());
}

#[test]
fn parameters_bypass_const() {
    let scope = ScopeRef::root("root");
    scope.set_parameter("it", Value::int(1));
    scope.set_parameter("it", Value::int(2));
    assert_eq!(scope.get(&key("it")).ok(), Some(Value::int(2)));
}

#[test]
fn listeners_fire_after_commit() {
    let scope = ScopeRef::root("root");
    let _ = scope.set(&key("x"), Value::int(0), SetOptions::declaration());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let reader = scope.clone();
    scope.listen(
        &key("x"),
        "watch",
        Arc::new(move |v: &Value| {
            let committed = reader.get(&VarKey::new("x"))?;
            sink.lock().push((v.clone(), committed));
            Ok(Value::Void)
        }),
    );
    let _ = scope.set(&key("x"), Value::int(5), SetOptions::default());
    assert_eq!(*seen.lock(), vec![(Value::int(5), Value::int(5))]);

    scope.unlisten(&key("x"), "watch");
    let _ = scope.set(&key("x"), Value::int(6), SetOptions::default());
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn handler_is_found_up_the_chain() {
    let root = ScopeRef::root("root");
    root.set_error_handler(Arc::new(|_: &EvalError| Ok(Value::int(-1))));
    let child = root.child("child");

    let handled = child.handle_error(dollar_value::error::exception("x"));
    assert_eq!(handled.ok(), Some(Value::int(-1)));
}

#[test]
fn fatal_errors_bypass_handlers() {
    let root = ScopeRef::root("root");
    root.set_error_handler(Arc::new(|_: &EvalError| Ok(Value::int(-1))));
    let err = root.handle_error(dollar_value::error::recursion_limit_exceeded(100));
    assert_eq!(err.err().map(|e| e.kind), Some(ErrorKind::RecursionLimitExceeded));
}

#[test]
fn missing_handler_returns_the_error() {
    let root = ScopeRef::root("root");
    let err = root.handle_error(dollar_value::error::exception("x"));
    assert_eq!(err.err().map(|e| e.kind), Some(ErrorKind::Exception));
}

#[test]
fn constraint_sees_it_and_previous() {
    use crate::node::NodeBuilder;
    use crate::runtime::Runtime;
    use dollar_ir::SourceSegment;

    let rt = Runtime::new();
    let predicate = NodeBuilder::new(&rt, "increasing", SourceSegment::unknown()).build_value(|_| {
        let scope = context::current_scope()
            .ok_or_else(|| dollar_value::error::exception("no scope"))?;
        let it = scope.get(&VarKey::new("it"))?;
        let previous = scope.get(&VarKey::new("previous"))?;
        if previous.is_void() {
            Ok(Value::bool(true))
        } else {
            it.greater_than(&previous)
        }
    });
    let scope = ScopeRef::root("root");
    let options = SetOptions {
        constraint: Some(Constraint::new(predicate, "it > previous")),
        ..SetOptions::declaration()
    };
    assert!(scope.set(&key("x"), Value::int(1), options).is_ok());
    assert!(scope.set(&key("x"), Value::int(5), SetOptions::default()).is_ok());

    let err = scope.set(&key("x"), Value::int(3), SetOptions::default());
    assert_eq!(err.err().map(|e| e.kind), Some(ErrorKind::ConstraintViolation));
    assert_eq!(scope.get(&key("x")).ok(), Some(Value::int(5)));
    assert_eq!(scope.sub_type_of(&key("x")), Some("it > previous".to_string()));
    assert!(scope.constraint_of(&key("x")).is_some_and(|c| c.is_node()));
    assert_eq!(context::scope_depth(), 0);
}

#[test]
fn const_landing_during_a_constraint_check_wins() {
    use crate::node::NodeBuilder;
    use crate::runtime::Runtime;
    use dollar_ir::SourceSegment;

    let rt = Runtime::new();
    let scope = ScopeRef::root("root");
    let racer = scope.clone();
    let predicate = NodeBuilder::new(&rt, "sneaky", SourceSegment::unknown()).build_value(move |_| {
        let options = SetOptions {
            flags: BindingFlags::CONST,
            ..SetOptions::declaration()
        };
        racer.set(&VarKey::new("c"), Value::int(1), options)?;
        Ok(Value::bool(true))
    });
    let options = SetOptions {
        constraint: Some(Constraint::new(predicate, "true")),
        ..SetOptions::declaration()
    };

    let err = scope.set(&key("c"), Value::int(2), options);
    assert_eq!(err.err().map(|e| e.kind), Some(ErrorKind::ImmutableVariable));
    assert_eq!(scope.get(&key("c")).ok(), Some(Value::int(1)));
}

#[test]
fn concurrent_const_declarations_bind_once() {
    use std::sync::Barrier;
    use std::thread;

    let scope = ScopeRef::root("root");
    let barrier = Arc::new(Barrier::new(16));
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let scope = scope.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let options = SetOptions {
                    flags: BindingFlags::CONST,
                    ..SetOptions::declaration()
                };
                barrier.wait();
                scope.set(&VarKey::new("c"), Value::int(i), options).is_ok()
            })
        })
        .collect();

    let bound = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(false))
        .filter(|ok| *ok)
        .count();
    assert_eq!(bound, 1);
}

use super::*;
use crate::eval_mode::EvalMode;
use pretty_assertions::assert_eq;

#[test]
fn builder_overrides_mode_defaults() {
    let runtime = Runtime::builder()
        .max_recursion_depth(10)
        .assignment_fix_depth(3)
        .parallel(true)
        .fail_fast(false)
        .build();
    let config = runtime.config();
    assert_eq!(config.max_recursion_depth, 10);
    assert_eq!(config.assignment_fix_depth, 3);
    assert!(config.parallel);
    assert!(!config.fail_fast);
}

#[test]
fn for_mode_seeds_polling() {
    let runtime = RuntimeBuilder::for_mode(EvalMode::Test).build();
    assert_eq!(runtime.config().mode, EvalMode::Test);
    assert_eq!(runtime.config().poll_interval, EvalMode::Test.poll_interval());
}

#[test]
fn builtins_are_reserved() {
    let runtime = Runtime::builder().builtin("emit").build();
    assert!(runtime.is_builtin("print"));
    assert!(runtime.is_builtin("it"));
    assert!(runtime.is_builtin("emit"));
    assert!(!runtime.is_builtin("total"));
}

#[test]
fn exports_are_shared_between_clones() {
    let runtime = Runtime::new();
    let clone = runtime.clone();
    clone.export(VarKey::new("b"), Value::int(2));
    clone.export(VarKey::new("a"), Value::int(1));

    assert_eq!(runtime.exported(&VarKey::new("a")), Some(Value::int(1)));
    let names: Vec<String> = runtime
        .exports()
        .into_iter()
        .map(|(k, _)| k.as_str().to_string())
        .collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn shutdown_stops_followed_resources() {
    use std::time::Duration;

    use crate::queue::QueueResource;
    use crate::subscription::subscribe;

    let runtime = Runtime::new();
    let handle = QueueResource::new("q", 4, Duration::from_millis(2), Duration::from_millis(50))
        .into_handle();
    let source = Value::resource(handle.clone());
    for slot in ["a", "b"] {
        let pipe: dollar_value::Pipe = Arc::new(|_: &Value| Ok(Value::Void));
        let subscription = subscribe(&source, pipe).unwrap_or_else(|e| panic!("{e}"));
        runtime.track_subscription(slot.to_string(), subscription);
    }
    assert_eq!(handle.state(), ResourceState::Running);

    runtime.shutdown();
    assert_eq!(runtime.subscription_count(), 0);
    assert_eq!(handle.state(), ResourceState::Stopped);
    runtime.shutdown();
    assert_eq!(handle.state(), ResourceState::Stopped);
}

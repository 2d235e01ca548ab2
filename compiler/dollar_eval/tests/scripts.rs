//! End-to-end scripts: statements are wired the way a front end would wire
//! them and run through `ScriptRunner`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dollar_eval::{
    Assignment, EvalMode, NodeBuilder, OperatorTableError, QueueResource, Runtime, ScriptRunner,
    Value, Wiring,
};
use dollar_eval::{ErrorKind, Reactive, Resource};
use dollar_ir::{OpDef, OpToken, SourceSegment, SourceText, Span, VarKey};
use dollar_value::ValueMap;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn seg() -> SourceSegment {
    SourceSegment::unknown()
}

fn op(w: &Wiring, def: &'static OpDef, operands: Vec<Value>) -> Result<Value, OperatorTableError> {
    w.build(OpToken::new(def, operands, seg()))
}

fn declare(w: &Wiring, name: &str, value: Value) -> Result<Value, OperatorTableError> {
    w.assign(&OpDef::DECLARATION, Assignment::new(name, value, seg()))
}

fn reassign(w: &Wiring, name: &str, value: Value) -> Result<Value, OperatorTableError> {
    w.assign(&OpDef::ASSIGNMENT, Assignment::new(name, value, seg()))
}

fn map(entries: &[(&str, i64)]) -> Value {
    Value::map(
        entries
            .iter()
            .map(|(k, v)| (*k, Value::int(*v)))
            .collect::<ValueMap>(),
    )
}

fn get(runner: &ScriptRunner, name: &str) -> Option<Value> {
    runner.root().get(&VarKey::new(name)).ok()
}

/// Poll `check` until it returns true or the deadline passes.
fn eventually(timeout: Duration, check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    check()
}

// -- Bindings --

#[test]
fn declared_sum_reads_back_as_integer() {
    let runner = ScriptRunner::new(&Runtime::new());
    let statements = runner
        .enter(|w| {
            let sum = op(w, &OpDef::PLUS, vec![Value::int(1), Value::int(2)])?;
            let bind = declare(w, "x", sum)?;
            Ok::<_, OperatorTableError>(vec![bind, w.var_ref("x", seg())])
        })
        .unwrap();

    assert_eq!(runner.run(&statements).unwrap(), Value::int(3));
}

#[test]
fn map_merge_prefers_the_right_hand_side() {
    let runner = ScriptRunner::new(&Runtime::new());
    let statements = runner
        .enter(|w| {
            let merged = op(
                w,
                &OpDef::PLUS,
                vec![map(&[("a", 1)]), map(&[("a", 2), ("b", 3)])],
            )?;
            let bind = declare(w, "m", merged)?;
            Ok::<_, OperatorTableError>(vec![bind, w.var_ref("m", seg())])
        })
        .unwrap();

    assert_eq!(runner.run(&statements).unwrap(), map(&[("a", 2), ("b", 3)]));
}

#[test]
fn const_rebinding_fails_and_keeps_the_value() {
    let runner = ScriptRunner::new(&Runtime::new());
    let statements = runner
        .enter(|w| {
            let bind = w.assign(
                &OpDef::DECLARATION,
                Assignment::new("c", Value::int(1), seg()).constant(),
            )?;
            let again = reassign(w, "c", Value::int(2))?;
            Ok::<_, OperatorTableError>(vec![bind, again])
        })
        .unwrap();

    let err = runner.run(&statements).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ImmutableVariable);
    assert_eq!(get(&runner, "c"), Some(Value::int(1)));
}

#[test]
fn errors_report_where_they_happened() {
    let source = SourceText::new(Some("sum.ds".into()), "total := {} * 2\n");
    let runner = ScriptRunner::with_source(&Runtime::new(), Arc::clone(&source));
    let statement = runner
        .enter(|w| {
            let product = w.build(OpToken::new(
                &OpDef::MULTIPLY,
                vec![Value::map(ValueMap::new()), Value::int(2)],
                SourceSegment::new(source, Span::new(12, 13)),
            ))?;
            declare(w, "total", product)
        })
        .unwrap();

    let err = runner.run(&[statement]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidMapOperation);
    let report = err.report();
    assert!(report.contains("sum.ds(1:12)"), "{report}");
    assert!(report.contains("→ * ←"), "{report}");
}

// -- Reactivity --

#[test]
fn when_assignment_waits_for_its_condition() {
    let runner = ScriptRunner::new(&Runtime::new());
    let (setup, flip) = runner
        .enter(|w| {
            let flag = declare(w, "ready", Value::bool(false))?;
            let source = declare(w, "y", Value::int(10))?;
            let when = w.assign(
                &OpDef::WHEN_ASSIGN,
                Assignment::new("w", w.var_ref("y", seg()), seg())
                    .with_condition(w.var_ref("ready", seg())),
            )?;
            let bump = reassign(w, "y", Value::int(20))?;
            let ready = reassign(w, "ready", Value::bool(true))?;
            let unready = reassign(w, "ready", Value::bool(false))?;
            Ok::<_, OperatorTableError>((vec![flag, source, when, bump], [ready, unready]))
        })
        .unwrap();

    runner.run(&setup).unwrap();
    assert_eq!(get(&runner, "w"), Some(Value::Void));

    runner.run(&flip[..1]).unwrap();
    assert_eq!(get(&runner, "w"), Some(Value::int(20)));

    runner.run(&flip[1..]).unwrap();
    assert_eq!(get(&runner, "w"), Some(Value::Void));
}

#[test]
fn notify_reaches_every_listener_once_in_order() {
    let runtime = Runtime::new();
    let node = NodeBuilder::new(&runtime, "source", seg()).build(|_| Ok(Value::int(7)));
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    for index in 0..5 {
        let seen = Arc::clone(&seen);
        node.listen(
            Arc::new(move |v: &Value| {
                seen.lock().push((index, v.clone()));
                Ok(Value::Void)
            }),
            None,
        )
        .unwrap();
    }

    node.notify().unwrap();
    let expected: Vec<_> = (0..5).map(|i| (i, Value::int(7))).collect();
    assert_eq!(*seen.lock(), expected);
}

#[test]
fn self_referencing_node_hits_the_recursion_limit() {
    let runtime = Runtime::builder().max_recursion_depth(32).build();
    let runner = ScriptRunner::new(&runtime);
    let looping = runner.enter(|w| {
        let me = w.var_ref("again", seg());
        NodeBuilder::new(w.runtime(), "again", seg())
            .inputs(vec![me])
            .build_value(|inputs| inputs[0].fix(1))
    });
    runner.root().set_parameter("again", looping.clone());

    let err = runner.run(&[looping]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::RecursionLimitExceeded);
    assert_eq!(dollar_eval::context::call_depth(), 0);
}

#[test]
fn subscribe_assignment_follows_a_queue() {
    let runtime = Runtime::builder()
        .config(dollar_eval::RuntimeConfig::for_mode(EvalMode::Test))
        .build();
    let runner = ScriptRunner::new(&runtime);
    let queue = QueueResource::for_runtime("events", &runtime).into_handle();
    let statement = runner
        .enter(|w| {
            w.assign(
                &OpDef::SUBSCRIBE_ASSIGN,
                Assignment::new("latest", Value::resource(queue.clone()), seg()),
            )
        })
        .unwrap();

    runner.run(&[statement]).unwrap();
    assert_eq!(runtime.subscription_count(), 1);
    for i in 1..=3 {
        queue.backend().write(Value::int(i), false, true);
    }

    assert!(eventually(Duration::from_secs(2), || {
        get(&runner, "latest") == Some(Value::int(3))
    }));
    runtime.shutdown();
    assert_eq!(runtime.subscription_count(), 0);
    assert_eq!(queue.state(), dollar_value::ResourceState::Stopped);
}

#[test]
fn parallel_runtime_forces_lists_in_order() {
    let runtime = Runtime::builder().parallel(true).build();
    let runner = ScriptRunner::new(&runtime);
    let calls = Arc::new(AtomicUsize::new(0));
    let statements = runner
        .enter(|w| {
            let base = declare(w, "base", Value::int(100))?;
            let items = (0..16)
                .map(|i| {
                    let calls = Arc::clone(&calls);
                    let base = w.var_ref("base", seg());
                    NodeBuilder::new(w.runtime(), "item", seg())
                        .inputs(vec![base])
                        .build_value(move |inputs| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            inputs[0].fix(1)?.plus(&Value::int(i))
                        })
                })
                .collect();
            let bind = declare(w, "xs", Value::list(items))?;
            Ok::<_, OperatorTableError>(vec![base, bind])
        })
        .unwrap();

    runner.run(&statements).unwrap();
    let expected: Vec<_> = (0..16).map(|i| Value::int(100 + i)).collect();
    assert_eq!(get(&runner, "xs"), Some(Value::list(expected)));
    assert_eq!(calls.load(Ordering::SeqCst), 16);
}

// -- Properties --

proptest! {
    #[test]
    fn decimal_division_by_zero_keeps_the_sign(d in -1.0e6f64..1.0e6f64) {
        prop_assume!(d != 0.0);
        let runner = ScriptRunner::new(&Runtime::new());
        let quotient = runner
            .enter(|w| op(w, &OpDef::DIVIDE, vec![Value::decimal(d), Value::decimal(0.0)]))
            .unwrap();
        let expected = if d > 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
        prop_assert_eq!(runner.run(&[quotient]).unwrap(), Value::decimal(expected));
    }

    #[test]
    fn forcing_a_concrete_value_is_idempotent(xs in prop::collection::vec(any::<i64>(), 0..8)) {
        let value = Value::list(xs.into_iter().map(Value::int).collect());
        let once = dollar_eval::force(&value, usize::MAX, false).unwrap();
        let twice = dollar_eval::force(&once, usize::MAX, false).unwrap();
        prop_assert_eq!(&once, &value);
        prop_assert_eq!(once, twice);
    }
}

use std::time::Duration;

use super::*;
use crossbeam::channel::unbounded;
use dollar_value::{ResourceState, Signal};
use pretty_assertions::assert_eq;

fn queue(capacity: usize) -> QueueResource {
    QueueResource::new(
        "q",
        capacity,
        Duration::from_millis(2),
        Duration::from_millis(50),
    )
}

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::int).collect())
}

#[test]
fn reads_are_first_in_first_out() {
    let q = queue(10);
    q.write(Value::int(1), false, false);
    q.write(Value::int(2), false, false);

    assert_eq!(q.read(false, false), Value::int(1));
    assert_eq!(q.read(false, true), Value::int(1));
    assert_eq!(q.read(false, true), Value::int(2));
    assert_eq!(q.read(false, true), Value::Void);
}

#[test]
fn full_queue_overwrites_oldest() {
    let q = queue(3);
    for i in 1..=4 {
        q.write(Value::int(i), false, false);
    }
    assert_eq!(q.all(), ints(&[2, 3, 4]));
    assert_eq!(q.size(), Value::int(3));
}

#[test]
fn blocking_write_times_out_then_overwrites() {
    let q = queue(1);
    q.write(Value::int(1), true, false);
    q.write(Value::int(2), true, false);
    assert_eq!(q.all(), ints(&[2]));
}

#[test]
fn drain_empties_the_queue() {
    let q = queue(10);
    q.write(Value::int(1), false, false);
    q.write(Value::int(2), false, false);
    assert_eq!(q.drain(), ints(&[1, 2]));
    assert_eq!(q.size(), Value::int(0));
}

#[test]
fn blocking_read_times_out_to_void() {
    let q = queue(10);
    assert_eq!(q.read(true, true), Value::Void);
}

#[test]
fn blocking_read_wakes_on_write() {
    let q = Arc::new(QueueResource::new(
        "q",
        10,
        Duration::from_millis(2),
        Duration::from_secs(5),
    ));
    let writer = Arc::clone(&q);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        writer.write(Value::int(7), false, false);
    });
    assert_eq!(q.read(true, true), Value::int(7));
    let _ = handle.join();
}

#[test]
fn subscribers_receive_items_in_order() {
    let q = queue(10);
    let (tx, rx) = unbounded();
    let callback: Pipe = Arc::new(move |v: &Value| {
        let _ = tx.send(v.clone());
        Ok(Value::Void)
    });
    assert_eq!(q.subscribe(callback, "s1"), Value::Void);
    for i in 0..5 {
        q.write(Value::int(i), false, false);
    }

    let received: Vec<Value> = (0..5)
        .filter_map(|_| rx.recv_timeout(Duration::from_secs(2)).ok())
        .collect();
    assert_eq!(received, (0..5).map(Value::int).collect::<Vec<_>>());
    assert_eq!(q.subscriber_count(), 1);

    q.unsubscribe("s1");
    assert_eq!(q.subscriber_count(), 0);
}

#[test]
fn paused_queue_holds_items() {
    let q = queue(10);
    let (tx, rx) = unbounded();
    q.pause();
    q.subscribe(
        Arc::new(move |v: &Value| {
            let _ = tx.send(v.clone());
            Ok(Value::Void)
        }),
        "s",
    );
    q.write(Value::int(1), false, false);
    assert!(rx.recv_timeout(Duration::from_millis(30)).is_err());

    q.unpause();
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).ok(), Some(Value::int(1)));
}

#[test]
fn lifecycle_through_handle() {
    let handle = queue(10).into_handle();
    assert_eq!(handle.state(), ResourceState::Created);
    assert_eq!(handle.signal(Signal::Start), Value::Void);
    assert_eq!(handle.state(), ResourceState::Running);
    assert_eq!(handle.signal(Signal::Pause), Value::Void);
    assert_eq!(handle.state(), ResourceState::Paused);
    assert!(handle.signal(Signal::Pause).is_error());
    assert_eq!(handle.signal(Signal::Destroy), Value::Void);
    assert_eq!(handle.state(), ResourceState::Stopped);
}

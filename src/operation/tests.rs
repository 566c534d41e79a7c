use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::error::provider_failure;

/// A native job that completes with `value` once `ready` is set
fn gated<T: Clone + 'static>(ready: &Rc<Cell<bool>>, value: T) -> AsyncOp<T> {
    let ready = Rc::clone(ready);
    AsyncOp::wrap(move || {
        if ready.get() {
            OpStatus::Done(value.clone())
        } else {
            OpStatus::Pending
        }
    })
}

#[test]
fn test_immediate_and_failed() {
    assert_eq!(AsyncOp::immediate(3).poll(), OpStatus::Done(3));
    let err = provider_failure("x", "gone");
    assert_eq!(
        AsyncOp::<i32>::failed(err.clone()).poll(),
        OpStatus::Failed(err)
    );
    assert!(AsyncOp::from_result(Ok::<_, AddressableError>(1)).is_settled());
}

#[test]
fn test_wrapped_settles_exactly_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let op = AsyncOp::wrap(move || {
        counter.set(counter.get() + 1);
        if counter.get() < 3 {
            OpStatus::Pending
        } else {
            OpStatus::Done("loaded")
        }
    });

    assert!(op.poll().is_pending());
    assert!(op.poll().is_pending());
    assert_eq!(op.poll(), OpStatus::Done("loaded"));
    assert_eq!(op.poll(), OpStatus::Done("loaded"));
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_clones_share_instance() {
    let ready = Rc::new(Cell::new(false));
    let op = gated(&ready, 7);
    let same = op.clone();
    assert!(op.ptr_eq(&same));
    assert!(!op.ptr_eq(&gated(&ready, 7)));

    ready.set(true);
    assert_eq!(same.poll(), OpStatus::Done(7));
    assert!(op.is_settled());
}

#[test]
fn test_join_waits_for_both() {
    let ready_a = Rc::new(Cell::new(false));
    let ready_b = Rc::new(Cell::new(false));
    let joined = AsyncOp::join(gated(&ready_a, 2), gated(&ready_b, 3), |a, b| a * b);

    assert!(joined.poll().is_pending());
    ready_a.set(true);
    assert!(joined.poll().is_pending());
    ready_b.set(true);
    assert_eq!(joined.poll(), OpStatus::Done(6));
}

#[test]
fn test_join_failure_skips_combinator() {
    let invoked = Rc::new(Cell::new(false));
    let flag = Rc::clone(&invoked);
    let err = provider_failure("b", "corrupt");
    let joined = AsyncOp::join(
        AsyncOp::immediate(1),
        AsyncOp::<i32>::failed(err.clone()),
        move |a, b| {
            flag.set(true);
            a + b
        },
    );
    assert_eq!(joined.poll(), OpStatus::Failed(err));
    assert!(!invoked.get());
}

#[test]
fn test_join_all() {
    let ready = Rc::new(Cell::new(false));
    let all = AsyncOp::join_all(vec![AsyncOp::immediate(1), gated(&ready, 2)]);
    assert!(all.poll().is_pending());
    ready.set(true);
    assert_eq!(all.poll(), OpStatus::Done(vec![1, 2]));

    let empty = AsyncOp::<i32>::join_all(Vec::new());
    assert_eq!(empty.poll(), OpStatus::Done(vec![]));
}

#[test]
fn test_map_and_then() {
    let ready = Rc::new(Cell::new(false));
    let second_ready = Rc::clone(&ready);
    let chained = AsyncOp::immediate(20)
        .map(|v| v + 1)
        .and_then(move |v| gated(&second_ready, v * 2));

    assert!(chained.poll().is_pending());
    ready.set(true);
    assert_eq!(chained.poll(), OpStatus::Done(42));
}

#[test]
fn test_and_then_not_started_on_failure() {
    let started = Rc::new(Cell::new(false));
    let flag = Rc::clone(&started);
    let err = provider_failure("bundle", "missing");
    let chained = AsyncOp::<()>::failed(err.clone()).and_then(move |()| {
        flag.set(true);
        AsyncOp::immediate(1)
    });
    assert_eq!(chained.poll(), OpStatus::Failed(err));
    assert!(!started.get());
}

#[test]
fn test_cancel_pending() {
    let ready = Rc::new(Cell::new(false));
    let op = gated(&ready, 1).named("ui/logo");
    assert!(op.poll().is_pending());

    op.cancel();
    ready.set(true);
    assert_eq!(
        op.poll(),
        OpStatus::Failed(AddressableError::OperationCancelled {
            id: "ui/logo".to_string()
        })
    );
}

#[test]
fn test_cancel_after_settle_is_ignored() {
    let op = AsyncOp::immediate(5);
    op.cancel();
    assert_eq!(op.poll(), OpStatus::Done(5));
}

#[test]
fn test_cancel_composed_keeps_constituents() {
    let ready = Rc::new(Cell::new(false));
    let shared = gated(&ready, 1);
    let composed = shared.clone().map(|v| v + 1);

    composed.cancel();
    assert!(matches!(composed.poll(), OpStatus::Failed(_)));

    ready.set(true);
    assert_eq!(shared.poll(), OpStatus::Done(1));
}

#[test]
fn test_into_result() {
    assert_eq!(OpStatus::<i32>::Pending.into_result(), None);
    assert_eq!(OpStatus::Done(1).into_result(), Some(Ok(1)));
}

#[test]
fn test_map_err() {
    let op = AsyncOp::<()>::failed(provider_failure("menu", "missing"))
        .map_err(|e| crate::error::invalid_scene("menu", e.to_string()));
    assert!(matches!(
        op.poll(),
        OpStatus::Failed(AddressableError::InvalidScene { .. })
    ));
    assert_eq!(AsyncOp::immediate(1).map_err(|e| e).poll(), OpStatus::Done(1));
}

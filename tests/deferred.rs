use fable::future::{Deferred, Future, Listener, Outcome, State};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn first_transition_wins() {
    let deferred = Deferred::<String, i32>::new();
    let hits = Rc::new(RefCell::new(Vec::new()));
    deferred.listen(Listener::new().on_resolved({
        let hits = hits.clone();
        move |value| hits.borrow_mut().push(value)
    }));

    assert!(deferred.resolve(1));
    assert!(!deferred.reject("too late".to_string()));
    assert!(!deferred.cancel());
    assert!(!deferred.resolve(2));

    assert_eq!(*hits.borrow(), vec![1]);
    assert_eq!(deferred.future().outcome(), Some(Outcome::Resolved(1)));
}

#[test]
fn cancellation_never_overrides_and_is_never_overridden() {
    let deferred = Deferred::<String, i32>::new();
    assert!(deferred.cancel());
    assert!(!deferred.resolve(1));
    assert!(!deferred.reject("nope".to_string()));
    assert_eq!(deferred.future().state(), State::Cancelled);

    let settled = Deferred::<String, i32>::new();
    settled.resolve(7);
    assert!(!settled.future().cancel());
    assert_eq!(settled.future().state(), State::Resolved);
}

#[test]
fn listeners_fire_in_registration_order() {
    let deferred = Deferred::<String, &'static str>::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        deferred.listen(Listener::new().on_resolved({
            let order = order.clone();
            move |_| order.borrow_mut().push(tag)
        }));
    }
    deferred.resolve("go");
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn listener_replay_after_settlement() {
    let deferred = Deferred::<String, i32>::new();
    let before = Rc::new(Cell::new(0));
    deferred.listen(Listener::new().on_resolved({
        let before = before.clone();
        move |value| before.set(value)
    }));
    deferred.resolve(42);

    // Registered after settlement: fires immediately, same outcome.
    let after = Rc::new(Cell::new(0));
    deferred.future().listen(Listener::new().on_resolved({
        let after = after.clone();
        move |value| after.set(value)
    }));
    assert_eq!(before.get(), 42);
    assert_eq!(after.get(), 42);
}

#[test]
fn rejection_reaches_the_rejection_callback_only() {
    let deferred = Deferred::<&'static str, i32>::new();
    let resolved = Rc::new(Cell::new(false));
    let cancelled = Rc::new(Cell::new(false));
    let reason = Rc::new(RefCell::new(None));
    deferred.listen(
        Listener::new()
            .on_resolved({
                let resolved = resolved.clone();
                move |_| resolved.set(true)
            })
            .on_cancelled({
                let cancelled = cancelled.clone();
                move || cancelled.set(true)
            })
            .on_rejected({
                let reason = reason.clone();
                move |r| *reason.borrow_mut() = Some(r)
            }),
    );
    deferred.reject("boom");
    assert!(!resolved.get());
    assert!(!cancelled.get());
    assert_eq!(*reason.borrow(), Some("boom"));
}

#[test]
fn future_chain_short_circuits_on_rejection() {
    let rejected = Future::<&'static str, i32>::rejected("boom");
    let ran = Rc::new(Cell::new(false));
    let chained = rejected.chain({
        let ran = ran.clone();
        move |value| {
            ran.set(true);
            Future::of(value + 1)
        }
    });
    assert!(!ran.get());
    assert_eq!(chained.outcome(), Some(Outcome::Rejected("boom")));
}

#[test]
fn future_chain_forwards_dependent_outcome() {
    let deferred = Deferred::<&'static str, i32>::new();
    let chained = deferred.future().chain(|n| Future::of(n * 2));
    assert!(chained.is_pending());
    deferred.resolve(21);
    assert_eq!(chained.outcome(), Some(Outcome::Resolved(42)));
}

#[test]
fn future_combinators_map_both_channels() {
    let ok = Future::<&'static str, i32>::of(2).map(|n| n + 1);
    assert_eq!(ok.outcome(), Some(Outcome::Resolved(3)));

    let err = Future::<&'static str, i32>::rejected("bad")
        .map_rejected(|reason| reason.len());
    assert_eq!(err.outcome(), Some(Outcome::Rejected(3)));

    let both = Future::<i32, i32>::rejected(3).bimap(|e| e * 2, |v| v * 10);
    assert_eq!(both.outcome(), Some(Outcome::Rejected(6)));

    let swapped = Future::<&'static str, i32>::of(1).swap();
    assert_eq!(swapped.outcome(), Some(Outcome::Rejected(1)));

    let recovered =
        Future::<&'static str, i32>::rejected("bad").recover(|_| Future::<String, i32>::of(0));
    assert_eq!(recovered.outcome(), Some(Outcome::Resolved(0)));
}

#[test]
fn cancellation_propagates_through_chain() {
    let deferred = Deferred::<&'static str, i32>::new();
    let ran = Rc::new(Cell::new(false));
    let chained = deferred.future().chain({
        let ran = ran.clone();
        move |n| {
            ran.set(true);
            Future::of(n)
        }
    });
    deferred.cancel();
    assert!(!ran.get());
    assert_eq!(chained.outcome(), Some(Outcome::Cancelled));
}

#[test]
fn or_settles_with_first_and_cancels_loser() {
    let left = Deferred::<&'static str, i32>::new();
    let right = Deferred::<&'static str, i32>::new();
    let raced = left.future().or(&right.future());

    left.resolve(1);
    assert_eq!(raced.outcome(), Some(Outcome::Resolved(1)));
    assert_eq!(right.future().state(), State::Cancelled);

    // The loser's settlement is too late to matter.
    assert!(!right.resolve(2));
    assert_eq!(raced.outcome(), Some(Outcome::Resolved(1)));
}

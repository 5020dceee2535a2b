use fable::future::{Listener, Outcome, State};
use fable::task::{task, wait_all, Task};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn of_resolves_every_run() {
    let t = Task::<String, i32>::of(7);
    for _ in 0..2 {
        let execution = t.run();
        assert_eq!(execution.future().outcome(), Some(Outcome::Resolved(7)));
    }
}

#[test]
fn rejected_rejects_every_run() {
    let t = Task::<&'static str, i32>::rejected("nope");
    let execution = t.run();
    assert_eq!(execution.future().outcome(), Some(Outcome::Rejected("nope")));
}

#[test]
fn chain_sequences_and_short_circuits() {
    let doubled = Task::<&'static str, i32>::of(21).chain(|n| Task::of(n * 2));
    assert_eq!(
        doubled.run().future().outcome(),
        Some(Outcome::Resolved(42))
    );

    let ran = Rc::new(Cell::new(false));
    let after_rejection = Task::<&'static str, i32>::rejected("boom").chain({
        let ran = ran.clone();
        move |n| {
            ran.set(true);
            Task::of(n)
        }
    });
    assert_eq!(
        after_rejection.run().future().outcome(),
        Some(Outcome::Rejected("boom"))
    );
    assert!(!ran.get());
}

#[test]
fn map_and_or_else_transform_their_channels() {
    let mapped = Task::<&'static str, i32>::of(1).map(|n| n + 1);
    assert_eq!(mapped.run().future().outcome(), Some(Outcome::Resolved(2)));

    let renamed = Task::<&'static str, i32>::rejected("x").map_rejected(|r| r.len());
    assert_eq!(renamed.run().future().outcome(), Some(Outcome::Rejected(1)));

    let recovered = Task::<&'static str, i32>::rejected("x").or_else(|_| Task::<String, i32>::of(9));
    assert_eq!(
        recovered.run().future().outcome(),
        Some(Outcome::Resolved(9))
    );
}

#[test]
fn and_joins_both_values() {
    let joined = Task::<&'static str, i32>::of(1).and(&Task::of(2));
    assert_eq!(
        joined.run().future().outcome(),
        Some(Outcome::Resolved((1, 2)))
    );
}

#[test]
fn and_rejection_cancels_the_other_side() {
    let hook_fired = Rc::new(Cell::new(false));
    let never: Task<&'static str, i32> = task({
        let hook_fired = hook_fired.clone();
        move |resolver| {
            let hook_fired = hook_fired.clone();
            resolver.on_cancelled(move || hook_fired.set(true));
        }
    });
    let joined = Task::<&'static str, i32>::rejected("boom").and(&never);
    let execution = joined.run();
    assert_eq!(
        execution.future().outcome(),
        Some(Outcome::Rejected("boom"))
    );
    assert!(hook_fired.get());
}

#[test]
fn wait_all_preserves_input_order() {
    let all = wait_all(vec![
        Task::<&'static str, i32>::of(1),
        Task::of(2),
        Task::of(3),
    ]);
    assert_eq!(
        all.run().future().outcome(),
        Some(Outcome::Resolved(vec![1, 2, 3]))
    );
}

#[test]
#[should_panic(expected = "non-empty")]
fn wait_all_rejects_empty_input() {
    let _ = wait_all(Vec::<Task<String, i32>>::new());
}

#[test]
fn cancellation_hooks_fire_in_order_only_on_cancel() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let pending: Task<String, i32> = task({
        let order = order.clone();
        move |resolver| {
            for tag in ["first", "second"] {
                let order = order.clone();
                resolver.on_cancelled(move || order.borrow_mut().push(tag));
            }
            let order = order.clone();
            resolver.cleanup(move || order.borrow_mut().push("cleanup"));
        }
    });

    let execution = pending.run();
    execution.cancel();
    execution.cancel();
    assert_eq!(*order.borrow(), vec!["first", "second", "cleanup"]);
    assert_eq!(execution.future().state(), State::Cancelled);
}

#[test]
fn cancellation_hooks_never_fire_on_resolution() {
    let cancelled = Rc::new(Cell::new(false));
    let cleaned = Rc::new(Cell::new(false));
    let t: Task<String, i32> = task({
        let cancelled = cancelled.clone();
        let cleaned = cleaned.clone();
        move |resolver| {
            let cancelled = cancelled.clone();
            resolver.on_cancelled(move || cancelled.set(true));
            let cleaned = cleaned.clone();
            resolver.cleanup(move || cleaned.set(true));
            resolver.resolve(5);
        }
    });
    let execution = t.run();
    execution.cancel();
    assert_eq!(execution.future().outcome(), Some(Outcome::Resolved(5)));
    assert!(!cancelled.get());
    assert!(cleaned.get());
}

#[test]
fn late_hook_on_cancelled_run_fires_immediately() {
    let resolvers = Rc::new(RefCell::new(Vec::new()));
    let pending: Task<String, i32> = task({
        let resolvers = resolvers.clone();
        move |resolver| resolvers.borrow_mut().push(resolver)
    });
    let execution = pending.run();
    execution.cancel();

    let fired = Rc::new(Cell::new(false));
    let resolver = resolvers.borrow_mut().pop().expect("one run");
    assert!(resolver.is_cancelled());
    resolver.on_cancelled({
        let fired = fired.clone();
        move || fired.set(true)
    });
    assert!(fired.get());
}

#[test]
fn runs_are_independent() {
    let counter = Rc::new(Cell::new(0));
    let t: Task<String, i32> = task({
        let counter = counter.clone();
        move |resolver| {
            counter.set(counter.get() + 1);
            resolver.resolve(counter.get());
        }
    });
    let first = t.run();
    let second = t.run();
    assert_eq!(first.future().outcome(), Some(Outcome::Resolved(1)));
    assert_eq!(second.future().outcome(), Some(Outcome::Resolved(2)));
}

#[test]
fn listeners_observe_a_run_through_listen() {
    let got = Rc::new(Cell::new(0));
    let execution = Task::<String, i32>::of(11).run();
    execution.listen(Listener::new().on_resolved({
        let got = got.clone();
        move |value| got.set(value)
    }));
    assert_eq!(got.get(), 11);
}

//! Regression scenario: cancelling a chain of timer-backed stages must
//! cancel whichever stage is in flight and never start the stages after it.

use fable::convert::{future_to_native, Failure};
use fable::runtime::{self, Reactor};
use fable::task::{task, Task};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn chained_stages_cancel_in_flight() {
    let started = Rc::new(RefCell::new(Vec::new()));
    let finished = Rc::new(RefCell::new(Vec::new()));

    let outcome = runtime::block_on(async {
        let delay = {
            let started = started.clone();
            let finished = finished.clone();
            move |ms: u64, tag: &'static str| -> Task<String, &'static str> {
                let started = started.clone();
                let finished = finished.clone();
                task(move |resolver| {
                    started.borrow_mut().push(tag);
                    let reactor = Reactor::current();
                    let key = reactor.set_timeout(Duration::from_millis(ms), {
                        let finished = finished.clone();
                        let resolver = resolver.clone();
                        move || {
                            finished.borrow_mut().push(tag);
                            resolver.resolve(tag);
                        }
                    });
                    resolver.on_cancelled(move || reactor.clear_timeout(key));
                })
            }
        };

        // Three 100ms stages; cancellation lands at 150ms, halfway through
        // the second stage.
        let chain = {
            let d1 = delay.clone();
            let d2 = delay.clone();
            delay(100, "a")
                .chain(move |_| d1(100, "b"))
                .chain(move |_| d2(100, "c"))
        };
        let execution = chain.run();
        Reactor::current().set_timeout(Duration::from_millis(150), {
            let execution = execution.clone();
            move || execution.cancel()
        });

        future_to_native(&execution.future()).await
    });

    assert_eq!(outcome, Err(Failure::Cancelled));
    assert_eq!(*started.borrow(), vec!["a", "b"]);
    assert_eq!(*finished.borrow(), vec!["a"]);
}

#[test]
fn cancelling_before_first_resolution_never_runs_the_transformation() {
    let transformed = Rc::new(RefCell::new(false));

    let outcome = runtime::block_on(async {
        let first: Task<String, i32> = task(|resolver| {
            let reactor = Reactor::current();
            let key = reactor.set_timeout(Duration::from_millis(50), {
                let resolver = resolver.clone();
                move || resolver.resolve(1)
            });
            resolver.on_cancelled(move || reactor.clear_timeout(key));
        });
        let chain = first.chain({
            let transformed = transformed.clone();
            move |n| {
                *transformed.borrow_mut() = true;
                Task::of(n + 1)
            }
        });
        let execution = chain.run();
        Reactor::current().set_timeout(Duration::from_millis(10), {
            let execution = execution.clone();
            move || execution.cancel()
        });
        future_to_native(&execution.future()).await
    });

    assert_eq!(outcome, Err(Failure::Cancelled));
    assert!(!*transformed.borrow());
}

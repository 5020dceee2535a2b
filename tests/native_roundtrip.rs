use fable::convert::{future_to_native, native_to_future, Failure};
use fable::future::{Deferred, Future, Outcome};
use fable::runtime::{self, Reactor};
use futures_lite::future::poll_once;
use std::time::Duration;

#[test]
fn resolved_future_becomes_ok() {
    let result = runtime::block_on(async {
        let future = Future::<String, i32>::of(7);
        future_to_native(&future).await
    });
    assert_eq!(result, Ok(7));
}

#[test]
fn rejected_future_becomes_rejected_failure() {
    let result = runtime::block_on(async {
        let future = Future::<&'static str, i32>::rejected("boom");
        future_to_native(&future).await
    });
    assert_eq!(result, Err(Failure::Rejected("boom")));
}

#[test]
fn cancelled_future_becomes_the_cancellation_sentinel() {
    let result = runtime::block_on(async {
        let deferred = Deferred::<String, i32>::new();
        let future = deferred.future();
        future.cancel();
        future_to_native(&future).await
    });
    assert_eq!(result, Err(Failure::Cancelled));
}

#[test]
fn pending_future_stays_pending() {
    runtime::block_on(async {
        let deferred = Deferred::<String, i32>::new();
        let native = future_to_native(&deferred.future());
        assert!(poll_once(native).await.is_none());
    });
}

#[test]
fn settlement_wakes_a_waiting_native_future() {
    let result = runtime::block_on(async {
        let deferred = Deferred::<String, i32>::new();
        Reactor::current().set_timeout(Duration::from_millis(5), {
            let deferred = deferred.clone();
            move || {
                deferred.resolve(5);
            }
        });
        future_to_native(&deferred.future()).await
    });
    assert_eq!(result, Ok(5));
}

#[test]
fn round_trip_preserves_all_three_outcomes() {
    runtime::block_on(async {
        let resolved = Future::<String, i32>::of(1);
        let back = native_to_future(future_to_native(&resolved));
        assert_eq!(future_to_native(&back).await, Ok(1));

        let rejected = Future::<&'static str, i32>::rejected("boom");
        let back = native_to_future(future_to_native(&rejected));
        assert_eq!(future_to_native(&back).await, Err(Failure::Rejected("boom")));

        let cancelled = Deferred::<String, i32>::new().future();
        cancelled.cancel();
        let back = native_to_future(future_to_native(&cancelled));
        assert_eq!(future_to_native(&back).await, Err(Failure::Cancelled));
        assert_eq!(back.outcome(), Some(Outcome::Cancelled));
    });
}

#[test]
fn cancelling_the_adapted_future_stops_the_driver() {
    runtime::block_on(async {
        // A native future that would resolve at 50ms, adapted and cancelled
        // at once: the driver must leave the cancellation in place.
        let adapted = native_to_future(async {
            fable::time::sleep(Duration::from_millis(50)).await;
            Ok::<i32, Failure<String>>(9)
        });
        adapted.cancel();
        assert_eq!(future_to_native(&adapted).await, Err(Failure::Cancelled));
        assert_eq!(adapted.outcome(), Some(Outcome::Cancelled));
    });
}

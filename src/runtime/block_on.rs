use super::{Reactor, REACTOR};

use core::future::Future;
use core::pin::pin;
use core::task::Waker;
use core::task::{Context, Poll};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Wake;
use std::thread;
use std::time::Instant;

/// Runs a native future to completion on the current thread, driving timers
/// and locally-spawned tasks while it is pending.
///
/// # Panics
///
/// Panics when nested inside another `block_on`, and when the main future is
/// pending while the reactor has no timers and no runnable tasks - at that
/// point no event could ever wake it, so hanging would only mask the bug.
pub fn block_on<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    // Construct the reactor and store a copy as a singleton for
    // `Reactor::current()` to hand out.
    let reactor = Reactor::new();
    let prev = REACTOR.replace(Some(reactor.clone()));
    if prev.is_some() {
        panic!("cannot fable::runtime::block_on inside an existing block_on!")
    }

    // Pin the future so it can be polled
    let mut fut = pin!(fut);

    // Create a new context to be passed to the future.
    let waker_impl = Arc::new(MainWaker::new());
    let waker = Waker::from(Arc::clone(&waker_impl));
    let mut cx = Context::from_waker(&waker);

    // Either the future completes and we return, or some timer or spawned
    // task is due and we run it.
    let res = loop {
        // Clear the flag before polling: a wake that lands during the poll
        // itself must not be lost.
        waker_impl.set_awake(false);
        if let Poll::Ready(res) = fut.as_mut().poll(&mut cx) {
            break res;
        }
        reactor.run_tasks();
        if waker_impl.awake() {
            continue;
        }
        let now = Instant::now();
        if reactor.fire_due(now) {
            continue;
        }
        match reactor.next_deadline() {
            Some(deadline) => thread::sleep(deadline.saturating_duration_since(now)),
            None => panic!(
                "fable::runtime::block_on would block forever: \
                 the main future is pending but no timers or tasks are scheduled"
            ),
        }
    };
    // Clear the singleton
    REACTOR.replace(None);
    res
}

struct MainWaker {
    awake: AtomicBool,
}

impl MainWaker {
    fn new() -> Self {
        Self {
            awake: AtomicBool::new(false),
        }
    }

    #[inline]
    fn set_awake(&self, awake: bool) {
        self.awake.store(awake, Ordering::Relaxed);
    }

    #[inline]
    fn awake(&self) -> bool {
        self.awake.load(Ordering::Relaxed)
    }
}

impl Wake for MainWaker {
    fn wake(self: Arc<Self>) {
        self.set_awake(true);
    }
}

//! Timer-backed futures and tasks.
//!
//! Both shapes ride on the reactor's timer queue and therefore only work
//! inside [`crate::runtime::block_on`]: [`sleep`] for native `async` code,
//! [`delay`] for [`Task`] pipelines. There is no built-in timeout; compose
//! one by racing against a `delay`, e.g.
//! `work.or(&delay(limit).chain(|_| Task::rejected(timed_out)))`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use crate::runtime::{Reactor, TimerKey};
use crate::task::{task, Task};

/// Suspends native async code for the given duration.
pub fn sleep(dur: Duration) -> Sleep {
    Sleep {
        deadline: Instant::now() + dur,
        key: None,
    }
}

/// A native future that completes once its deadline has passed.
///
/// Created by [`sleep`]. Must be polled inside
/// [`block_on`][crate::runtime::block_on]; dropping it releases its timer.
#[must_use = "futures do nothing unless polled or .awaited"]
#[derive(Debug)]
pub struct Sleep {
    deadline: Instant,
    key: Option<TimerKey>,
}

impl Future for Sleep {
    type Output = Instant;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let now = Instant::now();
        if now >= this.deadline {
            if let Some(key) = this.key.take() {
                Reactor::current().clear_timeout(key);
            }
            return Poll::Ready(now);
        }
        let reactor = Reactor::current();
        match this.key {
            Some(key) => reactor.update_waker(key, cx.waker()),
            None => this.key = Some(reactor.register_waker_at(this.deadline, cx.waker())),
        }
        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            // The runtime may already have exited; a timer without a runtime
            // is gone anyway.
            if let Some(reactor) = Reactor::try_current() {
                reactor.clear_timeout(key);
            }
        }
    }
}

/// A task that resolves with the current instant once `dur` has elapsed.
///
/// Cancelling the run clears the underlying timer, so a cancelled delay
/// costs nothing beyond the bookkeeping. Each run schedules its own timer.
///
/// # Panics
///
/// Running the returned task panics outside
/// [`block_on`][crate::runtime::block_on].
pub fn delay<E: Clone + 'static>(dur: Duration) -> Task<E, Instant> {
    task(move |resolver| {
        let reactor = Reactor::current();
        let key = reactor.set_timeout(dur, {
            let resolver = resolver.clone();
            move || resolver.resolve(Instant::now())
        });
        resolver.on_cancelled(move || reactor.clear_timeout(key));
    })
}

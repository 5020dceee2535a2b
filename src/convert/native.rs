use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures_core::ready;
use pin_project_lite::pin_project;

use crate::future::{Deferred, Future, Listener, Outcome};
use crate::runtime::Reactor;

/// The error channel of a native future standing in for a [`Future`].
///
/// Native futures have two outcomes where ours have three, so cancellation
/// is folded into the error channel as a distinguished variant. The reverse
/// adapter ([`native_to_future`]) recovers `Cancelled` as a cancellation,
/// which makes the two adapters round-trip all three outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure<E> {
    /// The computation rejected with this reason.
    Rejected(E),
    /// The computation was cancelled; there is no payload to carry.
    Cancelled,
}

impl<E> Failure<E> {
    /// Returns `true` for [`Failure::Cancelled`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Failure::Cancelled)
    }
}

/// Adapts a [`Future`] into a native [`std::future::Future`].
///
/// Resolution becomes `Ok`, rejection `Err(Failure::Rejected)`, and
/// cancellation `Err(Failure::Cancelled)`. The adapter registers a single
/// listener on first poll and needs no reactor of its own; it can be awaited
/// under any executor.
pub fn future_to_native<E, V>(future: &Future<E, V>) -> Native<E, V>
where
    E: Clone + 'static,
    V: Clone + 'static,
{
    Native {
        future: future.clone(),
        shared: Rc::new(RefCell::new(NativeShared {
            outcome: None,
            waker: None,
            registered: false,
        })),
    }
}

/// Native-future view of a [`Future`]. See [`future_to_native`].
#[must_use = "futures do nothing unless polled or .awaited"]
#[derive(Debug)]
pub struct Native<E, V> {
    future: Future<E, V>,
    shared: Rc<RefCell<NativeShared<E, V>>>,
}

struct NativeShared<E, V> {
    outcome: Option<Outcome<E, V>>,
    waker: Option<Waker>,
    registered: bool,
}

impl<E, V> std::fmt::Debug for NativeShared<E, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeShared")
            .field("settled", &self.outcome.is_some())
            .field("registered", &self.registered)
            .finish()
    }
}

impl<E: Clone + 'static, V: Clone + 'static> std::future::Future for Native<E, V> {
    type Output = Result<V, Failure<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let register = {
            let mut shared = this.shared.borrow_mut();
            if let Some(outcome) = shared.outcome.take() {
                return Poll::Ready(outcome_to_result(outcome));
            }
            shared.waker = Some(cx.waker().clone());
            !std::mem::replace(&mut shared.registered, true)
        };
        if register {
            // The listener may fire synchronously if the future has already
            // settled, which is why the borrow is released first and the
            // outcome re-checked after.
            let shared = this.shared.clone();
            this.future.listen(
                Listener::new()
                    .on_resolved({
                        let shared = shared.clone();
                        move |value| settle_native(&shared, Outcome::Resolved(value))
                    })
                    .on_rejected({
                        let shared = shared.clone();
                        move |reason| settle_native(&shared, Outcome::Rejected(reason))
                    })
                    .on_cancelled(move || settle_native(&shared, Outcome::Cancelled)),
            );
            let mut shared = this.shared.borrow_mut();
            if let Some(outcome) = shared.outcome.take() {
                return Poll::Ready(outcome_to_result(outcome));
            }
        }
        Poll::Pending
    }
}

fn settle_native<E, V>(shared: &Rc<RefCell<NativeShared<E, V>>>, outcome: Outcome<E, V>) {
    let waker = {
        let mut shared = shared.borrow_mut();
        shared.outcome = Some(outcome);
        shared.waker.take()
    };
    if let Some(waker) = waker {
        waker.wake();
    }
}

fn outcome_to_result<E, V>(outcome: Outcome<E, V>) -> Result<V, Failure<E>> {
    match outcome {
        Outcome::Resolved(value) => Ok(value),
        Outcome::Rejected(reason) => Err(Failure::Rejected(reason)),
        Outcome::Cancelled => Err(Failure::Cancelled),
    }
}

/// Adapts a native future into a [`Future`], spawning a driver on the
/// current reactor.
///
/// An `Err(Failure::Cancelled)` settlement cancels the future instead of
/// rejecting it, undoing the fold [`future_to_native`] performs. If the
/// returned future is cancelled externally the driver stops polling the
/// native future at its next wake.
///
/// # Panics
///
/// Panics outside [`block_on`][crate::runtime::block_on].
pub fn native_to_future<E, V, F>(future: F) -> Future<E, V>
where
    F: std::future::Future<Output = Result<V, Failure<E>>> + 'static,
    E: Clone + 'static,
    V: Clone + 'static,
{
    let deferred = Deferred::new();
    let handle = deferred.future();
    Reactor::current().spawn(Drive { future, deferred });
    handle
}

pin_project! {
    struct Drive<F, E, V> {
        #[pin]
        future: F,
        deferred: Deferred<E, V>,
    }
}

impl<F, E, V> std::future::Future for Drive<F, E, V>
where
    F: std::future::Future<Output = Result<V, Failure<E>>>,
    E: Clone + 'static,
    V: Clone + 'static,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if !this.deferred.is_pending() {
            // Cancelled (or otherwise settled) from outside; nothing left to
            // drive.
            return Poll::Ready(());
        }
        match ready!(this.future.poll(cx)) {
            Ok(value) => this.deferred.resolve(value),
            Err(Failure::Rejected(reason)) => this.deferred.reject(reason),
            Err(Failure::Cancelled) => this.deferred.cancel(),
        };
        Poll::Ready(())
    }
}

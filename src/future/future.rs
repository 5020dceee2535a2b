use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::deferred::{cell_outcome, cell_state, fmt_cell, listen_cell, settle_cell, CellRef};
use super::{Deferred, Listener, Outcome, State};

/// The consumer half of a settle-once cell: subscribe, compose, cancel.
///
/// A `Future` is a cheap handle (clones share the same cell). It settles at
/// most once with an [`Outcome`], which listeners observe through
/// [`listen`][Future::listen]; all combinators are built on top of that one
/// primitive, each wiring a fresh [`Deferred`] to the receiver's outcome.
///
/// Unlike a native [`std::future::Future`], this type is eager (the
/// computation producing it is already underway) and supports external
/// cancellation via [`cancel`][Future::cancel]. The two worlds are bridged by
/// [`crate::convert`].
pub struct Future<E, V> {
    cell: CellRef<E, V>,
}

impl<E: Clone + 'static, V: Clone + 'static> Future<E, V> {
    pub(crate) fn from_cell(cell: CellRef<E, V>) -> Self {
        Self { cell }
    }

    /// A future already settled with [`Outcome::Resolved`].
    #[must_use]
    pub fn of(value: V) -> Self {
        let deferred = Deferred::new();
        deferred.resolve(value);
        deferred.future()
    }

    /// A future already settled with [`Outcome::Rejected`].
    #[must_use]
    pub fn rejected(reason: E) -> Self {
        let deferred = Deferred::new();
        deferred.reject(reason);
        deferred.future()
    }

    /// Registers a listener. See [`Listener`] for the delivery contract.
    pub fn listen(&self, listener: Listener<E, V>) {
        listen_cell(&self.cell, listener);
    }

    /// Cancels the future if it is still pending; a no-op once settled.
    /// Returns whether this call performed the transition.
    ///
    /// Cancellation is advisory and cooperative: it only releases resources
    /// if the producing computation registered a cancellation hook (see
    /// [`Resolver::on_cancelled`][crate::task::Resolver::on_cancelled]).
    pub fn cancel(&self) -> bool {
        settle_cell(&self.cell, Outcome::Cancelled)
    }

    /// The current state, without payload.
    #[must_use]
    pub fn state(&self) -> State {
        cell_state(&self.cell)
    }

    /// Returns `true` while the future has not settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    /// A clone of the settled outcome, or `None` while pending.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome<E, V>> {
        cell_outcome(&self.cell)
    }

    /// Sequences a dependent future: once this future resolves,
    /// `transformation` runs with the value and the result future's outcome
    /// is forwarded. Rejection and cancellation short-circuit without
    /// invoking `transformation`.
    pub fn chain<V2: Clone + 'static>(
        &self,
        transformation: impl FnOnce(V) -> Future<E, V2> + 'static,
    ) -> Future<E, V2> {
        let deferred = Deferred::new();
        let d = deferred.clone();
        self.listen(
            Listener::new()
                .on_cancelled({
                    let d = d.clone();
                    move || {
                        d.cancel();
                    }
                })
                .on_rejected({
                    let d = d.clone();
                    move |reason| {
                        d.reject(reason);
                    }
                })
                .on_resolved(move |value| {
                    transformation(value).listen(
                        Listener::new()
                            .on_cancelled({
                                let d = d.clone();
                                move || {
                                    d.cancel();
                                }
                            })
                            .on_rejected({
                                let d = d.clone();
                                move |reason| {
                                    d.reject(reason);
                                }
                            })
                            .on_resolved(move |value| {
                                d.resolve(value);
                            }),
                    );
                }),
        );
        deferred.future()
    }

    /// Transforms the success value.
    pub fn map<V2: Clone + 'static>(
        &self,
        transformation: impl FnOnce(V) -> V2 + 'static,
    ) -> Future<E, V2> {
        self.chain(move |value| Future::of(transformation(value)))
    }

    /// Transforms both channels at once.
    pub fn bimap<E2: Clone + 'static, V2: Clone + 'static>(
        &self,
        on_rejection: impl FnOnce(E) -> E2 + 'static,
        on_success: impl FnOnce(V) -> V2 + 'static,
    ) -> Future<E2, V2> {
        let deferred = Deferred::new();
        let d = deferred.clone();
        self.listen(
            Listener::new()
                .on_cancelled({
                    let d = d.clone();
                    move || {
                        d.cancel();
                    }
                })
                .on_rejected({
                    let d = d.clone();
                    move |reason| {
                        d.reject(on_rejection(reason));
                    }
                })
                .on_resolved(move |value| {
                    d.resolve(on_success(value));
                }),
        );
        deferred.future()
    }

    /// Transforms the rejection reason.
    pub fn map_rejected<E2: Clone + 'static>(
        &self,
        transformation: impl FnOnce(E) -> E2 + 'static,
    ) -> Future<E2, V> {
        self.bimap(transformation, |value| value)
    }

    /// Recovers from a rejection by sequencing a new future from the reason.
    /// Resolution and cancellation pass through untouched.
    pub fn recover<E2: Clone + 'static>(
        &self,
        handler: impl FnOnce(E) -> Future<E2, V> + 'static,
    ) -> Future<E2, V> {
        let deferred = Deferred::new();
        let d = deferred.clone();
        self.listen(
            Listener::new()
                .on_cancelled({
                    let d = d.clone();
                    move || {
                        d.cancel();
                    }
                })
                .on_resolved({
                    let d = d.clone();
                    move |value| {
                        d.resolve(value);
                    }
                })
                .on_rejected(move |reason| {
                    handler(reason).listen(
                        Listener::new()
                            .on_cancelled({
                                let d = d.clone();
                                move || {
                                    d.cancel();
                                }
                            })
                            .on_resolved({
                                let d = d.clone();
                                move |value| {
                                    d.resolve(value);
                                }
                            })
                            .on_rejected(move |reason| {
                                d.reject(reason);
                            }),
                    );
                }),
        );
        deferred.future()
    }

    /// Swaps the success and failure channels.
    pub fn swap(&self) -> Future<V, E> {
        let deferred = Deferred::new();
        let d = deferred.clone();
        self.listen(
            Listener::new()
                .on_cancelled({
                    let d = d.clone();
                    move || {
                        d.cancel();
                    }
                })
                .on_rejected({
                    let d = d.clone();
                    move |reason| {
                        d.resolve(reason);
                    }
                })
                .on_resolved(move |value| {
                    d.reject(value);
                }),
        );
        deferred.future()
    }

    /// Races two futures: the first settlement (resolution, rejection, or
    /// cancellation) wins and the loser is cancelled to release its
    /// resources.
    pub fn or(&self, that: &Future<E, V>) -> Future<E, V> {
        let deferred = Deferred::new();
        let done = Rc::new(Cell::new(false));
        wire_race(self, that.clone(), &deferred, &done);
        wire_race(that, self.clone(), &deferred, &done);
        deferred.future()
    }
}

fn wire_race<E: Clone + 'static, V: Clone + 'static>(
    side: &Future<E, V>,
    loser: Future<E, V>,
    deferred: &Deferred<E, V>,
    done: &Rc<Cell<bool>>,
) {
    let resolved = {
        let d = deferred.clone();
        let done = done.clone();
        let loser = loser.clone();
        move |value| {
            if !done.replace(true) {
                loser.cancel();
                d.resolve(value);
            }
        }
    };
    let rejected = {
        let d = deferred.clone();
        let done = done.clone();
        let loser = loser.clone();
        move |reason| {
            if !done.replace(true) {
                loser.cancel();
                d.reject(reason);
            }
        }
    };
    let cancelled = {
        let d = deferred.clone();
        let done = done.clone();
        move || {
            if !done.replace(true) {
                loser.cancel();
                d.cancel();
            }
        }
    };
    side.listen(
        Listener::new()
            .on_resolved(resolved)
            .on_rejected(rejected)
            .on_cancelled(cancelled),
    );
}

impl<E, V> Clone for Future<E, V> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<E, V> fmt::Debug for Future<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_cell("Future", &self.cell, f)
    }
}

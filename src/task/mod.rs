//! Lazy, re-runnable, cancellable computations.
//!
//! A [`Task`] is a description of an asynchronous computation: nothing
//! happens until [`Task::run`] hands a fresh [`Resolver`] to the wrapped
//! closure and returns an [`Execution`]. Each run settles at most once and
//! can be cancelled cooperatively; the computation reacts to cancellation
//! through [`Resolver::on_cancelled`] hooks (clearing a timer, dropping a
//! connection) and releases resources unconditionally through
//! [`Resolver::cleanup`].
//!
//! ```no_run
//! use fable::future::Listener;
//! use fable::runtime::Reactor;
//! use fable::task::task;
//! use std::time::Duration;
//!
//! let delayed = task::<String, &str, _>(|resolver| {
//!     let reactor = Reactor::current();
//!     let r = resolver.clone();
//!     let key = reactor.set_timeout(Duration::from_millis(100), move || r.resolve("done"));
//!     resolver.on_cancelled(move || reactor.clear_timeout(key));
//! });
//! let execution = delayed.run();
//! execution.listen(Listener::new().on_resolved(|v| println!("{v}")));
//! ```
//!
//! Combinators ([`Task::chain`], [`Task::or`], [`Task::and`]) propagate
//! cancellation to whichever run is currently in flight: cancelling a
//! chained execution after the first stage resolved cancels the second
//! stage, and a stage that never started is never started at all.

mod execution;
mod resolver;
mod wait;

pub use execution::Execution;
pub use resolver::Resolver;
pub use wait::{wait_all, wait_any};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::future::{Deferred, Listener};
use resolver::{new_run_state, wire_hooks};

/// A lazy, cancellable computation producing a value of type `V` or a
/// failure of type `E`.
///
/// Tasks are values: cloning is cheap, and the same task may be run any
/// number of times, each run independent. See the [module docs][self].
pub struct Task<E, V> {
    computation: Rc<dyn Fn(Resolver<E, V>)>,
}

/// Creates a task from a computation. The computation runs once per
/// [`Task::run`] call, receiving that run's [`Resolver`].
pub fn task<E, V, F>(computation: F) -> Task<E, V>
where
    F: Fn(Resolver<E, V>) + 'static,
{
    Task {
        computation: Rc::new(computation),
    }
}

impl<E: Clone + 'static, V: Clone + 'static> Task<E, V> {
    /// A task that immediately resolves with `value` on every run.
    #[must_use]
    pub fn of(value: V) -> Self {
        task(move |resolver| resolver.resolve(value.clone()))
    }

    /// A task that immediately rejects with `reason` on every run.
    #[must_use]
    pub fn rejected(reason: E) -> Self {
        task(move |resolver| resolver.reject(reason.clone()))
    }

    /// Starts one run of this task.
    pub fn run(&self) -> Execution<E, V> {
        let deferred = Deferred::new();
        let state = new_run_state();
        wire_hooks(&deferred, &state);
        let resolver = Resolver {
            deferred: deferred.clone(),
            state,
        };
        (self.computation)(resolver);
        Execution { deferred }
    }

    /// Sequences a dependent task: once this task resolves, `transformation`
    /// runs with the value and the resulting task is started; its outcome
    /// becomes the chained task's outcome. Rejection and cancellation
    /// short-circuit without invoking `transformation`.
    ///
    /// Cancelling the chained execution cancels whichever stage is in
    /// flight: the outer run while it is pending, the inner run once it has
    /// started. If cancellation lands before the outer run resolves,
    /// `transformation` never runs.
    pub fn chain<V2: Clone + 'static>(
        &self,
        transformation: impl Fn(V) -> Task<E, V2> + 'static,
    ) -> Task<E, V2> {
        let this = self.clone();
        let transformation = Rc::new(transformation);
        task(move |resolver| {
            let execution = this.run();
            resolver.on_cancelled({
                let execution = execution.clone();
                move || execution.cancel()
            });
            let transformation = transformation.clone();
            execution.listen(
                Listener::new()
                    .on_cancelled({
                        let r = resolver.clone();
                        move || r.cancel()
                    })
                    .on_rejected({
                        let r = resolver.clone();
                        move |reason| r.reject(reason)
                    })
                    .on_resolved(move |value| {
                        if resolver.is_cancelled() {
                            return;
                        }
                        let inner = transformation(value).run();
                        resolver.on_cancelled({
                            let inner = inner.clone();
                            move || inner.cancel()
                        });
                        inner.listen(
                            Listener::new()
                                .on_cancelled({
                                    let r = resolver.clone();
                                    move || r.cancel()
                                })
                                .on_rejected({
                                    let r = resolver.clone();
                                    move |reason| r.reject(reason)
                                })
                                .on_resolved(move |value| resolver.resolve(value)),
                        );
                    }),
            );
        })
    }

    /// Transforms the success value.
    pub fn map<V2: Clone + 'static>(&self, transformation: impl Fn(V) -> V2 + 'static) -> Task<E, V2> {
        let this = self.clone();
        let transformation = Rc::new(transformation);
        task(move |resolver| {
            let execution = this.run();
            resolver.on_cancelled({
                let execution = execution.clone();
                move || execution.cancel()
            });
            let transformation = transformation.clone();
            execution.listen(
                Listener::new()
                    .on_cancelled({
                        let r = resolver.clone();
                        move || r.cancel()
                    })
                    .on_rejected({
                        let r = resolver.clone();
                        move |reason| r.reject(reason)
                    })
                    .on_resolved(move |value| resolver.resolve(transformation(value))),
            );
        })
    }

    /// Transforms the rejection reason.
    pub fn map_rejected<E2: Clone + 'static>(
        &self,
        transformation: impl Fn(E) -> E2 + 'static,
    ) -> Task<E2, V> {
        let this = self.clone();
        let transformation = Rc::new(transformation);
        task(move |resolver| {
            let execution = this.run();
            resolver.on_cancelled({
                let execution = execution.clone();
                move || execution.cancel()
            });
            let transformation = transformation.clone();
            execution.listen(
                Listener::new()
                    .on_cancelled({
                        let r = resolver.clone();
                        move || r.cancel()
                    })
                    .on_resolved({
                        let r = resolver.clone();
                        move |value| r.resolve(value)
                    })
                    .on_rejected(move |reason| resolver.reject(transformation(reason))),
            );
        })
    }

    /// Recovers from a rejection by starting the task `handler` produces
    /// from the reason. Resolution and cancellation pass through untouched.
    pub fn or_else<E2: Clone + 'static>(
        &self,
        handler: impl Fn(E) -> Task<E2, V> + 'static,
    ) -> Task<E2, V> {
        let this = self.clone();
        let handler = Rc::new(handler);
        task(move |resolver| {
            let execution = this.run();
            resolver.on_cancelled({
                let execution = execution.clone();
                move || execution.cancel()
            });
            let handler = handler.clone();
            execution.listen(
                Listener::new()
                    .on_cancelled({
                        let r = resolver.clone();
                        move || r.cancel()
                    })
                    .on_resolved({
                        let r = resolver.clone();
                        move |value| r.resolve(value)
                    })
                    .on_rejected(move |reason| {
                        if resolver.is_cancelled() {
                            return;
                        }
                        let inner = handler(reason).run();
                        resolver.on_cancelled({
                            let inner = inner.clone();
                            move || inner.cancel()
                        });
                        inner.listen(
                            Listener::new()
                                .on_cancelled({
                                    let r = resolver.clone();
                                    move || r.cancel()
                                })
                                .on_rejected({
                                    let r = resolver.clone();
                                    move |reason| r.reject(reason)
                                })
                                .on_resolved(move |value| resolver.resolve(value)),
                        );
                    }),
            );
        })
    }

    /// Races two tasks: both run, the first settlement wins, and the loser
    /// is cancelled to release its resources.
    pub fn or(&self, that: &Task<E, V>) -> Task<E, V> {
        let this = self.clone();
        let that = that.clone();
        task(move |resolver| {
            let left = this.run();
            let right = that.run();
            let done = Rc::new(std::cell::Cell::new(false));
            resolver.on_cancelled({
                let left = left.clone();
                let right = right.clone();
                move || {
                    left.cancel();
                    right.cancel();
                }
            });
            race_side(&left, right.clone(), &resolver, &done);
            race_side(&right, left, &resolver, &done);
        })
    }

    /// Joins two tasks: both run, and the result resolves with both values
    /// once both sides resolve. The first rejection or cancellation wins and
    /// cancels the other side.
    pub fn and<V2: Clone + 'static>(&self, that: &Task<E, V2>) -> Task<E, (V, V2)> {
        let this = self.clone();
        let that = that.clone();
        task(move |resolver| {
            let left = this.run();
            let right = that.run();
            let pair = Rc::new(RefCell::new(Join::<V, V2> {
                left: None,
                right: None,
                settled: false,
            }));
            resolver.on_cancelled({
                let left = left.clone();
                let right = right.clone();
                move || {
                    left.cancel();
                    right.cancel();
                }
            });
            left.listen(
                Listener::new()
                    .on_resolved({
                        let pair = pair.clone();
                        let r = resolver.clone();
                        move |value| {
                            let ready = {
                                let mut join = pair.borrow_mut();
                                join.left = Some(value);
                                join.ready_pair()
                            };
                            if let Some(both) = ready {
                                r.resolve(both);
                            }
                        }
                    })
                    .on_rejected(join_failure(&pair, &resolver, &right))
                    .on_cancelled(join_cancel(&pair, &resolver, &right)),
            );
            right.listen(
                Listener::new()
                    .on_resolved({
                        let pair = pair.clone();
                        let r = resolver.clone();
                        move |value| {
                            let ready = {
                                let mut join = pair.borrow_mut();
                                join.right = Some(value);
                                join.ready_pair()
                            };
                            if let Some(both) = ready {
                                r.resolve(both);
                            }
                        }
                    })
                    .on_rejected(join_failure(&pair, &resolver, &left))
                    .on_cancelled(join_cancel(&pair, &resolver, &left)),
            );
        })
    }
}

fn race_side<E: Clone + 'static, V: Clone + 'static>(
    side: &Execution<E, V>,
    loser: Execution<E, V>,
    resolver: &Resolver<E, V>,
    done: &Rc<std::cell::Cell<bool>>,
) {
    let resolved = {
        let r = resolver.clone();
        let loser = loser.clone();
        let done = done.clone();
        move |value| {
            if !done.replace(true) {
                loser.cancel();
                r.resolve(value);
            }
        }
    };
    let rejected = {
        let r = resolver.clone();
        let loser = loser.clone();
        let done = done.clone();
        move |reason| {
            if !done.replace(true) {
                loser.cancel();
                r.reject(reason);
            }
        }
    };
    let cancelled = {
        let r = resolver.clone();
        let done = done.clone();
        move || {
            if !done.replace(true) {
                loser.cancel();
                r.cancel();
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

struct Join<V, V2> {
    left: Option<V>,
    right: Option<V2>,
    settled: bool,
}

impl<V: Clone, V2: Clone> Join<V, V2> {
    /// Returns both values once both sides have resolved, marking the join
    /// settled. `None` if a side is still outstanding or the join already
    /// settled.
    fn ready_pair(&mut self) -> Option<(V, V2)> {
        if self.settled {
            return None;
        }
        if let (Some(left), Some(right)) = (&self.left, &self.right) {
            self.settled = true;
            Some((left.clone(), right.clone()))
        } else {
            None
        }
    }

    /// Marks the join settled; returns whether this call did it.
    fn settle_once(&mut self) -> bool {
        if self.settled {
            false
        } else {
            self.settled = true;
            true
        }
    }
}

fn join_failure<E: Clone + 'static, V: Clone + 'static, V2: Clone + 'static, W: Clone + 'static>(
    pair: &Rc<RefCell<Join<V, V2>>>,
    resolver: &Resolver<E, (V, V2)>,
    other: &Execution<E, W>,
) -> impl FnOnce(E) {
    let pair = pair.clone();
    let resolver = resolver.clone();
    let other = other.clone();
    move |reason| {
        let first = pair.borrow_mut().settle_once();
        if first {
            other.cancel();
            resolver.reject(reason);
        }
    }
}

fn join_cancel<E: Clone + 'static, V: Clone + 'static, V2: Clone + 'static, W: Clone + 'static>(
    pair: &Rc<RefCell<Join<V, V2>>>,
    resolver: &Resolver<E, (V, V2)>,
    other: &Execution<E, W>,
) -> impl FnOnce() {
    let pair = pair.clone();
    let resolver = resolver.clone();
    let other = other.clone();
    move || {
        let first = pair.borrow_mut().settle_once();
        if first {
            other.cancel();
            resolver.cancel();
        }
    }
}

impl<E, V> Clone for Task<E, V> {
    fn clone(&self) -> Self {
        Self {
            computation: self.computation.clone(),
        }
    }
}

impl<E, V> fmt::Debug for Task<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task(..)")
    }
}

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::future::{Deferred, Listener};

type Hook = Box<dyn FnOnce()>;

/// Per-run bookkeeping shared between a [`Resolver`] and the run that
/// created it.
pub(crate) struct RunState {
    cancellations: Vec<Hook>,
    cleanups: Vec<Hook>,
    is_cancelled: bool,
    done: bool,
}

pub(crate) type RunStateRef = Rc<RefCell<RunState>>;

pub(crate) fn new_run_state() -> RunStateRef {
    Rc::new(RefCell::new(RunState {
        cancellations: Vec::new(),
        cleanups: Vec::new(),
        is_cancelled: false,
        done: false,
    }))
}

/// Wires a run's deferred so that settlement drives the registered hooks:
/// cancellation hooks (then cleanups) on cancellation, cleanups only on
/// resolution or rejection. Hooks run in registration order, at most once.
pub(crate) fn wire_hooks<E: Clone + 'static, V: Clone + 'static>(
    deferred: &Deferred<E, V>,
    state: &RunStateRef,
) {
    let on_cancelled = {
        let state = state.clone();
        move || {
            let (cancellations, cleanups) = {
                let mut s = state.borrow_mut();
                s.done = true;
                s.is_cancelled = true;
                (mem::take(&mut s.cancellations), mem::take(&mut s.cleanups))
            };
            for hook in cancellations {
                hook();
            }
            for hook in cleanups {
                hook();
            }
        }
    };
    let settled = |state: RunStateRef| {
        move || {
            let cleanups = {
                let mut s = state.borrow_mut();
                s.done = true;
                s.cancellations.clear();
                mem::take(&mut s.cleanups)
            };
            for hook in cleanups {
                hook();
            }
        }
    };
    let on_resolved = settled(state.clone());
    let on_rejected = settled(state.clone());
    deferred.listen(
        Listener::new()
            .on_cancelled(on_cancelled)
            .on_resolved(move |_| on_resolved())
            .on_rejected(move |_| on_rejected()),
    );
}

/// The producer-side capability of a running task.
///
/// The computation a [`Task`][crate::task::Task] wraps receives one
/// `Resolver` per run. It settles the run through
/// [`resolve`][Resolver::resolve] / [`reject`][Resolver::reject] /
/// [`cancel`][Resolver::cancel] (first transition wins, the rest are no-ops)
/// and registers resource hooks through
/// [`on_cancelled`][Resolver::on_cancelled] and
/// [`cleanup`][Resolver::cleanup].
///
/// Resolvers are cheap to clone and `'static`, so they can be moved into
/// timer callbacks and native-future drivers.
pub struct Resolver<E, V> {
    pub(crate) deferred: Deferred<E, V>,
    pub(crate) state: RunStateRef,
}

impl<E: Clone + 'static, V: Clone + 'static> Resolver<E, V> {
    /// Settles the run with a success value, if still pending.
    pub fn resolve(&self, value: V) {
        self.deferred.resolve(value);
    }

    /// Settles the run with a failure value, if still pending.
    pub fn reject(&self, reason: E) {
        self.deferred.reject(reason);
    }

    /// Cancels the run, if still pending.
    pub fn cancel(&self) {
        self.deferred.cancel();
    }

    /// Whether this run has been cancelled. Late callbacks (timers, native
    /// futures settling after the fact) should check this before resolving.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().is_cancelled
    }

    /// Registers a hook to run if (and only if) this run is cancelled.
    ///
    /// Hooks fire in registration order, at most once. If the run is already
    /// cancelled the hook fires immediately; if the run already resolved or
    /// rejected the hook is dropped, since it must never fire for a
    /// non-cancelled settlement.
    pub fn on_cancelled(&self, hook: impl FnOnce() + 'static) {
        {
            let mut s = self.state.borrow_mut();
            if !s.done {
                s.cancellations.push(Box::new(hook));
                return;
            }
            if !s.is_cancelled {
                return;
            }
        }
        hook();
    }

    /// Registers a hook to run once the run settles, whatever the outcome.
    /// If the run already settled, the hook runs immediately.
    pub fn cleanup(&self, hook: impl FnOnce() + 'static) {
        {
            let mut s = self.state.borrow_mut();
            if !s.done {
                s.cleanups.push(Box::new(hook));
                return;
            }
        }
        hook();
    }
}

impl<E, V> Clone for Resolver<E, V> {
    fn clone(&self) -> Self {
        Self {
            deferred: self.deferred.clone(),
            state: self.state.clone(),
        }
    }
}

impl<E, V> fmt::Debug for Resolver<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("Resolver")
            .field("done", &s.done)
            .field("is_cancelled", &s.is_cancelled)
            .field("cancellation_hooks", &s.cancellations.len())
            .field("cleanup_hooks", &s.cleanups.len())
            .finish()
    }
}

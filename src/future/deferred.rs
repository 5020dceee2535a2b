use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use super::{Future, Listener, Outcome, State};

/// The shared settle-once cell behind a [`Deferred`]/[`Future`] pair.
///
/// The cell is the only shared mutable resource in the crate and is mutated
/// through exactly one transition function, [`settle_cell`]. Listener
/// callbacks always run after the cell's borrow has been released, so a
/// callback is free to register further listeners or settle other cells.
pub(crate) struct Shared<E, V> {
    state: SharedState<E, V>,
    rejection_observed: bool,
}

enum SharedState<E, V> {
    Pending { listeners: Vec<Listener<E, V>> },
    Settled(Outcome<E, V>),
}

pub(crate) type CellRef<E, V> = Rc<RefCell<Shared<E, V>>>;

pub(crate) fn new_cell<E, V>() -> CellRef<E, V> {
    Rc::new(RefCell::new(Shared {
        state: SharedState::Pending {
            listeners: Vec::new(),
        },
        rejection_observed: false,
    }))
}

/// Transitions the cell to `outcome` iff it is still pending, then notifies
/// the accumulated listeners in registration order. Returns whether this call
/// performed the transition; once settled, further calls are no-ops.
pub(crate) fn settle_cell<E: Clone, V: Clone>(cell: &CellRef<E, V>, outcome: Outcome<E, V>) -> bool {
    let listeners = {
        let mut shared = cell.borrow_mut();
        if let SharedState::Settled(_) = shared.state {
            return false;
        }
        let previous = mem::replace(&mut shared.state, SharedState::Settled(outcome.clone()));
        match previous {
            SharedState::Pending { listeners } => listeners,
            SharedState::Settled(_) => unreachable!("checked pending above"),
        }
    };
    for listener in listeners {
        deliver(cell, listener, &outcome);
    }
    true
}

pub(crate) fn listen_cell<E: Clone, V: Clone>(cell: &CellRef<E, V>, listener: Listener<E, V>) {
    let outcome = {
        let mut shared = cell.borrow_mut();
        match &mut shared.state {
            SharedState::Pending { listeners } => {
                listeners.push(listener);
                return;
            }
            SharedState::Settled(outcome) => outcome.clone(),
        }
    };
    deliver(cell, listener, &outcome);
}

pub(crate) fn cell_state<E, V>(cell: &CellRef<E, V>) -> State {
    match &cell.borrow().state {
        SharedState::Pending { .. } => State::Pending,
        SharedState::Settled(Outcome::Resolved(_)) => State::Resolved,
        SharedState::Settled(Outcome::Rejected(_)) => State::Rejected,
        SharedState::Settled(Outcome::Cancelled) => State::Cancelled,
    }
}

pub(crate) fn cell_outcome<E: Clone, V: Clone>(cell: &CellRef<E, V>) -> Option<Outcome<E, V>> {
    match &cell.borrow().state {
        SharedState::Pending { .. } => None,
        SharedState::Settled(outcome) => Some(outcome.clone()),
    }
}

pub(crate) fn fmt_cell<E, V>(
    name: &str,
    cell: &CellRef<E, V>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let shared = cell.borrow();
    match &shared.state {
        SharedState::Pending { listeners } => {
            write!(f, "{name}(Pending, {} listeners)", listeners.len())
        }
        SharedState::Settled(Outcome::Resolved(_)) => write!(f, "{name}(Resolved)"),
        SharedState::Settled(Outcome::Rejected(_)) => write!(f, "{name}(Rejected)"),
        SharedState::Settled(Outcome::Cancelled) => write!(f, "{name}(Cancelled)"),
    }
}

fn deliver<E: Clone, V: Clone>(cell: &CellRef<E, V>, listener: Listener<E, V>, outcome: &Outcome<E, V>) {
    match outcome {
        Outcome::Resolved(value) => {
            if let Some(callback) = listener.on_resolved {
                callback(value.clone());
            }
        }
        Outcome::Rejected(reason) => {
            if let Some(callback) = listener.on_rejected {
                cell.borrow_mut().rejection_observed = true;
                callback(reason.clone());
            }
        }
        Outcome::Cancelled => {
            if let Some(callback) = listener.on_cancelled {
                callback();
            }
        }
    }
}

impl<E, V> Drop for Shared<E, V> {
    fn drop(&mut self) {
        // A rejection that nobody ever looked at is usually a bug in the
        // caller's wiring. Surface it through the log facade.
        if let SharedState::Settled(Outcome::Rejected(_)) = self.state {
            if !self.rejection_observed {
                log::warn!("future dropped with an unobserved rejection");
            }
        }
    }
}

/// The producer half of a settle-once cell.
///
/// A `Deferred` owns the right to settle; [`Deferred::future`] hands out
/// read/subscribe views. Settlement happens at most once: the first of
/// [`resolve`][Deferred::resolve], [`reject`][Deferred::reject], or
/// [`cancel`][Deferred::cancel] wins and the rest are silent no-ops.
///
/// ```
/// use fable::future::{Deferred, Outcome};
///
/// let deferred = Deferred::<String, i32>::new();
/// let future = deferred.future();
/// deferred.resolve(1);
/// deferred.reject("too late".to_string());
/// assert_eq!(future.outcome(), Some(Outcome::Resolved(1)));
/// ```
pub struct Deferred<E, V> {
    cell: CellRef<E, V>,
}

impl<E: Clone + 'static, V: Clone + 'static> Deferred<E, V> {
    /// Creates a fresh pending cell.
    #[must_use]
    pub fn new() -> Self {
        Self { cell: new_cell() }
    }

    /// Settles with [`Outcome::Resolved`]. Returns whether this call
    /// performed the transition.
    pub fn resolve(&self, value: V) -> bool {
        settle_cell(&self.cell, Outcome::Resolved(value))
    }

    /// Settles with [`Outcome::Rejected`]. Returns whether this call
    /// performed the transition.
    pub fn reject(&self, reason: E) -> bool {
        settle_cell(&self.cell, Outcome::Rejected(reason))
    }

    /// Settles with [`Outcome::Cancelled`]. Cancellation never overrides a
    /// resolved or rejected outcome; on an already-settled cell this is a
    /// no-op. Returns whether this call performed the transition.
    pub fn cancel(&self) -> bool {
        settle_cell(&self.cell, Outcome::Cancelled)
    }

    /// Registers a listener. See [`Listener`] for the delivery contract.
    pub fn listen(&self, listener: Listener<E, V>) {
        listen_cell(&self.cell, listener);
    }

    /// Returns a consumer handle sharing this cell.
    #[must_use]
    pub fn future(&self) -> Future<E, V> {
        Future::from_cell(self.cell.clone())
    }

    /// Returns `true` while no transition has happened.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        cell_state(&self.cell) == State::Pending
    }
}

impl<E: Clone + 'static, V: Clone + 'static> Default for Deferred<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, V> Clone for Deferred<E, V> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<E, V> fmt::Debug for Deferred<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_cell("Deferred", &self.cell, f)
    }
}

use std::fmt;

use crate::future::{Deferred, Future, Listener};

/// A single run of a [`Task`][crate::task::Task].
///
/// Holds the run's settle-once cell. Executions are cheap to clone; any
/// holder may [`cancel`][Execution::cancel] the run or subscribe to its
/// outcome.
pub struct Execution<E, V> {
    pub(crate) deferred: Deferred<E, V>,
}

impl<E: Clone + 'static, V: Clone + 'static> Execution<E, V> {
    /// Cancels the run if it has not settled yet; a no-op otherwise.
    /// Cancellation hooks registered on the run's resolver fire in
    /// registration order.
    pub fn cancel(&self) {
        self.deferred.cancel();
    }

    /// Registers a listener for the run's outcome.
    pub fn listen(&self, listener: Listener<E, V>) {
        self.deferred.listen(listener);
    }

    /// A consumer handle to the run's outcome.
    #[must_use]
    pub fn future(&self) -> Future<E, V> {
        self.deferred.future()
    }
}

impl<E, V> Clone for Execution<E, V> {
    fn clone(&self) -> Self {
        Self {
            deferred: self.deferred.clone(),
        }
    }
}

impl<E, V> fmt::Debug for Execution<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Execution").field(&self.deferred).finish()
    }
}

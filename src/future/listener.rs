/// A set of callbacks to run when a future settles.
///
/// Each callback is optional; outcomes with no matching callback are simply
/// not delivered to this listener. Listeners registered while a future is
/// pending fire exactly once, in registration order, at the moment the future
/// settles. Listeners registered after settlement fire immediately with the
/// recorded outcome.
///
/// ```
/// use fable::future::{Deferred, Listener};
///
/// let deferred = Deferred::<String, i32>::new();
/// deferred.listen(Listener::new().on_resolved(|n| assert_eq!(n, 3)));
/// deferred.resolve(3);
/// ```
pub struct Listener<E, V> {
    pub(crate) on_resolved: Option<Box<dyn FnOnce(V)>>,
    pub(crate) on_rejected: Option<Box<dyn FnOnce(E)>>,
    pub(crate) on_cancelled: Option<Box<dyn FnOnce()>>,
}

impl<E, V> Listener<E, V> {
    /// Creates a listener with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_resolved: None,
            on_rejected: None,
            on_cancelled: None,
        }
    }

    /// Sets the callback for [`Outcome::Resolved`][super::Outcome].
    #[must_use]
    pub fn on_resolved(mut self, callback: impl FnOnce(V) + 'static) -> Self {
        self.on_resolved = Some(Box::new(callback));
        self
    }

    /// Sets the callback for [`Outcome::Rejected`][super::Outcome].
    #[must_use]
    pub fn on_rejected(mut self, callback: impl FnOnce(E) + 'static) -> Self {
        self.on_rejected = Some(Box::new(callback));
        self
    }

    /// Sets the callback for [`Outcome::Cancelled`][super::Outcome].
    #[must_use]
    pub fn on_cancelled(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_cancelled = Some(Box::new(callback));
        self
    }
}

impl<E, V> Default for Listener<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, V> std::fmt::Debug for Listener<E, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("on_resolved", &self.on_resolved.is_some())
            .field("on_rejected", &self.on_rejected.is_some())
            .field("on_cancelled", &self.on_cancelled.is_some())
            .finish()
    }
}

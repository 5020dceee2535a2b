/// A terminal state of a [`Future`][crate::future::Future].
///
/// Once a future settles it holds exactly one `Outcome`, forever. Cancellation
/// is deliberately a third variant rather than a flavor of rejection: the two
/// are only folded together at the native-future boundary, where
/// [`Failure::Cancelled`][crate::convert::Failure] plays the role of a
/// distinguished sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E, V> {
    /// The computation finished with a success value.
    Resolved(V),
    /// The computation finished with a failure value.
    Rejected(E),
    /// The computation was cancelled before it could finish.
    Cancelled,
}

impl<E, V> Outcome<E, V> {
    /// Returns `true` for [`Outcome::Resolved`].
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Outcome::Resolved(_))
    }

    /// Returns `true` for [`Outcome::Rejected`].
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Returns `true` for [`Outcome::Cancelled`].
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// A payload-free view of a future's current state, for inspection and
/// `Debug` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not settled yet.
    Pending,
    /// Settled with a success value.
    Resolved,
    /// Settled with a failure value.
    Rejected,
    /// Settled by cancellation.
    Cancelled,
}

//! Eager, cancellable asynchronous values.
//!
//! A [`Deferred`]/[`Future`] pair shares one settle-once cell. The producer
//! settles it with exactly one [`Outcome`] (resolved, rejected, or
//! cancelled); consumers observe that outcome through [`Listener`]s and
//! compose dependent futures with [`Future::chain`] and friends.
//!
//! # Cancellation
//!
//! Cancellation is a first-class terminal state, not an error. Cancelling a
//! pending future settles it as [`Outcome::Cancelled`]; cancelling a settled
//! future does nothing. The producer side observes cancellation through
//! [`Resolver::on_cancelled`][crate::task::Resolver::on_cancelled] hooks,
//! which is how timer-backed computations release their timers.
//!
//! This module is the shared substrate; most code should start from
//! [`crate::task`], which adds lazy, re-runnable computations on top.

mod deferred;
#[allow(clippy::module_inception)]
mod future;
mod listener;
mod outcome;

pub use deferred::Deferred;
pub use future::Future;
pub use listener::Listener;
pub use outcome::{Outcome, State};

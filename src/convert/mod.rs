//! Adapters between [`Future`][crate::future::Future]s/[`Task`][crate::task::Task]s
//! and the native async world.
//!
//! Native futures have no cancelled state, so crossing the boundary folds
//! cancellation into the error channel as [`Failure::Cancelled`]; crossing
//! back unfolds it. [`future_to_native`] works under any executor, while the
//! adapters that must *drive* a native future ([`native_to_future`],
//! [`promised_to_task`]) spawn onto the current
//! [`Reactor`][crate::runtime::Reactor] and so require a running
//! [`block_on`][crate::runtime::block_on].

mod native;
mod nodeback;
mod promised;

pub use native::{future_to_native, native_to_future, Failure, Native};
pub use nodeback::{nodeback_to_task, Nodeback};
pub use promised::promised_to_task;

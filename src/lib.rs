#![warn(future_incompatible, unreachable_pub)]
#![deny(missing_debug_implementations)]

//! Cancellable futures and tasks for single-threaded cooperative async.
//!
//! This library models asynchronous computations as values that settle at
//! most once with one of three outcomes: resolved, rejected, or *cancelled*.
//! Cancellation is a first-class terminal state that producers can observe
//! and react to - clearing a timer, closing a handle - rather than a
//! dropped future they never hear about.
//!
//! The three layers:
//!
//! - [`future`]: the eager substrate. A [`Deferred`][future::Deferred] /
//!   [`Future`][future::Future] pair shares a settle-once cell; listeners
//!   observe the outcome, combinators compose dependent futures.
//! - [`task`]: lazy, re-runnable computations. A [`Task`][task::Task] does
//!   nothing until [`run`][task::Task::run]; each run gets a fresh
//!   [`Resolver`][task::Resolver] with cancellation and cleanup hooks.
//!   Combinators propagate cancellation to whichever run is in flight.
//! - [`convert`] + [`runtime`] + [`time`]: the bridge to native async. A
//!   minimal single-threaded event loop ([`runtime::block_on`]) drives
//!   timers and locally-spawned native futures; [`convert`] maps between
//!   the two worlds, folding cancellation into the distinguished
//!   [`Failure::Cancelled`][convert::Failure] value at the boundary.
//!
//! # Example
//!
//! ```no_run
//! use fable::convert::future_to_native;
//! use fable::runtime;
//! use fable::task::Task;
//! use fable::time::delay;
//! use std::time::Duration;
//!
//! let outcome = runtime::block_on(async {
//!     let greeting: Task<String, &str> = delay(Duration::from_millis(10))
//!         .chain(|_| Task::of("hello"));
//!     let execution = greeting.run();
//!     future_to_native(&execution.future()).await
//! });
//! assert_eq!(outcome, Ok("hello"));
//! ```
//!
//! # Design Decisions
//!
//! Everything here is deliberately single-threaded: handles are `Rc`-based
//! and not `Send`, state cells need no locks, and "concurrency" means the
//! interleaving of timer and reactor callbacks, never parallelism. State
//! transitions notify listeners from inside the transition itself, so a
//! settlement happens-before every observation of it by construction.
//!
//! Double settlement is a silent no-op (the first transition wins) to keep
//! producer code free of bookkeeping. The one diagnostic concession: a
//! rejection that is dropped without any listener ever observing it is
//! logged through the [`log`] facade.

pub mod convert;
pub mod future;
pub mod runtime;
pub mod task;
pub mod time;

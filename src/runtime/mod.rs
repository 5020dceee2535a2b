//! Single-threaded event loop support.
//!
//! Call [`block_on()`] to run a native future to completion; while it runs,
//! [`Reactor::current()`] gives access to the loop's timer queue and local
//! spawner. Timer-backed tasks ([`crate::time::delay`]) and the
//! native-future adapters in [`crate::convert`] require a running reactor;
//! everything else in the crate works without one.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod block_on;
mod reactor;

pub use block_on::block_on;
pub use reactor::{Reactor, TimerKey};

use std::cell::RefCell;

thread_local! {
    pub(crate) static REACTOR: RefCell<Option<Reactor>> = const { RefCell::new(None) };
}

use super::REACTOR;

use core::cell::RefCell;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use slab::Slab;
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::Wake;
use std::time::{Duration, Instant};

/// Identifies one scheduled timer, for [`Reactor::clear_timeout`].
///
/// Keys are slab indices paired with a sequence number, so a key that
/// already fired (or was cleared) is recognized as stale instead of hitting
/// whatever timer later reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerKey {
    index: usize,
    seq: u64,
}

struct TimerEntry {
    deadline: Instant,
    seq: u64,
    wake: TimerWake,
}

enum TimerWake {
    /// A one-shot callback, the setTimeout shape timer-backed tasks use.
    Callback(Box<dyn FnOnce()>),
    /// A native-future waker, the shape [`crate::time::Sleep`] uses.
    Waker(Waker),
}

/// Task indices whose wakers have fired since the last drain.
///
/// Wakers must be `Send + Sync`, so this one piece of state sits behind a
/// `Mutex` even though the runtime itself is single-threaded.
struct WokenQueue {
    queue: Mutex<VecDeque<usize>>,
}

impl WokenQueue {
    fn push(&self, index: usize) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(index);
    }

    fn pop(&self) -> Option<usize> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

struct TaskWaker {
    index: usize,
    woken: Arc<WokenQueue>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.woken.push(self.index);
    }
}

/// Manages timers and locally-spawned native futures for one
/// [`block_on`][super::block_on] call.
#[derive(Clone)]
pub struct Reactor {
    inner: Rc<RefCell<InnerReactor>>,
}

/// The private, internal `Reactor` implementation - factored out so we can
/// take a lock of the whole.
struct InnerReactor {
    timers: Slab<TimerEntry>,
    next_seq: u64,
    // A slot holds `None` while its future is out being polled.
    tasks: Slab<Option<Pin<Box<dyn Future<Output = ()>>>>>,
    woken: Arc<WokenQueue>,
}

impl Reactor {
    /// Returns the `Reactor` of the currently running
    /// [`block_on`][super::block_on].
    ///
    /// # Panics
    ///
    /// Panics if called outside of `fable::runtime::block_on`.
    #[must_use]
    pub fn current() -> Self {
        Self::try_current().expect("Reactor::current must be called within fable::runtime::block_on")
    }

    pub(crate) fn try_current() -> Option<Self> {
        REACTOR.with(|r| r.borrow().clone())
    }

    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(InnerReactor {
                timers: Slab::new(),
                next_seq: 0,
                tasks: Slab::new(),
                woken: Arc::new(WokenQueue {
                    queue: Mutex::new(VecDeque::new()),
                }),
            })),
        }
    }

    /// Schedules `callback` to run once, `after` from now. The returned key
    /// can be passed to [`clear_timeout`][Reactor::clear_timeout] to cancel
    /// the timer before it fires.
    pub fn set_timeout(&self, after: Duration, callback: impl FnOnce() + 'static) -> TimerKey {
        self.insert_timer(
            Instant::now() + after,
            TimerWake::Callback(Box::new(callback)),
        )
    }

    /// Cancels a scheduled timer. Stale keys (already fired or already
    /// cleared) are ignored.
    pub fn clear_timeout(&self, key: TimerKey) {
        let mut inner = self.inner.borrow_mut();
        let live = inner
            .timers
            .get(key.index)
            .is_some_and(|entry| entry.seq == key.seq);
        if live {
            inner.timers.remove(key.index);
        }
    }

    pub(crate) fn register_waker_at(&self, deadline: Instant, waker: &Waker) -> TimerKey {
        self.insert_timer(deadline, TimerWake::Waker(waker.clone()))
    }

    pub(crate) fn update_waker(&self, key: TimerKey, waker: &Waker) {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.timers.get_mut(key.index) {
            if entry.seq == key.seq {
                entry.wake = TimerWake::Waker(waker.clone());
            }
        }
    }

    fn insert_timer(&self, deadline: Instant, wake: TimerWake) -> TimerKey {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let index = inner.timers.insert(TimerEntry {
            deadline,
            seq,
            wake,
        });
        TimerKey { index, seq }
    }

    /// Spawns a native future onto this reactor. The future is polled from
    /// inside [`block_on`][super::block_on] on the current thread; it does
    /// not need to be `Send`.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        let mut inner = self.inner.borrow_mut();
        let index = inner.tasks.insert(Some(Box::pin(future)));
        inner.woken.push(index);
    }

    /// Polls every spawned task whose waker has fired, until the queue is
    /// drained. The cell's borrow is released while a task runs, so tasks
    /// are free to spawn, set timers, or settle futures.
    pub(crate) fn run_tasks(&self) {
        let woken = self.inner.borrow().woken.clone();
        while let Some(index) = woken.pop() {
            let Some(mut future) = self.take_task(index) else {
                // Vacated slot or a stale waker after slab reuse; either way
                // there is nothing to poll.
                continue;
            };
            let waker = Waker::from(Arc::new(TaskWaker {
                index,
                woken: woken.clone(),
            }));
            let mut cx = Context::from_waker(&waker);
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {
                    self.inner.borrow_mut().tasks.remove(index);
                }
                Poll::Pending => {
                    if let Some(slot) = self.inner.borrow_mut().tasks.get_mut(index) {
                        *slot = Some(future);
                    }
                }
            }
        }
    }

    fn take_task(&self, index: usize) -> Option<Pin<Box<dyn Future<Output = ()>>>> {
        self.inner
            .borrow_mut()
            .tasks
            .get_mut(index)
            .and_then(Option::take)
    }

    /// The earliest pending timer deadline, if any.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.inner
            .borrow()
            .timers
            .iter()
            .map(|(_, entry)| entry.deadline)
            .min()
    }

    /// Fires every timer due at `now`, in (deadline, registration) order.
    /// Returns whether anything fired. Callbacks run with the cell's borrow
    /// released and may clear or schedule further timers; timers scheduled
    /// during this pass wait for the next one.
    pub(crate) fn fire_due(&self, now: Instant) -> bool {
        let mut due: Vec<(Instant, u64, usize)> = self
            .inner
            .borrow()
            .timers
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(index, entry)| (entry.deadline, entry.seq, index))
            .collect();
        due.sort_unstable();
        let fired = !due.is_empty();
        for (_, seq, index) in due {
            let entry = {
                let mut inner = self.inner.borrow_mut();
                match inner.timers.get(index) {
                    Some(live) if live.seq == seq => Some(inner.timers.remove(index)),
                    // Cleared by an earlier callback in this same pass.
                    _ => None,
                }
            };
            if let Some(entry) = entry {
                match entry.wake {
                    TimerWake::Callback(callback) => callback(),
                    TimerWake::Waker(waker) => waker.wake(),
                }
            }
        }
        fired
    }
}

impl std::fmt::Debug for Reactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Reactor")
            .field("timers", &inner.timers.len())
            .field("tasks", &inner.tasks.len())
            .finish()
    }
}

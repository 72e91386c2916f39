//! Contains [BlockingQueue](struct.BlockingQueue.html)

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::collections::VecDeque;
use wait_for::{WaitPeriod, wait_condvar_while};

/// A thread-safe queue for handing values from producer threads to consumer threads.
///
/// Sending never blocks. Receiving blocks until a value is available and then takes the most
/// recently sent one, so a consumer that falls behind sees the newest value first rather than
/// working through a backlog of stale ones.
#[derive(Debug)]
pub struct BlockingQueue<T> {
    queue: Mutex<VecDeque<T>>,
    condvar: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Creates a new, empty `BlockingQueue`
    pub fn new() -> BlockingQueue<T> {
        Self::with_capacity(0)
    }

    /// Creates a new, empty `BlockingQueue` with space for at least `cap` values
    pub fn with_capacity(cap: usize) -> BlockingQueue<T> {
        BlockingQueue {
            queue: Mutex::new(VecDeque::with_capacity(cap)),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<VecDeque<T>> {
        // no user code runs while the lock is held, so the queue is consistent even if poisoned
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `item` to the queue and wakes up one thread waiting to receive
    pub fn send(&self, item: T) {
        let mut queue = self.lock();
        queue.push_back(item);
        trace!("sent item, {} queued", queue.len());
        self.condvar.notify_one();
    }

    /// Takes the most recently sent item out of the queue, waiting until there is one.
    ///
    /// # Liveness
    /// If nothing is ever sent again this blocks forever. Use
    /// [receive_for](#method.receive_for) to put a bound on the wait.
    pub fn receive(&self) -> T {
        let mut queue = self.lock();
        loop {
            if let Some(item) = queue.pop_back() {
                return item;
            }
            queue = self.condvar.wait(queue).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Takes the most recently sent item out of the queue, waiting for at most `period`.
    ///
    /// Returns `None` if the queue was still empty once the period ran out.
    pub fn receive_for(&self, period: &WaitPeriod) -> Option<T> {
        let mut queue = wait_condvar_while(&self.condvar, &self.queue, period, |queue| {
                queue.is_empty()
            })
            .unwrap_or_else(PoisonError::into_inner);
        queue.pop_back()
    }

    /// Takes the most recently sent item out of the queue if there is one, without blocking
    pub fn try_receive(&self) -> Option<T> {
        self.receive_for(&WaitPeriod::None)
    }

    /// Gets the number of items waiting in the queue
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if there are no items waiting in the queue
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Contains methods for waiting for periods of time for events to happen

use std::cmp::{PartialOrd, Ordering};
use std::time::{Duration, Instant};
use std::sync::{Condvar, Mutex, MutexGuard, LockResult, PoisonError};

/// Represents a time to wait for when waiting for an event to occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitPeriod {
    /// Just wait for the next occurence of the event
    Wait,
    /// Wait at most for the specified duration (wait for a timeout)
    AtMost(Duration),
    /// Don't wait at all and return immediately
    None,
}

impl WaitPeriod {
    /// Converts this period into a `Deadline` starting at `now`
    pub fn deadline_from(&self, now: Instant) -> Deadline {
        match *self {
            WaitPeriod::Wait => Deadline::Never,
            // too far in the future to represent is as good as no deadline
            WaitPeriod::AtMost(dur) => now.checked_add(dur).map_or(Deadline::Never, Deadline::At),
            WaitPeriod::None => Deadline::Passed,
        }
    }
}

impl PartialOrd for WaitPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WaitPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        use self::WaitPeriod::*;
        match (self, other) {
            (&Wait, &Wait) | (&None, &None) => Ordering::Equal,
            (&Wait, _) | (_, &None) => Ordering::Greater,
            (_, &Wait) | (&None, _) => Ordering::Less,
            (&AtMost(ref dur1), &AtMost(ref dur2)) => dur1.cmp(dur2),
        }
    }
}

/// A fixed point in time by which a sequence of waits must finish.
///
/// Used when one logical wait is made of several condvar or queue waits, so that the total time
/// spent stays within the original `WaitPeriod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// There is no deadline
    Never,
    /// The deadline is at the specified instant
    At(Instant),
    /// The deadline has already passed; waits should not block
    Passed,
}

impl Deadline {
    /// Gets the `WaitPeriod` that is left until the deadline, as seen at `now`
    pub fn remaining(&self, now: Instant) -> WaitPeriod {
        match *self {
            Deadline::Never => WaitPeriod::Wait,
            Deadline::At(at) if at > now => WaitPeriod::AtMost(at - now),
            Deadline::At(_) | Deadline::Passed => WaitPeriod::None,
        }
    }
}

/// Waits on `condvar` for `period` while `condition` returns true, returning a `MutexGuard` for
/// `mutex`.
///
/// The condition is checked with the lock held before every wait, so a notification can't be
/// missed and spurious wakeups are ignored. When the period runs out the guard is returned
/// anyway; the caller should check the guarded data again.
pub fn wait_condvar_while<'a, T, F>(condvar: &Condvar,
                                    mutex: &'a Mutex<T>,
                                    period: &WaitPeriod,
                                    condition: F)
                                    -> LockResult<MutexGuard<'a, T>>
    where F: FnMut(&mut T) -> bool
{
    use self::WaitPeriod::*;
    let lock = mutex.lock();
    match *period {
        Wait => lock.and_then(|guard| condvar.wait_while(guard, condition)),
        AtMost(dur) => {
            lock.and_then(|guard| {
                condvar.wait_timeout_while(guard, dur, condition)
                    .map(|res| res.0)
                    .map_err(|err| PoisonError::new(err.into_inner().0))
            })
        }
        None => lock,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_period_order() {
        let short = WaitPeriod::AtMost(Duration::from_millis(5));
        let long = WaitPeriod::AtMost(Duration::from_millis(50));
        assert!(WaitPeriod::Wait > long);
        assert!(long > short);
        assert!(short > WaitPeriod::None);
        assert_eq!(::std::cmp::min(WaitPeriod::Wait, short.clone()), short);
    }

    #[test]
    fn test_deadline_remaining() {
        let now = Instant::now();
        let deadline = WaitPeriod::AtMost(Duration::from_millis(100)).deadline_from(now);
        assert_eq!(deadline.remaining(now + Duration::from_millis(40)),
                   WaitPeriod::AtMost(Duration::from_millis(60)));
        assert_eq!(deadline.remaining(now + Duration::from_millis(100)),
                   WaitPeriod::None);
        assert_eq!(WaitPeriod::Wait.deadline_from(now).remaining(now), WaitPeriod::Wait);
        assert_eq!(WaitPeriod::None.deadline_from(now).remaining(now), WaitPeriod::None);
    }

    #[test]
    fn test_deadline_huge_period() {
        let now = Instant::now();
        let deadline = WaitPeriod::AtMost(Duration::from_secs(u64::MAX)).deadline_from(now);
        assert_eq!(deadline, Deadline::Never);
        assert_eq!(deadline.remaining(now), WaitPeriod::Wait);
    }

    #[test]
    fn test_wait_condvar_while_times_out() {
        let mutex = Mutex::new(false);
        let condvar = Condvar::new();
        let start = Instant::now();
        let guard = wait_condvar_while(&condvar,
                                       &mutex,
                                       &WaitPeriod::AtMost(Duration::from_millis(30)),
                                       |ready| !*ready)
            .unwrap();
        assert!(!*guard);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_condvar_while_wakes() {
        let state = Arc::new((Mutex::new(false), Condvar::new()));
        let setter = {
            let state = state.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                *state.0.lock().unwrap() = true;
                state.1.notify_one();
            })
        };
        let guard = wait_condvar_while(&state.1, &state.0, &WaitPeriod::Wait, |ready| !*ready)
            .unwrap();
        assert!(*guard);
        drop(guard);
        setter.join().unwrap();
    }
}

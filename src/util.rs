//! Contains various utilites that are used in the rest of the program

use std::time::Duration;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::ops::{Deref, DerefMut};
use serde::{Deserialize, Deserializer};
use wait_for::{WaitPeriod, wait_condvar_while};

/// Gets a human-readable string representation of a `chrono::Duration`
pub fn chrono_duration_string(dur: &::chrono::Duration) -> String {
    if dur.is_zero() {
        return "0".into();
    }

    let (dur, neg): (::chrono::Duration, bool) = {
        if dur < &::chrono::Duration::zero() {
            (-(*dur), true)
        } else {
            (*dur, false)
        }
    };

    let parts = [(dur.num_hours(), "h"),
                 (dur.num_minutes() % 60, "m"),
                 (dur.num_seconds() % 60, "s"),
                 (dur.num_milliseconds() % 1000, "ms"),
                 (dur.num_microseconds().map_or(0, |micros| micros % 1000), "us")];

    let mut s = String::new();
    if neg {
        s.push('-');
    }
    for &(amount, unit) in &parts {
        if amount > 0 {
            s.push_str(&amount.to_string());
            s.push_str(unit);
        }
    }
    if s.is_empty() || s == "-" {
        // only nanoseconds are left
        s.push_str("<1us");
    }
    s
}

/// Gets a string representation of a `std::time::Duration`
pub fn duration_string(duration: &Duration) -> String {
    match ::chrono::Duration::from_std(*duration) {
        Ok(dur) => chrono_duration_string(&dur),
        Err(_) => "forever".into(),
    }
}

/// Deserializes a `Duration` from a whole number of milliseconds
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where D: Deserializer<'de>
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// A guard returned by [RunnerState.update](struct.RunnerState.html#method.update) and
/// [LockCondvarGuard.lock_condvar](trait.LockCondvarGuard.html#tymethod.lock_condvar).
/// It `Deref`s and `DerefMut`s to the underlying `MutexGuard`. It notifies on the `Condvar` when
/// it is `Drop`ed.
pub struct CondvarGuard<'a, T>
    where T: 'a
{
    mutex_guard: MutexGuard<'a, T>,
    condvar: &'a Condvar,
}

impl<'mutex, T> Deref for CondvarGuard<'mutex, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.mutex_guard.deref()
    }
}

impl<'mutex, T> DerefMut for CondvarGuard<'mutex, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.mutex_guard.deref_mut()
    }
}

impl<'a, T> Drop for CondvarGuard<'a, T> {
    fn drop(&mut self) {
        self.condvar.notify_all();
    }
}

/// For objects that can be locked with a `Condvar`
pub trait LockCondvarGuard<T> {
    /// Locks `self`, notifying the `Condvar` when the returned `CondvarGuard` is dropped and
    /// unlocks `self`
    fn lock_condvar<'a>(&'a self, condvar: &'a Condvar) -> CondvarGuard<'a, T>;
}

impl<T> LockCondvarGuard<T> for Mutex<T> {
    fn lock_condvar<'a>(&'a self, condvar: &'a Condvar) -> CondvarGuard<'a, T> {
        // the guarded data is plain flags, so a panic while holding the lock can't leave it in
        // an inconsistent state
        let guard = self.lock().unwrap_or_else(PoisonError::into_inner);
        CondvarGuard {
            mutex_guard: guard,
            condvar: condvar,
        }
    }
}

/// State shared between a background runner thread and the handles that control it. Updates
/// made through [update](#method.update) wake up the runner.
#[derive(Debug)]
pub struct RunnerState<T> {
    data: Mutex<T>,
    condvar: Condvar,
}

impl<T> RunnerState<T> {
    /// Creates a new `RunnerState` holding `data`
    pub fn new(data: T) -> Self {
        RunnerState {
            data: Mutex::new(data),
            condvar: Condvar::new(),
        }
    }

    /// Creates a new `RunnerState` holding `data`, wrapped in an `Arc`
    pub fn new_arc(data: T) -> Arc<Self> {
        Arc::new(Self::new(data))
    }

    /// Locks the state for updating. The runner is notified when the returned guard is dropped.
    pub fn update(&self) -> CondvarGuard<T> {
        self.data.lock_condvar(&self.condvar)
    }

    /// Waits at most `period` while `condition` holds, then returns the locked state
    pub fn wait_while_for_period<F>(&self, period: &WaitPeriod, condition: F) -> MutexGuard<T>
        where F: FnMut(&mut T) -> bool
    {
        wait_condvar_while(&self.condvar, &self.data, period, condition)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

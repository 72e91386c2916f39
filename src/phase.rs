//! The signal state of a traffic light

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// The phase a traffic light is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Traffic must stop
    Red,
    /// Traffic may go
    Green,
}

impl Phase {
    /// Gets the phase that follows this one
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Red => Phase::Green,
            Phase::Green => Phase::Red,
        }
    }

    fn from_green(green: bool) -> Phase {
        if green { Phase::Green } else { Phase::Red }
    }
}

impl Default for Phase {
    fn default() -> Phase {
        Phase::Red
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Phase::Red => f.write_str("red"),
            Phase::Green => f.write_str("green"),
        }
    }
}

/// A `Phase` which can be shared between threads. One thread may change it while any number of
/// others read it.
#[derive(Debug)]
pub struct AtomicPhase {
    green: AtomicBool,
}

impl AtomicPhase {
    /// Creates a new `AtomicPhase` holding `phase`
    pub fn new(phase: Phase) -> Self {
        AtomicPhase { green: AtomicBool::new(phase == Phase::Green) }
    }

    /// Gets the current phase
    #[inline]
    pub fn load(&self) -> Phase {
        Phase::from_green(self.green.load(Ordering::Acquire))
    }

    /// Switches to the other phase, returning the phase that was switched to
    #[inline]
    pub fn toggle(&self) -> Phase {
        let was_green = self.green.fetch_xor(true, Ordering::AcqRel);
        Phase::from_green(!was_green)
    }
}

impl Default for AtomicPhase {
    fn default() -> Self {
        AtomicPhase::new(Phase::default())
    }
}

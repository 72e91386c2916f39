//! Contains [TrafficLight](struct.TrafficLight.html)

use std::fmt;
use std::io;
use std::time::{Duration, Instant};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use blocking_queue::BlockingQueue;
use cycle::{CycleBounds, CycleTimer};
use phase::{AtomicPhase, Phase};
use util::{self, duration_string};
use wait_for::WaitPeriod;

quick_error! {
    /// An error that can be returned from `TrafficLight` related methods
    #[derive(Debug)]
    pub enum LightError {
        /// `simulate` was called on a light that was already started
        AlreadyRunning(name: String) {
            display("traffic light {} has already been started", name)
        }
        /// The thread that cycles through the phases could not be spawned
        Spawn(err: io::Error) {
            from()
            display("could not spawn cycling thread: {}", err)
            source(err)
        }
        /// The cycle bounds were empty, or the minimum cycle length was longer than the maximum
        InvalidBounds { min: Duration, max: Duration } {
            display("invalid cycle bounds from {} to {}, the minimum must be at least 1ms and \
                     no longer than the maximum",
                    duration_string(min), duration_string(max))
        }
    }
}

#[derive(Debug)]
struct CycleData {
    quit: bool,
}

type CycleState = util::RunnerState<CycleData>;

/// State shared between a `TrafficLight` and its cycling thread
struct Shared {
    name: String,
    bounds: CycleBounds,
    phase: AtomicPhase,
    messages: BlockingQueue<Phase>,
    state: CycleState,
}

impl Shared {
    /// Runs the thread which flips the phase whenever the current one has lasted long enough
    fn cycle_through_phases(&self) {
        let mut rng = ::rand::thread_rng();
        let mut timer = CycleTimer::start(self.bounds, Instant::now(), &mut rng);
        debug!("light {} starts {}, next change in {}",
               self.name,
               self.phase.load(),
               duration_string(&timer.target()));
        loop {
            let period = timer.wait_period(Instant::now());
            {
                let data = self.state.wait_while_for_period(&period, |data| !data.quit);
                if data.quit {
                    debug!("light {} stopped cycling", self.name);
                    return;
                }
            }
            if let Some(elapsed) = timer.poll(Instant::now(), &mut rng) {
                let phase = self.phase.toggle();
                debug!("light {} switched to {} after {}, next change in {}",
                       self.name,
                       phase,
                       duration_string(&elapsed),
                       duration_string(&timer.target()));
                self.messages.send(phase);
            }
        }
    }
}

/// A traffic light that switches between red and green on its own thread.
///
/// Each phase lasts a random length of time picked from its `CycleBounds`, and a new length is
/// picked for every phase. Other threads can read the phase at any time with
/// [current_phase](#method.current_phase) or block until it turns green with
/// [wait_for_green](#method.wait_for_green).
///
/// The cycling thread is started by [simulate](#method.simulate) and runs until
/// [stop](#method.stop) is called or the `TrafficLight` is dropped.
pub struct TrafficLight {
    shared: Arc<Shared>,
    started: AtomicBool,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TrafficLight {
    /// Creates a new red `TrafficLight` whose phases last between the specified `bounds`
    pub fn new<S: Into<String>>(name: S, bounds: CycleBounds) -> Self {
        TrafficLight {
            shared: Arc::new(Shared {
                name: name.into(),
                bounds: bounds,
                phase: AtomicPhase::default(),
                messages: BlockingQueue::new(),
                state: CycleState::new(CycleData { quit: false }),
            }),
            started: AtomicBool::new(false),
            join_handle: Mutex::new(None),
        }
    }

    /// Creates a new red `TrafficLight` whose phases last between 4 and 6 seconds
    pub fn with_default_bounds<S: Into<String>>(name: S) -> Self {
        Self::new(name, CycleBounds::default())
    }

    /// Gets the name of this light
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Gets the bounds on the length of each phase
    pub fn bounds(&self) -> CycleBounds {
        self.shared.bounds
    }

    /// Starts the thread that cycles through the phases.
    ///
    /// A light can only be started once; any later call returns `LightError::AlreadyRunning`.
    pub fn simulate(&self) -> Result<(), LightError> {
        if self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err() {
            return Err(LightError::AlreadyRunning(self.shared.name.clone()));
        }
        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name(format!("light-{}", self.shared.name))
            .spawn(move || shared.cycle_through_phases());
        match spawned {
            Ok(join_handle) => {
                *self.join_handle.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(join_handle);
                Ok(())
            }
            Err(err) => {
                self.started.store(false, Ordering::Release);
                Err(err.into())
            }
        }
    }

    /// Gets the phase the light is in right now, without blocking
    pub fn current_phase(&self) -> Phase {
        self.shared.phase.load()
    }

    /// Blocks until the light turns green.
    ///
    /// Phase changes are received from the light's event queue; red ones are skipped. Only
    /// returns once a green event has been received while the light is still green, so a stale
    /// event can't let the caller through on red.
    ///
    /// # Liveness
    /// If the light is never started, or is stopped, this blocks forever. Use
    /// [wait_for_green_for](#method.wait_for_green_for) to put a bound on the wait.
    pub fn wait_for_green(&self) {
        loop {
            let phase = self.shared.messages.receive();
            if phase == Phase::Green && self.current_phase() == Phase::Green {
                return;
            }
            trace!("light {} waiting for green, skipped {}", self.shared.name, phase);
        }
    }

    /// Blocks until the light turns green, waiting at most `period` in total.
    ///
    /// Returns `true` if the light turned green, `false` if the period ran out first.
    pub fn wait_for_green_for(&self, period: &WaitPeriod) -> bool {
        let deadline = period.deadline_from(Instant::now());
        loop {
            let remaining = deadline.remaining(Instant::now());
            match self.shared.messages.receive_for(&remaining) {
                Some(Phase::Green) if self.current_phase() == Phase::Green => return true,
                Some(phase) => {
                    trace!("light {} waiting for green, skipped {}", self.shared.name, phase)
                }
                None => return false,
            }
        }
    }

    /// Stops the cycling thread and waits for it to exit.
    ///
    /// The light keeps the phase it was in. Does nothing if the light was never started or has
    /// already been stopped. A stopped light cannot be started again.
    pub fn stop(&self) {
        {
            let mut data = self.shared.state.update();
            data.quit = true;
        }
        let join_handle = self.join_handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(join_handle) = join_handle {
            if join_handle.join().is_err() {
                warn!("cycling thread for light {} panicked", self.shared.name);
            }
        }
    }
}

impl fmt::Debug for TrafficLight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "TrafficLight {{ name: \"{}\", phase: {}, bounds: {:?} }}",
               self.shared.name,
               self.current_phase(),
               self.shared.bounds)
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        // the cycling thread holds on to the shared state, so it has to be told to quit or it
        // would keep running detached
        self.stop();
    }
}

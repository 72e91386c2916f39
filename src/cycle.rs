//! Timing for the phase cycle of a [TrafficLight](../traffic_light/struct.TrafficLight.html)

use std::fmt;
use std::time::{Duration, Instant};
use rand::Rng;
use traffic_light::LightError;
use util::duration_string;
use wait_for::WaitPeriod;

/// The shortest time a phase lasts by default
pub const DEFAULT_MIN_CYCLE: Duration = Duration::from_millis(4000);
/// The longest time a phase lasts by default
pub const DEFAULT_MAX_CYCLE: Duration = Duration::from_millis(6000);

/// The range that the length of each phase is randomly picked from
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    min: Duration,
    max: Duration,
}

/// The shortest phase length `CycleBounds` accept
pub const MIN_CYCLE: Duration = Duration::from_millis(1);

impl CycleBounds {
    /// Creates new `CycleBounds`. Fails if `min` is shorter than 1ms or longer than `max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self, LightError> {
        if min < MIN_CYCLE || min > max {
            return Err(LightError::InvalidBounds { min: min, max: max });
        }
        Ok(CycleBounds {
            min: min,
            max: max,
        })
    }

    /// The shortest time a phase can last
    pub fn min(&self) -> Duration {
        self.min
    }

    /// The longest time a phase can last
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Picks a phase length uniformly from `[min, max]`, to the millisecond
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

impl Default for CycleBounds {
    fn default() -> Self {
        CycleBounds {
            min: DEFAULT_MIN_CYCLE,
            max: DEFAULT_MAX_CYCLE,
        }
    }
}

impl fmt::Debug for CycleBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CycleBounds {{ min: {}, max: {} }}",
               duration_string(&self.min),
               duration_string(&self.max))
    }
}

/// Keeps track of when the current phase started and how long it should last
#[derive(Debug)]
pub struct CycleTimer {
    bounds: CycleBounds,
    baseline: Instant,
    target: Duration,
}

impl CycleTimer {
    /// Starts timing the first phase at `now`
    pub fn start<R: Rng>(bounds: CycleBounds, now: Instant, rng: &mut R) -> Self {
        CycleTimer {
            bounds: bounds,
            baseline: now,
            target: bounds.draw(rng),
        }
    }

    /// How long the current phase is meant to last
    pub fn target(&self) -> Duration {
        self.target
    }

    /// How long is left in the current phase as of `now`, as a `WaitPeriod`
    pub fn wait_period(&self, now: Instant) -> WaitPeriod {
        let elapsed = now.saturating_duration_since(self.baseline);
        if elapsed >= self.target {
            WaitPeriod::None
        } else {
            WaitPeriod::AtMost(self.target - elapsed)
        }
    }

    /// Checks whether the current phase is over as of `now`.
    ///
    /// If it is, the next phase starts at `now` with a freshly drawn target and the length of
    /// the finished phase is returned.
    pub fn poll<R: Rng>(&mut self, now: Instant, rng: &mut R) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.baseline);
        if elapsed < self.target {
            return None;
        }
        self.baseline = now;
        self.target = self.bounds.draw(rng);
        Some(elapsed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_bounds_validation() {
        assert!(CycleBounds::new(ms(6000), ms(4000)).is_err());
        assert!(CycleBounds::new(ms(1), ms(1)).is_ok());
        let bounds = CycleBounds::new(ms(5), ms(5)).unwrap();
        assert_eq!(bounds.draw(&mut StdRng::seed_from_u64(1)), ms(5));
        assert_eq!(CycleBounds::default().min(), ms(4000));
        assert_eq!(CycleBounds::default().max(), ms(6000));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        // a zero length phase would make the cycling thread flip without ever waiting
        match CycleBounds::new(ms(0), ms(0)) {
            Err(LightError::InvalidBounds { min, max }) => {
                assert_eq!(min, ms(0));
                assert_eq!(max, ms(0));
            }
            other => panic!("expected InvalidBounds, got {:?}", other),
        }
        assert!(CycleBounds::new(Duration::from_micros(500), ms(10)).is_err());
    }

    #[test]
    fn test_draw_within_bounds() {
        let bounds = CycleBounds::default();
        let mut rng = StdRng::seed_from_u64(7);
        let draws: Vec<Duration> = (0..1000).map(|_| bounds.draw(&mut rng)).collect();
        assert!(draws.iter().all(|dur| *dur >= ms(4000) && *dur <= ms(6000)));
        // a fixed interval would be a bug
        assert!(draws.iter().any(|dur| *dur != draws[0]));
        assert!(draws.iter().any(|dur| *dur < ms(4500)));
        assert!(draws.iter().any(|dur| *dur > ms(5500)));
    }

    #[test]
    fn test_timer_waits_for_target() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = Instant::now();
        let mut timer = CycleTimer::start(CycleBounds::default(), start, &mut rng);
        let target = timer.target();
        assert_eq!(timer.wait_period(start), WaitPeriod::AtMost(target));
        assert_eq!(timer.wait_period(start + ms(1000)),
                   WaitPeriod::AtMost(target - ms(1000)));
        assert_eq!(timer.poll(start + ms(3999), &mut rng), None);
        assert_eq!(timer.wait_period(start + target), WaitPeriod::None);
        assert_eq!(timer.poll(start + target, &mut rng), Some(target));
        // the next phase is timed from the transition
        assert_eq!(timer.poll(start + target + ms(1), &mut rng), None);
    }

    #[test]
    fn test_timer_redraws_each_cycle() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut now = Instant::now();
        let mut timer = CycleTimer::start(CycleBounds::default(), now, &mut rng);
        let mut targets = Vec::new();
        for _ in 0..50 {
            let target = timer.target();
            targets.push(target);
            now += target;
            assert_eq!(timer.poll(now, &mut rng), Some(target));
        }
        assert!(targets.iter().all(|dur| *dur >= ms(4000) && *dur <= ms(6000)));
        assert!(targets.iter().any(|dur| *dur != targets[0]));
    }
}

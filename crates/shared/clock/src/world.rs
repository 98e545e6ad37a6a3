use arena_core::Timestamp;
use arena_ports::Clock;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Time scale modes for simulation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimeScale {
    /// Real-time (1:1 ratio with wall clock)
    #[default]
    Normal,
    /// Accelerated time (multiplier applied to elapsed time)
    Fast(u32),
    /// Decelerated time (divisor applied to elapsed time)
    Slow(u32),
    /// Fixed time (only advances when explicitly moved)
    Fixed,
}

/// Pair of instants that simulation time is measured from
#[derive(Debug, Clone, Copy)]
struct Anchor {
    real: Timestamp,
    sim: Timestamp,
    scale: TimeScale,
}

impl Anchor {
    fn project(&self, real_now: Timestamp) -> Timestamp {
        let real_elapsed = real_now - self.real;
        match self.scale {
            TimeScale::Normal => self.sim + real_elapsed,
            TimeScale::Fast(multiplier) => self.sim + real_elapsed * multiplier as i32,
            TimeScale::Slow(0) => self.sim,
            TimeScale::Slow(divisor) => self.sim + real_elapsed / divisor as i32,
            TimeScale::Fixed => self.sim,
        }
    }
}

/// Simulation clock - the source of truth for all time in an arena
///
/// Time is projected from an anchor (a real instant paired with a simulated
/// instant) through the current scale. Changing the scale, advancing or
/// setting the time re-anchors, so simulated time stays continuous.
pub struct WorldClock {
    anchor: RwLock<Anchor>,
}

impl WorldClock {
    /// Create a new world clock running in real time
    ///
    /// # Arguments
    /// * `initial_time` - Optional starting time. If None, uses current wall time.
    pub fn new(initial_time: Option<Timestamp>) -> Arc<Self> {
        let real = Utc::now();
        Arc::new(Self {
            anchor: RwLock::new(Anchor {
                real,
                sim: initial_time.unwrap_or(real),
                scale: TimeScale::Normal,
            }),
        })
    }

    /// Create a frozen clock, for deterministic tests
    pub fn fixed(initial_time: Option<Timestamp>) -> Arc<Self> {
        let clock = Self::new(initial_time);
        clock.set_time_scale(TimeScale::Fixed);
        clock
    }

    /// Set the time scale
    pub fn set_time_scale(&self, scale: TimeScale) {
        let mut anchor = self.anchor.write();
        let real_now = Utc::now();
        let sim_now = anchor.project(real_now);
        *anchor = Anchor {
            real: real_now,
            sim: sim_now,
            scale,
        };
    }

    /// Get the current time scale
    pub fn time_scale(&self) -> TimeScale {
        self.anchor.read().scale
    }

    /// Advance the simulated time by a specified duration
    pub fn advance(&self, duration: Duration) {
        self.anchor.write().sim += duration;
    }

    /// Explicitly set the simulation time
    ///
    /// Warning: moving time backwards is allowed and can cause discontinuities.
    pub fn set_time(&self, time: Timestamp) {
        let mut anchor = self.anchor.write();
        anchor.real = Utc::now();
        anchor.sim = time;
    }
}

impl Clock for WorldClock {
    fn now(&self) -> Timestamp {
        self.anchor.read().project(Utc::now())
    }

    fn name(&self) -> &str {
        "WorldClock"
    }
}

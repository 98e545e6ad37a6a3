//! Arena Clock Infrastructure
//!
//! Provides time abstractions for simulation and production:
//!
//! - [`SystemClock`]: wall-clock time
//! - [`WorldClock`]: simulation time that can run at normal speed, be
//!   accelerated or slowed down, or be frozen and moved by hand
//!
//! Cost accrual reads time only through the [`Clock`] port, so an arena
//! driven by a `WorldClock` ages its agents at whatever pace the clock runs.
//!
//! ## Usage
//!
//! ```ignore
//! use arena_clock::{WorldClock, TimeScale};
//! use chrono::Duration;
//!
//! let world = WorldClock::new(None);
//!
//! world.set_time_scale(TimeScale::Fast(60)); // one simulated hour per minute
//! world.set_time_scale(TimeScale::Fixed);    // frozen time
//! world.advance(Duration::hours(5));         // jump forward
//! ```

mod system;
mod world;

pub use system::SystemClock;
pub use world::{TimeScale, WorldClock};

// Re-export the Clock trait for convenience
pub use arena_ports::Clock;

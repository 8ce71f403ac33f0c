//! Collaborator interfaces for the flag search
//!
//! The planner and executor never touch hardware directly. Everything they drive
//! goes through the traits in this module:
//! - Point-to-point navigation (obstacle avoidance lives behind it)
//! - Motion primitives and heading queries
//! - Shared, reference-counted access to the distance and color sensors
//! - Time, so waits can be simulated
//! - The audible capture signal

mod clock;
mod lease;

use log::info;

use crate::core::Waypoint;
use crate::error::Result;

pub use clock::*;
pub use lease::*;

/// Drives the agent through an ordered list of targets.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    /// Replaces the current target list.
    fn set_path(&mut self, targets: &[Waypoint]);
    /// Whether every target has been reached.
    fn is_done(&self) -> bool;
    /// Advances navigation by one step.
    fn process(&mut self) -> Result<()>;
}

/// Blocking motion primitives. Distances are in the distance sensor's unit.
#[cfg_attr(test, mockall::automock)]
pub trait MotionDriver {
    /// Turns in place; positive is counter-clockwise.
    fn rotate(&mut self, degrees: f64) -> Result<()>;
    /// Drives straight ahead.
    fn move_forward(&mut self, distance: f64) -> Result<()>;
    /// Backs up in a straight line.
    fn move_backward(&mut self, distance: f64) -> Result<()>;
}

/// Current heading of the agent, in radians.
#[cfg_attr(test, mockall::automock)]
pub trait HeadingSource {
    /// Heading in radians.
    fn heading(&self) -> f64;
}

/// Everything the executor drives on the agent itself.
pub trait Robot: Navigator + MotionDriver + HeadingSource {}

impl<T: Navigator + MotionDriver + HeadingSource> Robot for T {}

/// Sensor channels shared with other subsystems
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SensorChannel {
    /// Ultrasonic range finder
    Distance,
    /// Downward light sensor
    Color,
}

/// Reference-counted access to the distance and color sensors.
///
/// Implementations are shared between subsystems, so every method takes `&self`.
#[cfg_attr(test, mockall::automock)]
pub trait SensorHub {
    /// Registers one more holder of `channel`.
    fn acquire(&self, channel: SensorChannel);
    /// Drops one holder of `channel`.
    fn release(&self, channel: SensorChannel);
    /// Most recent raw distance samples; `None` or empty while the sensor settles.
    fn distance_samples(&self) -> Option<Vec<f32>>;
    /// Most recent filtered color reading.
    fn latest_color(&self) -> f32;
}

/// Audible signal raised when the flag is captured.
#[cfg_attr(test, mockall::automock)]
pub trait CaptureSignal {
    /// Emits one beep.
    fn beep(&mut self);
}

/// Capture signal for targets without a speaker: logs each beep.
#[derive(Debug, Default)]
pub struct LogSignal {
    beeps: usize,
}

impl LogSignal {
    /// A signal that has not beeped yet.
    pub fn new() -> Self {
        LogSignal { beeps: 0 }
    }

    /// Beeps emitted so far.
    pub fn beeps(&self) -> usize {
        self.beeps
    }
}

impl CaptureSignal for LogSignal {
    fn beep(&mut self) {
        self.beeps += 1;
        info!("Beep {}", self.beeps);
    }
}

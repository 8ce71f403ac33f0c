// sim.rs
// Simulated arena for running a search without hardware.

// A single SimWorld holds the agent pose, an optional flag block and the sensor
// reference counts. SimRobot and SimSensors are handles onto it, sharing one
// ManualClock so every motion and wait costs virtual time.
// Distances reported by the sensor and taken by the motion primitives are in
// centimetres; positions are in tiles.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::{distance, FlagColor, Waypoint};
use crate::error::{Result, SearchError};
use crate::interface::{
    Clock, HeadingSource, ManualClock, MotionDriver, Navigator, SensorChannel, SensorHub,
};

fn default_tile_size() -> f64 {
    30.48
}

fn default_linear_speed() -> f64 {
    1.0
}

fn default_turn_rate() -> f64 {
    180.0
}

fn default_step_ms() -> u64 {
    40
}

fn default_flag_half_width() -> f64 {
    0.25
}

fn default_sensor_range() -> f64 {
    255.0
}

fn default_color_range() -> f64 {
    0.1
}

fn default_ambient_color() -> f32 {
    0.5
}

/// Physical parameters of the simulated arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Centimetres per tile
    #[serde(default = "default_tile_size")]
    pub tile_size: f64,
    /// Tiles per second while navigating or driving straight
    #[serde(default = "default_linear_speed")]
    pub linear_speed: f64,
    /// Degrees per second when turning in place
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f64,
    /// Virtual time per navigation step
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Half the side length of the flag block, in tiles
    #[serde(default = "default_flag_half_width")]
    pub flag_half_width: f64,
    /// Reading reported when nothing is in front of the distance sensor
    #[serde(default = "default_sensor_range")]
    pub sensor_range: f64,
    /// How close (tiles) the block must be for the color sensor to see it
    #[serde(default = "default_color_range")]
    pub color_range: f64,
    /// Color reading with no flag in view
    #[serde(default = "default_ambient_color")]
    pub ambient_color: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tile_size: default_tile_size(),
            linear_speed: default_linear_speed(),
            turn_rate: default_turn_rate(),
            step_ms: default_step_ms(),
            flag_half_width: default_flag_half_width(),
            sensor_range: default_sensor_range(),
            color_range: default_color_range(),
            ambient_color: default_ambient_color(),
        }
    }
}

impl SimConfig {
    /// Rejects parameters that would stall the virtual clock or yield infinite motion times
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tile_size", self.tile_size),
            ("linear_speed", self.linear_speed),
            ("turn_rate", self.turn_rate),
            ("flag_half_width", self.flag_half_width),
            ("sensor_range", self.sensor_range),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SearchError::Config(format!(
                    "sim {} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.step_ms == 0 {
            return Err(SearchError::Config("sim step_ms must be non-zero".to_string()));
        }
        if !(self.color_range.is_finite() && self.color_range >= 0.0) {
            return Err(SearchError::Config(format!(
                "sim color_range must not be negative, got {}",
                self.color_range
            )));
        }
        if !self.ambient_color.is_finite() {
            return Err(SearchError::Config("sim ambient_color must be finite".to_string()));
        }
        Ok(())
    }
}

// Virtual time taken to cover `amount` at `rate` per second
fn motion_time(amount: f64, rate: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(amount / rate).map_err(|e| {
        SearchError::Hardware(format!("cannot time a motion of {} at {}/s: {}", amount, rate, e))
    })
}

// Flag block placed in the arena
#[derive(Debug, Clone, Copy, PartialEq)]
struct SimFlag {
    position: Waypoint,
    color: FlagColor,
}

/// Motions recorded by the simulated robot, in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Navigation reached a target
    Arrived(Waypoint),
    /// In-place turn, degrees
    Rotate(f64),
    /// Straight drive, centimetres
    Forward(f64),
    /// Reverse drive, centimetres
    Backward(f64),
}

/// Shared state of the simulated arena
#[derive(Debug, Clone)]
pub struct SimWorld {
    position: Waypoint,
    /// Degrees, counter-clockwise from +x
    heading: f64,
    flag: Option<SimFlag>,
    motions: Vec<Motion>,
    distance_holders: usize,
    color_holders: usize,
}

impl SimWorld {
    /// Agent at `start` facing +x, no flag.
    pub fn new(start: Waypoint) -> Self {
        SimWorld {
            position: start,
            heading: 0.0,
            flag: None,
            motions: Vec::new(),
            distance_holders: 0,
            color_holders: 0,
        }
    }

    /// Agent position in tiles.
    pub fn position(&self) -> Waypoint {
        self.position
    }

    /// Agent heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Every motion so far, oldest first.
    pub fn motions(&self) -> &[Motion] {
        &self.motions
    }

    /// Outstanding acquisitions of `channel`.
    pub fn holders(&self, channel: SensorChannel) -> usize {
        match channel {
            SensorChannel::Distance => self.distance_holders,
            SensorChannel::Color => self.color_holders,
        }
    }

    fn holders_mut(&mut self, channel: SensorChannel) -> &mut usize {
        match channel {
            SensorChannel::Distance => &mut self.distance_holders,
            SensorChannel::Color => &mut self.color_holders,
        }
    }

    // Distance in tiles along the current heading to the flag block, if the ray hits it
    fn range_to_flag(&self, half_width: f64) -> Option<f64> {
        let flag = self.flag?;
        ray_to_block(&self.position, self.heading, &flag.position, half_width)
    }

    fn advance(&mut self, tiles: f64) {
        let rad = self.heading.to_radians();
        self.position.x += tiles * rad.cos();
        self.position.y += tiles * rad.sin();
    }
}

/// Slab test of a ray against an axis-aligned square block. Returns the distance
/// to the first face hit, zero when the origin is inside the block.
pub fn ray_to_block(origin: &Waypoint, heading_deg: f64, center: &Waypoint, half_width: f64) -> Option<f64> {
    let rad = heading_deg.to_radians();
    let dir = [rad.cos(), rad.sin()];
    let mut near = 0.0_f64;
    let mut far = f64::INFINITY;

    for axis in 0..2 {
        let lo = center[axis] - half_width;
        let hi = center[axis] + half_width;
        let o = origin[axis];
        if dir[axis].abs() < 1e-9 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t1, mut t2) = ((lo - o) / dir[axis], (hi - o) / dir[axis]);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        near = near.max(t1);
        far = far.min(t2);
        if near > far {
            return None;
        }
    }
    Some(near)
}

fn lock(world: &Mutex<SimWorld>) -> MutexGuard<'_, SimWorld> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated arena: hands out robot and sensor handles over one shared world.
pub struct SimArena {
    config: SimConfig,
    world: Arc<Mutex<SimWorld>>,
    clock: ManualClock,
}

impl SimArena {
    /// Empty arena with the agent at `start`.
    pub fn new(config: SimConfig, start: Waypoint) -> Self {
        SimArena {
            config,
            world: Arc::new(Mutex::new(SimWorld::new(start))),
            clock: ManualClock::new(),
        }
    }

    /// Places a flag block centred on `position`.
    pub fn place_flag(&self, position: Waypoint, color: FlagColor) {
        debug!("Flag {:?} placed at ({:.2}, {:.2})", color, position.x, position.y);
        lock(&self.world).flag = Some(SimFlag { position, color });
    }

    /// A robot handle onto the shared world.
    pub fn robot(&self) -> SimRobot {
        SimRobot {
            config: self.config.clone(),
            world: Arc::clone(&self.world),
            clock: self.clock.clone(),
            targets: VecDeque::new(),
        }
    }

    /// Sensor handle onto the shared world.
    pub fn sensors(&self) -> Arc<SimSensors> {
        Arc::new(SimSensors {
            config: self.config.clone(),
            world: Arc::clone(&self.world),
        })
    }

    /// The arena's virtual clock.
    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    /// Copy of the current world state
    pub fn snapshot(&self) -> SimWorld {
        lock(&self.world).clone()
    }
}

/// Simulated drive base: point-to-point navigation plus timed motions.
pub struct SimRobot {
    config: SimConfig,
    world: Arc<Mutex<SimWorld>>,
    clock: ManualClock,
    targets: VecDeque<Waypoint>,
}

impl SimRobot {
    fn drive(&mut self, centimetres: f64, forward: bool) -> Result<()> {
        if !centimetres.is_finite() || centimetres < 0.0 {
            return Err(SearchError::Hardware(format!(
                "invalid drive distance {}",
                centimetres
            )));
        }
        let tiles = centimetres / self.config.tile_size;
        let elapsed = motion_time(tiles, self.config.linear_speed)?;
        {
            let mut world = lock(&self.world);
            world.advance(if forward { tiles } else { -tiles });
            world.motions.push(if forward {
                Motion::Forward(centimetres)
            } else {
                Motion::Backward(centimetres)
            });
        }
        self.clock.sleep(elapsed);
        Ok(())
    }
}

impl Navigator for SimRobot {
    fn set_path(&mut self, targets: &[Waypoint]) {
        self.targets = targets.iter().copied().collect();
    }

    fn is_done(&self) -> bool {
        self.targets.is_empty()
    }

    fn process(&mut self) -> Result<()> {
        let Some(target) = self.targets.front().copied() else {
            return Ok(());
        };
        let step = self.config.linear_speed * self.config.step_ms as f64 / 1000.0;
        if !(step.is_finite() && step > 0.0) {
            return Err(SearchError::Hardware(format!(
                "navigation step of {} tiles never reaches a target",
                step
            )));
        }

        let mut world = lock(&self.world);
        let remaining = distance(&world.position, &target);
        if remaining > 0.0 {
            let delta = target - world.position;
            world.heading = delta.y.atan2(delta.x).to_degrees();
        }
        if remaining <= step {
            world.position = target;
            world.motions.push(Motion::Arrived(target));
            self.targets.pop_front();
            debug!("Arrived at ({:.2}, {:.2})", target.x, target.y);
        } else {
            world.advance(step);
        }
        drop(world);

        self.clock.sleep(Duration::from_millis(self.config.step_ms));
        Ok(())
    }
}

impl MotionDriver for SimRobot {
    fn rotate(&mut self, degrees: f64) -> Result<()> {
        if !degrees.is_finite() {
            return Err(SearchError::Hardware("invalid rotation".to_string()));
        }
        let elapsed = motion_time(degrees.abs(), self.config.turn_rate)?;
        {
            let mut world = lock(&self.world);
            world.heading = (world.heading + degrees).rem_euclid(360.0);
            world.motions.push(Motion::Rotate(degrees));
        }
        self.clock.sleep(elapsed);
        Ok(())
    }

    fn move_forward(&mut self, distance: f64) -> Result<()> {
        self.drive(distance, true)
    }

    fn move_backward(&mut self, distance: f64) -> Result<()> {
        self.drive(distance, false)
    }
}

impl HeadingSource for SimRobot {
    fn heading(&self) -> f64 {
        lock(&self.world).heading.to_radians()
    }
}

/// Simulated distance and color sensors with reference-counted activation.
pub struct SimSensors {
    config: SimConfig,
    world: Arc<Mutex<SimWorld>>,
}

impl SensorHub for SimSensors {
    fn acquire(&self, channel: SensorChannel) {
        let mut world = lock(&self.world);
        *world.holders_mut(channel) += 1;
        debug!("{:?} sensor holders: {}", channel, world.holders(channel));
    }

    fn release(&self, channel: SensorChannel) {
        let mut world = lock(&self.world);
        let holders = world.holders_mut(channel);
        if *holders == 0 {
            warn!("{:?} sensor released more times than acquired", channel);
            return;
        }
        *holders -= 1;
    }

    // Nothing while the channel is off
    fn distance_samples(&self) -> Option<Vec<f32>> {
        let world = lock(&self.world);
        if world.distance_holders == 0 {
            return None;
        }
        let reading = world
            .range_to_flag(self.config.flag_half_width)
            .map(|tiles| tiles * self.config.tile_size)
            .filter(|cm| *cm < self.config.sensor_range)
            .unwrap_or(self.config.sensor_range);
        Some(vec![reading as f32; 3])
    }

    fn latest_color(&self) -> f32 {
        let world = lock(&self.world);
        if world.color_holders == 0 {
            return FlagColor::NO_READING;
        }
        let close = world
            .range_to_flag(self.config.flag_half_width)
            .is_some_and(|tiles| tiles <= self.config.color_range);
        match (close, world.flag) {
            (true, Some(flag)) => flag.color.signature().unwrap_or(self.config.ambient_color),
            _ => self.config.ambient_color,
        }
    }
}

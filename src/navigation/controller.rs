// navigation/controller.rs
// Executes a planned search path and looks inward for the flag along the way.

// Drives the robot waypoint by waypoint: orients at the first one, turns at the
// corners, and at every edge waypoint faces the zone and runs the flag check. The
// attempt ends on capture, on timeout, or once the path runs out.
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::core::{FlagColor, SearchState, SearchStateMachine, Waypoint};
use crate::error::{Result, SearchError};
use crate::interface::{CaptureSignal, Clock, Robot, SensorHub, SensorLease};
use crate::SearchConfig;

use super::planner::SearchPath;

/// How a search attempt ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchOutcome {
    /// Flag confirmed while inspecting from path index `index`.
    Captured { index: usize, waypoint: Waypoint },
    /// Budget ran out after `visited` waypoints were reached.
    TimedOut { visited: usize },
    /// Every waypoint was visited without finding the flag.
    Exhausted,
}

impl SearchOutcome {
    /// Whether the flag was found.
    pub fn is_captured(&self) -> bool {
        matches!(self, SearchOutcome::Captured { .. })
    }
}

// Result of looking inward from one edge waypoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Inspection {
    Found,
    NotFound,
    TimedOut,
}

/// Signed rotation in (-180, 180] degrees that turns `current` onto `target`.
pub fn shortest_rotation(current: f64, target: f64) -> f64 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Search executor: owns the path for the duration of a run
pub struct SearchExecutor<R, S, C, G>
where
    R: Robot,
    S: SensorHub,
    C: Clock,
    G: CaptureSignal,
{
    config: SearchConfig,
    robot: R,
    sensors: Arc<S>,
    clock: C,
    signal: G,
    path: Option<SearchPath>,
    flag: FlagColor,
    fsm: SearchStateMachine,
}

impl<R, S, C, G> SearchExecutor<R, S, C, G>
where
    R: Robot,
    S: SensorHub,
    C: Clock,
    G: CaptureSignal,
{
    /// Create a new executor around its collaborators
    pub fn new(config: &SearchConfig, robot: R, sensors: Arc<S>, clock: C, signal: G) -> Self {
        SearchExecutor {
            config: config.clone(),
            robot,
            sensors,
            clock,
            signal,
            path: None,
            flag: FlagColor::None,
            fsm: SearchStateMachine::new(),
        }
    }

    /// Hands over the path and target color for the next run.
    pub fn load(&mut self, path: SearchPath, flag: FlagColor) {
        self.path = Some(path);
        self.flag = flag;
        self.fsm.reset();
    }

    /// Changes the target color without touching the path.
    pub fn set_flag(&mut self, flag: FlagColor) {
        self.flag = flag;
    }

    /// Loaded path, if any.
    pub fn path(&self) -> Option<&SearchPath> {
        self.path.as_ref()
    }

    /// Mutable access to the loaded path, for adjusting it before a run.
    pub fn path_mut(&mut self) -> Option<&mut SearchPath> {
        self.path.as_mut()
    }

    /// Removes the path; `run` then fails until another is loaded.
    pub fn take_path(&mut self) -> Option<SearchPath> {
        self.path.take()
    }

    /// Current execution state.
    pub fn state(&self) -> SearchState {
        self.fsm.get_state()
    }

    /// Mutable access to the robot.
    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    /// The clock every wait goes through.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The capture signal, e.g. to count beeps.
    pub fn signal(&self) -> &G {
        &self.signal
    }

    /// Walks the loaded path until the flag is captured, time runs out, or the path
    /// ends. Nothing moves if the path, flag color or direction is missing.
    pub fn run(&mut self) -> Result<SearchOutcome> {
        let turn = match &self.path {
            Some(path) => path.direction().turn_angle(self.config.turn_angle_deg),
            None => {
                error!("Search requested before a path was computed");
                return Err(SearchError::MissingInput("search path"));
            }
        };
        if self.flag.signature().is_none() {
            error!("Search requested without a flag color");
            return Err(SearchError::MissingInput("flag color"));
        }
        let turn = turn.ok_or_else(|| {
            error!("Search path has no traversal direction");
            SearchError::Config("search path direction is unknown".to_string())
        })?;

        let path = self
            .path
            .take()
            .ok_or(SearchError::MissingInput("search path"))?;
        self.fsm.reset();

        let outcome = self.walk(&path, turn);
        self.path = Some(path);

        match &outcome {
            Ok(result) => info!("Search finished: {:?}", result),
            Err(e) => error!("Search aborted: {}", e),
        }
        outcome
    }

    fn walk(&mut self, path: &SearchPath, turn: f64) -> Result<SearchOutcome> {
        let _lease = SensorLease::acquire(Arc::clone(&self.sensors));
        let start = self.clock.now();

        info!(
            "Searching {} waypoints {:?} for a {:?} flag",
            path.len(),
            path.direction(),
            self.flag
        );

        for (i, waypoint) in path.waypoints().iter().enumerate() {
            self.fsm.transition(if i == 0 {
                SearchState::Orienting
            } else {
                SearchState::Traversing
            })?;

            if self.timed_out(start) {
                self.fsm.transition(SearchState::TimedOut)?;
                return Ok(SearchOutcome::TimedOut { visited: i });
            }

            self.navigate_to(*waypoint)?;

            if self.timed_out(start) {
                self.fsm.transition(SearchState::TimedOut)?;
                return Ok(SearchOutcome::TimedOut { visited: i + 1 });
            }

            if i == 0 {
                self.orient(path.initial_heading())?;
                continue;
            }

            if path.corners().is_corner(i) {
                debug!("Corner at index {}, turning {:.0} deg", i, turn);
                self.robot.rotate(turn)?;
                continue;
            }

            // Face the zone
            self.robot.rotate(turn)?;
            self.fsm.transition(SearchState::Inspecting)?;

            match self.check_for_flag(start)? {
                Inspection::Found => {
                    self.fsm.transition(SearchState::Captured)?;
                    info!("Flag captured from waypoint {} ({:.2}, {:.2})", i, waypoint.x, waypoint.y);
                    self.signal_capture();
                    return Ok(SearchOutcome::Captured {
                        index: i,
                        waypoint: *waypoint,
                    });
                }
                Inspection::TimedOut => {
                    self.fsm.transition(SearchState::TimedOut)?;
                    return Ok(SearchOutcome::TimedOut { visited: i + 1 });
                }
                Inspection::NotFound => {
                    self.fsm.transition(SearchState::Traversing)?;
                    self.robot.rotate(-turn)?;
                }
            }
        }

        self.fsm.transition(SearchState::Exhausted)?;
        Ok(SearchOutcome::Exhausted)
    }

    // Blocks until the navigator reports the waypoint reached
    fn navigate_to(&mut self, waypoint: Waypoint) -> Result<()> {
        debug!("Navigating to ({:.2}, {:.2})", waypoint.x, waypoint.y);
        self.robot.set_path(&[waypoint]);
        while !self.robot.is_done() {
            self.robot.process()?;
            self.clock.sleep(self.config.navigation_poll());
        }
        Ok(())
    }

    fn orient(&mut self, target: f64) -> Result<()> {
        let current = self.robot.heading().to_degrees();
        let delta = shortest_rotation(current, target);
        debug!("Orienting from {:.1} to {:.1} deg ({:+.1})", current, target, delta);
        self.robot.rotate(delta)
    }

    // Probe ahead with the distance sensor; if something is close enough, drive up to it
    // and read its color. Backs off again unless the color matches.
    fn check_for_flag(&mut self, start: std::time::Duration) -> Result<Inspection> {
        let samples = loop {
            self.clock.sleep(self.config.stabilize());
            match self.sensors.distance_samples() {
                Some(samples) if !samples.is_empty() => break samples,
                _ => debug!("No distance data yet"),
            }
            if self.timed_out(start) {
                warn!("Timed out waiting for distance data");
                return Ok(Inspection::TimedOut);
            }
        };

        let distance =
            samples.iter().map(|s| f64::from(*s)).sum::<f64>() / samples.len() as f64;
        if distance > self.config.capture_distance {
            debug!("Nothing within reach ({:.1})", distance);
            return Ok(Inspection::NotFound);
        }

        self.robot.move_forward(distance)?;
        self.clock.sleep(self.config.stabilize());
        let color = self.sensors.latest_color();

        if self.flag.matches(color, self.config.color_tolerance) {
            Ok(Inspection::Found)
        } else {
            debug!("Object at {:.1} reads {:.3}, not the flag", distance, color);
            self.robot.move_backward(distance)?;
            Ok(Inspection::NotFound)
        }
    }

    fn signal_capture(&mut self) {
        for n in 0..self.config.capture_beeps {
            if n > 0 {
                self.clock.sleep(self.config.beep_interval());
            }
            self.signal.beep();
        }
    }

    fn timed_out(&self, start: std::time::Duration) -> bool {
        let elapsed = self.clock.elapsed_since(start);
        if elapsed > self.config.timeout() {
            warn!("Search timed out after {:.1}s", elapsed.as_secs_f64());
            true
        } else {
            false
        }
    }
}

//! Flag Search - perimeter search planning and execution
//!
//! This library plans a walk around a rectangular search zone, clipped to the
//! region the agent may legally enter, and drives an agent along it while
//! checking inward for a flag of a known color.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Shared value types: zones, flags, requests and the state machine
pub mod core;
/// Error type and result alias
pub mod error;
/// Hardware-facing traits and their stock implementations
pub mod interface;
/// Perimeter planning and the search executor
pub mod navigation;
/// In-memory simulated arena
pub mod sim;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

// Re-export commonly used items for easier access
pub use crate::core::{FlagColor, NavigableBounds, SearchRequest, SearchState, Waypoint, Zone};
pub use error::{Result, SearchError};
pub use interface::{CaptureSignal, Clock, Robot, SensorHub};
pub use navigation::{Direction, SearchExecutor, SearchOutcome, SearchPath, SearchPlanner};
pub use sim::SimConfig;

fn default_clearance() -> f64 {
    0.5
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_navigation_poll_ms() -> u64 {
    40
}

fn default_stabilize_ms() -> u64 {
    500
}

fn default_beep_interval_ms() -> u64 {
    200
}

fn default_capture_beeps() -> u32 {
    3
}

fn default_capture_distance() -> f64 {
    25.0
}

fn default_color_tolerance() -> f32 {
    0.001
}

fn default_turn_angle_deg() -> f64 {
    90.0
}

/// Main configuration structure for a search attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Distance (tiles) between the zone edge and the perimeter ring
    #[serde(default = "default_clearance")]
    pub clearance: f64,
    /// Wall-clock budget for one attempt
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Wait between navigation steps
    #[serde(default = "default_navigation_poll_ms")]
    pub navigation_poll_ms: u64,
    /// Settle time before sensor reads
    #[serde(default = "default_stabilize_ms")]
    pub stabilize_ms: u64,
    /// Gap between capture beeps
    #[serde(default = "default_beep_interval_ms")]
    pub beep_interval_ms: u64,
    /// Beeps emitted on capture
    #[serde(default = "default_capture_beeps")]
    pub capture_beeps: u32,
    /// Objects further than this (sensor units) are not approached
    #[serde(default = "default_capture_distance")]
    pub capture_distance: f64,
    /// Half-width of the accepted color window
    #[serde(default = "default_color_tolerance")]
    pub color_tolerance: f32,
    /// Magnitude of corner and inspection turns
    #[serde(default = "default_turn_angle_deg")]
    pub turn_angle_deg: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            clearance: default_clearance(),
            timeout_ms: default_timeout_ms(),
            navigation_poll_ms: default_navigation_poll_ms(),
            stabilize_ms: default_stabilize_ms(),
            beep_interval_ms: default_beep_interval_ms(),
            capture_beeps: default_capture_beeps(),
            capture_distance: default_capture_distance(),
            color_tolerance: default_color_tolerance(),
            turn_angle_deg: default_turn_angle_deg(),
        }
    }
}

impl SearchConfig {
    /// Load and validate a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SearchConfig = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the search loop meaningless or endless
    pub fn validate(&self) -> Result<()> {
        if !(self.clearance.is_finite() && self.clearance > 0.0) {
            return Err(SearchError::Config(format!(
                "clearance must be positive, got {}",
                self.clearance
            )));
        }
        if self.timeout_ms == 0 || self.navigation_poll_ms == 0 || self.stabilize_ms == 0 {
            return Err(SearchError::Config(
                "timeout, navigation poll and stabilize intervals must be non-zero".to_string(),
            ));
        }
        if !(self.capture_distance.is_finite() && self.capture_distance > 0.0) {
            return Err(SearchError::Config(format!(
                "capture distance must be positive, got {}",
                self.capture_distance
            )));
        }
        if !(self.color_tolerance.is_finite() && self.color_tolerance >= 0.0) {
            return Err(SearchError::Config(format!(
                "color tolerance must not be negative, got {}",
                self.color_tolerance
            )));
        }
        if !(self.turn_angle_deg > 0.0 && self.turn_angle_deg <= 180.0) {
            return Err(SearchError::Config(format!(
                "turn angle must be in (0, 180], got {}",
                self.turn_angle_deg
            )));
        }
        Ok(())
    }

    /// Attempt budget as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Wait between navigation steps
    pub fn navigation_poll(&self) -> Duration {
        Duration::from_millis(self.navigation_poll_ms)
    }

    /// Settle time before reading sensors
    pub fn stabilize(&self) -> Duration {
        Duration::from_millis(self.stabilize_ms)
    }

    /// Gap between beeps
    pub fn beep_interval(&self) -> Duration {
        Duration::from_millis(self.beep_interval_ms)
    }
}

/// Sample mission compiled into the crate, used when no mission file is given
pub const BUILTIN_MISSION: &str = include_str!("../config/mission.yaml");

fn default_arena() -> Zone {
    Zone::full_grid()
}

/// Everything one simulated attempt needs: where, what, and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Region the agent may occupy before the clearance inset
    #[serde(default = "default_arena")]
    pub arena: Zone,
    /// Rectangle the flag is hidden in
    pub zone: Zone,
    /// Agent position when the search starts
    pub start: Waypoint,
    /// Color to look for
    #[serde(default)]
    pub flag: FlagColor,
    /// Where the simulator places the flag block; no block when absent
    #[serde(default)]
    pub flag_position: Option<Waypoint>,
    /// Planner and executor tuning
    #[serde(default)]
    pub search: SearchConfig,
    /// Simulated hardware parameters
    #[serde(default)]
    pub sim: SimConfig,
}

impl MissionConfig {
    /// Load and validate a mission from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate a mission from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let mission: MissionConfig = serde_yaml::from_str(text)?;
        mission.search.validate()?;
        mission.sim.validate()?;
        Ok(mission)
    }

    /// The sample mission shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_MISSION)
    }

    /// Arena shrunk by the configured clearance
    pub fn bounds(&self) -> Result<NavigableBounds> {
        NavigableBounds::inset(&self.arena, self.search.clearance)
    }

    /// Builds the planner input for this mission
    pub fn request(&self) -> Result<SearchRequest> {
        SearchRequest::builder()
            .bounds(self.bounds()?)
            .zone(self.zone)
            .location(self.start)
            .flag(self.flag)
            .build()
    }
}

/// Primary entry point: plans a request and runs it to an outcome
pub struct SearchMission {
    config: SearchConfig,
    planner: SearchPlanner,
}

impl SearchMission {
    /// Create a new mission runner with the given configuration
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let planner = SearchPlanner::new(&config);
        Ok(SearchMission { config, planner })
    }

    /// Plans without moving anything
    pub fn plan(&self, request: &SearchRequest) -> Result<SearchPath> {
        self.planner.plan(request)
    }

    /// Plan `request`, then drive the agent along the path until the search ends
    pub fn run<R, S, C, G>(
        &self,
        request: &SearchRequest,
        robot: R,
        sensors: Arc<S>,
        clock: C,
        signal: G,
    ) -> Result<SearchOutcome>
    where
        R: Robot,
        S: SensorHub,
        C: Clock,
        G: CaptureSignal,
    {
        let path = self.plan(request)?;
        info!(
            "Planned {} waypoints, heading {:.0} deg, {:?}",
            path.len(),
            path.initial_heading(),
            path.direction()
        );

        let mut executor = SearchExecutor::new(&self.config, robot, sensors, clock, signal);
        executor.load(path, request.flag());
        executor.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_field_defaults() {
        let parsed: SearchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(parsed, SearchConfig::default());
        assert_eq!(parsed.timeout(), Duration::from_secs(120));
        assert_eq!(parsed.capture_beeps, 3);
        assert!(parsed.validate().is_ok());
    }

    #[rstest]
    #[case("clearance: 0.0")]
    #[case("timeout_ms: 0")]
    #[case("stabilize_ms: 0")]
    #[case("capture_distance: -1.0")]
    #[case("color_tolerance: -0.1")]
    #[case("turn_angle_deg: 270.0")]
    fn invalid_values_are_rejected(#[case] yaml: &str) {
        let config: SearchConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));
    }

    #[test]
    fn mission_builds_request_with_inset_bounds() {
        let yaml = "\
zone:
  lower_left: [3.0, 3.0]
  upper_right: [6.0, 6.0]
start: [8.0, 8.0]
flag: blue
";
        let mission: MissionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(mission.arena, Zone::full_grid());
        assert_eq!(mission.flag_position, None);

        let request = mission.request().unwrap();
        assert_eq!(request.bounds(), &NavigableBounds::default());
        assert_eq!(request.flag(), FlagColor::Blue);
        assert_eq!(request.location(), Waypoint::new(8.0, 8.0));
    }

    #[test]
    fn search_config_loads_from_file() {
        let path = std::env::temp_dir().join(format!("flag-search-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "timeout_ms: 5000\ncapture_beeps: 1\n").unwrap();
        let loaded = SearchConfig::from_yaml_file(&path);
        std::fs::write(&path, "stabilize_ms: 0\n").unwrap();
        let rejected = SearchConfig::from_yaml_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.capture_beeps, 1);
        assert_eq!(config.clearance, 0.5);
        assert!(matches!(rejected, Err(SearchError::Config(_))));
        assert!(matches!(
            SearchConfig::from_yaml_file("no/such/search.yaml"),
            Err(SearchError::Io(_))
        ));
    }

    #[rstest]
    #[case("turn_rate: 0.0")]
    #[case("linear_speed: -1.0")]
    #[case("tile_size: 0.0")]
    #[case("step_ms: 0")]
    fn mission_with_broken_sim_is_rejected(#[case] sim: &str) {
        let yaml = format!(
            "zone:\n  lower_left: [3.0, 3.0]\n  upper_right: [6.0, 6.0]\nstart: [8.0, 8.0]\nsim: {{{}}}\n",
            sim
        );
        let err = MissionConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn builtin_mission_is_the_sample_file() {
        let mission = MissionConfig::builtin().unwrap();
        assert_eq!(mission.flag, FlagColor::Blue);
        assert_eq!(mission.flag_position, Some(Waypoint::new(3.5, 4.5)));
        assert_eq!(mission.search, SearchConfig::default());
        assert_eq!(mission.sim, SimConfig::default());
        assert!(mission.request().is_ok());
    }

    #[test]
    fn oversized_zone_fails_to_load() {
        let yaml = "zone:\n  lower_left: [0.0, 3.0]\n  upper_right: [1.0e19, 5.0]\nstart: [8.0, 8.0]\n";
        assert!(matches!(
            MissionConfig::from_yaml_str(yaml),
            Err(SearchError::Yaml(_))
        ));
    }

    #[test]
    fn mission_runner_rejects_bad_config() {
        let config = SearchConfig {
            navigation_poll_ms: 0,
            ..SearchConfig::default()
        };
        assert!(SearchMission::new(config).is_err());
    }
}

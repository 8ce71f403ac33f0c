// src/main.rs
// Demo entry point: plans a flag search and runs it against the simulated arena.

// Imports dependencies and flag search modules.
// - env_logger: Logging for debugging, controlled through RUST_LOG.
// - flag_search: Mission config, planner/executor facade, and the simulator.
use std::error::Error;

use flag_search::{
    interface::LogSignal, sim::SimArena, MissionConfig, SearchMission, SearchOutcome,
};
use log::{info, warn};

/// Loads the mission (path from the first argument, else the built-in sample),
/// plans, and searches.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mission = match std::env::args().nth(1) {
        Some(path) => {
            let mission = MissionConfig::from_yaml_file(&path)?;
            info!("Loaded mission from {}", path);
            mission
        }
        None => {
            info!("No mission file given, running the built-in sample");
            MissionConfig::builtin()?
        }
    };

    let arena = SimArena::new(mission.sim.clone(), mission.start);
    match mission.flag_position {
        Some(position) => arena.place_flag(position, mission.flag),
        None => warn!("No flag block placed; the search cannot succeed"),
    }

    let runner = SearchMission::new(mission.search.clone())?;
    let request = mission.request()?;
    let outcome = runner.run(
        &request,
        arena.robot(),
        arena.sensors(),
        arena.clock(),
        LogSignal::new(),
    )?;

    let world = arena.snapshot();
    match outcome {
        SearchOutcome::Captured { index, waypoint } => info!(
            "Captured from waypoint {} at ({:.2}, {:.2})",
            index, waypoint.x, waypoint.y
        ),
        SearchOutcome::TimedOut { visited } => warn!("Timed out after {} waypoints", visited),
        SearchOutcome::Exhausted => warn!("Walked the whole path without finding the flag"),
    }
    info!(
        "Agent ended at ({:.2}, {:.2}) after {} motions",
        world.position().x,
        world.position().y,
        world.motions().len()
    );

    Ok(())
}

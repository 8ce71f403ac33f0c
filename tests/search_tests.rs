// tests/search_tests.rs
// End-to-end searches against the simulated arena.

use std::sync::Arc;
use std::time::Duration;

use flag_search::core::{distance, FlagColor, SearchState, Waypoint, Zone};
use flag_search::interface::{Clock, LogSignal, SensorChannel};
use flag_search::sim::{Motion, SimArena, SimConfig, SimSensors};
use flag_search::{
    MissionConfig, SearchConfig, SearchExecutor, SearchMission, SearchOutcome, SearchPath,
};
use rstest::{fixture, rstest};

type SimExecutor = SearchExecutor<flag_search::sim::SimRobot, SimSensors, flag_search::interface::ManualClock, LogSignal>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mission(zone: Zone, start: Waypoint, flag_at: Option<Waypoint>) -> MissionConfig {
    MissionConfig {
        arena: Zone::full_grid(),
        zone,
        start,
        flag: FlagColor::Blue,
        flag_position: flag_at,
        search: SearchConfig::default(),
        sim: SimConfig::default(),
    }
}

#[fixture]
fn interior_zone() -> Zone {
    Zone::from_coords(3.0, 3.0, 6.0, 6.0).unwrap()
}

// Plans the mission and loads it into an executor driving the simulator
fn prepare(mission: &MissionConfig) -> (SimArena, SimExecutor, SearchPath) {
    init_logging();
    let arena = SimArena::new(mission.sim.clone(), mission.start);
    if let Some(position) = mission.flag_position {
        arena.place_flag(position, mission.flag);
    }

    let runner = SearchMission::new(mission.search.clone()).unwrap();
    let request = mission.request().unwrap();
    let path = runner.plan(&request).unwrap();

    let mut executor = SearchExecutor::new(
        &mission.search,
        arena.robot(),
        arena.sensors(),
        arena.clock(),
        LogSignal::new(),
    );
    executor.load(path.clone(), mission.flag);
    (arena, executor, path)
}

// Worst-case virtual time of one uninterruptible navigation leg along the walk
fn longest_leg(mission: &MissionConfig, path: &SearchPath) -> Duration {
    let step_tiles = mission.sim.linear_speed * mission.sim.step_ms as f64 / 1000.0;
    let per_step = Duration::from_millis(mission.sim.step_ms + mission.search.navigation_poll_ms);
    std::iter::once(mission.start)
        .chain(path.waypoints().iter().copied())
        .collect::<Vec<_>>()
        .windows(2)
        .map(|leg| {
            let steps = (distance(&leg[0], &leg[1]) / step_tiles).ceil() as u32 + 1;
            per_step * steps
        })
        .max()
        .unwrap_or_default()
}

fn assert_sensors_released(arena: &SimArena) {
    let world = arena.snapshot();
    assert_eq!(world.holders(SensorChannel::Distance), 0);
    assert_eq!(world.holders(SensorChannel::Color), 0);
}

#[rstest]
fn flag_beside_left_edge_is_captured(interior_zone: Zone) {
    let mission = mission(interior_zone, Waypoint::new(8.0, 8.0), Some(Waypoint::new(3.5, 4.5)));
    let (arena, mut executor, path) = prepare(&mission);

    let outcome = executor.run().unwrap();

    assert_eq!(
        outcome,
        SearchOutcome::Captured {
            index: 11,
            waypoint: Waypoint::new(2.5, 4.5)
        }
    );
    assert_eq!(path.waypoints()[11], Waypoint::new(2.5, 4.5));
    assert_eq!(executor.state(), SearchState::Captured);
    assert_eq!(executor.signal().beeps(), 3);

    // Stayed at the block
    let world = arena.snapshot();
    assert!((world.position().x - 3.25).abs() < 1e-6);
    assert!(matches!(world.motions().last(), Some(Motion::Forward(_))));
    assert!(arena.clock().now() < mission.search.timeout());
    assert_sensors_released(&arena);
}

#[rstest]
fn flag_out_of_reach_exhausts_the_path(interior_zone: Zone) {
    let mission = mission(interior_zone, Waypoint::new(1.0, 1.0), Some(Waypoint::new(4.5, 4.5)));
    let (arena, mut executor, path) = prepare(&mission);

    assert_eq!(executor.run().unwrap(), SearchOutcome::Exhausted);
    assert_eq!(executor.state(), SearchState::Exhausted);
    assert_eq!(executor.signal().beeps(), 0);

    let world = arena.snapshot();
    let arrivals = world
        .motions()
        .iter()
        .filter(|m| matches!(m, Motion::Arrived(_)))
        .count();
    assert_eq!(arrivals, path.len());
    assert!(!world
        .motions()
        .iter()
        .any(|m| matches!(m, Motion::Forward(_) | Motion::Backward(_))));
    assert_sensors_released(&arena);
}

#[rstest]
#[case(2_000)]
#[case(10_000)]
fn short_budget_times_out_without_capture(interior_zone: Zone, #[case] timeout_ms: u64) {
    let mut mission = mission(interior_zone, Waypoint::new(8.0, 8.0), Some(Waypoint::new(3.5, 4.5)));
    mission.search.timeout_ms = timeout_ms;
    let (arena, mut executor, path) = prepare(&mission);

    let outcome = executor.run().unwrap();

    match outcome {
        SearchOutcome::TimedOut { visited } => assert!(visited < path.len()),
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(!outcome.is_captured());
    assert_eq!(executor.state(), SearchState::TimedOut);
    // Stops at the first check past the budget; only the leg in flight can overrun it
    let elapsed = arena.clock().now();
    assert!(elapsed > mission.search.timeout());
    assert!(
        elapsed <= mission.search.timeout() + longest_leg(&mission, &path),
        "ran {:?} on a {:?} budget",
        elapsed,
        mission.search.timeout()
    );
    assert_eq!(executor.signal().beeps(), 0);
    assert_sensors_released(&arena);
}

#[test]
fn wall_zone_capture_follows_reachable_arc() {
    let zone = Zone::from_coords(0.0, 3.0, 2.0, 6.0).unwrap();
    let mission = mission(zone, Waypoint::new(1.0, 8.0), Some(Waypoint::new(1.5, 3.5)));
    let (arena, mut executor, path) = prepare(&mission);

    assert_eq!(path.len(), 9);
    let outcome = executor.run().unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Captured {
            index: 5,
            waypoint: Waypoint::new(2.5, 3.5)
        }
    );

    // Never planned or driven outside the arena
    let world = arena.snapshot();
    for motion in world.motions() {
        if let Motion::Arrived(at) = motion {
            assert!(at.x >= 0.5 && at.y >= 0.5);
        }
    }
    assert_sensors_released(&arena);
}

#[test]
fn sample_mission_file_captures_the_flag() {
    init_logging();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/mission.yaml");
    let mission = MissionConfig::from_yaml_file(path).unwrap();
    assert_eq!(mission.search, SearchConfig::default());

    let arena = SimArena::new(mission.sim.clone(), mission.start);
    if let Some(position) = mission.flag_position {
        arena.place_flag(position, mission.flag);
    }
    let runner = SearchMission::new(mission.search.clone()).unwrap();
    let outcome = runner
        .run(
            &mission.request().unwrap(),
            arena.robot(),
            arena.sensors(),
            arena.clock(),
            LogSignal::new(),
        )
        .unwrap();

    assert!(outcome.is_captured());
    assert_sensors_released(&arena);
}

#[test]
fn sensors_shared_with_another_holder_stay_on() {
    let mission = mission(
        Zone::from_coords(3.0, 3.0, 6.0, 6.0).unwrap(),
        Waypoint::new(8.0, 8.0),
        None,
    );
    init_logging();
    let arena = SimArena::new(mission.sim.clone(), mission.start);
    let sensors: Arc<SimSensors> = arena.sensors();
    sensors_hold(&sensors);

    let runner = SearchMission::new(mission.search.clone()).unwrap();
    let outcome = runner
        .run(
            &mission.request().unwrap(),
            arena.robot(),
            Arc::clone(&sensors),
            arena.clock(),
            LogSignal::new(),
        )
        .unwrap();

    assert_eq!(outcome, SearchOutcome::Exhausted);
    let world = arena.snapshot();
    assert_eq!(world.holders(SensorChannel::Distance), 1);
    assert_eq!(world.holders(SensorChannel::Color), 1);
}

fn sensors_hold(sensors: &SimSensors) {
    use flag_search::interface::SensorHub;
    sensors.acquire(SensorChannel::Distance);
    sensors.acquire(SensorChannel::Color);
}

#[test]
fn missing_flag_color_is_rejected_before_moving() {
    let mut mission = mission(
        Zone::from_coords(3.0, 3.0, 6.0, 6.0).unwrap(),
        Waypoint::new(8.0, 8.0),
        None,
    );
    mission.flag = FlagColor::None;
    let (arena, mut executor, _) = prepare(&mission);

    assert!(executor.run().is_err());
    assert!(arena.snapshot().motions().is_empty());
    assert_eq!(arena.clock().now(), Duration::ZERO);
}

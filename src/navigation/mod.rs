//! Perimeter search planning and execution
//!
//! This module turns a search zone into an ordered walk around its perimeter and
//! drives the agent along it, looking inward for the flag from every edge waypoint.
//!
//! - `geometry`: perimeter ring, corner bookkeeping, side reachability
//! - `transform`: circular rotate/reverse/truncate of the ring
//! - `planner`: full-ring or reachable-arc path selection
//! - `controller`: the executor state machine

/// Search executor
pub mod controller;
/// Perimeter ring construction
pub mod geometry;
/// Path selection over the ring
pub mod planner;
/// Circular index arithmetic and ring transforms
pub mod transform;

pub use controller::{shortest_rotation, SearchExecutor, SearchOutcome};
pub use geometry::{Corner, CornerIndices, PerimeterRing, SideReachability};
pub use planner::{closest_waypoint, Direction, SearchPath, SearchPlanner};
pub use transform::{transform, CircularIndex, Shift, Transformed};

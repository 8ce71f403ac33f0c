// core/mod.rs

// Declares and exposes the value types every search component shares: zones and
// waypoints, flag colors, the per-attempt request, and the execution state machine.

/// Flag colors and their expected readings
pub mod flag;
/// Validated per-attempt search request
pub mod request;
/// Execution states and the transition table
pub mod state;
/// Waypoints, zones and navigable bounds
pub mod zone;

// Re-export key types for a unified API
pub use flag::FlagColor;
pub use request::{SearchRequest, SearchRequestBuilder};
pub use state::{SearchState, SearchStateMachine};
pub use zone::{distance, NavigableBounds, Waypoint, Zone, DEFAULT_GRID_TILES, MAX_ZONE_TILES};

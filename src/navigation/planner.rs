// navigation/planner.rs
// Plans the perimeter search path around the search zone.

// Builds the waypoint ring, picks where to join it based on the agent's current
// location, and cuts it into a linear path with a starting heading and direction.
use log::{debug, error, info};

use crate::core::{distance, SearchRequest, Waypoint};
use crate::error::{Result, SearchError};
use crate::SearchConfig;

use super::geometry::{Corner, CornerIndices, PerimeterRing};
use super::transform::{transform, CircularIndex, Shift};

/// Direction of travel around the zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Not planned yet
    #[default]
    Unknown,
    /// Forward through the ring
    Clockwise,
    /// Backward through the ring
    CounterClockwise,
}

impl Direction {
    /// Signed turn (degrees) that faces the zone from the current travel heading:
    /// right turns when clockwise, left turns when counter-clockwise.
    pub fn turn_angle(&self, magnitude: f64) -> Option<f64> {
        match self {
            Direction::Clockwise => Some(-magnitude),
            Direction::CounterClockwise => Some(magnitude),
            Direction::Unknown => None,
        }
    }
}

impl From<Shift> for Direction {
    fn from(shift: Shift) -> Self {
        match shift {
            Shift::Forward => Direction::Clockwise,
            Shift::Reverse => Direction::CounterClockwise,
        }
    }
}

/// Ordered waypoints to visit, where the zone corners sit in that order, the heading
/// to face at the first waypoint, and the travel direction.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchPath {
    waypoints: Vec<Waypoint>,
    corners: CornerIndices,
    initial_heading: f64,
    direction: Direction,
}

impl SearchPath {
    /// Assembles a path directly, e.g. to inject one for testing.
    pub fn new(
        waypoints: Vec<Waypoint>,
        corners: CornerIndices,
        initial_heading: f64,
        direction: Direction,
    ) -> Self {
        SearchPath {
            waypoints,
            corners,
            initial_heading,
            direction,
        }
    }

    /// Waypoints in visiting order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether there is nothing to visit.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Path indices of the corners still on the path.
    pub fn corners(&self) -> &CornerIndices {
        &self.corners
    }

    /// Heading in degrees to face at the first waypoint.
    pub fn initial_heading(&self) -> f64 {
        self.initial_heading
    }

    /// Travel direction around the zone.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Replaces the corner indices.
    pub fn set_corners(&mut self, corners: CornerIndices) {
        self.corners = corners;
    }

    /// Overrides the travel direction.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Overrides the starting heading.
    pub fn set_initial_heading(&mut self, heading: f64) {
        self.initial_heading = heading;
    }
}

/// Index of the candidate nearest to `from`. The first candidate wins exact ties.
pub fn closest_waypoint(from: &Waypoint, candidates: &[Waypoint]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        let d = distance(from, candidate);
        match best {
            Some((_, min)) if d >= min => {}
            _ => best = Some((i, d)),
        }
    }

    best.map(|(i, _)| i)
}

/// Plans search paths for one configuration.
pub struct SearchPlanner {
    clearance: f64,
}

impl SearchPlanner {
    /// Creates a planner using the configured clearance around the zone.
    pub fn new(config: &SearchConfig) -> Self {
        SearchPlanner {
            clearance: config.clearance,
        }
    }

    /// Computes the search path for `request`.
    pub fn plan(&self, request: &SearchRequest) -> Result<SearchPath> {
        let ring = PerimeterRing::around(request.zone(), request.bounds(), self.clearance);

        let path = if ring.reachability().all() {
            self.plan_full_ring(&ring, request.location())?
        } else {
            self.plan_reachable_arc(&ring, request.location())?
        };

        info!(
            "Planned search path: {} of {} waypoints, {:?}, initial heading {:.0} deg",
            path.len(),
            ring.len(),
            path.direction(),
            path.initial_heading()
        );

        // The ring and its validity flags are dropped here
        Ok(path)
    }

    // Zone is clear of every wall: join at the nearest corner and go all the way round
    fn plan_full_ring(&self, ring: &PerimeterRing, location: Waypoint) -> Result<SearchPath> {
        let corners = ring.corners();
        let mut candidates = Vec::with_capacity(Corner::ALL.len());
        for corner in Corner::ALL {
            let index = corners.get(corner).ok_or_else(|| {
                SearchError::Internal(format!("ring is missing its {:?} corner", corner))
            })?;
            candidates.push(ring.waypoints()[index]);
        }

        let closest = closest_waypoint(&location, &candidates);
        let corner = match closest {
            Some(0) => Corner::LowerLeft,
            Some(1) => Corner::UpperLeft,
            Some(2) => Corner::UpperRight,
            Some(3) => Corner::LowerRight,
            other => {
                error!("Closest corner selection returned {:?}", other);
                return Err(SearchError::Internal(format!("unknown closest corner {:?}", other)));
            }
        };

        let view = CircularIndex::new(ring.len())?;
        let corner_index = corners
            .get(corner)
            .ok_or_else(|| SearchError::Internal(format!("{:?} corner vanished", corner)))?;
        // One step before the corner so that the corner is the second waypoint
        let anchor = view.prev(corner_index);
        debug!("Joining the ring at index {} ahead of the {:?} corner", anchor, corner);

        let cut = transform(ring.waypoints(), corners, anchor, anchor, Shift::Forward)?;

        Ok(SearchPath::new(
            cut.waypoints,
            cut.corners,
            corner.initial_heading(),
            Direction::Clockwise,
        ))
    }

    // Zone touches a wall: walk the single reachable arc starting from its nearer end
    fn plan_reachable_arc(&self, ring: &PerimeterRing, location: Waypoint) -> Result<SearchPath> {
        let view = CircularIndex::new(ring.len())?;
        let (first, second) = find_arc_edges(ring.validity(), &view)?;

        let candidates = [ring.waypoints()[first], ring.waypoints()[second]];
        let closest = closest_waypoint(&location, &candidates);

        // Whether the arc runs clockwise from `first` to `second`
        let gap = view.span(first, second, Shift::Forward) % view.len();
        let midpoint = view.offset(first, gap / 2, Shift::Forward);
        let clockwise_from_first = ring.is_valid(midpoint);

        let (start, other, shift) = match closest {
            Some(0) if clockwise_from_first => (first, second, Shift::Forward),
            Some(0) => (first, second, Shift::Reverse),
            Some(1) if clockwise_from_first => (second, first, Shift::Reverse),
            Some(1) => (second, first, Shift::Forward),
            other => {
                error!("Closest edge selection returned {:?}", other);
                return Err(SearchError::Internal(format!("unknown closest edge {:?}", other)));
            }
        };

        // Stop right after the far end of the arc
        let limit = view.step(other, shift);
        debug!(
            "Reachable arc edges {} and {}, starting at {} towards {} ({:?})",
            first, second, start, other, shift
        );

        let cut = transform(ring.waypoints(), ring.corners(), start, limit, shift)?;
        let heading = ring.reachability().blocked_heading().ok_or_else(|| {
            SearchError::Internal("arc planning requested with every side reachable".to_string())
        })?;

        Ok(SearchPath::new(cut.waypoints, cut.corners, heading, shift.into()))
    }
}

// Finds the two ends of the reachable arc: for each validity flip, the index on the
// valid side of it. Exactly two flips are expected.
fn find_arc_edges(valid: &[bool], view: &CircularIndex) -> Result<(usize, usize)> {
    let mut edges = Vec::with_capacity(2);

    for i in 0..view.len() {
        let j = view.next(i);
        if valid[i] != valid[j] {
            edges.push(if valid[j] { j } else { i });
        }
    }

    match edges.as_slice() {
        [first, second] => Ok((*first, *second)),
        [] if valid.iter().any(|v| *v) => Err(SearchError::Internal(
            "every waypoint is reachable although a side is blocked".to_string(),
        )),
        [] => Err(SearchError::Unreachable),
        many => Err(SearchError::DisjointArcs(many.len() / 2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NavigableBounds, Zone};

    fn plan(zone: Zone, location: Waypoint) -> Result<SearchPath> {
        let request = SearchRequest::builder()
            .bounds(NavigableBounds::default())
            .zone(zone)
            .location(location)
            .build()?;
        SearchPlanner::new(&SearchConfig::default()).plan(&request)
    }

    #[test]
    fn closest_waypoint_prefers_first_on_ties() {
        let candidates = [
            Waypoint::new(0.0, 1.0),
            Waypoint::new(1.0, 0.0),
            Waypoint::new(5.0, 5.0),
        ];
        assert_eq!(closest_waypoint(&Waypoint::origin(), &candidates), Some(0));
        assert_eq!(closest_waypoint(&Waypoint::new(4.0, 4.0), &candidates), Some(2));
        assert_eq!(closest_waypoint(&Waypoint::origin(), &[]), None);
    }

    #[test]
    fn interior_zone_joins_before_nearest_corner() {
        let zone = Zone::from_coords(3.0, 3.0, 5.0, 5.0).unwrap();
        // Nearest to the upper-right corner (5.5, 5.5)
        let path = plan(zone, Waypoint::new(8.0, 8.0)).unwrap();

        assert_eq!(path.len(), 12);
        assert_eq!(path.direction(), Direction::Clockwise);
        assert_eq!(path.initial_heading(), 270.0);
        assert_eq!(path.waypoints()[0], Waypoint::new(4.5, 5.5));
        assert_eq!(path.waypoints()[1], Waypoint::new(5.5, 5.5));
        assert_eq!(path.corners().get(Corner::UpperRight), Some(1));
        assert_eq!(path.corners().get(Corner::LowerRight), Some(4));
        assert_eq!(path.corners().get(Corner::LowerLeft), Some(7));
        assert_eq!(path.corners().get(Corner::UpperLeft), Some(10));
    }

    #[test]
    fn lower_left_anchor_wraps_to_end_of_ring() {
        let zone = Zone::from_coords(3.0, 3.0, 5.0, 5.0).unwrap();
        let path = plan(zone, Waypoint::new(1.0, 1.0)).unwrap();

        assert_eq!(path.initial_heading(), 90.0);
        assert_eq!(path.waypoints()[0], Waypoint::new(3.5, 2.5));
        assert_eq!(path.corners().get(Corner::LowerLeft), Some(1));
    }

    #[test]
    fn left_wall_arc_runs_clockwise_from_top() {
        // Zone pressed against the left wall; reachable arc is UR side round to the bottom
        let zone = Zone::from_coords(0.0, 3.0, 2.0, 6.0).unwrap();
        let path = plan(zone, Waypoint::new(1.0, 8.0)).unwrap();

        assert_eq!(path.direction(), Direction::Clockwise);
        assert_eq!(path.initial_heading(), 0.0);
        assert_eq!(path.len(), 9);
        assert_eq!(path.waypoints()[0], Waypoint::new(0.5, 6.5));
        assert_eq!(*path.waypoints().last().unwrap(), Waypoint::new(0.5, 2.5));
        assert_eq!(path.corners().get(Corner::LowerLeft), None);
        assert_eq!(path.corners().get(Corner::UpperLeft), None);
        assert_eq!(path.corners().get(Corner::UpperRight), Some(2));
        assert_eq!(path.corners().get(Corner::LowerRight), Some(6));
    }

    #[test]
    fn left_wall_arc_runs_counter_clockwise_from_bottom() {
        let zone = Zone::from_coords(0.0, 3.0, 2.0, 6.0).unwrap();
        let path = plan(zone, Waypoint::new(1.0, 1.0)).unwrap();

        assert_eq!(path.direction(), Direction::CounterClockwise);
        assert_eq!(path.len(), 9);
        assert_eq!(path.waypoints()[0], Waypoint::new(0.5, 2.5));
        assert_eq!(*path.waypoints().last().unwrap(), Waypoint::new(0.5, 6.5));
        assert_eq!(path.corners().get(Corner::LowerRight), Some(2));
        assert_eq!(path.corners().get(Corner::UpperRight), Some(6));
    }

    #[test]
    fn zone_filling_the_arena_is_unreachable() {
        let zone = Zone::from_coords(0.0, 0.0, 12.0, 12.0).unwrap();
        let err = plan(zone, Waypoint::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SearchError::Unreachable));
    }

    #[test]
    fn zone_spanning_the_width_splits_into_two_arcs() {
        let zone = Zone::from_coords(0.0, 4.0, 12.0, 6.0).unwrap();
        let err = plan(zone, Waypoint::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SearchError::DisjointArcs(2)));
    }

    #[test]
    fn edges_are_found_across_the_wrap() {
        let valid = [true, true, false, false, false, true];
        let view = CircularIndex::new(valid.len()).unwrap();
        assert_eq!(find_arc_edges(&valid, &view).unwrap(), (1, 5));
    }

    #[test]
    fn direction_turn_angles() {
        assert_eq!(Direction::Clockwise.turn_angle(90.0), Some(-90.0));
        assert_eq!(Direction::CounterClockwise.turn_angle(90.0), Some(90.0));
        assert_eq!(Direction::Unknown.turn_angle(90.0), None);
    }
}

// navigation/geometry.rs

// Generates the ring of candidate waypoints that surrounds a search zone at a fixed
// clearance, clockwise from the lower-left corner, and marks which of them the agent
// can actually reach given the navigable bounds.

use log::debug;

use crate::core::{NavigableBounds, Waypoint, Zone};

/// Zone corners, in enumeration order. Ties between corners resolve in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Minimum x and y
    LowerLeft,
    /// Minimum x, maximum y
    UpperLeft,
    /// Maximum x and y
    UpperRight,
    /// Maximum x, minimum y
    LowerRight,
}

impl Corner {
    /// Every corner, in tie-break order.
    pub const ALL: [Corner; 4] = [
        Corner::LowerLeft,
        Corner::UpperLeft,
        Corner::UpperRight,
        Corner::LowerRight,
    ];

    fn slot(self) -> usize {
        match self {
            Corner::LowerLeft => 0,
            Corner::UpperLeft => 1,
            Corner::UpperRight => 2,
            Corner::LowerRight => 3,
        }
    }

    /// Heading (degrees) to face before setting off clockwise from this corner.
    pub fn initial_heading(self) -> f64 {
        match self {
            Corner::LowerLeft => 90.0,
            Corner::UpperLeft => 0.0,
            Corner::UpperRight => 270.0,
            Corner::LowerRight => 180.0,
        }
    }
}

/// Position of each zone corner within a waypoint sequence; `None` once a corner is
/// no longer part of the sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CornerIndices([Option<usize>; 4]);

impl CornerIndices {
    /// Indices given in lower-left, upper-left, upper-right, lower-right order.
    pub fn new(ll: Option<usize>, ul: Option<usize>, ur: Option<usize>, lr: Option<usize>) -> Self {
        CornerIndices([ll, ul, ur, lr])
    }

    /// Index of `corner`, if it is still in the sequence.
    pub fn get(&self, corner: Corner) -> Option<usize> {
        self.0[corner.slot()]
    }

    /// Moves or removes `corner`.
    pub fn set(&mut self, corner: Corner, index: Option<usize>) {
        self.0[corner.slot()] = index;
    }

    /// Corner sitting at `index`, if any.
    pub fn corner_at(&self, index: usize) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .find(|corner| self.get(*corner) == Some(index))
    }

    /// Whether any corner sits at `index`.
    pub fn is_corner(&self, index: usize) -> bool {
        self.corner_at(index).is_some()
    }

    /// Corners still present, with their indices.
    pub fn present(&self) -> impl Iterator<Item = (Corner, usize)> + '_ {
        Corner::ALL
            .into_iter()
            .filter_map(move |corner| self.get(corner).map(|i| (corner, i)))
    }

    /// Raw indices in lower-left, upper-left, upper-right, lower-right order.
    pub fn as_array(&self) -> [Option<usize>; 4] {
        self.0
    }
}

/// Which sides of the zone the agent can drive along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SideReachability {
    /// Western side
    pub left: bool,
    /// Northern side
    pub top: bool,
    /// Eastern side
    pub right: bool,
    /// Southern side
    pub bottom: bool,
}

impl SideReachability {
    /// A side is reachable when the zone's border on that side lies inside the bounds.
    pub fn evaluate(zone: &Zone, bounds: &NavigableBounds) -> Self {
        let ll = zone.lower_left();
        let ur = zone.upper_right();
        let lower = bounds.lower_left();
        let upper = bounds.upper_right();

        SideReachability {
            left: ll.x >= lower.x,
            top: ur.y <= upper.y,
            right: ur.x <= upper.x,
            bottom: ll.y >= lower.y,
        }
    }

    /// No side touches a wall.
    pub fn all(&self) -> bool {
        self.left && self.top && self.right && self.bottom
    }

    /// Heading to start with when the zone rests against a wall. Sides are evaluated
    /// left, top, right, bottom and the last blocked one wins.
    pub fn blocked_heading(&self) -> Option<f64> {
        let mut heading = None;
        if !self.left {
            heading = Some(0.0);
        }
        if !self.top {
            heading = Some(270.0);
        }
        if !self.right {
            heading = Some(180.0);
        }
        if !self.bottom {
            heading = Some(90.0);
        }
        heading
    }
}

/// Every candidate waypoint around a zone, clockwise from the lower-left corner.
#[derive(Clone, Debug)]
pub struct PerimeterRing {
    waypoints: Vec<Waypoint>,
    valid: Vec<bool>,
    corners: CornerIndices,
    reach: SideReachability,
}

impl PerimeterRing {
    /// Builds the ring `clearance` tiles outside `zone`.
    pub fn around(zone: &Zone, bounds: &NavigableBounds, clearance: f64) -> Self {
        let length = zone.tile_length();
        let height = zone.tile_height();
        let count = 2 * length + 2 * height + 4;
        let ll = zone.lower_left();
        let ur = zone.upper_right();
        let reach = SideReachability::evaluate(zone, bounds);

        let mut waypoints = Vec::with_capacity(count);
        let mut valid = Vec::with_capacity(count);
        let mut corners = CornerIndices::default();

        let left_x = ll.x - clearance;
        let right_x = ur.x + clearance;
        let top_y = ur.y + clearance;
        let bottom_y = ll.y - clearance;

        // Lower-left corner, then up the left side
        corners.set(Corner::LowerLeft, Some(waypoints.len()));
        waypoints.push(Waypoint::new(left_x, bottom_y));
        valid.push(reach.bottom && reach.left);
        for i in 0..height {
            waypoints.push(Waypoint::new(left_x, ll.y + i as f64 + 0.5));
            valid.push(reach.left);
        }

        // Upper-left corner, then along the top
        corners.set(Corner::UpperLeft, Some(waypoints.len()));
        waypoints.push(Waypoint::new(left_x, top_y));
        valid.push(reach.left && reach.top);
        for i in 0..length {
            waypoints.push(Waypoint::new(ll.x + i as f64 + 0.5, top_y));
            valid.push(reach.top);
        }

        // Upper-right corner, then down the right side
        corners.set(Corner::UpperRight, Some(waypoints.len()));
        waypoints.push(Waypoint::new(right_x, top_y));
        valid.push(reach.top && reach.right);
        for i in 0..height {
            waypoints.push(Waypoint::new(right_x, ur.y - i as f64 - 0.5));
            valid.push(reach.right);
        }

        // Lower-right corner, then back along the bottom
        corners.set(Corner::LowerRight, Some(waypoints.len()));
        waypoints.push(Waypoint::new(right_x, bottom_y));
        valid.push(reach.right && reach.bottom);
        for i in 0..length {
            waypoints.push(Waypoint::new(ur.x - i as f64 - 0.5, bottom_y));
            valid.push(reach.bottom);
        }

        debug!(
            "Perimeter ring: {} waypoints ({}x{} tiles), reach {:?}, {} valid",
            waypoints.len(),
            length,
            height,
            reach,
            valid.iter().filter(|v| **v).count()
        );

        PerimeterRing {
            waypoints,
            valid,
            corners,
            reach,
        }
    }

    /// Number of ring waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false for a ring built from a valid zone.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoints in clockwise order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Per-waypoint reachability flags.
    pub fn validity(&self) -> &[bool] {
        &self.valid
    }

    /// Out-of-range indices count as unreachable.
    pub fn is_valid(&self, index: usize) -> bool {
        self.valid.get(index).copied().unwrap_or(false)
    }

    /// Ring indices of the zone corners.
    pub fn corners(&self) -> &CornerIndices {
        &self.corners
    }

    /// Reachability of each zone side.
    pub fn reachability(&self) -> SideReachability {
        self.reach
    }
}

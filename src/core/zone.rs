// core/zone.rs

// Planar primitives for the perimeter search: waypoints in tile units, validated
// axis-aligned zones, and the navigable bounds the agent may plan inside.

// Dependencies
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// A planar navigation target, in tile units.
pub type Waypoint = Point2<f64>;

/// Side length of the default playing field, in tiles.
pub const DEFAULT_GRID_TILES: f64 = 12.0;

/// Largest whole-tile span a zone may have on either axis.
pub const MAX_ZONE_TILES: f64 = u16::MAX as f64;

/// Euclidean distance between two waypoints.
pub fn distance(a: &Waypoint, b: &Waypoint) -> f64 {
    nalgebra::distance(a, b)
}

/// Axis-aligned rectangle with `upper_right` strictly above and right of `lower_left`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ZoneCorners", into = "ZoneCorners")]
pub struct Zone {
    lower_left: Waypoint,
    upper_right: Waypoint,
}

// Wire form of a zone, validated on the way in
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct ZoneCorners {
    lower_left: Waypoint,
    upper_right: Waypoint,
}

impl Zone {
    /// Creates a zone, rejecting inverted or degenerate corners.
    pub fn new(lower_left: Waypoint, upper_right: Waypoint) -> Result<Self> {
        let finite = [lower_left.x, lower_left.y, upper_right.x, upper_right.y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(SearchError::MalformedZone(format!(
                "non-finite corner in {:?} / {:?}",
                lower_left, upper_right
            )));
        }
        if upper_right.x <= lower_left.x || upper_right.y <= lower_left.y {
            return Err(SearchError::MalformedZone(format!(
                "upper-right ({}, {}) must lie above and right of lower-left ({}, {})",
                upper_right.x, upper_right.y, lower_left.x, lower_left.y
            )));
        }
        let span = (upper_right.x.trunc() - lower_left.x.trunc())
            .max(upper_right.y.trunc() - lower_left.y.trunc());
        if span > MAX_ZONE_TILES {
            return Err(SearchError::MalformedZone(format!(
                "zone spans {} tiles, more than the {} allowed",
                span, MAX_ZONE_TILES
            )));
        }

        Ok(Zone {
            lower_left,
            upper_right,
        })
    }

    /// The whole playing grid, from the origin to `DEFAULT_GRID_TILES` on each axis.
    pub fn full_grid() -> Self {
        Zone {
            lower_left: Waypoint::origin(),
            upper_right: Waypoint::new(DEFAULT_GRID_TILES, DEFAULT_GRID_TILES),
        }
    }

    /// Convenience constructor from raw coordinates.
    pub fn from_coords(llx: f64, lly: f64, urx: f64, ury: f64) -> Result<Self> {
        Zone::new(Waypoint::new(llx, lly), Waypoint::new(urx, ury))
    }

    /// Lower-left corner.
    pub fn lower_left(&self) -> Waypoint {
        self.lower_left
    }

    /// Upper-right corner.
    pub fn upper_right(&self) -> Waypoint {
        self.upper_right
    }

    /// Number of whole tiles spanned along x.
    pub fn tile_length(&self) -> usize {
        (self.upper_right.x.trunc() - self.lower_left.x.trunc()).abs() as usize
    }

    /// Number of whole tiles spanned along y.
    pub fn tile_height(&self) -> usize {
        (self.upper_right.y.trunc() - self.lower_left.y.trunc()).abs() as usize
    }
}

impl TryFrom<ZoneCorners> for Zone {
    type Error = SearchError;

    fn try_from(corners: ZoneCorners) -> Result<Self> {
        Zone::new(corners.lower_left, corners.upper_right)
    }
}

impl From<Zone> for ZoneCorners {
    fn from(zone: Zone) -> Self {
        ZoneCorners {
            lower_left: zone.lower_left,
            upper_right: zone.upper_right,
        }
    }
}

/// Region the agent may occupy while planning: an arena or enemy zone shrunk by a
/// clearance on every side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigableBounds(Zone);

impl NavigableBounds {
    /// Wraps already-inset limits.
    pub fn new(limits: Zone) -> Self {
        NavigableBounds(limits)
    }

    /// Shrinks `region` by `clearance` on every side.
    pub fn inset(region: &Zone, clearance: f64) -> Result<Self> {
        let ll = region.lower_left();
        let ur = region.upper_right();
        let limits = Zone::new(
            Waypoint::new(ll.x + clearance, ll.y + clearance),
            Waypoint::new(ur.x - clearance, ur.y - clearance),
        )
        .map_err(|e| {
            SearchError::Config(format!(
                "region {:?} too small for a {} tile clearance: {}",
                region, clearance, e
            ))
        })?;

        Ok(NavigableBounds(limits))
    }

    /// Lowest corner the agent may reach.
    pub fn lower_left(&self) -> Waypoint {
        self.0.lower_left()
    }

    /// Highest corner the agent may reach.
    pub fn upper_right(&self) -> Waypoint {
        self.0.upper_right()
    }
}

impl Default for NavigableBounds {
    /// The full 12x12 grid, kept half a tile off the walls.
    fn default() -> Self {
        NavigableBounds(Zone {
            lower_left: Waypoint::new(0.5, 0.5),
            upper_right: Waypoint::new(DEFAULT_GRID_TILES - 0.5, DEFAULT_GRID_TILES - 0.5),
        })
    }
}

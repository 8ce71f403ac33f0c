// core/request.rs

// Inputs for one search attempt, gathered once by the caller and then handed by
// reference to the planner and executor. Nothing here changes after `build()`.

use log::debug;

use super::flag::FlagColor;
use super::zone::{NavigableBounds, Waypoint, Zone};
use crate::error::{Result, SearchError};

/// Immutable per-attempt inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchRequest {
    bounds: NavigableBounds,
    zone: Zone,
    location: Waypoint,
    flag: FlagColor,
}

impl SearchRequest {
    /// Starts an empty builder.
    pub fn builder() -> SearchRequestBuilder {
        SearchRequestBuilder::default()
    }

    /// Inset limits the planner must stay within.
    pub fn bounds(&self) -> &NavigableBounds {
        &self.bounds
    }

    /// Zone to walk around.
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Where the agent stands when planning starts.
    pub fn location(&self) -> Waypoint {
        self.location
    }

    /// Color being searched for.
    pub fn flag(&self) -> FlagColor {
        self.flag
    }
}

/// Collects the inputs; any of bounds, zone or location left unset fails `build()`.
#[derive(Clone, Debug, Default)]
pub struct SearchRequestBuilder {
    bounds: Option<NavigableBounds>,
    zone: Option<Zone>,
    location: Option<Waypoint>,
    flag: FlagColor,
}

impl SearchRequestBuilder {
    /// Sets the navigable bounds.
    pub fn bounds(mut self, bounds: NavigableBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Sets the search zone.
    pub fn zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Sets the agent's current location.
    pub fn location(mut self, location: Waypoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Target color. Optional at planning time; the executor refuses `FlagColor::None`.
    pub fn flag(mut self, flag: FlagColor) -> Self {
        self.flag = flag;
        self
    }

    /// Fails with `MissingInput` for an unset field, or `Config` for a non-finite location.
    pub fn build(self) -> Result<SearchRequest> {
        let bounds = self.bounds.ok_or(SearchError::MissingInput("navigable bounds"))?;
        let zone = self.zone.ok_or(SearchError::MissingInput("search zone"))?;
        let location = self.location.ok_or(SearchError::MissingInput("current location"))?;
        if !location.x.is_finite() || !location.y.is_finite() {
            return Err(SearchError::Config(format!(
                "current location {:?} is not finite",
                location
            )));
        }

        debug!(
            "Search request: zone {:?}, bounds {:?}, location ({:.2}, {:.2}), flag {:?}",
            zone, bounds, location.x, location.y, self.flag
        );

        Ok(SearchRequest {
            bounds,
            zone,
            location,
            flag: self.flag,
        })
    }
}

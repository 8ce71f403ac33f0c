// navigation/transform.rs

// Re-slices a circular waypoint ring into a linear path: start at an anchor, step
// clockwise or counter-clockwise, stop before an exclusive limit, and carry the
// corner markers over to their new positions.

use crate::core::Waypoint;
use crate::error::{Result, SearchError};

use super::geometry::CornerIndices;

/// Stepping direction around the ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shift {
    /// +1, clockwise
    Forward,
    /// -1, counter-clockwise
    Reverse,
}

impl Shift {
    /// Index delta of one step.
    pub fn sign(self) -> isize {
        match self {
            Shift::Forward => 1,
            Shift::Reverse => -1,
        }
    }
}

/// Bounds-checked index arithmetic over a ring of fixed length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircularIndex {
    len: usize,
}

impl CircularIndex {
    /// Fails on an empty ring.
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(SearchError::Internal("empty waypoint ring".to_string()));
        }
        Ok(CircularIndex { len })
    }

    /// Ring length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maps any signed offset onto `0..len`.
    pub fn wrap(&self, index: isize) -> usize {
        index.rem_euclid(self.len as isize) as usize
    }

    /// One step from `index` in the `shift` direction.
    pub fn step(&self, index: usize, shift: Shift) -> usize {
        self.wrap(index as isize + shift.sign())
    }

    /// Clockwise neighbour.
    pub fn next(&self, index: usize) -> usize {
        self.step(index, Shift::Forward)
    }

    /// Counter-clockwise neighbour.
    pub fn prev(&self, index: usize) -> usize {
        self.step(index, Shift::Reverse)
    }

    /// Index `offset` steps away from `start`.
    pub fn offset(&self, start: usize, offset: usize, shift: Shift) -> usize {
        self.wrap(start as isize + shift.sign() * offset as isize)
    }

    /// Number of indices visited stepping from `start` up to, not including, `limit`.
    /// `start == limit` covers the whole ring.
    pub fn span(&self, start: usize, limit: usize, shift: Shift) -> usize {
        let raw = match shift {
            Shift::Forward => limit as isize - start as isize,
            Shift::Reverse => start as isize - limit as isize,
        };
        match self.wrap(raw) {
            0 => self.len,
            size => size,
        }
    }

    /// Fails on indices outside the ring.
    pub fn check(&self, index: usize) -> Result<usize> {
        if index < self.len {
            Ok(index)
        } else {
            Err(SearchError::Internal(format!(
                "ring index {} out of range for {} waypoints",
                index, self.len
            )))
        }
    }
}

/// Linear path cut out of a ring, with corners remapped.
#[derive(Clone, Debug, PartialEq)]
pub struct Transformed {
    /// Waypoints starting at the cut.
    pub waypoints: Vec<Waypoint>,
    /// Corner indices into `waypoints`.
    pub corners: CornerIndices,
}

/// Copies `ring[start], ring[start+shift], ...` up to `limit` (exclusive).
///
/// Corners inside the kept span get their new linear index; the others become `None`.
pub fn transform(
    ring: &[Waypoint],
    corners: &CornerIndices,
    start: usize,
    limit: usize,
    shift: Shift,
) -> Result<Transformed> {
    let view = CircularIndex::new(ring.len())?;
    let start = view.check(start)?;
    let limit = view.check(limit)?;
    let size = view.span(start, limit, shift);

    let mut waypoints = Vec::with_capacity(size);
    let mut remapped = CornerIndices::default();

    for i in 0..size {
        let index = view.offset(start, i, shift);
        waypoints.push(ring[index]);

        if let Some(corner) = corners.corner_at(index) {
            remapped.set(corner, Some(i));
        }
    }

    Ok(Transformed {
        waypoints,
        corners: remapped,
    })
}

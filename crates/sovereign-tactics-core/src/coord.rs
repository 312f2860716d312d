//! Square grid coordinates for the game map.
//!
//! Movement is 4-directional, so distance is the Manhattan metric and the
//! neighborhood of a tile is its orthogonal neighbors in N, E, S, W order.

use serde::{Deserialize, Serialize};

/// A tile position on the grid. `x` grows east, `y` grows south.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct GridCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl PartialOrd for GridCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// Orthogonal offsets in the order every search visits them: N, E, S, W.
pub const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// All eight surrounding offsets, row by row.
pub const SURROUNDING: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl GridCoord {
    /// Create a new grid coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by an offset.
    #[inline]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbors in N, E, S, W order.
    ///
    /// No bounds checking; use [`crate::map::Map::neighbors`] for that.
    pub fn neighbors(&self) -> [GridCoord; 4] {
        ORTHOGONAL.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// Manhattan distance to another tile.
    pub fn distance(&self, other: &GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Check if another tile is orthogonally adjacent.
    pub fn is_adjacent(&self, other: &GridCoord) -> bool {
        self.distance(other) == 1
    }

    /// All coordinates within a Manhattan radius (including self), unbounded.
    pub fn within_radius(&self, radius: u32) -> Vec<GridCoord> {
        let r = radius as i32;
        let mut result = Vec::new();
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                result.push(self.offset(dx, dy));
            }
        }
        result
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

//! Fog of war: which tiles each player has revealed.
//!
//! Every owned unit and city reveals the tiles within
//! [`VISIBILITY_RANGE`] (Manhattan) of itself. By default revealed tiles
//! stay revealed for the rest of the game; with persistent exploration off
//! each recompute starts from a blank grid and only current vision remains.

use crate::coord::GridCoord;
use crate::types::{PlayerId, VISIBILITY_RANGE};
use crate::unit::Unit;
use crate::world::WorldState;
use serde::{Deserialize, Serialize};

/// Revealed flags for one player, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityGrid {
    width: u32,
    height: u32,
    revealed: Vec<bool>,
}

impl VisibilityGrid {
    /// A fully hidden grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            revealed: vec![false; (width as usize) * (height as usize)],
        }
    }

    fn index(&self, coord: &GridCoord) -> Option<usize> {
        if coord.x < 0
            || coord.y < 0
            || coord.x as u32 >= self.width
            || coord.y as u32 >= self.height
        {
            return None;
        }
        Some(coord.y as usize * self.width as usize + coord.x as usize)
    }

    /// Reveal every in-bounds tile within `radius` of `center`. Returns how
    /// many tiles were newly revealed.
    pub fn reveal(&mut self, center: GridCoord, radius: u32) -> usize {
        let mut newly = 0;
        for coord in center.within_radius(radius) {
            if let Some(i) = self.index(&coord) {
                if !self.revealed[i] {
                    self.revealed[i] = true;
                    newly += 1;
                }
            }
        }
        newly
    }

    pub fn is_visible(&self, coord: &GridCoord) -> bool {
        self.index(coord).map_or(false, |i| self.revealed[i])
    }

    /// Hide everything.
    pub fn clear(&mut self) {
        self.revealed.iter_mut().for_each(|r| *r = false);
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }

    /// Dimensions this grid was built for.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the flag storage covers exactly `width * height` tiles.
    /// Deserialized grids are not guaranteed to.
    pub fn is_consistent(&self) -> bool {
        self.revealed.len() == (self.width as usize) * (self.height as usize)
    }
}

/// Per-player visibility grids, indexed by player id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityTracker {
    grids: Vec<VisibilityGrid>,
}

impl VisibilityTracker {
    pub fn new(player_count: usize, width: u32, height: u32) -> Self {
        Self {
            grids: vec![VisibilityGrid::new(width, height); player_count],
        }
    }

    /// Rebuild from stored grids.
    pub fn from_grids(grids: Vec<VisibilityGrid>) -> Self {
        Self { grids }
    }

    pub fn grids(&self) -> &[VisibilityGrid] {
        &self.grids
    }

    pub fn grid(&self, player: PlayerId) -> Option<&VisibilityGrid> {
        self.grids.get(player as usize)
    }

    /// Reveal a radius around a tile for one player.
    pub fn reveal(&mut self, player: PlayerId, center: GridCoord, radius: u32) -> usize {
        match self.grids.get_mut(player as usize) {
            Some(grid) => grid.reveal(center, radius),
            None => 0,
        }
    }

    /// Reveal around everything the player owns. With `persistent` off the
    /// grid is cleared first.
    pub fn recompute(&mut self, player: PlayerId, world: &WorldState, persistent: bool) {
        let Some(grid) = self.grids.get_mut(player as usize) else {
            return;
        };
        if !persistent {
            grid.clear();
        }
        for unit in world.units.values().filter(|u| u.owner == player) {
            grid.reveal(unit.position, VISIBILITY_RANGE);
        }
        for city in world.cities.values().filter(|c| c.is_owned_by(player)) {
            grid.reveal(city.position, VISIBILITY_RANGE);
        }
    }

    /// Hide everything for one player.
    pub fn reset(&mut self, player: PlayerId) {
        if let Some(grid) = self.grids.get_mut(player as usize) {
            grid.clear();
        }
    }

    pub fn is_visible(&self, player: PlayerId, coord: &GridCoord) -> bool {
        self.grid(player).map_or(false, |g| g.is_visible(coord))
    }

    pub fn revealed_count(&self, player: PlayerId) -> usize {
        self.grid(player).map_or(0, |g| g.revealed_count())
    }

    /// Units a player can see: its own plus any standing on revealed tiles.
    pub fn visible_units<'a>(&self, player: PlayerId, world: &'a WorldState) -> Vec<&'a Unit> {
        world
            .units
            .values()
            .filter(|u| u.owner == player || self.is_visible(player, &u.position))
            .collect()
    }
}

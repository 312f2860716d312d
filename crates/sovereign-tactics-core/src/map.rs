//! Terrain grid and spatial queries.

use crate::coord::{GridCoord, SURROUNDING};
use crate::terrain::Terrain;
use serde::{Deserialize, Serialize};

/// The game map: a dense, row-major terrain grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    tiles: Vec<Terrain>,
}

impl Map {
    /// Create a map filled with a single terrain type.
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        Self {
            width,
            height,
            tiles: vec![terrain; (width as usize) * (height as usize)],
        }
    }

    /// Rebuild a map from raw row-major terrain. Returns `None` if the length
    /// does not match the dimensions.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Terrain>) -> Option<Self> {
        if tiles.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            tiles,
        })
    }

    /// Row-major terrain slice.
    pub fn tiles(&self) -> &[Terrain] {
        &self.tiles
    }

    fn index(&self, coord: &GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    /// Check if a coordinate is within the map bounds.
    pub fn in_bounds(&self, coord: &GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Terrain at a coordinate, or `None` outside the map.
    pub fn get(&self, coord: &GridCoord) -> Option<Terrain> {
        self.index(coord).map(|i| self.tiles[i])
    }

    /// Terrain at a coordinate. Out-of-bounds reads report `Land`; callers
    /// that care must check [`Map::in_bounds`] first.
    pub fn terrain_at(&self, coord: &GridCoord) -> Terrain {
        self.get(coord).unwrap_or(Terrain::Land)
    }

    /// Overwrite terrain. Returns false if the coordinate is off the map.
    pub fn set_terrain(&mut self, coord: &GridCoord, terrain: Terrain) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.tiles[i] = terrain;
                true
            }
            None => false,
        }
    }

    /// In-bounds orthogonal neighbors, N, E, S, W.
    pub fn neighbors(&self, coord: &GridCoord) -> Vec<GridCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    /// True if any of the eight surrounding tiles is ocean.
    pub fn is_coastal(&self, coord: &GridCoord) -> bool {
        SURROUNDING
            .iter()
            .map(|&(dx, dy)| coord.offset(dx, dy))
            .any(|c| self.get(&c) == Some(Terrain::Ocean))
    }

    /// Every coordinate, row by row.
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| GridCoord::new(x, y)))
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Count tiles of a given terrain.
    pub fn count(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|t| **t == terrain).count()
    }
}

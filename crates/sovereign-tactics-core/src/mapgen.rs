//! Procedural map generation.
//!
//! The generator is seeded independently of the game's random source, so a
//! settings seed always produces the same terrain and city layout.

use crate::city::CITY_NAMES;
use crate::coord::GridCoord;
use crate::map::Map;
use crate::random::{RandomSource, SeededRandom};
use crate::settings::GameSettings;
use crate::terrain::Terrain;

/// Configuration for map generation.
#[derive(Clone, Debug, PartialEq)]
pub struct MapGenConfig {
    pub width: u32,
    pub height: u32,
    /// Fraction of tiles that become ocean.
    pub ocean_ratio: f32,
    /// Fraction of tiles that become mountains.
    pub mountain_ratio: f32,
    /// Map tiles per generated city.
    pub tiles_per_city: u32,
    /// Minimum number of cities; every player needs a capital.
    pub player_count: usize,
}

impl MapGenConfig {
    pub fn from_settings(settings: &GameSettings, player_count: usize) -> Self {
        Self {
            width: settings.map_width,
            height: settings.map_height,
            ocean_ratio: settings.ocean_ratio,
            mountain_ratio: settings.mountain_ratio,
            tiles_per_city: settings.tiles_per_city.max(1),
            player_count,
        }
    }

    /// Number of cities to place before clamping to available land.
    pub fn target_city_count(&self) -> usize {
        let by_area = (self.width * self.height / self.tiles_per_city.max(1)) as usize;
        by_area.max(self.player_count)
    }
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self::from_settings(&GameSettings::default(), 2)
    }
}

/// A named city site chosen by the generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitySite {
    pub position: GridCoord,
    pub name: String,
}

/// Terrain plus the neutral cities to found on it.
#[derive(Clone, Debug)]
pub struct GeneratedMap {
    pub map: Map,
    pub cities: Vec<CitySite>,
}

/// Generates game maps from a seed.
pub struct MapGenerator {
    rng: SeededRandom,
    config: MapGenConfig,
}

impl MapGenerator {
    /// Create a new map generator with the given seed and config.
    pub fn new(seed: u64, config: MapGenConfig) -> Self {
        Self {
            rng: SeededRandom::from_seed(seed),
            config,
        }
    }

    /// Generate terrain and city sites.
    pub fn generate(&mut self) -> GeneratedMap {
        let map = self.generate_terrain();
        let cities = self.place_cities(&map);
        GeneratedMap { map, cities }
    }

    /// Roll every tile independently against the terrain ratios.
    fn generate_terrain(&mut self) -> Map {
        let mut map = Map::filled(self.config.width, self.config.height, Terrain::Land);
        let ocean = self.config.ocean_ratio as f64;
        let mountains = ocean + self.config.mountain_ratio as f64;

        let coords: Vec<GridCoord> = map.coords().collect();
        for coord in coords {
            let roll = self.rng.next_f64();
            let terrain = if roll < ocean {
                Terrain::Ocean
            } else if roll < mountains {
                Terrain::Mountains
            } else {
                Terrain::Land
            };
            map.set_terrain(&coord, terrain);
        }
        map
    }

    /// Pick distinct land tiles for cities and name them.
    fn place_cities(&mut self, map: &Map) -> Vec<CitySite> {
        let mut candidates: Vec<GridCoord> = map
            .coords()
            .filter(|c| map.terrain_at(c) == Terrain::Land)
            .collect();
        self.rng.shuffle(&mut candidates);

        let mut names: Vec<&str> = CITY_NAMES.to_vec();
        self.rng.shuffle(&mut names);

        let count = self.config.target_city_count().min(candidates.len());
        candidates
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(i, position)| {
                let base = names[i % names.len()];
                let round = i / names.len();
                let name = if round == 0 {
                    base.to_string()
                } else {
                    format!("{} {}", base, round + 1)
                };
                CitySite { position, name }
            })
            .collect()
    }
}

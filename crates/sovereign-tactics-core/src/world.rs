//! Authoritative world state: terrain, cities, units and players.
//!
//! `WorldState` answers spatial and ownership queries and performs raw
//! insertions and removals. It enforces no game rules and emits no events;
//! that is the job of [`crate::game::Game`].

use crate::city::City;
use crate::coord::GridCoord;
use crate::map::Map;
use crate::pathfinding::can_enter;
use crate::player::Player;
use crate::terrain::Terrain;
use crate::types::{CityId, PlayerId, UnitId};
use crate::unit::{Unit, UnitType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// The terrain grid.
    pub map: Map,
    /// All cities, indexed by ID.
    pub cities: BTreeMap<CityId, City>,
    /// All units, indexed by ID. Iteration follows creation order.
    pub units: BTreeMap<UnitId, Unit>,
    /// Players in turn order; `players[i].id == i`.
    pub players: Vec<Player>,
    /// Next available unit ID.
    pub next_unit_id: UnitId,
    /// Next available city ID.
    pub next_city_id: CityId,
}

impl WorldState {
    pub fn new(map: Map, players: Vec<Player>) -> Self {
        Self {
            map,
            cities: BTreeMap::new(),
            units: BTreeMap::new(),
            players,
            next_unit_id: 1,
            next_city_id: 1,
        }
    }

    // ---- Terrain ----

    /// Terrain at a coordinate; off-map reads as `Land`.
    pub fn terrain_at(&self, coord: &GridCoord) -> Terrain {
        self.map.terrain_at(coord)
    }

    pub fn in_bounds(&self, coord: &GridCoord) -> bool {
        self.map.in_bounds(coord)
    }

    // ---- Units ----

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn unit_at(&self, coord: &GridCoord) -> Option<&Unit> {
        self.units.values().find(|u| u.position == *coord)
    }

    pub fn is_occupied(&self, coord: &GridCoord) -> bool {
        self.unit_at(coord).is_some()
    }

    pub fn units_owned_by(&self, player: PlayerId) -> Vec<&Unit> {
        self.units.values().filter(|u| u.owner == player).collect()
    }

    /// IDs of a player's units in creation order.
    pub fn unit_ids_owned_by(&self, player: PlayerId) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.owner == player)
            .map(|u| u.id)
            .collect()
    }

    pub fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        id
    }

    /// Insert a unit, keeping the ID counter ahead of it.
    pub fn add_unit(&mut self, unit: Unit) {
        self.next_unit_id = self.next_unit_id.max(unit.id + 1);
        self.units.insert(unit.id, unit);
    }

    /// Create and insert a unit with a fresh ID.
    pub fn spawn_unit(&mut self, unit_type: UnitType, position: GridCoord, owner: PlayerId) -> UnitId {
        let id = self.allocate_unit_id();
        self.add_unit(Unit::new(id, unit_type, position, owner));
        id
    }

    /// Remove a unit. Absent IDs are ignored.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    // ---- Cities ----

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(&id)
    }

    pub fn city_at(&self, coord: &GridCoord) -> Option<&City> {
        self.cities.values().find(|c| c.position == *coord)
    }

    pub fn cities_owned_by(&self, player: PlayerId) -> Vec<&City> {
        self.cities
            .values()
            .filter(|c| c.is_owned_by(player))
            .collect()
    }

    pub fn city_ids_owned_by(&self, player: PlayerId) -> Vec<CityId> {
        self.cities
            .values()
            .filter(|c| c.is_owned_by(player))
            .map(|c| c.id)
            .collect()
    }

    pub fn neutral_cities(&self) -> Vec<&City> {
        self.cities.values().filter(|c| c.is_neutral()).collect()
    }

    pub fn allocate_city_id(&mut self) -> CityId {
        let id = self.next_city_id;
        self.next_city_id += 1;
        id
    }

    /// Found a city, flipping the tile to `City`. A city already standing on
    /// the tile is replaced.
    pub fn add_city(&mut self, position: GridCoord, owner: Option<PlayerId>, name: String) -> CityId {
        self.remove_city_at(&position);
        let id = self.allocate_city_id();
        self.cities.insert(id, City::new(id, position, owner, name));
        self.map.set_terrain(&position, Terrain::City);
        id
    }

    /// Remove the city on a tile, flipping the tile back to `Land`.
    pub fn remove_city_at(&mut self, position: &GridCoord) -> Option<City> {
        let id = self.city_at(position)?.id;
        self.map.set_terrain(position, Terrain::Land);
        self.cities.remove(&id)
    }

    /// Unit types a city can currently build.
    pub fn available_units(&self, city: &City) -> Vec<UnitType> {
        city.available_units(self.map.is_coastal(&city.position))
    }

    // ---- Players ----

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    /// Players not yet eliminated.
    pub fn alive_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }

    /// Does the player own at least one unit or city?
    pub fn has_presence(&self, player: PlayerId) -> bool {
        self.units.values().any(|u| u.owner == player)
            || self.cities.values().any(|c| c.is_owned_by(player))
    }

    // ---- Placement ----

    /// First orthogonal neighbor (N, E, S, W) that is on the map, enterable
    /// by `unit_type` and free of units.
    pub fn empty_adjacent_for(&self, coord: &GridCoord, unit_type: UnitType) -> Option<GridCoord> {
        self.map
            .neighbors(coord)
            .into_iter()
            .find(|c| can_enter(unit_type, self.terrain_at(c)) && !self.is_occupied(c))
    }

    /// Where a unit produced at `coord` appears: the tile itself when free and
    /// enterable, else the first free enterable neighbor.
    pub fn spawn_site(&self, coord: &GridCoord, unit_type: UnitType) -> Option<GridCoord> {
        if can_enter(unit_type, self.terrain_at(coord)) && !self.is_occupied(coord) {
            return Some(*coord);
        }
        self.empty_adjacent_for(coord, unit_type)
    }
}

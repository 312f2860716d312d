//! Save and restore full game state.
//!
//! A [`GameSnapshot`] carries everything needed to resume a game except the
//! random source, which the caller supplies again. Restoring a snapshot and
//! feeding it the same random stream reproduces the saved game exactly.

use crate::error::GameError;
use crate::events::EventQueue;
use crate::game::{Game, TurnPhase};
use crate::random::RandomSource;
use crate::settings::GameSettings;
use crate::visibility::VisibilityTracker;
use crate::world::WorldState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub settings: GameSettings,
    pub world: WorldState,
    pub visibility: VisibilityTracker,
    pub turn_number: u32,
    pub current_player_index: usize,
    pub phase: TurnPhase,
}

impl GameSnapshot {
    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, GameError> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    /// Parse and validate a snapshot.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| GameError::Snapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), GameError> {
        let fail = |msg: String| Err(GameError::Snapshot(msg));

        if self.version != SNAPSHOT_VERSION {
            return fail(format!("unsupported snapshot version {}", self.version));
        }
        self.settings.validate()?;

        let map = &self.world.map;
        let expected = (map.width as usize) * (map.height as usize);
        if map.tiles().len() != expected {
            return fail(format!(
                "map has {} tiles, expected {}",
                map.tiles().len(),
                expected
            ));
        }

        if self.world.players.is_empty() {
            return fail("snapshot has no players".to_string());
        }
        for (index, player) in self.world.players.iter().enumerate() {
            if player.id as usize != index {
                return fail(format!("player at index {index} has id {}", player.id));
            }
        }
        if self.current_player_index >= self.world.players.len() {
            return Err(GameError::InvalidPlayerIndex(self.current_player_index));
        }

        let grids = self.visibility.grids();
        if grids.len() != self.world.players.len() {
            return fail(format!(
                "{} visibility grids for {} players",
                grids.len(),
                self.world.players.len()
            ));
        }
        if grids
            .iter()
            .any(|g| g.dimensions() != (map.width, map.height))
        {
            return fail("visibility grid does not match map size".to_string());
        }
        if let Some(player) = grids.iter().position(|g| !g.is_consistent()) {
            return fail(format!("visibility grid for player {player} is truncated"));
        }

        if let Some(unit) = self.world.units.values().find(|u| !map.in_bounds(&u.position)) {
            return fail(format!("unit {} is off the map at {}", unit.id, unit.position));
        }
        if let Some(city) = self.world.cities.values().find(|c| !map.in_bounds(&c.position)) {
            return fail(format!("city {} is off the map at {}", city.id, city.position));
        }
        Ok(())
    }
}

impl<R: RandomSource> Game<R> {
    /// Capture the full state of the game.
    pub fn export_state(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            settings: self.settings.clone(),
            world: self.world.clone(),
            visibility: self.visibility.clone(),
            turn_number: self.turn_number,
            current_player_index: self.current_player_index,
            phase: self.phase,
        }
    }

    /// Replace this game's state with a snapshot. Pending events are dropped;
    /// the random source is kept as is.
    pub fn import_state(&mut self, snapshot: GameSnapshot) -> Result<(), GameError> {
        snapshot.validate()?;
        debug!(
            turn = snapshot.turn_number,
            player_index = snapshot.current_player_index,
            "importing snapshot"
        );
        self.settings = snapshot.settings;
        self.world = snapshot.world;
        self.visibility = snapshot.visibility;
        self.turn_number = snapshot.turn_number;
        self.current_player_index = snapshot.current_player_index;
        self.phase = snapshot.phase;
        self.events = EventQueue::new();
        Ok(())
    }

    /// Rebuild a game from a snapshot and a random source.
    pub fn from_snapshot(snapshot: GameSnapshot, rng: R) -> Result<Self, GameError> {
        snapshot.validate()?;
        let mut game = Game::with_world(snapshot.world.clone(), snapshot.settings.clone(), rng);
        game.import_state(snapshot)?;
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;
    use crate::map::Map;
    use crate::player::Player;
    use crate::random::ScriptedRandom;
    use crate::settings::SettingsError;
    use crate::terrain::Terrain;
    use crate::unit::UnitType;

    fn create_test_game() -> Game<ScriptedRandom> {
        let mut world = WorldState::new(
            Map::filled(6, 6, Terrain::Land),
            vec![
                Player::human(0, "Ada".to_string()),
                Player::human(1, "Grace".to_string()),
            ],
        );
        world.add_city(GridCoord::new(0, 0), Some(0), "Alpha".to_string());
        world.add_city(GridCoord::new(5, 5), Some(1), "Omega".to_string());
        world.spawn_unit(UnitType::Army, GridCoord::new(1, 1), 0);
        world.spawn_unit(UnitType::Army, GridCoord::new(4, 4), 1);
        let mut game = Game::with_world(world, GameSettings::new(6, 6), ScriptedRandom::constant(0.5));
        game.start().unwrap();
        game
    }

    #[test]
    fn test_export_carries_current_version() {
        let game = create_test_game();
        let snapshot = game.export_state();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut snapshot = create_test_game().export_state();
        snapshot.version = 99;
        assert!(matches!(snapshot.validate(), Err(GameError::Snapshot(_))));
    }

    #[test]
    fn test_rejects_bad_player_index() {
        let mut snapshot = create_test_game().export_state();
        snapshot.current_player_index = 5;
        assert_eq!(snapshot.validate(), Err(GameError::InvalidPlayerIndex(5)));
    }

    #[test]
    fn test_rejects_off_map_unit() {
        let mut snapshot = create_test_game().export_state();
        if let Some(unit) = snapshot.world.units.values_mut().next() {
            unit.position = GridCoord::new(40, 40);
        }
        assert!(matches!(snapshot.validate(), Err(GameError::Snapshot(_))));
    }

    #[test]
    fn test_rejects_mismatched_visibility() {
        let mut snapshot = create_test_game().export_state();
        snapshot.visibility = VisibilityTracker::new(1, 6, 6);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut snapshot = create_test_game().export_state();
        snapshot.settings.max_automatic_turns = 0;
        assert!(matches!(
            snapshot.validate(),
            Err(GameError::InvalidConfig(SettingsError::NoAutomaticTurns))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            GameSnapshot::from_json("{not json"),
            Err(GameError::Snapshot(_))
        ));
    }

    #[test]
    fn test_import_drops_pending_events() {
        let mut game = create_test_game();
        assert!(!game.pending_events().is_empty());
        let snapshot = game.export_state();
        game.import_state(snapshot.clone()).unwrap();
        assert!(game.pending_events().is_empty());
        assert_eq!(game.export_state(), snapshot);
    }
}

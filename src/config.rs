//! Session configuration.
//!
//! Every field has a default from `constants`; a JSON file may override any
//! subset of them, e.g. `{ "dungeon": { "width": 60 }, "actors": { "monster_count": 4 } }`.

use std::path::Path;

use serde::Deserialize;

use crate::constants::*;
use crate::error::ConfigError;
use crate::pathfinding::CostWeights;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub width: usize,
    pub height: usize,
    /// Fraction of the grid rooms must exceed
    pub room_coverage: f32,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub min_room_height: i32,
    pub min_room_width: i32,
    pub min_partition_height: i32,
    pub max_partition_height: i32,
    pub min_partition_width: i32,
    pub max_partition_width: i32,
    pub split_tolerance: f32,
    pub room_placement_attempts: u32,
    pub generation_attempts: u32,
    pub min_rock_hardness: u8,
    pub max_rock_hardness: u8,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            width: DUNGEON_DEFAULT_WIDTH,
            height: DUNGEON_DEFAULT_HEIGHT,
            room_coverage: DUNGEON_ROOM_COVERAGE,
            min_rooms: DUNGEON_MIN_ROOMS,
            max_rooms: DUNGEON_MAX_ROOMS,
            min_room_height: DUNGEON_MIN_ROOM_HEIGHT,
            min_room_width: DUNGEON_MIN_ROOM_WIDTH,
            min_partition_height: DUNGEON_MIN_PARTITION_HEIGHT,
            max_partition_height: DUNGEON_MAX_PARTITION_HEIGHT,
            min_partition_width: DUNGEON_MIN_PARTITION_WIDTH,
            max_partition_width: DUNGEON_MAX_PARTITION_WIDTH,
            split_tolerance: DUNGEON_SPLIT_TOLERANCE,
            room_placement_attempts: DUNGEON_ROOM_PLACEMENT_ATTEMPTS,
            generation_attempts: DUNGEON_GENERATION_ATTEMPTS,
            min_rock_hardness: MIN_ROCK_HARDNESS,
            max_rock_hardness: MAX_ROCK_HARDNESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    pub corridor_use_hardness: bool,
    pub corridor_hardness_levels: u32,
    pub corridor_room_weight: u32,
    pub corridor_rock_weight: u32,
    pub corridor_corridor_weight: u32,
    pub tunnel_hardness_levels: u32,
    pub diagonal_needs_open_space: bool,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            corridor_use_hardness: CORRIDOR_USE_HARDNESS,
            corridor_hardness_levels: CORRIDOR_HARDNESS_LEVELS,
            corridor_room_weight: CORRIDOR_ROOM_WEIGHT,
            corridor_rock_weight: CORRIDOR_ROCK_WEIGHT,
            corridor_corridor_weight: CORRIDOR_CORRIDOR_WEIGHT,
            tunnel_hardness_levels: TUNNEL_HARDNESS_LEVELS,
            diagonal_needs_open_space: DIAGONAL_NEEDS_OPEN_SPACE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub monster_count: usize,
    pub player_speed: u32,
    pub min_monster_speed: u32,
    pub max_monster_speed: u32,
    /// Actors may step diagonally; also selects 8-way shared cost fields
    pub diagonal_movement: bool,
    pub placement_attempts: u32,
    pub tunnel_decrement: u8,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            monster_count: DEFAULT_MONSTER_COUNT,
            player_speed: PLAYER_SPEED,
            min_monster_speed: MIN_MONSTER_SPEED,
            max_monster_speed: MAX_MONSTER_SPEED,
            diagonal_movement: ACTOR_DIAGONAL_MOVEMENT,
            placement_attempts: MONSTER_PLACEMENT_ATTEMPTS,
            tunnel_decrement: TUNNEL_DECREMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Time units per turn at speed 1
    pub tick: u64,
    pub frames_per_second: u32,
    /// Stop after this many actor turns
    pub max_turns: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: GAME_TICK,
            frames_per_second: FRAMES_PER_SECOND,
            max_turns: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dungeon: DungeonConfig,
    pub pathing: PathingConfig,
    pub actors: ActorConfig,
    pub simulation: SimulationConfig,
}

impl GameConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn cost_weights(&self) -> CostWeights {
        CostWeights {
            use_hardness: self.pathing.corridor_use_hardness,
            corridor_levels: self.pathing.corridor_hardness_levels,
            room_weight: self.pathing.corridor_room_weight,
            rock_weight: self.pathing.corridor_rock_weight,
            corridor_weight: self.pathing.corridor_corridor_weight,
            tunnel_levels: self.pathing.tunnel_hardness_levels,
            min_rock_hardness: self.dungeon.min_rock_hardness,
            max_rock_hardness: self.dungeon.max_rock_hardness,
            diagonal_needs_open_space: self.pathing.diagonal_needs_open_space,
        }
    }

    /// Reject values the generator or simulation cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dungeon;
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        // Saved files store coordinates as single bytes
        if !(3..=255).contains(&d.width) || !(3..=255).contains(&d.height) {
            return invalid(format!("grid {}x{} must be between 3x3 and 255x255", d.width, d.height));
        }
        if d.min_rooms < 2 || d.min_rooms > d.max_rooms {
            return invalid(format!(
                "room bounds [{}, {}] must satisfy 2 <= min <= max",
                d.min_rooms, d.max_rooms
            ));
        }
        if !(0.0..1.0).contains(&d.room_coverage) {
            return invalid(format!("room coverage {} must be in [0, 1)", d.room_coverage));
        }
        if d.min_room_height < 1 || d.min_room_width < 1 {
            return invalid("minimum room size must be positive".to_string());
        }
        if d.min_partition_height < d.min_room_height
            || d.min_partition_width < d.min_room_width
            || d.min_partition_height > d.max_partition_height
            || d.min_partition_width > d.max_partition_width
        {
            return invalid("partition stop ranges must hold a minimum room and satisfy min <= max".to_string());
        }
        if d.split_tolerance < 0.0 {
            return invalid(format!("split tolerance {} must not be negative", d.split_tolerance));
        }
        if d.room_placement_attempts == 0 || d.generation_attempts == 0 {
            return invalid("attempt limits must be positive".to_string());
        }
        if d.min_rock_hardness == 0
            || d.min_rock_hardness > d.max_rock_hardness
            || d.max_rock_hardness == IMMUTABLE_HARDNESS
        {
            return invalid(format!(
                "rock hardness [{}, {}] must satisfy 1 <= min <= max < {}",
                d.min_rock_hardness, d.max_rock_hardness, IMMUTABLE_HARDNESS
            ));
        }

        if self.pathing.corridor_hardness_levels == 0 || self.pathing.tunnel_hardness_levels == 0 {
            return invalid("hardness levels must be positive".to_string());
        }

        let a = &self.actors;
        if a.player_speed == 0 || a.min_monster_speed == 0 || a.min_monster_speed > a.max_monster_speed {
            return invalid(format!(
                "speeds must be positive with min <= max (player {}, monsters [{}, {}])",
                a.player_speed, a.min_monster_speed, a.max_monster_speed
            ));
        }
        if a.tunnel_decrement == 0 {
            return invalid("tunnel decrement must be positive".to_string());
        }

        if self.simulation.tick == 0 || self.simulation.frames_per_second == 0 {
            return invalid("tick and frame rate must be positive".to_string());
        }
        // A speed above the tick would give a zero turn delay
        let fastest = a.player_speed.max(a.max_monster_speed) as u64;
        if fastest > self.simulation.tick {
            return invalid(format!(
                "speed {} exceeds the tick {}",
                fastest, self.simulation.tick
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dungeon.width, 80);
        assert_eq!(config.dungeon.height, 21);
        assert_eq!(config.simulation.tick, 1000);
    }

    #[test]
    fn test_speed_above_tick_is_rejected() {
        let mut config = GameConfig::default();
        config.simulation.tick = 10;
        config.actors.player_speed = 20;
        config.actors.max_monster_speed = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.actors.player_speed = 10;
        config.actors.max_monster_speed = 11;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.actors.max_monster_speed = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "dungeon": { "width": 40 }, "actors": { "monster_count": 3 } }"#).unwrap();
        assert_eq!(config.dungeon.width, 40);
        assert_eq!(config.dungeon.height, DUNGEON_DEFAULT_HEIGHT);
        assert_eq!(config.actors.monster_count, 3);
        assert_eq!(config.actors.player_speed, PLAYER_SPEED);
        assert_eq!(config.pathing, PathingConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_room_bounds() {
        let mut config = GameConfig::default();
        config.dungeon.min_rooms = 8;
        config.dungeon.max_rooms = 4;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_speed() {
        let mut config = GameConfig::default();
        config.actors.min_monster_speed = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_immutable_rock() {
        let mut config = GameConfig::default();
        config.dungeon.max_rock_hardness = 255;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cost_weights_follow_config() {
        let mut config = GameConfig::default();
        config.pathing.tunnel_hardness_levels = 5;
        config.dungeon.max_rock_hardness = 200;
        let weights = config.cost_weights();
        assert_eq!(weights.tunnel_levels, 5);
        assert_eq!(weights.max_rock_hardness, 200);
        assert_eq!(weights, CostWeights { tunnel_levels: 5, max_rock_hardness: 200, ..CostWeights::default() });
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = GameConfig::load(Path::new("/nonexistent/rogue-dungeon.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

//! Session setup - turns a loaded or generated layout into a populated dungeon.

use log::{info, warn};
use rand::Rng;

use crate::config::GameConfig;
use crate::dungeon::{Dungeon, DungeonLayout};
use crate::dungeon_gen::{place_stairs, DungeonGenerator};
use crate::error::{GameError, GenerationError};
use crate::spawning;

/// Run the generator and hand back its layout.
pub fn generate_layout(config: &GameConfig, rng: &mut impl Rng) -> Result<DungeonLayout, GenerationError> {
    let map = DungeonGenerator::generate(&config.dungeon, &config.cost_weights(), rng)?;
    info!(
        "generated {} rooms in {} attempt(s)",
        map.rooms.len(),
        map.attempts
    );
    Ok(map.into())
}

/// Give a layout without stairs one up and one down stair.
///
/// Returns false when the layout has too few rooms to hold them.
pub fn ensure_stairs(layout: &mut DungeonLayout, rng: &mut impl Rng) -> bool {
    if layout.grid.tiles.iter().any(|t| t.tile_type.is_stair()) {
        return true;
    }
    if place_stairs(&mut layout.grid, &layout.rooms, rng).is_some() {
        return true;
    }
    warn!(
        "cannot place stairs: need two rooms, layout has {}",
        layout.rooms.len()
    );
    false
}

/// Build the session dungeon.
///
/// A loaded layout is used when it passes validation; otherwise a fresh one
/// is generated. Monsters are spawned either way.
pub fn initialize_dungeon(
    config: &GameConfig,
    loaded: Option<DungeonLayout>,
    rng: &mut impl Rng,
) -> Result<Dungeon, GameError> {
    puffin::profile_function!();

    let loaded = loaded.and_then(|layout| match Dungeon::from_layout(layout, config, rng) {
        Ok(dungeon) => Some(dungeon),
        Err(err) => {
            warn!("loaded dungeon rejected ({}); generating a new one", err);
            None
        }
    });

    let mut dungeon = match loaded {
        Some(dungeon) => dungeon,
        None => {
            let layout = generate_layout(config, rng)?;
            Dungeon::from_layout(layout, config, rng)
                .map_err(|err| GameError::InvalidState(format!("generated dungeon is invalid: {}", err)))?
        }
    };

    spawning::spawn_monsters(&mut dungeon, &config.actors, rng);
    Ok(dungeon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon_gen::Rect;
    use crate::grid::Grid;
    use crate::tile::TileType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_session_is_populated() {
        let mut config = GameConfig::default();
        config.actors.monster_count = 5;
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let dungeon = initialize_dungeon(&config, None, &mut rng).unwrap();
        assert_eq!(dungeon.monster_count(), 5);
        let (up, down) = dungeon.stairs();
        assert_eq!((up.len(), down.len()), (1, 1));
    }

    #[test]
    fn test_invalid_layout_falls_back_to_generation() {
        let config = GameConfig::default();
        // Wrong size and no rooms
        let bogus = DungeonLayout {
            grid: Grid::new(10, 10),
            rooms: Vec::new(),
            player: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let dungeon = initialize_dungeon(&config, Some(bogus), &mut rng).unwrap();
        assert_eq!(dungeon.grid.width, config.dungeon.width);
        assert!(!dungeon.rooms.is_empty());
    }

    #[test]
    fn test_ensure_stairs_adds_missing_pair() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut layout = generate_layout(&config, &mut rng).unwrap();
        for tile in layout.grid.tiles.iter_mut().filter(|t| t.tile_type.is_stair()) {
            tile.tile_type = TileType::Room;
        }

        assert!(ensure_stairs(&mut layout, &mut rng));
        let stairs = layout.grid.tiles.iter().filter(|t| t.tile_type.is_stair()).count();
        assert_eq!(stairs, 2);
    }

    #[test]
    fn test_ensure_stairs_needs_two_rooms() {
        let mut layout = DungeonLayout {
            grid: Grid::new(8, 5),
            rooms: vec![Rect::new(1, 1, 2, 2)],
            player: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(!ensure_stairs(&mut layout, &mut rng));
        assert_eq!(
            layout.grid.tiles.iter().filter(|t| t.tile_type.is_stair()).count(),
            0
        );
    }
}

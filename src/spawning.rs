//! Actor spawning.
//!
//! The player goes into a random room cell (or a loaded position); monsters
//! get random speeds and behaviors and are dropped into free room cells away
//! from the player's room.

use hecs::{Entity, World};
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Actor, Behavior, Glyph, Memory, Navigation, Player, Position};
use crate::config::ActorConfig;
use crate::dungeon::Dungeon;

/// Everything needed to spawn one monster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterDef {
    pub speed: u32,
    pub behavior: Behavior,
}

impl MonsterDef {
    /// Speed uniform in the configured range, each behavior flag a coin flip.
    pub fn random(config: &ActorConfig, rng: &mut impl Rng) -> Self {
        let speed = rng.gen_range(config.min_monster_speed..=config.max_monster_speed);
        let mut behavior = Behavior::empty();
        for flag in [
            Behavior::INTELLIGENT,
            Behavior::TELEPATHIC,
            Behavior::TUNNELER,
            Behavior::ERRATIC,
        ] {
            if rng.gen_bool(0.5) {
                behavior |= flag;
            }
        }
        Self { speed, behavior }
    }

    /// Spawn this monster at the given position
    pub fn spawn(&self, world: &mut World, x: i32, y: i32) -> Entity {
        world.spawn((
            Position::new(x, y),
            Actor::new(self.speed),
            self.behavior,
            Memory::default(),
            Navigation::default(),
            Glyph::for_behavior(self.behavior),
        ))
    }
}

pub fn spawn_player(world: &mut World, x: i32, y: i32, speed: u32) -> Entity {
    world.spawn((Position::new(x, y), Actor::new(speed), Player, Glyph::player()))
}

/// Place up to `config.monster_count` monsters. Returns how many were placed.
///
/// Each monster gets a bounded number of tries at a free room cell outside
/// the player's room; running out stops placement early.
pub fn spawn_monsters(dungeon: &mut Dungeon, config: &ActorConfig, rng: &mut impl Rng) -> usize {
    puffin::profile_function!();

    let player_room = dungeon
        .player_position()
        .and_then(|p| dungeon.room_containing(p.x, p.y));
    let rooms: Vec<usize> = (0..dungeon.rooms.len())
        .filter(|&i| Some(i) != player_room)
        .collect();

    if config.monster_count > 0 && rooms.is_empty() {
        warn!("no room outside the player's room; spawning no monsters");
        return 0;
    }

    let mut placed = 0;
    for _ in 0..config.monster_count {
        let spot = (0..config.placement_attempts).find_map(|_| {
            let room = dungeon.rooms[*rooms.choose(rng)?];
            let (x, y) = room.random_cell(rng);
            dungeon.grid.occupant(x, y).is_none().then_some((x, y))
        });

        let Some((x, y)) = spot else {
            warn!(
                "ran out of free cells: placed {} of {} monsters",
                placed, config.monster_count
            );
            break;
        };

        let monster = MonsterDef::random(config, rng);
        let entity = monster.spawn(&mut dungeon.world, x, y);
        if let Some(tile) = dungeon.grid.get_mut(x, y) {
            tile.occupant = Some(entity);
        }
        placed += 1;
    }

    info!("spawned {} monsters", placed);
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::DungeonLayout;
    use crate::dungeon_gen::Rect;
    use crate::grid::Grid;
    use crate::tile::TileType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_room_dungeon(config: &GameConfig) -> Dungeon {
        let mut grid = Grid::new(config.dungeon.width, config.dungeon.height);
        let rooms = vec![Rect::new(2, 2, 3, 3), Rect::new(10, 2, 2, 2)];
        for room in &rooms {
            for (x, y) in room.cells() {
                grid.get_mut(x, y).unwrap().open_as(TileType::Room);
            }
        }
        let layout = DungeonLayout {
            grid,
            rooms,
            player: Some((3, 3)),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        Dungeon::from_layout(layout, config, &mut rng).unwrap()
    }

    fn small_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.dungeon.width = 20;
        config.dungeon.height = 8;
        config
    }

    #[test]
    fn test_random_monster_within_config() {
        let config = ActorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let def = MonsterDef::random(&config, &mut rng);
            assert!((config.min_monster_speed..=config.max_monster_speed).contains(&def.speed));
            assert!(def.behavior.bits() < 16);
        }
    }

    #[test]
    fn test_monsters_avoid_player_room() {
        let config = small_config();
        let mut dungeon = two_room_dungeon(&config);
        let actors = ActorConfig {
            monster_count: 3,
            ..config.actors.clone()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(spawn_monsters(&mut dungeon, &actors, &mut rng), 3);

        for (_, (pos, _behavior)) in dungeon.world.query::<(&Position, &Behavior)>().iter() {
            assert!(Rect::new(10, 2, 2, 2).contains(pos.x, pos.y));
        }
    }

    #[test]
    fn test_placement_exhaustion_places_fewer() {
        let config = small_config();
        let mut dungeon = two_room_dungeon(&config);
        // The far room only has four cells
        let actors = ActorConfig {
            monster_count: 10,
            placement_attempts: 200,
            ..config.actors.clone()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(spawn_monsters(&mut dungeon, &actors, &mut rng), 4);
        assert_eq!(dungeon.world.query::<&Behavior>().iter().count(), 4);
    }

    #[test]
    fn test_spawned_monsters_occupy_their_cells() {
        let config = small_config();
        let mut dungeon = two_room_dungeon(&config);
        let actors = ActorConfig {
            monster_count: 2,
            ..config.actors.clone()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        spawn_monsters(&mut dungeon, &actors, &mut rng);
        for (entity, pos) in dungeon.world.query::<&Position>().iter() {
            assert_eq!(dungeon.grid.occupant(pos.x, pos.y), Some(entity));
        }
    }
}

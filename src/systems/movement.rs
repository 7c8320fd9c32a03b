//! Actor movement, tunneling and kills.

use hecs::Entity;

use crate::components::{Behavior, Position};
use crate::dungeon::Dungeon;
use crate::events::{EventQueue, GameEvent};
use crate::tile::TileType;

/// Result of a move attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The actor now stands on the target cell; `victim` was standing there
    Moved { victim: Option<Entity> },
    /// A tunneler dug into the target but did not break through
    Eroded { hardness_left: u8 },
    /// Target was the actor's own cell
    Stayed,
    /// Target cannot be entered by this actor
    Blocked,
}

/// Move `entity` onto the neighboring cell `target`.
///
/// Entering a cell with nonzero hardness (tunnelers only) removes
/// `tunnel_decrement` hardness. If that leaves zero the cell turns into a
/// corridor, the actor moves in and both shared fields are rebuilt; otherwise
/// the actor stays put and only the tunneler field is rebuilt. Whoever stood
/// on the target cell is killed. The player moving rebuilds both fields.
pub fn move_actor(
    dungeon: &mut Dungeon,
    entity: Entity,
    target: (i32, i32),
    tunnel_decrement: u8,
    events: &mut EventQueue,
) -> MoveResult {
    puffin::profile_function!();

    let Some(from) = dungeon.position_of(entity) else {
        return MoveResult::Blocked;
    };
    if from.as_tuple() == target {
        return MoveResult::Stayed;
    }

    let tunneler = dungeon
        .world
        .get::<&Behavior>(entity)
        .map(|b| b.is_tunneler())
        .unwrap_or(false);

    let Some(tile) = dungeon.grid.get_mut(target.0, target.1) else {
        return MoveResult::Blocked;
    };
    if tile.is_immutable() {
        return MoveResult::Blocked;
    }

    let mut terrain_opened = false;
    if tile.hardness > 0 || !tile.tile_type.is_open() {
        if !tunneler {
            return MoveResult::Blocked;
        }

        tile.hardness = tile.hardness.saturating_sub(tunnel_decrement);
        if tile.hardness > 0 {
            let hardness_left = tile.hardness;
            events.push(GameEvent::TerrainEroded {
                entity,
                position: target,
                hardness_left,
            });
            dungeon.rebuild_tunneler_field();
            return MoveResult::Eroded { hardness_left };
        }

        if tile.tile_type == TileType::Rock {
            tile.tile_type = TileType::Corridor;
        }
        terrain_opened = true;
        events.push(GameEvent::TerrainOpened {
            entity,
            position: target,
        });
    }

    let victim = relocate(dungeon, entity, from, target, events);

    if terrain_opened || dungeon.is_player(entity) {
        dungeon.rebuild_fields();
    }

    MoveResult::Moved { victim }
}

/// Update occupancy and position, reporting whoever was standing on `to`.
fn relocate(
    dungeon: &mut Dungeon,
    entity: Entity,
    from: Position,
    to: (i32, i32),
    events: &mut EventQueue,
) -> Option<Entity> {
    let victim = dungeon.grid.occupant(to.0, to.1).filter(|&o| o != entity);

    if let Some(victim) = victim {
        if dungeon.is_player(victim) {
            events.push(GameEvent::PlayerKilled {
                killer: entity,
                position: to,
            });
        } else {
            events.push(GameEvent::ActorKilled {
                killer: entity,
                victim,
                position: to,
            });
        }
    }

    if let Some(tile) = dungeon.grid.get_mut(from.x, from.y) {
        if tile.occupant == Some(entity) {
            tile.occupant = None;
        }
    }
    if let Some(tile) = dungeon.grid.get_mut(to.0, to.1) {
        tile.occupant = Some(entity);
    }
    if let Ok(mut pos) = dungeon.world.get::<&mut Position>(entity) {
        *pos = Position::from(to);
    }

    events.push(GameEvent::ActorMoved {
        entity,
        from: from.as_tuple(),
        to,
    });

    victim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::DungeonLayout;
    use crate::dungeon_gen::Rect;
    use crate::grid::Grid;
    use crate::spawning::MonsterDef;
    use crate::tile::Tile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 10x5 grid: room x1..=3, rock wall at x=4 (hardness 40 on row 2), room x5..=8
    fn dungeon() -> Dungeon {
        let mut config = GameConfig::default();
        config.dungeon.width = 10;
        config.dungeon.height = 5;

        let mut grid = Grid::new(10, 5);
        let rooms = vec![Rect::new(1, 1, 3, 3), Rect::new(5, 1, 4, 3)];
        for room in &rooms {
            for (x, y) in room.cells() {
                grid.get_mut(x, y).unwrap().open_as(TileType::Room);
            }
        }
        for y in 1..4 {
            *grid.get_mut(4, y).unwrap() = Tile::rock(200);
        }
        grid.get_mut(4, 2).unwrap().hardness = 40;

        let layout = DungeonLayout {
            grid,
            rooms,
            player: Some((8, 2)),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        Dungeon::from_layout(layout, &config, &mut rng).unwrap()
    }

    fn spawn(dungeon: &mut Dungeon, behavior: Behavior, x: i32, y: i32) -> Entity {
        let entity = MonsterDef { speed: 10, behavior }.spawn(&mut dungeon.world, x, y);
        dungeon.grid.get_mut(x, y).unwrap().occupant = Some(entity);
        entity
    }

    #[test]
    fn test_plain_move_updates_occupancy() {
        let mut d = dungeon();
        let m = spawn(&mut d, Behavior::empty(), 2, 2);
        let mut events = EventQueue::new();
        let result = move_actor(&mut d, m, (2, 3), 85, &mut events);
        assert_eq!(result, MoveResult::Moved { victim: None });
        assert_eq!(d.position_of(m), Some(Position::new(2, 3)));
        assert_eq!(d.grid.occupant(2, 2), None);
        assert_eq!(d.grid.occupant(2, 3), Some(m));
        assert_eq!(
            events.drain().collect::<Vec<_>>(),
            vec![GameEvent::ActorMoved { entity: m, from: (2, 2), to: (2, 3) }]
        );
    }

    #[test]
    fn test_walker_blocked_by_rock() {
        let mut d = dungeon();
        let m = spawn(&mut d, Behavior::INTELLIGENT, 3, 2);
        let mut events = EventQueue::new();
        assert_eq!(move_actor(&mut d, m, (4, 2), 85, &mut events), MoveResult::Blocked);
        assert_eq!(d.grid.hardness(4, 2), Some(40));
        assert!(events.is_empty());
    }

    #[test]
    fn test_tunneler_opens_soft_rock_in_one_step() {
        let mut d = dungeon();
        let m = spawn(&mut d, Behavior::TUNNELER, 3, 2);
        assert!(!d.walker_field.is_reachable(3, 2));

        let mut events = EventQueue::new();
        let result = move_actor(&mut d, m, (4, 2), 85, &mut events);
        assert_eq!(result, MoveResult::Moved { victim: None });
        let tile = d.grid.get(4, 2).unwrap();
        assert_eq!(tile.hardness, 0);
        assert_eq!(tile.tile_type, TileType::Corridor);
        assert_eq!(d.position_of(m), Some(Position::new(4, 2)));
        // The walker field now sees through the new corridor
        assert!(d.walker_field.is_reachable(3, 2));
        assert!(events.iter().any(|e| matches!(e, GameEvent::TerrainOpened { position: (4, 2), .. })));
    }

    #[test]
    fn test_tunneler_erodes_hard_rock_without_moving() {
        let mut d = dungeon();
        let m = spawn(&mut d, Behavior::TUNNELER, 3, 1);
        let before = d.tunneler_field.cost(3, 1);

        let mut events = EventQueue::new();
        let result = move_actor(&mut d, m, (4, 1), 85, &mut events);
        assert_eq!(result, MoveResult::Eroded { hardness_left: 115 });
        assert_eq!(d.position_of(m), Some(Position::new(3, 1)));
        assert_eq!(d.grid.tile_type(4, 1), Some(TileType::Rock));
        assert!(d.tunneler_field.cost(3, 1) <= before);

        assert_eq!(move_actor(&mut d, m, (4, 1), 85, &mut events), MoveResult::Eroded { hardness_left: 30 });
        assert_eq!(move_actor(&mut d, m, (4, 1), 85, &mut events), MoveResult::Moved { victim: None });
    }

    #[test]
    fn test_nobody_digs_the_border() {
        let mut d = dungeon();
        let m = spawn(&mut d, Behavior::TUNNELER, 1, 1);
        let mut events = EventQueue::new();
        assert_eq!(move_actor(&mut d, m, (0, 1), 85, &mut events), MoveResult::Blocked);
        assert_eq!(d.grid.hardness(0, 1), Some(255));
    }

    #[test]
    fn test_moving_onto_occupant_kills_it() {
        let mut d = dungeon();
        let a = spawn(&mut d, Behavior::empty(), 6, 2);
        let b = spawn(&mut d, Behavior::empty(), 7, 2);
        let mut events = EventQueue::new();
        assert_eq!(move_actor(&mut d, a, (7, 2), 85, &mut events), MoveResult::Moved { victim: Some(b) });
        assert_eq!(d.grid.occupant(7, 2), Some(a));
        assert!(events.iter().any(|e| *e == GameEvent::ActorKilled { killer: a, victim: b, position: (7, 2) }));
    }

    #[test]
    fn test_killing_the_player_is_reported() {
        let mut d = dungeon();
        let m = spawn(&mut d, Behavior::empty(), 7, 2);
        let player = d.player;
        let mut events = EventQueue::new();
        assert_eq!(move_actor(&mut d, m, (8, 2), 85, &mut events), MoveResult::Moved { victim: Some(player) });
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled { .. })));
    }

    #[test]
    fn test_player_move_rebuilds_fields() {
        let mut d = dungeon();
        let player = d.player;
        let mut events = EventQueue::new();
        assert_eq!(move_actor(&mut d, player, (7, 2), 85, &mut events), MoveResult::Moved { victim: None });
        assert_eq!(d.walker_field.cost(7, 2), 0);
        assert_eq!(d.tunneler_field.cost(7, 2), 0);
        assert_eq!(d.walker_field.cost(8, 2), 1);
    }
}

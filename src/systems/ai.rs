//! Monster decision-making.
//!
//! Each monster picks at most one neighboring cell per turn. What it knows
//! about the player depends on its behavior flags:
//! - intelligent + telepathic monsters follow the dungeon's shared field
//! - intelligent monsters chase what they saw and otherwise head for the
//!   last place they saw the player
//! - unintelligent monsters close Manhattan distance when they can sense the
//!   player and wander otherwise
//! - erratic monsters wander half of the time regardless

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Behavior, FieldRef, Memory, Navigation, Position, SharedField};
use crate::dungeon::Dungeon;
use crate::pathfinding::{line_of_sight, manhattan, Direction};

/// Pick the cell a monster wants to move to, or `None` to stay put.
pub fn decide_move(dungeon: &mut Dungeon, entity: Entity, rng: &mut impl Rng) -> Option<(i32, i32)> {
    puffin::profile_function!();

    let pos = dungeon.position_of(entity)?.as_tuple();
    let behavior = *dungeon.world.get::<&Behavior>(entity).ok()?;
    let player = dungeon.player_position()?.as_tuple();
    let directions = Direction::scan(dungeon.diagonal());

    if behavior.is_erratic() && rng.gen_bool(0.5) {
        return random_step(dungeon, pos, behavior, rng);
    }

    if behavior.is_intelligent() {
        return intelligent_step(dungeon, entity, pos, player, behavior, directions);
    }

    if behavior.is_telepathic() || line_of_sight(&dungeon.grid, pos, player) {
        return greedy_step(dungeon, pos, player, behavior, directions);
    }

    random_step(dungeon, pos, behavior, rng)
}

fn intelligent_step(
    dungeon: &mut Dungeon,
    entity: Entity,
    pos: (i32, i32),
    player: (i32, i32),
    behavior: Behavior,
    directions: &[Direction],
) -> Option<(i32, i32)> {
    let shared = if behavior.is_tunneler() {
        SharedField::Tunneler
    } else {
        SharedField::Walker
    };

    let sees_player = behavior.is_telepathic() || line_of_sight(&dungeon.grid, pos, player);
    if sees_player {
        if !behavior.is_telepathic() {
            set_memory(dungeon, entity, Some(Position::from(player)));
        }
        set_navigation(dungeon, entity, FieldRef::Shared(shared));
        return dungeon.field(shared).best_neighbor(pos, directions);
    }

    let remembered = dungeon
        .world
        .get::<&Memory>(entity)
        .ok()
        .and_then(|m| m.last_seen);

    match remembered {
        None => {
            // First turn without sight: anchor on the current cell
            set_memory(dungeon, entity, Some(Position::from(pos)));
            set_navigation(dungeon, entity, FieldRef::None);
            None
        }
        Some(target) if target.as_tuple() == pos => None,
        Some(target) => {
            // Terrain may have changed since the last turn, so always rebuild
            let field = dungeon.field_toward(target.as_tuple(), behavior.is_tunneler());
            let step = field.best_neighbor(pos, directions);
            set_navigation(dungeon, entity, FieldRef::Owned(field));
            step
        }
    }
}

/// Cells a monster may try to enter: in bounds and, unless it tunnels, open.
/// Nobody may enter immutable rock.
fn can_enter(dungeon: &Dungeon, cell: (i32, i32), behavior: Behavior) -> bool {
    match dungeon.grid.get(cell.0, cell.1) {
        Some(tile) if tile.is_immutable() => false,
        Some(tile) => behavior.is_tunneler() || tile.tile_type.is_open(),
        None => false,
    }
}

/// Neighbor that strictly minimizes Manhattan distance to the player; the
/// first candidate in scan order wins ties.
fn greedy_step(
    dungeon: &Dungeon,
    pos: (i32, i32),
    player: (i32, i32),
    behavior: Behavior,
    directions: &[Direction],
) -> Option<(i32, i32)> {
    let mut best = i32::MAX;
    let mut pick = None;
    for &dir in directions {
        let next = dir.step(pos);
        if !can_enter(dungeon, next, behavior) {
            continue;
        }
        let distance = manhattan(next, player);
        if distance < best {
            best = distance;
            pick = Some(next);
        }
    }
    pick
}

fn random_step(
    dungeon: &Dungeon,
    pos: (i32, i32),
    behavior: Behavior,
    rng: &mut impl Rng,
) -> Option<(i32, i32)> {
    let candidates: Vec<(i32, i32)> = Direction::scan(dungeon.diagonal())
        .iter()
        .map(|d| d.step(pos))
        .filter(|&cell| can_enter(dungeon, cell, behavior))
        .collect();
    candidates.choose(rng).copied()
}

fn set_memory(dungeon: &mut Dungeon, entity: Entity, last_seen: Option<Position>) {
    if let Ok(mut memory) = dungeon.world.get::<&mut Memory>(entity) {
        memory.last_seen = last_seen;
    }
}

fn set_navigation(dungeon: &mut Dungeon, entity: Entity, field: FieldRef) {
    if let Ok(mut nav) = dungeon.world.get::<&mut Navigation>(entity) {
        nav.0 = field;
    }
}

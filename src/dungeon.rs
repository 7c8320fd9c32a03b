//! The live dungeon: terrain, rooms, actors and the player-centred cost fields.

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Behavior, Player, Position, SharedField};
use crate::config::GameConfig;
use crate::dungeon_gen::{GeneratedMap, Rect};
use crate::error::LayoutError;
use crate::grid::Grid;
use crate::pathfinding::{CostField, CostPolicy, CostWeights};
use crate::spawning;
use crate::tile::TileType;

/// Terrain and rooms as produced by the generator or a file loader,
/// before any actor exists.
#[derive(Debug, Clone)]
pub struct DungeonLayout {
    pub grid: Grid,
    pub rooms: Vec<Rect>,
    /// Where the player starts; a random room cell when absent
    pub player: Option<(i32, i32)>,
}

impl From<GeneratedMap> for DungeonLayout {
    fn from(map: GeneratedMap) -> Self {
        Self {
            grid: map.grid,
            rooms: map.rooms,
            player: None,
        }
    }
}

impl DungeonLayout {
    /// Check the structural rules every dungeon must satisfy.
    pub fn validate(&self, width: usize, height: usize) -> Result<(), LayoutError> {
        let grid = &self.grid;
        if grid.width != width || grid.height != height || grid.tiles.len() != width * height {
            return Err(LayoutError::WrongSize {
                width: grid.width,
                height: grid.height,
                expected_width: width,
                expected_height: height,
            });
        }

        for (idx, tile) in grid.tiles.iter().enumerate() {
            let (x, y) = grid.coords(idx);
            if grid.is_border(x, y) && !tile.is_immutable() {
                return Err(LayoutError::MutableBorder { x, y });
            }
            if tile.tile_type.is_stair() && (!grid.is_interior(x, y) || tile.hardness != 0) {
                return Err(LayoutError::BadStair { x, y });
            }
        }

        if self.rooms.is_empty() {
            return Err(LayoutError::NoRooms);
        }
        for (index, room) in self.rooms.iter().enumerate() {
            if room.width < 1 || room.height < 1 {
                return Err(LayoutError::RoomOutOfBounds { index });
            }
            for (x, y) in room.cells() {
                if !grid.is_interior(x, y) {
                    return Err(LayoutError::RoomOutOfBounds { index });
                }
                if grid.hardness(x, y) != Some(0) {
                    return Err(LayoutError::RoomNotOpen { index, x, y });
                }
            }
        }

        if let Some((x, y)) = self.player {
            let open = grid.is_interior(x, y) && grid.tile_type(x, y).is_some_and(|t| t.is_open());
            if !open {
                return Err(LayoutError::PlayerInRock { x, y });
            }
        }

        Ok(())
    }
}

pub struct Dungeon {
    pub grid: Grid,
    pub rooms: Vec<Rect>,
    pub world: World,
    pub player: Entity,
    pub walker_field: CostField,
    pub tunneler_field: CostField,
    weights: CostWeights,
    diagonal: bool,
}

impl Dungeon {
    /// Validate a layout, spawn the player and compute the shared fields.
    pub fn from_layout(
        layout: DungeonLayout,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, LayoutError> {
        layout.validate(config.dungeon.width, config.dungeon.height)?;

        let DungeonLayout {
            mut grid,
            rooms,
            player,
        } = layout;
        grid.clear_occupants();

        let (px, py) = match player {
            Some(pos) => pos,
            None => rooms[rng.gen_range(0..rooms.len())].random_cell(rng),
        };

        let mut world = World::new();
        let player = spawning::spawn_player(&mut world, px, py, config.actors.player_speed);
        if let Some(tile) = grid.get_mut(px, py) {
            tile.occupant = Some(player);
        }

        let diagonal = config.actors.diagonal_movement;
        let (width, height) = (grid.width, grid.height);
        let mut dungeon = Self {
            grid,
            rooms,
            world,
            player,
            walker_field: CostField::unreachable(width, height, CostPolicy::Walker, diagonal),
            tunneler_field: CostField::unreachable(width, height, CostPolicy::Tunneler, diagonal),
            weights: config.cost_weights(),
            diagonal,
        };
        dungeon.rebuild_fields();
        Ok(dungeon)
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Whether actors and shared fields use 8-way movement
    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    pub fn player_position(&self) -> Option<Position> {
        self.world.get::<&Position>(self.player).ok().map(|p| *p)
    }

    pub fn position_of(&self, entity: Entity) -> Option<Position> {
        self.world.get::<&Position>(entity).ok().map(|p| *p)
    }

    pub fn is_player(&self, entity: Entity) -> bool {
        self.world.get::<&Player>(entity).is_ok()
    }

    pub fn field(&self, which: SharedField) -> &CostField {
        match which {
            SharedField::Walker => &self.walker_field,
            SharedField::Tunneler => &self.tunneler_field,
        }
    }

    pub fn room_containing(&self, x: i32, y: i32) -> Option<usize> {
        self.rooms.iter().position(|r| r.contains(x, y))
    }

    /// Stair cells, up stairs first
    pub fn stairs(&self) -> (Vec<(i32, i32)>, Vec<(i32, i32)>) {
        let mut up = Vec::new();
        let mut down = Vec::new();
        for (idx, tile) in self.grid.tiles.iter().enumerate() {
            match tile.tile_type {
                TileType::StairUp => up.push(self.grid.coords(idx)),
                TileType::StairDown => down.push(self.grid.coords(idx)),
                _ => {}
            }
        }
        (up, down)
    }

    /// Number of living monsters
    pub fn monster_count(&self) -> usize {
        self.world.query::<&Behavior>().iter().count()
    }

    /// Recompute both player-centred fields.
    pub fn rebuild_fields(&mut self) {
        self.rebuild_walker_field();
        self.rebuild_tunneler_field();
    }

    pub fn rebuild_walker_field(&mut self) {
        let sources: Vec<(i32, i32)> = self.player_position().map(|p| p.as_tuple()).into_iter().collect();
        self.walker_field =
            CostField::generate(&self.grid, &sources, self.diagonal, CostPolicy::Walker, &self.weights);
    }

    pub fn rebuild_tunneler_field(&mut self) {
        let sources: Vec<(i32, i32)> = self.player_position().map(|p| p.as_tuple()).into_iter().collect();
        self.tunneler_field =
            CostField::generate(&self.grid, &sources, self.diagonal, CostPolicy::Tunneler, &self.weights);
    }

    /// Private single-source field for an actor steering toward `target`.
    pub fn field_toward(&self, target: (i32, i32), tunneler: bool) -> CostField {
        let policy = if tunneler { CostPolicy::Tunneler } else { CostPolicy::Walker };
        CostField::generate(&self.grid, &[target], self.diagonal, policy, &self.weights)
    }

    /// Remove an actor from the grid and the world.
    pub fn despawn(&mut self, entity: Entity) {
        if let Some(pos) = self.position_of(entity) {
            if let Some(tile) = self.grid.get_mut(pos.x, pos.y) {
                if tile.occupant == Some(entity) {
                    tile.occupant = None;
                }
            }
        }
        let _ = self.world.despawn(entity);
    }
}

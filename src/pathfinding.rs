//! Dijkstra cost fields over the dungeon grid.
//!
//! A `CostField` holds, for every cell, the cheapest cost to reach any of its
//! source cells under a movement policy. Monsters roll downhill on fields
//! centred on the player; the generator rolls downhill on a corridor field to
//! carve tunnels between rooms.

use crate::constants::{
    CORRIDOR_CORRIDOR_WEIGHT, CORRIDOR_HARDNESS_LEVELS, CORRIDOR_ROCK_WEIGHT, CORRIDOR_ROOM_WEIGHT,
    CORRIDOR_USE_HARDNESS, DIAGONAL_NEEDS_OPEN_SPACE, MAX_ROCK_HARDNESS, MIN_ROCK_HARDNESS,
    TUNNEL_HARDNESS_LEVELS,
};
use crate::grid::Grid;
use crate::pairing_heap::{NodeHandle, PairingHeap};
use crate::tile::{Tile, TileType};

/// Cost of an unreachable cell, and weight of an impassable one
pub const INFINITE: u32 = u32::MAX;

// =============================================================================
// DIRECTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// Neighbor scan order shared by field relaxation, carving and monster steps.
    /// Orthogonal directions come first, so `&SCAN_ORDER[..4]` is the 4-way set.
    pub const SCAN_ORDER: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (1, -1),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (1, 1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    /// Directions to scan: 4-way or 8-way.
    pub fn scan(diagonal: bool) -> &'static [Direction] {
        if diagonal {
            &Self::SCAN_ORDER
        } else {
            &Self::SCAN_ORDER[..4]
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Self::SCAN_ORDER.iter().copied().find(|d| d.delta() == (dx, dy))
    }

    pub fn step(self, from: (i32, i32)) -> (i32, i32) {
        let (dx, dy) = self.delta();
        (from.0 + dx, from.1 + dy)
    }
}

// =============================================================================
// POLICIES & WEIGHTS
// =============================================================================

/// Which cells an agent may cross and what each costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostPolicy {
    /// Open cells only, each costing 1
    Walker,
    /// Anything but immutable rock, harder rock costs more
    Tunneler,
    /// Corridor carving, prefers existing corridors and soft rock
    Corridor,
}

/// Weight parameters for the cost policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWeights {
    /// Corridor policy prices rock by hardness bucket instead of `rock_weight`
    pub use_hardness: bool,
    pub corridor_levels: u32,
    pub room_weight: u32,
    pub rock_weight: u32,
    pub corridor_weight: u32,
    pub tunnel_levels: u32,
    pub min_rock_hardness: u8,
    pub max_rock_hardness: u8,
    /// Walkers may only cut a corner if one of the two orthogonal cells is open
    pub diagonal_needs_open_space: bool,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            use_hardness: CORRIDOR_USE_HARDNESS,
            corridor_levels: CORRIDOR_HARDNESS_LEVELS,
            room_weight: CORRIDOR_ROOM_WEIGHT,
            rock_weight: CORRIDOR_ROCK_WEIGHT,
            corridor_weight: CORRIDOR_CORRIDOR_WEIGHT,
            tunnel_levels: TUNNEL_HARDNESS_LEVELS,
            min_rock_hardness: MIN_ROCK_HARDNESS,
            max_rock_hardness: MAX_ROCK_HARDNESS,
            diagonal_needs_open_space: DIAGONAL_NEEDS_OPEN_SPACE,
        }
    }
}

impl CostWeights {
    fn bucket(&self, levels: u32) -> u32 {
        let span = self.max_rock_hardness.saturating_sub(self.min_rock_hardness) as u32;
        (span / levels.max(1)).max(1)
    }

    /// Cost of entering `tile` under `policy`.
    pub fn cell_weight(&self, policy: CostPolicy, tile: &Tile) -> u32 {
        match policy {
            CostPolicy::Walker => {
                if tile.tile_type.is_open() {
                    1
                } else {
                    INFINITE
                }
            }
            CostPolicy::Tunneler => {
                if tile.is_immutable() {
                    INFINITE
                } else {
                    1 + tile.hardness as u32 / self.bucket(self.tunnel_levels)
                }
            }
            CostPolicy::Corridor => {
                if tile.is_immutable() {
                    return INFINITE;
                }
                match tile.tile_type {
                    TileType::Room | TileType::StairUp | TileType::StairDown => 1 + self.room_weight,
                    TileType::Corridor => 1 + self.corridor_weight,
                    TileType::Rock if self.use_hardness => {
                        let level = tile.hardness as u32 / self.bucket(self.corridor_levels);
                        level.min(self.corridor_levels) + 1
                    }
                    TileType::Rock => 1 + self.rock_weight,
                }
            }
        }
    }

    fn weight_at(&self, grid: &Grid, policy: CostPolicy, x: i32, y: i32) -> u32 {
        grid.get(x, y)
            .map(|t| self.cell_weight(policy, t))
            .unwrap_or(INFINITE)
    }
}

// =============================================================================
// COST FIELD
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CostField {
    width: usize,
    height: usize,
    costs: Vec<u32>,
    policy: CostPolicy,
    diagonal: bool,
}

impl CostField {
    /// Run multi-source Dijkstra over the grid interior.
    pub fn generate(
        grid: &Grid,
        sources: &[(i32, i32)],
        diagonal: bool,
        policy: CostPolicy,
        weights: &CostWeights,
    ) -> Self {
        puffin::profile_function!();

        let cells = grid.cell_count();
        let mut costs = vec![INFINITE; cells];
        let mut frontier: PairingHeap<u32, usize> = PairingHeap::preallocated(cells);

        for y in 1..grid.height as i32 - 1 {
            for x in 1..grid.width as i32 - 1 {
                let Some(tile) = grid.get(x, y) else {
                    continue;
                };
                if policy == CostPolicy::Walker && !tile.tile_type.is_open() {
                    continue;
                }
                let idx = y as usize * grid.width + x as usize;
                frontier.insert_at(NodeHandle::new(idx), INFINITE, idx);
            }
        }

        for &(x, y) in sources {
            let Some(idx) = grid.index(x, y) else {
                continue;
            };
            costs[idx] = 0;
            let handle = NodeHandle::new(idx);
            if frontier.contains(handle) {
                frontier.decrease_key(handle, 0);
            }
        }

        let directions = Direction::scan(diagonal);
        while let Some((cost, idx)) = frontier.extract_min() {
            // Everything left is unreachable
            if cost == INFINITE {
                break;
            }
            let (x, y) = grid.coords(idx);

            for &dir in directions {
                let (nx, ny) = dir.step((x, y));
                let Some(nidx) = grid.index(nx, ny) else {
                    continue;
                };
                let handle = NodeHandle::new(nidx);
                if !frontier.contains(handle) {
                    continue;
                }
                let weight = weights.weight_at(grid, policy, nx, ny);
                if weight == INFINITE {
                    continue;
                }
                if dir.is_diagonal()
                    && policy == CostPolicy::Walker
                    && weights.diagonal_needs_open_space
                {
                    let (dx, dy) = dir.delta();
                    let side_a = weights.weight_at(grid, policy, x + dx, y);
                    let side_b = weights.weight_at(grid, policy, x, y + dy);
                    if side_a == INFINITE && side_b == INFINITE {
                        continue;
                    }
                }

                let candidate = cost.saturating_add(weight);
                if candidate < costs[nidx] {
                    costs[nidx] = candidate;
                    frontier.decrease_key(handle, candidate);
                }
            }
        }

        Self {
            width: grid.width,
            height: grid.height,
            costs,
            policy,
            diagonal,
        }
    }

    /// Field with every cell unreachable
    pub fn unreachable(width: usize, height: usize, policy: CostPolicy, diagonal: bool) -> Self {
        Self {
            width,
            height,
            costs: vec![INFINITE; width * height],
            policy,
            diagonal,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn policy(&self) -> CostPolicy {
        self.policy
    }

    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    pub fn costs(&self) -> &[u32] {
        &self.costs
    }

    /// Cost at a cell, `INFINITE` when out of bounds or unreachable.
    pub fn cost(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return INFINITE;
        }
        self.costs[y as usize * self.width + x as usize]
    }

    pub fn is_reachable(&self, x: i32, y: i32) -> bool {
        self.cost(x, y) != INFINITE
    }

    /// Cheapest reachable neighbor in scan order; the first of equal minima
    /// wins. Returns `None` when every neighbor is unreachable.
    pub fn best_neighbor(&self, from: (i32, i32), directions: &[Direction]) -> Option<(i32, i32)> {
        let mut best = INFINITE;
        let mut pick = None;
        for &dir in directions {
            let next = dir.step(from);
            let cost = self.cost(next.0, next.1);
            if cost < best {
                best = cost;
                pick = Some(next);
            }
        }
        pick
    }
}

// =============================================================================
// GEOMETRY HELPERS
// =============================================================================

pub fn manhattan(from: (i32, i32), to: (i32, i32)) -> i32 {
    (from.0 - to.0).abs() + (from.1 - to.1).abs()
}

/// Bresenham ray between two cells; blocked if any cell strictly between
/// them is rock.
pub fn line_of_sight(grid: &Grid, from: (i32, i32), to: (i32, i32)) -> bool {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = x0;
    let mut y = y0;

    while x != x1 || y != y1 {
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }

        if x == x1 && y == y1 {
            break;
        }

        match grid.get(x, y) {
            Some(tile) if tile.tile_type.is_open() => {}
            _ => return false,
        }
    }

    true
}

use std::fmt;

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::DungeonConfig;
use crate::constants::IMMUTABLE_HARDNESS;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::pathfinding::{CostField, CostPolicy, CostWeights, Direction};
use crate::tile::{Tile, TileType};

/// A rectangle representing a room or partition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Every cell of the rectangle, row by row
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let Rect { x, y, width, height } = *self;
        (y..y + height).flat_map(move |cy| (x..x + width).map(move |cx| (cx, cy)))
    }

    /// This rectangle grown by one cell on every side
    pub fn expanded(&self) -> Rect {
        Rect::new(self.x - 1, self.y - 1, self.width + 2, self.height + 2)
    }

    pub fn random_cell(&self, rng: &mut impl Rng) -> (i32, i32) {
        (
            rng.gen_range(self.x..self.x + self.width),
            rng.gen_range(self.y..self.y + self.height),
        )
    }

    /// Random cell away from the edge when the rectangle is at least 3x3
    pub fn random_inner_cell(&self, rng: &mut impl Rng) -> (i32, i32) {
        if self.width >= 3 && self.height >= 3 {
            Rect::new(self.x + 1, self.y + 1, self.width - 2, self.height - 2).random_cell(rng)
        } else {
            self.random_cell(rng)
        }
    }
}

/// Which dimension of a partition gets cut
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SplitAxis {
    /// Cut into a top and a bottom half
    Height,
    /// Cut into a left and a right half
    Width,
}

/// Why a layout attempt was thrown away
#[derive(Debug)]
enum Rejection {
    RoomPlacement(Rect),
    TooManyRooms,
    RoomCount(usize),
    Coverage(f32),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::RoomPlacement(r) => write!(f, "no room fits partition {:?}", r),
            Rejection::TooManyRooms => write!(f, "too many rooms"),
            Rejection::RoomCount(n) => write!(f, "{} rooms", n),
            Rejection::Coverage(c) => write!(f, "rooms cover only {:.3}", c),
        }
    }
}

/// Result of dungeon generation
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub grid: Grid,
    pub rooms: Vec<Rect>,
    pub stairs_up: (i32, i32),
    pub stairs_down: (i32, i32),
    /// Layout attempts used, including the successful one
    pub attempts: u32,
}

/// Binary space partitioning generator.
///
/// Partitions are split on a work stack until both dimensions fall inside
/// their stop ranges, then a room is fitted inside each. Rooms are joined by
/// corridors carved downhill on a corridor cost field.
pub struct DungeonGenerator<'a> {
    config: &'a DungeonConfig,
    grid: Grid,
    rooms: Vec<Rect>,
}

impl<'a> DungeonGenerator<'a> {
    pub fn new(config: &'a DungeonConfig) -> Self {
        Self {
            config,
            grid: Grid::new(config.width, config.height),
            rooms: Vec::new(),
        }
    }

    /// Generate a full dungeon, retrying whole layouts until one is accepted.
    pub fn generate(
        config: &DungeonConfig,
        weights: &CostWeights,
        rng: &mut impl Rng,
    ) -> Result<GeneratedMap, GenerationError> {
        puffin::profile_function!();

        for attempt in 1..=config.generation_attempts {
            // Each attempt starts from a clean grid
            let mut gen = DungeonGenerator::new(config);
            if let Err(reason) = gen.layout_rooms(rng) {
                trace!("layout attempt {} rejected: {}", attempt, reason);
                continue;
            }

            gen.randomize_hardness(rng);
            gen.connect_rooms(weights, rng);
            let Some((stairs_up, stairs_down)) = place_stairs(&mut gen.grid, &gen.rooms, rng) else {
                trace!("layout attempt {} rejected: no room for stairs", attempt);
                continue;
            };

            return Ok(GeneratedMap {
                grid: gen.grid,
                rooms: gen.rooms,
                stairs_up,
                stairs_down,
                attempts: attempt,
            });
        }

        Err(GenerationError::Exhausted {
            attempts: config.generation_attempts,
        })
    }

    // =========================================================================
    // PARTITIONING
    // =========================================================================

    fn layout_rooms(&mut self, rng: &mut impl Rng) -> Result<(), Rejection> {
        let interior = Rect::new(
            1,
            1,
            self.config.width as i32 - 2,
            self.config.height as i32 - 2,
        );
        let mut stack = vec![interior];

        while let Some(partition) = stack.pop() {
            let Some(axis) = self.choose_split(&partition, rng) else {
                self.place_room(&partition, rng)?;
                continue;
            };

            let (first, second) = self.split(&partition, axis, rng);
            for child in [first, second] {
                if self.needs_split(&child) {
                    stack.push(child);
                } else {
                    self.place_room(&child, rng)?;
                }
            }
        }

        let count = self.rooms.len();
        if count < self.config.min_rooms || count > self.config.max_rooms {
            return Err(Rejection::RoomCount(count));
        }

        let coverage = self.grid.room_cell_count() as f32 / self.grid.cell_count() as f32;
        if coverage <= self.config.room_coverage {
            return Err(Rejection::Coverage(coverage));
        }

        Ok(())
    }

    fn height_in_range(&self, r: &Rect) -> bool {
        (self.config.min_partition_height..=self.config.max_partition_height).contains(&r.height)
    }

    fn width_in_range(&self, r: &Rect) -> bool {
        (self.config.min_partition_width..=self.config.max_partition_width).contains(&r.width)
    }

    fn needs_split(&self, r: &Rect) -> bool {
        !self.height_in_range(r) || !self.width_in_range(r)
    }

    /// Pick the axis to cut, or `None` when the partition should hold a room.
    fn choose_split(&self, r: &Rect, rng: &mut impl Rng) -> Option<SplitAxis> {
        let can_height = !self.height_in_range(r) && r.height >= 2 * self.config.min_partition_height;
        let can_width = !self.width_in_range(r) && r.width >= 2 * self.config.min_partition_width;

        match (can_height, can_width) {
            (false, false) => None,
            (true, false) => Some(SplitAxis::Height),
            (false, true) => Some(SplitAxis::Width),
            (true, true) => {
                let stretch = 1.0 + self.config.split_tolerance;
                if (r.width as f32) * stretch < r.height as f32 {
                    Some(SplitAxis::Height)
                } else if (r.height as f32) * stretch < r.width as f32 {
                    Some(SplitAxis::Width)
                } else if rng.gen_bool(0.5) {
                    Some(SplitAxis::Height)
                } else {
                    Some(SplitAxis::Width)
                }
            }
        }
    }

    fn split(&self, r: &Rect, axis: SplitAxis, rng: &mut impl Rng) -> (Rect, Rect) {
        match axis {
            SplitAxis::Height => {
                let min = self.config.min_partition_height;
                let at = rng.gen_range(min..=r.height - min);
                (
                    Rect::new(r.x, r.y, r.width, at),
                    Rect::new(r.x, r.y + at, r.width, r.height - at),
                )
            }
            SplitAxis::Width => {
                let min = self.config.min_partition_width;
                let at = rng.gen_range(min..=r.width - min);
                (
                    Rect::new(r.x, r.y, at, r.height),
                    Rect::new(r.x + at, r.y, r.width - at, r.height),
                )
            }
        }
    }

    // =========================================================================
    // ROOMS
    // =========================================================================

    fn place_room(&mut self, partition: &Rect, rng: &mut impl Rng) -> Result<(), Rejection> {
        if self.rooms.len() >= self.config.max_rooms {
            return Err(Rejection::TooManyRooms);
        }
        let min_h = self.config.min_room_height;
        let min_w = self.config.min_room_width;
        if partition.height < min_h || partition.width < min_w {
            return Err(Rejection::RoomPlacement(*partition));
        }

        for _ in 0..self.config.room_placement_attempts {
            let height = rng.gen_range(min_h..=partition.height);
            let width = rng.gen_range(min_w..=partition.width);
            let room = Rect::new(
                partition.x + rng.gen_range(0..=partition.width - width),
                partition.y + rng.gen_range(0..=partition.height - height),
                width,
                height,
            );

            if self.is_valid_room(&room) {
                self.carve_room(&room);
                self.rooms.push(room);
                return Ok(());
            }
        }

        Err(Rejection::RoomPlacement(*partition))
    }

    /// The room and its one-cell ring must be untouched rock.
    fn is_valid_room(&self, room: &Rect) -> bool {
        room.expanded().cells().all(|(x, y)| {
            self.grid
                .get(x, y)
                .is_some_and(|t| t.tile_type == TileType::Rock)
        })
    }

    fn carve_room(&mut self, room: &Rect) {
        for (x, y) in room.cells() {
            if let Some(tile) = self.grid.get_mut(x, y) {
                tile.open_as(TileType::Room);
            }
        }
    }

    fn randomize_hardness(&mut self, rng: &mut impl Rng) {
        let (min, max) = (self.config.min_rock_hardness, self.config.max_rock_hardness);
        for y in 1..self.grid.height as i32 - 1 {
            for x in 1..self.grid.width as i32 - 1 {
                if let Some(tile) = self.grid.get_mut(x, y) {
                    if tile.tile_type == TileType::Rock {
                        let jitter = rng.gen_range(min..=max);
                        tile.hardness = tile.hardness.saturating_add(jitter).min(IMMUTABLE_HARDNESS - 1);
                    }
                }
            }
        }
    }

    // =========================================================================
    // CORRIDORS
    // =========================================================================

    /// Chain every room to the next along a random permutation.
    fn connect_rooms(&mut self, weights: &CostWeights, rng: &mut impl Rng) {
        let mut order: Vec<usize> = (0..self.rooms.len()).collect();
        order.shuffle(rng);

        for pair in order.windows(2) {
            let from = self.rooms[pair[0]].random_cell(rng);
            let to = self.rooms[pair[1]].random_cell(rng);
            if carve_corridor(&mut self.grid, from, to, weights).is_none() {
                trace!("corridor {:?} -> {:?} never reached its source", from, to);
            }
        }
    }
}

/// Carve a corridor by walking downhill from `to` on a 4-way corridor field
/// rooted at `from`, turning rock into corridor along the way.
///
/// Returns the number of steps taken, or `None` if the walk stalled or ran
/// past the cell count without arriving.
pub fn carve_corridor(
    grid: &mut Grid,
    from: (i32, i32),
    to: (i32, i32),
    weights: &CostWeights,
) -> Option<usize> {
    let field = CostField::generate(grid, &[from], false, CostPolicy::Corridor, weights);
    let directions = Direction::scan(false);

    let mut current = to;
    for steps in 0..=grid.cell_count() {
        if let Some(tile) = grid.get_mut(current.0, current.1) {
            if tile.tile_type == TileType::Rock {
                tile.open_as(TileType::Corridor);
            }
        }
        if current == from {
            return Some(steps);
        }
        current = field.best_neighbor(current, directions)?;
    }

    None
}

/// Put an up stair and a down stair in two different rooms.
/// Returns `None` with fewer than two rooms.
pub fn place_stairs(
    grid: &mut Grid,
    rooms: &[Rect],
    rng: &mut impl Rng,
) -> Option<((i32, i32), (i32, i32))> {
    if rooms.len() < 2 {
        return None;
    }

    let up_room = rng.gen_range(0..rooms.len());
    let mut down_room = rng.gen_range(0..rooms.len() - 1);
    if down_room >= up_room {
        down_room += 1;
    }

    let up = rooms[up_room].random_inner_cell(rng);
    let down = rooms[down_room].random_inner_cell(rng);
    set_stair(grid, up, TileType::StairUp);
    set_stair(grid, down, TileType::StairDown);
    Some((up, down))
}

fn set_stair(grid: &mut Grid, (x, y): (i32, i32), stair: TileType) {
    if let Some(tile) = grid.get_mut(x, y) {
        *tile = Tile {
            occupant: tile.occupant,
            ..Tile::new(stair, 0)
        };
    }
}

//! Dungeon generation constants.

/// Default dungeon height in cells, border included
pub const DUNGEON_DEFAULT_HEIGHT: usize = 21;
/// Default dungeon width in cells, border included
pub const DUNGEON_DEFAULT_WIDTH: usize = 80;

/// Fraction of the grid that room cells must exceed for a layout to be kept
pub const DUNGEON_ROOM_COVERAGE: f32 = 0.1;
/// Fewest rooms an accepted layout may have
pub const DUNGEON_MIN_ROOMS: usize = 3;
/// Most rooms an accepted layout may have
pub const DUNGEON_MAX_ROOMS: usize = 10;

/// Minimum room height
pub const DUNGEON_MIN_ROOM_HEIGHT: i32 = 4;
/// Minimum room width
pub const DUNGEON_MIN_ROOM_WIDTH: i32 = 7;

/// Partitions stop splitting once their height is within this range
pub const DUNGEON_MIN_PARTITION_HEIGHT: i32 = 7;
pub const DUNGEON_MAX_PARTITION_HEIGHT: i32 = 13;
/// Partitions stop splitting once their width is within this range
pub const DUNGEON_MIN_PARTITION_WIDTH: i32 = 13;
pub const DUNGEON_MAX_PARTITION_WIDTH: i32 = 27;

/// How much longer one side must be than the other before it is forced to split
pub const DUNGEON_SPLIT_TOLERANCE: f32 = 0.25;

/// Attempts at fitting a room inside one partition
pub const DUNGEON_ROOM_PLACEMENT_ATTEMPTS: u32 = 2000;
/// Attempts at producing a whole acceptable layout
pub const DUNGEON_GENERATION_ATTEMPTS: u32 = 2000;

/// Lowest jitter added to rock hardness
pub const MIN_ROCK_HARDNESS: u8 = 1;
/// Highest jitter added to rock hardness
pub const MAX_ROCK_HARDNESS: u8 = 254;
/// Hardness of cells that can never be tunneled or carved
pub const IMMUTABLE_HARDNESS: u8 = 255;
/// Hardness of rooms, corridors and stairs
pub const OPEN_HARDNESS: u8 = 0;

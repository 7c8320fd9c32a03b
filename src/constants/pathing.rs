//! Cost field weighting constants.

/// Corridors bucket rock hardness into levels instead of a flat rock weight
pub const CORRIDOR_USE_HARDNESS: bool = true;
/// Number of hardness buckets seen by the corridor carver
pub const CORRIDOR_HARDNESS_LEVELS: u32 = 6;
/// Extra weight of crossing a room while carving
pub const CORRIDOR_ROOM_WEIGHT: u32 = 1;
/// Extra weight of crossing rock while carving (flat mode only)
pub const CORRIDOR_ROCK_WEIGHT: u32 = 5;
/// Extra weight of reusing an existing corridor while carving
pub const CORRIDOR_CORRIDOR_WEIGHT: u32 = 0;

/// Number of hardness buckets seen by tunneling monsters
pub const TUNNEL_HARDNESS_LEVELS: u32 = 3;

/// Walkers may only cut a corner diagonally when one orthogonal cell is open
pub const DIAGONAL_NEEDS_OPEN_SPACE: bool = true;

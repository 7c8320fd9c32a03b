//! Player and monster constants.

/// Monsters spawned when nothing else is requested
pub const DEFAULT_MONSTER_COUNT: usize = 10;

/// Player speed
pub const PLAYER_SPEED: u32 = 10;
/// Slowest monster speed
pub const MIN_MONSTER_SPEED: u32 = 5;
/// Fastest monster speed
pub const MAX_MONSTER_SPEED: u32 = 20;

/// Actors may move diagonally
pub const ACTOR_DIAGONAL_MOVEMENT: bool = true;

/// Attempts at finding a free cell for a single monster
pub const MONSTER_PLACEMENT_ATTEMPTS: u32 = 2000;

/// Hardness removed each time a tunneler digs into a cell
pub const TUNNEL_DECREMENT: u8 = 85;

/// Glyph drawn for the player
pub const PLAYER_GLYPH: char = '@';

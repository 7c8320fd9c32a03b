//! Turn scheduling constants.

/// Scheduler time units per turn; an actor waits `GAME_TICK / speed` between turns
pub const GAME_TICK: u64 = 1000;

/// Frames drawn per second by the console sink
pub const FRAMES_PER_SECOND: u32 = 4;

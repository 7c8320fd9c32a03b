//! Save file locations and on-disk format constants

/// Save directory, relative to the home directory
pub const SAVE_DIRECTORY: &str = ".rlg327";
pub const DEFAULT_DUNGEON_FILE: &str = "dungeon";
pub const DEFAULT_PGM_FILE: &str = "dungeon.pgm";

/// Binary dungeon header
pub const FILE_MARKER: &[u8; 12] = b"RLG327-S2021";
pub const FILE_VERSION: u32 = 0;

/// Files larger than this are rejected unless the configured grid needs more
pub const MAX_DUNGEON_FILE_SIZE: usize = 11788;
pub const MAX_PGM_FILE_SIZE: usize = 4096;

pub const PGM_MAGIC: &str = "P5";
pub const PGM_COMMENT: &str = "# CREATOR: CS327 RLG";
pub const PGM_MAX_VALUE: u8 = 255;
pub const PGM_CORRIDOR_VALUE: u8 = 255;
pub const PGM_ROOM_VALUE: u8 = 0;

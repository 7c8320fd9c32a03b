//! Error types for every fallible layer, plus the process exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Process exit statuses
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const INVALID_ARGUMENT: i32 = 1;
    /// Reserved: allocation failure aborts before we could report it
    pub const MEM_FAILURE: i32 = 2;
    pub const DUNGEON_GENERATION_FAILURE: i32 = 3;
    pub const INVALID_STATE: i32 = 4;
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no valid dungeon after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Failure to read a dungeon file. Never fatal: the caller falls back to generation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file marker")]
    InvalidMarker,

    #[error("unsupported file version {0}")]
    UnsupportedVersion(u32),

    #[error("file is {actual} bytes, header says {declared}")]
    SizeMismatch { declared: u32, actual: usize },

    #[error("file exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error("file ends early while reading {0}")]
    Truncated(&'static str),

    #[error("malformed PGM: {0}")]
    MalformedPgm(String),

    #[error("PGM is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// A loaded layout breaks a structural rule of the dungeon.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("grid is {width}x{height}, expected {expected_width}x{expected_height}")]
    WrongSize {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("border cell ({x}, {y}) is not immutable")]
    MutableBorder { x: i32, y: i32 },

    #[error("layout has no rooms")]
    NoRooms,

    #[error("room {index} leaves the interior")]
    RoomOutOfBounds { index: usize },

    #[error("room {index} covers hard cell ({x}, {y})")]
    RoomNotOpen { index: usize, x: i32, y: i32 },

    #[error("stair at ({x}, {y}) is not on an open interior cell")]
    BadStair { x: i32, y: i32 },

    #[error("player at ({x}, {y}) is inside rock")]
    PlayerInRock { x: i32, y: i32 },
}

/// Top-level error reported by the binary.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("cannot save dungeon: {0}")]
    Save(#[source] std::io::Error),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl GameError {
    pub fn exit_code(&self) -> i32 {
        match self {
            GameError::Config(_) => exit_codes::INVALID_ARGUMENT,
            GameError::Generation(_) => exit_codes::DUNGEON_GENERATION_FAILURE,
            GameError::Save(_) | GameError::InvalidState(_) => exit_codes::INVALID_STATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let err = GameError::from(GenerationError::Exhausted { attempts: 3 });
        assert_eq!(err.exit_code(), exit_codes::DUNGEON_GENERATION_FAILURE);
        let err = GameError::from(ConfigError::Invalid("bad".into()));
        assert_eq!(err.exit_code(), exit_codes::INVALID_ARGUMENT);
        assert_eq!(GameError::InvalidState("x".into()).exit_code(), exit_codes::INVALID_STATE);
    }

    #[test]
    fn test_messages() {
        let err = GenerationError::Exhausted { attempts: 2000 };
        assert_eq!(err.to_string(), "no valid dungeon after 2000 attempts");
        let err = LoadError::from(LayoutError::NoRooms);
        assert_eq!(err.to_string(), "layout has no rooms");
    }
}

//! Dungeon files: the binary save format and PGM hardness maps.
//!
//! Binary layout (all integers big-endian):
//!
//! | field            | size                  |
//! |------------------|-----------------------|
//! | marker           | 12 bytes              |
//! | version          | u32                   |
//! | file size        | u32                   |
//! | player x, y      | 2 x u8                |
//! | hardness         | height x width x u8   |
//! | room count       | u16                   |
//! | rooms            | count x (x, y, w, h)  |
//! | up stair count   | u16                   |
//! | up stairs        | count x (x, y)        |
//! | down stair count | u16                   |
//! | down stairs      | count x (x, y)        |
//!
//! Loaders produce a `DungeonLayout` that has already passed validation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::constants::{
    DEFAULT_DUNGEON_FILE, DEFAULT_PGM_FILE, FILE_MARKER, FILE_VERSION, MAX_DUNGEON_FILE_SIZE,
    MAX_PGM_FILE_SIZE, PGM_COMMENT, PGM_CORRIDOR_VALUE, PGM_MAGIC, PGM_MAX_VALUE, PGM_ROOM_VALUE,
    SAVE_DIRECTORY,
};
use crate::dungeon::{Dungeon, DungeonLayout};
use crate::dungeon_gen::Rect;
use crate::error::{LayoutError, LoadError};
use crate::grid::Grid;
use crate::tile::{Tile, TileType};

// =============================================================================
// PATHS
// =============================================================================

/// `~/.rlg327`, or `None` when there is no home directory
pub fn default_save_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SAVE_DIRECTORY))
}

pub fn default_dungeon_path() -> Option<PathBuf> {
    default_save_dir().map(|dir| dir.join(DEFAULT_DUNGEON_FILE))
}

pub fn default_pgm_path() -> Option<PathBuf> {
    default_save_dir().map(|dir| dir.join(DEFAULT_PGM_FILE))
}

/// Largest binary file a grid of this size can produce: every interior cell
/// a 1x1 room holding a stair.
fn dungeon_size_limit(width: usize, height: usize) -> usize {
    let interior = width.saturating_sub(2) * height.saturating_sub(2);
    let fixed = FILE_MARKER.len() + 4 + 4 + 2 + 2 * 3;
    MAX_DUNGEON_FILE_SIZE.max(fixed + width * height + interior * 6)
}

fn pgm_size_limit(width: usize, height: usize) -> usize {
    MAX_PGM_FILE_SIZE.max(width * height + 64)
}

fn read_limited(path: &Path, max: usize) -> Result<Vec<u8>, LoadError> {
    if fs::metadata(path)?.len() > max as u64 {
        return Err(LoadError::TooLarge { max });
    }
    Ok(fs::read(path)?)
}

fn write_creating_dirs(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

// =============================================================================
// BINARY FORMAT
// =============================================================================

/// Bounds-checked big-endian cursor
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], LoadError> {
        let end = self.pos + len;
        let slice = self.bytes.get(self.pos..end).ok_or(LoadError::Truncated(what))?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, LoadError> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &'static str) -> Result<u16, LoadError> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, LoadError> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn point(&mut self, what: &'static str) -> Result<(i32, i32), LoadError> {
        let x = self.u8(what)? as i32;
        let y = self.u8(what)? as i32;
        Ok((x, y))
    }
}

/// Parse a binary dungeon for a grid of the given size.
pub fn decode_dungeon(bytes: &[u8], width: usize, height: usize) -> Result<DungeonLayout, LoadError> {
    let max = dungeon_size_limit(width, height);
    if bytes.len() > max {
        return Err(LoadError::TooLarge { max });
    }

    let mut reader = Reader::new(bytes);
    if reader.take(FILE_MARKER.len(), "marker")? != FILE_MARKER {
        return Err(LoadError::InvalidMarker);
    }
    let version = reader.u32("version")?;
    if version != FILE_VERSION {
        return Err(LoadError::UnsupportedVersion(version));
    }
    let declared = reader.u32("file size")?;
    if declared as usize != bytes.len() {
        return Err(LoadError::SizeMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let player = reader.point("player position")?;

    let mut grid = Grid::new(width, height);
    let hardness = reader.take(width * height, "hardness map")?;
    for (tile, &h) in grid.tiles.iter_mut().zip(hardness) {
        *tile = if h == 0 {
            Tile::new(TileType::Corridor, 0)
        } else {
            Tile::rock(h)
        };
    }

    let room_count = reader.u16("room count")?;
    let mut rooms = Vec::with_capacity(room_count as usize);
    for _ in 0..room_count {
        let b = reader.take(4, "rooms")?;
        let room = Rect::new(b[0] as i32, b[1] as i32, b[2] as i32, b[3] as i32);
        for (x, y) in room.cells() {
            if let Some(tile) = grid.get_mut(x, y) {
                if tile.hardness == 0 {
                    tile.tile_type = TileType::Room;
                }
            }
        }
        rooms.push(room);
    }

    for stair in [TileType::StairUp, TileType::StairDown] {
        let count = reader.u16("stair count")?;
        for _ in 0..count {
            let (x, y) = reader.point("stairs")?;
            let tile = grid.get_mut(x, y).ok_or(LayoutError::BadStair { x, y })?;
            tile.tile_type = stair;
        }
    }

    let layout = DungeonLayout {
        grid,
        rooms,
        player: Some(player),
    };
    layout.validate(width, height)?;
    Ok(layout)
}

/// Serialize a dungeon into the binary format.
pub fn encode_dungeon(dungeon: &Dungeon) -> Vec<u8> {
    let grid = &dungeon.grid;
    let (up, down) = dungeon.stairs();
    let (px, py) = dungeon.player_position().map(|p| p.as_tuple()).unwrap_or_default();

    let size = FILE_MARKER.len()
        + 4
        + 4
        + 2
        + grid.cell_count()
        + 2
        + dungeon.rooms.len() * 4
        + 2
        + up.len() * 2
        + 2
        + down.len() * 2;

    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(FILE_MARKER);
    out.extend_from_slice(&FILE_VERSION.to_be_bytes());
    out.extend_from_slice(&(size as u32).to_be_bytes());
    out.extend_from_slice(&[px as u8, py as u8]);
    out.extend(grid.tiles.iter().map(|t| t.hardness));

    out.extend_from_slice(&(dungeon.rooms.len() as u16).to_be_bytes());
    for room in &dungeon.rooms {
        out.extend_from_slice(&[room.x as u8, room.y as u8, room.width as u8, room.height as u8]);
    }

    for stairs in [&up, &down] {
        out.extend_from_slice(&(stairs.len() as u16).to_be_bytes());
        for &(x, y) in stairs {
            out.extend_from_slice(&[x as u8, y as u8]);
        }
    }

    debug_assert_eq!(out.len(), size);
    out
}

pub fn load_dungeon(path: &Path, width: usize, height: usize) -> Result<DungeonLayout, LoadError> {
    let bytes = read_limited(path, dungeon_size_limit(width, height))?;
    let layout = decode_dungeon(&bytes, width, height)?;
    info!("loaded dungeon from {} ({} rooms)", path.display(), layout.rooms.len());
    Ok(layout)
}

pub fn save_dungeon(dungeon: &Dungeon, path: &Path) -> io::Result<()> {
    write_creating_dirs(path, &encode_dungeon(dungeon))?;
    info!("saved dungeon to {}", path.display());
    Ok(())
}

// =============================================================================
// PGM FORMAT
// =============================================================================

/// Split off the next header token, skipping whitespace and `#` comments.
/// Returns the token and the offset just past it.
fn pgm_token(bytes: &[u8], mut pos: usize) -> Result<(&str, usize), LoadError> {
    loop {
        match bytes.get(pos) {
            Some(b) if b.is_ascii_whitespace() => pos += 1,
            Some(b'#') => {
                while bytes.get(pos).is_some_and(|&b| b != b'\n') {
                    pos += 1;
                }
            }
            Some(_) => break,
            None => return Err(LoadError::Truncated("PGM header")),
        }
    }

    let start = pos;
    while bytes.get(pos).is_some_and(|b| !b.is_ascii_whitespace()) {
        pos += 1;
    }
    let token = std::str::from_utf8(&bytes[start..pos])
        .map_err(|_| LoadError::MalformedPgm("header is not ASCII".into()))?;
    Ok((token, pos))
}

fn pgm_number(bytes: &[u8], pos: usize, what: &str) -> Result<(usize, usize), LoadError> {
    let (token, pos) = pgm_token(bytes, pos)?;
    let value = token
        .parse::<usize>()
        .map_err(|_| LoadError::MalformedPgm(format!("bad {}: {:?}", what, token)))?;
    Ok((value, pos))
}

/// Parse a PGM hardness map. The image covers the interior only; the border
/// is added here. Every room pixel becomes its own 1x1 room.
pub fn decode_pgm(bytes: &[u8], width: usize, height: usize) -> Result<DungeonLayout, LoadError> {
    let max = pgm_size_limit(width, height);
    if bytes.len() > max {
        return Err(LoadError::TooLarge { max });
    }

    let (magic, pos) = pgm_token(bytes, 0)?;
    if magic != PGM_MAGIC {
        return Err(LoadError::MalformedPgm(format!("bad magic {:?}", magic)));
    }
    let (image_width, pos) = pgm_number(bytes, pos, "width")?;
    let (image_height, pos) = pgm_number(bytes, pos, "height")?;
    let (max_value, pos) = pgm_number(bytes, pos, "max value")?;
    if max_value != PGM_MAX_VALUE as usize {
        return Err(LoadError::MalformedPgm(format!("max value {} is not {}", max_value, PGM_MAX_VALUE)));
    }
    if image_width.checked_add(2) != Some(width) || image_height.checked_add(2) != Some(height) {
        return Err(LoadError::DimensionMismatch {
            width: image_width.saturating_add(2),
            height: image_height.saturating_add(2),
            expected_width: width,
            expected_height: height,
        });
    }

    // Exactly one whitespace byte separates the header from the pixels
    let start = pos + 1;
    let pixels = image_width
        .checked_mul(image_height)
        .and_then(|len| start.checked_add(len))
        .and_then(|end| bytes.get(start..end))
        .ok_or(LoadError::Truncated("PGM pixels"))?;

    let mut grid = Grid::new(width, height);
    let mut rooms = Vec::new();
    for (i, &value) in pixels.iter().enumerate() {
        let x = (i % image_width) as i32 + 1;
        let y = (i / image_width) as i32 + 1;
        let tile = match value {
            PGM_CORRIDOR_VALUE => Tile::new(TileType::Corridor, 0),
            PGM_ROOM_VALUE => {
                rooms.push(Rect::new(x, y, 1, 1));
                Tile::new(TileType::Room, 0)
            }
            hardness => Tile::rock(hardness),
        };
        if let Some(cell) = grid.get_mut(x, y) {
            *cell = tile;
        }
    }

    let layout = DungeonLayout {
        grid,
        rooms,
        player: None,
    };
    layout.validate(width, height)?;
    Ok(layout)
}

/// Render the interior of a grid as a PGM image.
pub fn encode_pgm(grid: &Grid) -> Vec<u8> {
    let (w, h) = (grid.width.saturating_sub(2), grid.height.saturating_sub(2));
    let mut out = format!("{}\n{}\n{} {}\n{}\n", PGM_MAGIC, PGM_COMMENT, w, h, PGM_MAX_VALUE).into_bytes();
    out.reserve(w * h);

    for y in 1..=h as i32 {
        for x in 1..=w as i32 {
            let value = match grid.get(x, y) {
                Some(tile) if tile.tile_type.is_room_like() => PGM_ROOM_VALUE,
                Some(tile) if tile.tile_type == TileType::Corridor => PGM_CORRIDOR_VALUE,
                // Keep rock out of the values reserved for rooms and corridors
                Some(tile) => tile.hardness.clamp(PGM_ROOM_VALUE + 1, PGM_CORRIDOR_VALUE - 1),
                None => PGM_ROOM_VALUE + 1,
            };
            out.push(value);
        }
    }
    out
}

pub fn load_pgm(path: &Path, width: usize, height: usize) -> Result<DungeonLayout, LoadError> {
    let bytes = read_limited(path, pgm_size_limit(width, height))?;
    let layout = decode_pgm(&bytes, width, height)?;
    info!("loaded PGM from {} ({} room cells)", path.display(), layout.rooms.len());
    Ok(layout)
}

pub fn save_pgm(grid: &Grid, path: &Path) -> io::Result<()> {
    write_creating_dirs(path, &encode_pgm(grid))?;
    info!("saved PGM to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::initialize_dungeon;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dungeon(seed: u64) -> Dungeon {
        let mut config = GameConfig::default();
        config.actors.monster_count = 0;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        initialize_dungeon(&config, None, &mut rng).unwrap()
    }

    fn dims(d: &Dungeon) -> (usize, usize) {
        (d.grid.width, d.grid.height)
    }

    /// Hand-built 6x5 file: one 2x2 room, one stair of each kind
    fn small_file() -> Vec<u8> {
        let (w, h) = (6usize, 5usize);
        let mut hardness = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    hardness[y * w + x] = 255;
                } else if x == 4 {
                    hardness[y * w + x] = 50;
                }
            }
        }
        let mut out = Vec::new();
        out.extend_from_slice(FILE_MARKER);
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&[1, 1]);
        out.extend_from_slice(&hardness);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[1, 1, 2, 2]);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[2, 2]);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[3, 3]);
        let size = out.len() as u32;
        out[16..20].copy_from_slice(&size.to_be_bytes());
        out
    }

    #[test]
    fn test_decode_hand_built_file() {
        let layout = decode_dungeon(&small_file(), 6, 5).unwrap();
        let grid = &layout.grid;
        assert_eq!(layout.player, Some((1, 1)));
        assert_eq!(layout.rooms, vec![Rect::new(1, 1, 2, 2)]);
        assert_eq!(grid.tile_type(1, 1), Some(TileType::Room));
        assert_eq!(grid.tile_type(2, 2), Some(TileType::StairUp));
        assert_eq!(grid.tile_type(3, 3), Some(TileType::StairDown));
        // Zero hardness outside any room is a corridor
        assert_eq!(grid.tile_type(3, 1), Some(TileType::Corridor));
        assert_eq!(grid.tile_type(4, 2), Some(TileType::Rock));
        assert_eq!(grid.hardness(4, 2), Some(50));
    }

    #[test]
    fn test_binary_round_trip_preserves_terrain() {
        let d = dungeon(21);
        let (w, h) = dims(&d);
        let layout = decode_dungeon(&encode_dungeon(&d), w, h).unwrap();

        assert_eq!(layout.rooms, d.rooms);
        assert_eq!(layout.player, d.player_position().map(|p| p.as_tuple()));
        for (a, b) in layout.grid.tiles.iter().zip(&d.grid.tiles) {
            assert_eq!(a.tile_type, b.tile_type);
            assert_eq!(a.hardness, b.hardness);
        }
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = small_file();
        bytes[0] = b'X';
        assert!(matches!(decode_dungeon(&bytes, 6, 5), Err(LoadError::InvalidMarker)));

        let mut bytes = small_file();
        bytes[15] = 1;
        assert!(matches!(decode_dungeon(&bytes, 6, 5), Err(LoadError::UnsupportedVersion(1))));

        let mut bytes = small_file();
        bytes.push(0);
        assert!(matches!(decode_dungeon(&bytes, 6, 5), Err(LoadError::SizeMismatch { .. })));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let bytes = small_file();
        let cut = &bytes[..30];
        assert!(matches!(decode_dungeon(cut, 6, 5), Err(LoadError::SizeMismatch { .. })));

        // Consistent size field but missing the stair section
        let mut cut = bytes[..bytes.len() - 6].to_vec();
        let size = cut.len() as u32;
        cut[16..20].copy_from_slice(&size.to_be_bytes());
        assert!(matches!(decode_dungeon(&cut, 6, 5), Err(LoadError::Truncated(_))));
    }

    #[test]
    fn test_rejects_structural_violations() {
        // Mutable border
        let mut bytes = small_file();
        bytes[22] = 10;
        assert!(matches!(
            decode_dungeon(&bytes, 6, 5),
            Err(LoadError::Layout(LayoutError::MutableBorder { x: 0, y: 0 }))
        ));

        // Player inside rock
        let mut bytes = small_file();
        bytes[20] = 4;
        assert!(matches!(
            decode_dungeon(&bytes, 6, 5),
            Err(LoadError::Layout(LayoutError::PlayerInRock { x: 4, y: 1 }))
        ));
    }

    #[test]
    fn test_rejects_oversized_input() {
        let bytes = vec![0u8; MAX_DUNGEON_FILE_SIZE + 1];
        assert!(matches!(decode_dungeon(&bytes, 6, 5), Err(LoadError::TooLarge { .. })));
    }

    #[test]
    fn test_pgm_round_trip() {
        let d = dungeon(5);
        let (w, h) = dims(&d);
        let layout = decode_pgm(&encode_pgm(&d.grid), w, h).unwrap();

        assert_eq!(layout.rooms.len(), d.grid.room_cell_count());
        for (a, b) in layout.grid.tiles.iter().zip(&d.grid.tiles) {
            match b.tile_type {
                // Stairs come back as plain room cells
                t if t.is_room_like() => assert_eq!(a.tile_type, TileType::Room),
                t => assert_eq!(a.tile_type, t),
            }
            assert_eq!(a.hardness, b.hardness);
        }
    }

    #[test]
    fn test_pgm_header_with_comments() {
        let mut bytes = b"P5\n# first\n# second\n3 2\n255\n".to_vec();
        bytes.extend_from_slice(&[0, 255, 80, 80, 255, 0]);
        let layout = decode_pgm(&bytes, 5, 4).unwrap();
        assert_eq!(layout.rooms, vec![Rect::new(1, 1, 1, 1), Rect::new(3, 2, 1, 1)]);
        assert_eq!(layout.grid.tile_type(2, 1), Some(TileType::Corridor));
        assert_eq!(layout.grid.hardness(1, 2), Some(80));
        assert!(layout.grid.get(0, 0).unwrap().is_immutable());
    }

    #[test]
    fn test_pgm_rejections() {
        let mut bytes = b"P5\n3 2\n255\n".to_vec();
        bytes.extend_from_slice(&[0, 255, 80, 80, 255, 0]);
        assert!(matches!(decode_pgm(&bytes, 6, 4), Err(LoadError::DimensionMismatch { .. })));

        let bytes = b"P2\n3 2\n255\n".to_vec();
        assert!(matches!(decode_pgm(&bytes, 5, 4), Err(LoadError::MalformedPgm(_))));

        let mut bytes = b"P5\n3 2\n100\n".to_vec();
        bytes.extend_from_slice(&[0; 6]);
        assert!(matches!(decode_pgm(&bytes, 5, 4), Err(LoadError::MalformedPgm(_))));

        let mut bytes = b"P5\n3 2\n255\n".to_vec();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(decode_pgm(&bytes, 5, 4), Err(LoadError::Truncated(_))));

        // All rock: no rooms
        let mut bytes = b"P5\n3 2\n255\n".to_vec();
        bytes.extend_from_slice(&[9; 6]);
        assert!(matches!(
            decode_pgm(&bytes, 5, 4),
            Err(LoadError::Layout(LayoutError::NoRooms))
        ));
    }

    #[test]
    fn test_pgm_huge_dimensions_are_rejected() {
        let bytes = b"P5\n18446744073709551615 2\n255\n\0";
        assert!(matches!(decode_pgm(bytes, 80, 21), Err(LoadError::DimensionMismatch { .. })));

        let bytes = b"P5\n78 18446744073709551615\n255\n\0";
        assert!(matches!(decode_pgm(bytes, 80, 21), Err(LoadError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_save_and_load_files() {
        let d = dungeon(33);
        let (w, h) = dims(&d);
        let dir = std::env::temp_dir().join(format!("rogue-dungeon-test-{}", std::process::id()));
        let bin = dir.join("nested").join(DEFAULT_DUNGEON_FILE);
        let pgm = dir.join(DEFAULT_PGM_FILE);

        save_dungeon(&d, &bin).unwrap();
        save_pgm(&d.grid, &pgm).unwrap();
        assert_eq!(load_dungeon(&bin, w, h).unwrap().rooms, d.rooms);
        assert!(!load_pgm(&pgm, w, h).unwrap().rooms.is_empty());
        assert!(matches!(load_dungeon(&dir.join("missing"), w, h), Err(LoadError::Io(_))));

        let _ = fs::remove_dir_all(&dir);
    }
}

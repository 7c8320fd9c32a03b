use crate::constants::{IMMUTABLE_HARDNESS, OPEN_HARDNESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    Rock,
    Room,
    Corridor,
    StairUp,
    StairDown,
}

impl TileType {
    /// Anything a non-tunneling actor can stand on
    pub fn is_open(&self) -> bool {
        !matches!(self, TileType::Rock)
    }

    /// Rooms and the stairs placed inside them
    pub fn is_room_like(&self) -> bool {
        matches!(self, TileType::Room | TileType::StairUp | TileType::StairDown)
    }

    pub fn is_stair(&self) -> bool {
        matches!(self, TileType::StairUp | TileType::StairDown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub tile_type: TileType,
    /// 0 is freely passable, 255 can never be dug
    pub hardness: u8,
    /// Actor standing on this cell, if any
    pub occupant: Option<hecs::Entity>,
}

impl Tile {
    pub fn new(tile_type: TileType, hardness: u8) -> Self {
        Self {
            tile_type,
            hardness,
            occupant: None,
        }
    }

    pub fn rock(hardness: u8) -> Self {
        Self::new(TileType::Rock, hardness)
    }

    pub fn is_immutable(&self) -> bool {
        self.hardness == IMMUTABLE_HARDNESS
    }

    /// Convert to an open cell of the given type with zero hardness.
    /// Immutable cells are left alone.
    pub fn open_as(&mut self, tile_type: TileType) {
        if self.is_immutable() {
            return;
        }
        self.tile_type = tile_type;
        self.hardness = OPEN_HARDNESS;
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::rock(OPEN_HARDNESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_as_clears_hardness() {
        let mut tile = Tile::rock(120);
        tile.open_as(TileType::Corridor);
        assert_eq!(tile.tile_type, TileType::Corridor);
        assert_eq!(tile.hardness, 0);
    }

    #[test]
    fn test_open_as_skips_immutable() {
        let mut tile = Tile::rock(IMMUTABLE_HARDNESS);
        tile.open_as(TileType::Corridor);
        assert_eq!(tile.tile_type, TileType::Rock);
        assert!(tile.is_immutable());
    }

    #[test]
    fn test_stairs_count_as_room() {
        assert!(TileType::StairUp.is_room_like());
        assert!(TileType::StairDown.is_open());
        assert!(!TileType::Corridor.is_room_like());
        assert!(!TileType::Rock.is_open());
    }
}

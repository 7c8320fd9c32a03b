use crate::constants::{IMMUTABLE_HARDNESS, OPEN_HARDNESS};
use crate::tile::{Tile, TileType};

/// Fixed-size map of tiles, row-major.
///
/// The outer ring is immutable rock; everything inside it is the interior.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
}

impl Grid {
    /// Solid rock with an immutable border and zero-hardness interior.
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Self {
            width,
            height,
            tiles: vec![Tile::rock(OPEN_HARDNESS); width * height],
        };
        grid.seal_border();
        grid
    }

    /// Force every border cell back to immutable rock.
    pub fn seal_border(&mut self) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.is_border(x, y) {
                    let tile = &mut self.tiles[y as usize * self.width + x as usize];
                    tile.tile_type = TileType::Rock;
                    tile.hardness = IMMUTABLE_HARDNESS;
                }
            }
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    pub fn is_border(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y)
            && (x == 0 || y == 0 || x == self.width as i32 - 1 || y == self.height as i32 - 1)
    }

    pub fn is_interior(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.width as i32 - 1 && y < self.height as i32 - 1
    }

    /// Row-major index of an in-bounds cell
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn coords(&self, index: usize) -> (i32, i32) {
        ((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&self.tiles[y as usize * self.width + x as usize])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&mut self.tiles[y as usize * self.width + x as usize])
    }

    pub fn tile_type(&self, x: i32, y: i32) -> Option<TileType> {
        self.get(x, y).map(|t| t.tile_type)
    }

    pub fn hardness(&self, x: i32, y: i32) -> Option<u8> {
        self.get(x, y).map(|t| t.hardness)
    }

    pub fn occupant(&self, x: i32, y: i32) -> Option<hecs::Entity> {
        self.get(x, y).and_then(|t| t.occupant)
    }

    /// Number of cells that are rooms (including stairs)
    pub fn room_cell_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.tile_type.is_room_like()).count()
    }

    /// Remove every occupant reference.
    pub fn clear_occupants(&mut self) {
        for tile in &mut self.tiles {
            tile.occupant = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_has_immutable_border() {
        let grid = Grid::new(10, 6);
        for y in 0..6 {
            for x in 0..10 {
                let tile = grid.get(x, y).unwrap();
                assert_eq!(tile.tile_type, TileType::Rock);
                if grid.is_border(x, y) {
                    assert_eq!(tile.hardness, IMMUTABLE_HARDNESS);
                } else {
                    assert_eq!(tile.hardness, 0);
                }
            }
        }
    }

    #[test]
    fn test_bounds_and_interior() {
        let grid = Grid::new(5, 4);
        assert!(grid.get(-1, 0).is_none());
        assert!(grid.get(5, 0).is_none());
        assert!(grid.get(4, 3).is_some());
        assert!(grid.is_interior(1, 1));
        assert!(grid.is_interior(3, 2));
        assert!(!grid.is_interior(4, 2));
        assert!(!grid.is_interior(0, 1));
    }

    #[test]
    fn test_index_round_trip() {
        let grid = Grid::new(7, 5);
        let idx = grid.index(3, 2).unwrap();
        assert_eq!(idx, 2 * 7 + 3);
        assert_eq!(grid.coords(idx), (3, 2));
        assert!(grid.index(7, 0).is_none());
    }
}

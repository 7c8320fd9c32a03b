//! Plain-text rendering of the map and of cost fields.

use std::io::Write;
use std::thread;
use std::time::Duration;

use log::warn;

use crate::components::Glyph;
use crate::dungeon::Dungeon;
use crate::engine::FrameSink;
use crate::grid::Grid;
use crate::pathfinding::CostField;
use crate::tile::TileType;

pub fn terrain_char(tile_type: TileType) -> char {
    match tile_type {
        TileType::Rock => ' ',
        TileType::Room => '.',
        TileType::Corridor => '#',
        TileType::StairUp => '<',
        TileType::StairDown => '>',
    }
}

/// The map with actors drawn over the terrain, one line per row.
pub fn render_map(dungeon: &Dungeon) -> String {
    let grid = &dungeon.grid;
    let mut out = String::with_capacity((grid.width + 1) * grid.height);
    for (idx, tile) in grid.tiles.iter().enumerate() {
        let glyph = tile
            .occupant
            .and_then(|e| dungeon.world.get::<&Glyph>(e).ok().map(|g| g.0));
        out.push(glyph.unwrap_or_else(|| terrain_char(tile.tile_type)));
        if (idx + 1) % grid.width == 0 {
            out.push('\n');
        }
    }
    out
}

/// A cost field as digits (cost mod 10), so sources show as `0`. Open cells
/// the field cannot reach show as `X`, unreachable rock as blank.
pub fn render_costs(grid: &Grid, field: &CostField) -> String {
    let mut out = String::with_capacity((grid.width + 1) * grid.height);
    for (idx, tile) in grid.tiles.iter().enumerate() {
        let cost = field.costs().get(idx).copied().unwrap_or(u32::MAX);
        let c = match cost {
            u32::MAX if tile.tile_type.is_open() => 'X',
            u32::MAX => ' ',
            cost => char::from_digit(cost % 10, 10).unwrap_or('?'),
        };
        out.push(c);
        if (idx + 1) % grid.width == 0 {
            out.push('\n');
        }
    }
    out
}

// =============================================================================
// CONSOLE OUTPUT
// =============================================================================

/// Writes each frame to a console and waits out the frame time.
pub struct ConsoleSink<W: Write> {
    out: W,
    frame_time: Duration,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, frames_per_second: u32) -> Self {
        Self {
            out,
            frame_time: Duration::from_secs(1) / frames_per_second.max(1),
        }
    }

    /// Frame sink that never sleeps, for tests and fast replays
    pub fn unpaced(out: W) -> Self {
        Self {
            out,
            frame_time: Duration::ZERO,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for ConsoleSink<W> {
    fn present(&mut self, dungeon: &Dungeon) {
        let frame = render_map(dungeon);
        let written = writeln!(self.out, "{}", frame).and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!("failed to draw frame: {}", err);
        }
        if !self.frame_time.is_zero() {
            thread::sleep(self.frame_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Behavior;
    use crate::config::GameConfig;
    use crate::dungeon::DungeonLayout;
    use crate::dungeon_gen::Rect;
    use crate::spawning::MonsterDef;
    use crate::tile::Tile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 7x4: room x1..=2, corridor at x=3, rock (hardness 60) at x=4,
    /// room x=5 with a down stair
    fn dungeon() -> Dungeon {
        let mut config = GameConfig::default();
        config.dungeon.width = 7;
        config.dungeon.height = 4;

        let mut grid = Grid::new(7, 4);
        let rooms = vec![Rect::new(1, 1, 2, 2), Rect::new(5, 1, 1, 2)];
        for room in &rooms {
            for (x, y) in room.cells() {
                grid.get_mut(x, y).unwrap().open_as(TileType::Room);
            }
        }
        grid.get_mut(3, 1).unwrap().open_as(TileType::Corridor);
        for y in 1..3 {
            *grid.get_mut(4, y).unwrap() = Tile::rock(60);
        }
        *grid.get_mut(3, 2).unwrap() = Tile::rock(60);
        grid.get_mut(5, 2).unwrap().open_as(TileType::StairDown);

        let layout = DungeonLayout {
            grid,
            rooms,
            player: Some((1, 1)),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        Dungeon::from_layout(layout, &config, &mut rng).unwrap()
    }

    #[test]
    fn test_map_rendering() {
        let mut d = dungeon();
        let m = MonsterDef {
            speed: 10,
            behavior: Behavior::TELEPATHIC | Behavior::TUNNELER,
        }
        .spawn(&mut d.world, 2, 2);
        d.grid.get_mut(2, 2).unwrap().occupant = Some(m);

        let expected = "       \n @.# . \n .6  > \n       \n";
        assert_eq!(render_map(&d), expected);
    }

    #[test]
    fn test_cost_rendering() {
        let d = dungeon();
        let walker = render_costs(&d.grid, &d.walker_field);
        let rows: Vec<&str> = walker.lines().collect();
        // Player at 0, then room and corridor steps; the far room is cut off
        assert_eq!(rows[1], " 012 X ");
        assert_eq!(rows[2], " 11  X ");

        let tunneler = render_costs(&d.grid, &d.tunneler_field);
        let rows: Vec<&str> = tunneler.lines().collect();
        assert_eq!(rows[1].chars().nth(1), Some('0'));
        assert!(rows[1].chars().nth(5).unwrap().is_ascii_digit());
        assert_eq!(rows[0], "       ");
    }

    #[test]
    fn test_console_sink_writes_frames() {
        let d = dungeon();
        let mut sink = ConsoleSink::unpaced(Vec::new());
        sink.present(&d);
        sink.present(&d);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.matches('@').count(), 2);
    }
}

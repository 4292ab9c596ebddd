//! ASCII map parsing.
//!
//! A layout is a list of text rows. Each character marks one cell:
//!
//! | char | meaning                 |
//! |------|-------------------------|
//! | `W`  | wall                    |
//! | `A`  | apple spawn             |
//! | `P`  | perimeter player spawn  |
//! | `Q`  | interior player spawn   |
//!
//! Any other character, and any cell past the end of a short row or
//! below the last row, is empty. Coordinate sets are collected in
//! row-major order.

use commons_core::{Item, Pos};

use crate::error::LayoutError;
use crate::grid::Grid;

/// The open commons harvest map, 16 × 22.
pub const HARVEST_OPEN_MAP: [&str; 16] = [
    "AAA    A      A    AAA",
    "AA    AAA    AAA    AA",
    "A    AAAAA  AAAAA    A",
    "      AAA    AAA      ",
    "       A      A       ",
    "  A                A  ",
    " AAA  Q        Q  AAA ",
    "AAAAA            AAAAA",
    " AAA              AAA ",
    "  A                A  ",
    "                      ",
    "                      ",
    "                      ",
    "  PPPPPPPPPPPPPPPPPP  ",
    " PPPPPPPPPPPPPPPPPPPP ",
    "PPPPPPPPPPPPPPPPPPPPPP",
];

/// Fixed coordinate sets parsed from an ASCII map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLayout {
    rows: usize,
    cols: usize,
    walls: Vec<Pos>,
    apple_spawns: Vec<Pos>,
    interior_spawns: Vec<Pos>,
    perimeter_spawns: Vec<Pos>,
}

impl MapLayout {
    /// Parse `lines` into a `rows × cols` layout.
    ///
    /// # Errors
    ///
    /// [`LayoutError::EmptyGrid`] for a zero dimension,
    /// [`LayoutError::TooManyRows`] or [`LayoutError::RowTooWide`] when the
    /// text does not fit the grid.
    pub fn parse<S: AsRef<str>>(lines: &[S], rows: usize, cols: usize) -> Result<Self, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyGrid);
        }
        if lines.len() > rows {
            return Err(LayoutError::TooManyRows {
                layout_rows: lines.len(),
                grid_rows: rows,
            });
        }

        let mut layout = MapLayout {
            rows,
            cols,
            walls: Vec::new(),
            apple_spawns: Vec::new(),
            interior_spawns: Vec::new(),
            perimeter_spawns: Vec::new(),
        };

        for (r, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let width = line.chars().count();
            if width > cols {
                return Err(LayoutError::RowTooWide {
                    row: r,
                    width,
                    grid_cols: cols,
                });
            }
            for (c, ch) in line.chars().enumerate() {
                let pos = Pos::new(r as i32, c as i32);
                match ch {
                    'W' => layout.walls.push(pos),
                    'A' => layout.apple_spawns.push(pos),
                    'P' => layout.perimeter_spawns.push(pos),
                    'Q' => layout.interior_spawns.push(pos),
                    _ => {}
                }
            }
        }

        Ok(layout)
    }

    /// Parse a newline-separated map.
    pub fn parse_str(text: &str, rows: usize, cols: usize) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = text.lines().collect();
        Self::parse(&lines, rows, cols)
    }

    /// The built-in open harvest map at its native 16 × 22 size.
    pub fn harvest_open() -> Result<Self, LayoutError> {
        Self::parse(&HARVEST_OPEN_MAP, 16, 22)
    }

    /// Grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Wall cells.
    pub fn walls(&self) -> &[Pos] {
        &self.walls
    }

    /// Cells where apples may exist.
    pub fn apple_spawns(&self) -> &[Pos] {
        &self.apple_spawns
    }

    /// Interior player spawn cells (`Q`).
    pub fn interior_spawns(&self) -> &[Pos] {
        &self.interior_spawns
    }

    /// Perimeter player spawn cells (`P`), also used for respawning.
    pub fn perimeter_spawns(&self) -> &[Pos] {
        &self.perimeter_spawns
    }

    /// Total number of player spawn cells.
    pub fn player_spawn_count(&self) -> usize {
        self.interior_spawns.len() + self.perimeter_spawns.len()
    }

    /// Static grid at episode start: walls, plus an apple on every spawn.
    pub fn initial_grid(&self) -> Result<Grid, LayoutError> {
        let mut grid = Grid::empty(self.rows, self.cols)?;
        for &p in &self.apple_spawns {
            grid.set(p, Item::Apple.code());
        }
        for &p in &self.walls {
            grid.set(p, Item::Wall.code());
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_sets() {
        let layout = MapLayout::harvest_open().unwrap();
        assert_eq!((layout.rows(), layout.cols()), (16, 22));
        assert!(layout.walls().is_empty());
        assert_eq!(
            layout.interior_spawns(),
            &[Pos::new(6, 6), Pos::new(6, 15)]
        );
        assert_eq!(layout.perimeter_spawns().len(), 18 + 20 + 22);
        let apples: usize = HARVEST_OPEN_MAP
            .iter()
            .map(|l| l.chars().filter(|&c| c == 'A').count())
            .sum();
        assert_eq!(layout.apple_spawns().len(), apples);
    }

    #[test]
    fn unknown_characters_are_empty() {
        let layout = MapLayout::parse(&["W.x", "AQP"], 2, 3).unwrap();
        assert_eq!(layout.walls(), &[Pos::new(0, 0)]);
        assert_eq!(layout.apple_spawns(), &[Pos::new(1, 0)]);
        assert_eq!(layout.interior_spawns(), &[Pos::new(1, 1)]);
        assert_eq!(layout.perimeter_spawns(), &[Pos::new(1, 2)]);
    }

    #[test]
    fn short_rows_and_missing_rows_are_empty() {
        let layout = MapLayout::parse(&["W"], 3, 3).unwrap();
        let grid = layout.initial_grid().unwrap();
        assert_eq!(grid.count(Item::Empty.code()), 8);
        assert!(grid.is(Pos::new(0, 0), Item::Wall));
    }

    #[test]
    fn oversize_layouts_rejected() {
        assert_eq!(
            MapLayout::parse(&["WWWW"], 2, 3),
            Err(LayoutError::RowTooWide {
                row: 0,
                width: 4,
                grid_cols: 3
            })
        );
        assert_eq!(
            MapLayout::parse(&["W", "W", "W"], 2, 3),
            Err(LayoutError::TooManyRows {
                layout_rows: 3,
                grid_rows: 2
            })
        );
    }

    #[test]
    fn initial_grid_has_apples_and_walls() {
        let layout = MapLayout::parse_str("WAW\n P ", 2, 3).unwrap();
        let grid = layout.initial_grid().unwrap();
        assert!(grid.is(Pos::new(0, 1), Item::Apple));
        assert_eq!(grid.count(Item::Wall.code()), 2);
        assert!(grid.is(Pos::new(1, 1), Item::Empty));
    }
}

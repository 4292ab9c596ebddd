//! Grid positions and agent placements.

use std::fmt;

use crate::action::Orientation;

/// A `(row, col)` grid position.
///
/// Signed so that offsets can be applied before bounds checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    /// Row index.
    pub row: i32,
    /// Column index.
    pub col: i32,
}

impl Pos {
    /// Construct a position.
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position shifted by a `(row, col)` offset.
    #[inline]
    pub fn offset(self, (dr, dc): (i32, i32)) -> Self {
        Self::new(self.row + dr, self.col + dc)
    }

    /// Whether the position lies inside a `rows × cols` grid.
    #[inline]
    pub fn in_bounds(self, rows: usize, cols: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < rows && (self.col as usize) < cols
    }

    /// Position clamped into a `rows × cols` grid.
    pub fn clamped(self, rows: usize, cols: usize) -> Self {
        Self::new(
            self.row.clamp(0, rows as i32 - 1),
            self.col.clamp(0, cols as i32 - 1),
        )
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Where an agent stands and which way it faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentLoc {
    /// Grid cell.
    pub pos: Pos,
    /// Facing direction.
    pub orientation: Orientation,
}

impl AgentLoc {
    /// Construct a placement.
    #[inline]
    pub const fn new(pos: Pos, orientation: Orientation) -> Self {
        Self { pos, orientation }
    }
}

//! Window placement and rotation.
//!
//! The play grid is padded with `size - 1` wall cells on every side, so a
//! window anchored anywhere near an agent lies inside the padded grid. The
//! anchor is pushed towards the agent's facing direction, then the window
//! is rotated counter-clockwise by `orientation` quarter turns.

use commons_core::{AgentLoc, Orientation};

/// Observation window geometry for a fixed window size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    size: usize,
}

impl WindowGeometry {
    /// Geometry for a `size × size` window.
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Window side length.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Wall padding applied on every side of the play grid.
    pub const fn padding(&self) -> usize {
        self.size.saturating_sub(1)
    }

    /// Top-left corner of `loc`'s window in the padded grid.
    ///
    /// The result is clamped so the whole window fits inside a padded grid
    /// of `padded_rows × padded_cols`.
    pub fn origin(&self, loc: AgentLoc, padded_rows: usize, padded_cols: usize) -> (usize, usize) {
        let half = (self.size / 2) as i64;
        let pad = self.padding() as i64;
        let mut x = loc.pos.row as i64 + pad - half;
        let mut y = loc.pos.col as i64 + pad - half;
        let reach = half - 1;
        match loc.orientation {
            Orientation::Up => x += reach,
            Orientation::Right => y += reach,
            Orientation::Down => x -= reach,
            Orientation::Left => y -= reach,
        }
        let max_x = padded_rows.saturating_sub(self.size) as i64;
        let max_y = padded_cols.saturating_sub(self.size) as i64;
        (x.clamp(0, max_x) as usize, y.clamp(0, max_y) as usize)
    }
}

/// Source cell of output cell `(i, j)` after rotating a `w × w` window
/// counter-clockwise by `k` quarter turns.
#[inline]
pub fn rot90_source(i: usize, j: usize, k: u8, w: usize) -> (usize, usize) {
    let last = w - 1;
    match k % 4 {
        0 => (i, j),
        1 => (j, last - i),
        2 => (last - i, last - j),
        _ => (last - j, i),
    }
}

//! Row-major grid of cell codes.

use commons_core::{AgentId, Item, Pos};

use crate::error::LayoutError;

/// A `rows × cols` grid holding one `u16` cell code per position.
///
/// Codes follow [`Item`] and [`AgentId::code`]. Reads outside the grid
/// return `None`; writes outside the grid are ignored and reported.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u16>,
}

impl Grid {
    /// A grid with every cell set to `fill`.
    pub fn filled(rows: usize, cols: usize, fill: u16) -> Result<Self, LayoutError> {
        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyGrid);
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![fill; rows * cols],
        })
    }

    /// An all-empty grid.
    pub fn empty(rows: usize, cols: usize) -> Result<Self, LayoutError> {
        Self::filled(rows, cols, Item::Empty.code())
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw row-major cell codes.
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    #[inline]
    fn index(&self, pos: Pos) -> Option<usize> {
        pos.in_bounds(self.rows, self.cols)
            .then(|| pos.row as usize * self.cols + pos.col as usize)
    }

    /// Code at `pos`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<u16> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Whether `pos` holds `item`.
    #[inline]
    pub fn is(&self, pos: Pos, item: Item) -> bool {
        self.get(pos) == Some(item.code())
    }

    /// Agent standing at `pos`, if any.
    #[inline]
    pub fn agent_at(&self, pos: Pos) -> Option<AgentId> {
        self.get(pos).and_then(AgentId::from_code)
    }

    /// Write `code` at `pos`. Returns `false` if `pos` is outside the grid.
    #[inline]
    pub fn set(&mut self, pos: Pos, code: u16) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = code;
                true
            }
            None => false,
        }
    }

    /// Number of cells holding `code`.
    pub fn count(&self, code: u16) -> usize {
        self.cells.iter().filter(|&&c| c == code).count()
    }

    /// Number of cells holding any agent code.
    pub fn agent_cell_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&c| AgentId::from_code(c).is_some())
            .count()
    }

    /// Replace every `from` code with `to`.
    pub fn replace_all(&mut self, from: u16, to: u16) {
        for c in self.cells.iter_mut().filter(|c| **c == from) {
            *c = to;
        }
    }

    /// Copy of this grid surrounded by a border of `fill` cells `pad` thick.
    pub fn padded(&self, pad: usize, fill: u16) -> Grid {
        let rows = self.rows + 2 * pad;
        let cols = self.cols + 2 * pad;
        let mut cells = vec![fill; rows * cols];
        for r in 0..self.rows {
            let src = &self.cells[r * self.cols..(r + 1) * self.cols];
            let start = (r + pad) * cols + pad;
            cells[start..start + self.cols].copy_from_slice(src);
        }
        Grid { rows, cols, cells }
    }
}

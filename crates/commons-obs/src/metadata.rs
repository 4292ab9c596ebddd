//! Observation tensor layout and feature indices.

use smallvec::SmallVec;

/// Channels per observed cell: 5 item classes plus 10 agent channels.
pub const FEATURES: usize = 15;

/// Feature channel offsets within a cell.
pub mod feature {
    /// One-hot of item codes `1..=5` (wall, interact, apple, spawn, inner spawn).
    pub const ITEMS: usize = 0;
    /// Number of item channels.
    pub const ITEM_COUNT: usize = 5;
    /// The cell holds the viewing agent.
    pub const SELF: usize = 5;
    /// The cell holds another agent.
    pub const OTHER: usize = 6;
    /// One-hot of the occupant's orientation relative to the viewer.
    pub const ANGLE: usize = 7;
    /// The occupant carries a non-empty inventory.
    pub const CAN_INTERACT: usize = 11;
    /// Disclosed two-slot inventory of the occupant.
    pub const INVENTORY: usize = 12;
    /// The occupant is frozen.
    pub const FROZEN: usize = 14;
}

/// How per-agent observations are shaped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObsLayout {
    /// `(window, window, FEATURES)`, for convolutional policies.
    #[default]
    Spatial,
    /// `(window * window * FEATURES,)`, same row-major data.
    Flat,
}

/// Shape of one agent's observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObsShape {
    /// Window side length.
    pub window: usize,
    /// Tensor layout.
    pub layout: ObsLayout,
}

impl ObsShape {
    /// Tensor dimensions.
    pub fn dims(&self) -> SmallVec<[usize; 3]> {
        match self.layout {
            ObsLayout::Spatial => SmallVec::from_slice(&[self.window, self.window, FEATURES]),
            ObsLayout::Flat => SmallVec::from_slice(&[self.len()]),
        }
    }

    /// Total `f32` elements.
    pub fn len(&self) -> usize {
        self.window * self.window * FEATURES
    }

    /// Whether the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of `(row, col, feature)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize, feature: usize) -> usize {
        (row * self.window + col) * FEATURES + feature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spatial_and_flat_dims() {
        let spatial = ObsShape {
            window: 11,
            layout: ObsLayout::Spatial,
        };
        assert_eq!(spatial.dims().as_slice(), &[11, 11, 15]);
        let flat = ObsShape {
            layout: ObsLayout::Flat,
            ..spatial
        };
        assert_eq!(flat.dims().as_slice(), &[11 * 11 * 15]);
        assert_eq!(flat.len(), spatial.len());
    }

    #[test]
    fn feature_channels_tile_the_cell() {
        assert_eq!(feature::ITEMS + feature::ITEM_COUNT, feature::SELF);
        assert_eq!(feature::ANGLE + 4, feature::CAN_INTERACT);
        assert_eq!(feature::INVENTORY + 2, feature::FROZEN);
        assert_eq!(feature::FROZEN + 1, FEATURES);
    }

    #[test]
    fn index_is_row_major() {
        let shape = ObsShape {
            window: 3,
            layout: ObsLayout::Spatial,
        };
        assert_eq!(shape.index(0, 0, 0), 0);
        assert_eq!(shape.index(0, 1, 0), FEATURES);
        assert_eq!(shape.index(1, 0, 2), 3 * FEATURES + 2);
        assert_eq!(shape.index(2, 2, FEATURES - 1), shape.len() - 1);
    }
}

//! Shared grid helpers used by several stages.

use commons_core::{Orientation, Pos};
use commons_space::Grid;
use rand::seq::SliceRandom;
use rand::Rng;

/// The 12 neighbour offsets inspected by apple regrowth: orthogonal at
/// distance 1, orthogonal at distance 2, and the 4 diagonals.
pub const REGROWTH_OFFSETS: [(i32, i32); 12] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-2, 0),
    (2, 0),
    (0, -2),
    (0, 2),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Count in-bounds cells at `pos + offset` holding `code`.
///
/// Each offset is bounds-checked on its own; out-of-grid cells never
/// count.
pub fn count_matching(grid: &Grid, pos: Pos, offsets: &[(i32, i32)], code: u16) -> usize {
    offsets
        .iter()
        .filter(|&&off| grid.get(pos.offset(off)) == Some(code))
        .count()
}

/// A uniformly shuffled copy of `cells`.
pub fn permuted<R: Rng + ?Sized>(cells: &[Pos], rng: &mut R) -> Vec<Pos> {
    let mut out = cells.to_vec();
    out.shuffle(rng);
    out
}

/// Draw a spawn orientation.
///
/// The upper bound is exclusive at 3, so [`Orientation::Left`] is never
/// produced.
pub fn draw_orientation<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
    Orientation::from_index(rng.random_range(0..3u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons_core::{EnvKey, Item};

    #[test]
    fn neighbours_bounds_checked_per_offset() {
        let mut g = Grid::filled(3, 3, Item::Apple.code()).unwrap();
        // Corner: (0,1), (1,0), (0,2), (2,0), (1,1) are in bounds.
        assert_eq!(count_matching(&g, Pos::new(0, 0), &REGROWTH_OFFSETS, Item::Apple.code()), 5);
        // Centre of 3x3: 4 orthogonal + 4 diagonal, distance-2 all out.
        assert_eq!(count_matching(&g, Pos::new(1, 1), &REGROWTH_OFFSETS, Item::Apple.code()), 8);
        g.set(Pos::new(1, 1), Item::Empty.code());
        assert_eq!(count_matching(&g, Pos::new(0, 0), &REGROWTH_OFFSETS, Item::Apple.code()), 4);
    }

    #[test]
    fn last_row_diagonals_do_not_count() {
        let g = Grid::filled(4, 4, Item::Apple.code()).unwrap();
        // (3,3): up 1, up 2, left 1, left 2, and the up-left diagonal.
        assert_eq!(count_matching(&g, Pos::new(3, 3), &REGROWTH_OFFSETS, Item::Apple.code()), 5);
    }

    #[test]
    fn permutation_keeps_all_cells() {
        let cells: Vec<Pos> = (0..10).map(|i| Pos::new(i, 0)).collect();
        let mut p = permuted(&cells, &mut EnvKey(5).rng());
        p.sort();
        assert_eq!(p, cells);
    }

    #[test]
    fn orientation_draw_never_left() {
        let mut rng = EnvKey(11).rng();
        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[draw_orientation(&mut rng).index() as usize] = true;
        }
        assert_eq!(seen, [true, true, true, false]);
    }
}

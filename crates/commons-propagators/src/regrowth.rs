//! Stochastic apple regrowth.
//!
//! Runs against the grid as it was at the start of the step, over the
//! fixed apple-spawn cells only. Each spawn cell gets one uniform draw on
//! `[0, 1)` and is rewritten to either [`Item::Apple`] or [`Item::Empty`]:
//!
//! | current | apple neighbours | draw        | result |
//! |---------|------------------|-------------|--------|
//! | apple   | any              | any         | apple  |
//! | empty   | 0                | `> 1`       | apple  |
//! | empty   | `>= 3`           | `< 0.025`   | apple  |
//! | empty   | 2                | `< 0.005`   | apple  |
//! | empty   | 1                | `< 0.001`   | apple  |
//! | other   |                  |             | empty  |
//!
//! The zero-neighbour row can never fire because draws are below 1.
//! Non-empty, non-apple codes on a spawn cell (an agent, a beam marker)
//! also resolve to empty; agents are stamped back right after.

use commons_core::{EnvKey, Item, Pos};
use commons_space::Grid;
use rand::Rng;

use crate::grid_helpers::{count_matching, REGROWTH_OFFSETS};

/// Regrowth probability with three or more neighbouring apples.
pub const P_DENSE: f64 = 0.025;
/// Regrowth probability with exactly two neighbouring apples.
pub const P_PAIR: f64 = 0.005;
/// Regrowth probability with exactly one neighbouring apple.
pub const P_SINGLE: f64 = 0.001;

/// Result of one regrowth pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RegrowthOutcome {
    /// Grid with every apple-spawn cell rewritten.
    pub grid: Grid,
    /// Spawn cells that went from empty to apple.
    pub regrown: usize,
}

/// Whether a spawn cell holds an apple after regrowth.
pub fn regrows(current: u16, neighbours: usize, draw: f64) -> bool {
    if current == Item::Apple.code() {
        return true;
    }
    if current != Item::Empty.code() {
        return false;
    }
    match neighbours {
        0 => draw > 1.0,
        1 => draw < P_SINGLE,
        2 => draw < P_PAIR,
        _ => draw < P_DENSE,
    }
}

/// Regrow apples using explicit per-cell draws.
///
/// `draws[i]` is used for `apple_spawns[i]`; missing draws count as 1.0
/// (no regrowth).
pub fn regrow_with_draws(prev: &Grid, apple_spawns: &[Pos], draws: &[f64]) -> RegrowthOutcome {
    let apple = Item::Apple.code();
    let mut grid = prev.clone();
    let mut regrown = 0;

    for (i, &pos) in apple_spawns.iter().enumerate() {
        let Some(current) = prev.get(pos) else {
            continue;
        };
        let neighbours = count_matching(prev, pos, &REGROWTH_OFFSETS, apple);
        let draw = draws.get(i).copied().unwrap_or(1.0);
        let grows = regrows(current, neighbours, draw);
        if grows && current != apple {
            regrown += 1;
        }
        grid.set(pos, if grows { apple } else { Item::Empty.code() });
    }

    RegrowthOutcome { grid, regrown }
}

/// Regrow apples with draws taken from `key`.
pub fn regrow(prev: &Grid, apple_spawns: &[Pos], key: EnvKey) -> RegrowthOutcome {
    let mut rng = key.rng();
    let draws: Vec<f64> = (0..apple_spawns.len())
        .map(|_| rng.random::<f64>())
        .collect();
    regrow_with_draws(prev, apple_spawns, &draws)
}

//! Test fixtures for commons harvest development.
//!
//! Hand-built [`GridState`]s that skip reset randomness, a few tiny map
//! layouts, and helpers for building action and key sequences.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{actions, key_stream, repeat, DUEL_MAP, SPARSE_MAP};

use commons_core::{AgentId, AgentLoc, Item, Orientation, Pos};
use commons_space::{FreezeMatrix, Grid, GridState};

/// An empty `rows × cols` world holding `agents` at `(row, col, orientation)`.
///
/// Inventories are zero, the freeze matrix is all `-1`, `reborn_locs`
/// mirrors `agent_locs` and both counters are zero.
pub fn state_with(rows: usize, cols: usize, agents: &[(i32, i32, Orientation)]) -> GridState {
    let mut grid = Grid::empty(rows, cols).expect("fixture grid dimensions");
    let locs: Vec<AgentLoc> = agents
        .iter()
        .map(|&(r, c, o)| AgentLoc::new(Pos::new(r, c), o))
        .collect();
    for (i, loc) in locs.iter().enumerate() {
        assert!(
            grid.set(loc.pos, AgentId(i as u16).code()),
            "fixture agent {i} outside {rows}x{cols}"
        );
    }
    let n = locs.len();
    GridState {
        grid,
        agent_invs: vec![[0, 0]; n],
        freeze: FreezeMatrix::filled(n, -1),
        reborn_locs: locs.clone(),
        agent_locs: locs,
        smooth_rewards: vec![0.0; n],
        inner_t: 0,
        outer_t: 0,
    }
}

/// Write `item` at every `(row, col)` in `cells`.
pub fn with_items(mut state: GridState, item: Item, cells: &[(i32, i32)]) -> GridState {
    for &(r, c) in cells {
        assert!(state.grid.set(Pos::new(r, c), item.code()));
    }
    state
}

/// Positions of every cell holding `item`.
pub fn cells_of(grid: &Grid, item: Item) -> Vec<Pos> {
    let mut out = Vec::new();
    for r in 0..grid.rows() as i32 {
        for c in 0..grid.cols() as i32 {
            let pos = Pos::new(r, c);
            if grid.is(pos, item) {
                out.push(pos);
            }
        }
    }
    out
}

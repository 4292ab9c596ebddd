//! Zap beams and the respawn set.
//!
//! A zapping agent covers up to four cells from its current placement:
//! one ahead, two ahead, ahead-right and ahead-left. A diagonal that
//! leaves the grid falls back to the one-ahead cell; one- or two-ahead
//! cells outside the grid are dropped.
//!
//! Every agent whose code sits in any zapper's beam cells is marked for
//! respawn. The per-cell "valid target" check (the cell holds another
//! agent) is computed and reported separately and does not gate respawn.
//! Beam cells that are empty receive an [`Item::Interact`] marker for
//! this step; occupied cells keep their contents.

use commons_core::{Action, AgentId, AgentLoc, Item, Orientation, Pos};
use commons_space::Grid;
use smallvec::SmallVec;

/// Beam cells for one agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beam {
    /// One cell ahead.
    pub ahead: Option<Pos>,
    /// Two cells ahead.
    pub ahead_two: Option<Pos>,
    /// Ahead and to the right, or `ahead` when off the grid.
    pub right: Option<Pos>,
    /// Ahead and to the left, or `ahead` when off the grid.
    pub left: Option<Pos>,
}

impl Beam {
    /// The in-grid beam cells, in fixed order. May contain duplicates
    /// after diagonal fallback.
    pub fn cells(&self) -> SmallVec<[Pos; 4]> {
        [self.ahead, self.ahead_two, self.right, self.left]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Beam cells for an agent standing at `loc` on a `rows × cols` grid.
pub fn beam(loc: AgentLoc, rows: usize, cols: usize) -> Beam {
    let facing = loc.orientation;
    let step = facing.step();
    let (sr, sc) = step;
    let inside = |p: Pos| p.in_bounds(rows, cols).then_some(p);

    let ahead_pos = loc.pos.offset(step);
    let ahead = inside(ahead_pos);
    let ahead_two = inside(loc.pos.offset((2 * sr, 2 * sc)));

    let diagonal = |side: Orientation| {
        let p = ahead_pos.offset(side.step());
        if p.in_bounds(rows, cols) {
            Some(p)
        } else {
            ahead
        }
    };
    let right = diagonal(Orientation::from_index(facing.index() + 1));
    let left = diagonal(Orientation::from_index(facing.index() + 3));

    Beam {
        ahead,
        ahead_two,
        right,
        left,
    }
}

/// Result of zap resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ZapOutcome {
    /// Grid with stale markers cleared and this step's markers painted.
    pub grid: Grid,
    /// Per agent: caught in some zapper's beam this step.
    pub reborn: Vec<bool>,
    /// Per agent: beam cells holding another agent (zero for non-zappers).
    pub valid_targets: Vec<u32>,
    /// Agents that fired.
    pub zaps: usize,
}

impl ZapOutcome {
    /// Number of agents marked for respawn.
    pub fn reborn_count(&self) -> usize {
        self.reborn.iter().filter(|&&r| r).count()
    }
}

/// Resolve all zaps for one step.
///
/// `grid` holds every agent at `locs` (movement already committed).
pub fn resolve_zaps(grid: &Grid, locs: &[AgentLoc], actions: &[Action]) -> ZapOutcome {
    let n = locs.len();
    let mut base = grid.clone();
    base.replace_all(Item::Interact.code(), Item::Empty.code());

    let mut marked = base.clone();
    let mut reborn = vec![false; n];
    let mut valid_targets = vec![0u32; n];
    let mut zaps = 0;

    for (i, (loc, action)) in locs.iter().zip(actions).enumerate() {
        if !action.is_zap() {
            continue;
        }
        zaps += 1;
        let me = AgentId(i as u16);
        for cell in beam(*loc, base.rows(), base.cols()).cells() {
            let Some(code) = base.get(cell) else {
                continue;
            };
            if let Some(hit) = AgentId::from_code(code) {
                if hit != me {
                    valid_targets[i] += 1;
                }
                if let Some(flag) = reborn.get_mut(hit.index()) {
                    *flag = true;
                }
            } else if code == Item::Empty.code() {
                marked.set(cell, Item::Interact.code());
            }
        }
    }

    ZapOutcome {
        grid: marked,
        reborn,
        valid_targets,
        zaps,
    }
}

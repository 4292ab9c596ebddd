//! Movement proposals and collision arbitration.
//!
//! Resolution runs in three passes over a scratch buffer:
//!
//! 1. **Propose**: every agent's action is applied independently
//!    (rotation, then the facing-independent offset, then clamping).
//! 2. **Arbitrate**: agents whose proposed cell is shared with another
//!    agent *and* who actually moved enter a worklist. The first pending
//!    agent's group (everyone proposing that cell) is resolved: if any
//!    member stayed put, all movers revert; otherwise one member, drawn
//!    uniformly, keeps the cell and the rest revert. The group leaves the
//!    worklist and the loop continues until it is empty.
//! 3. **Obstacles**: an agent whose destination is not its own current
//!    cell and holds anything other than empty or apple (a wall, a beam
//!    marker, another agent) reverts.
//!
//! Reverting restores the full previous placement, orientation included.

use commons_core::{Action, AgentLoc, EnvKey, Item};
use commons_space::Grid;
use rand::Rng;
use smallvec::SmallVec;

/// Result of movement resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementOutcome {
    /// Resolved placements, one per agent.
    pub locs: Vec<AgentLoc>,
    /// Conflict groups arbitrated.
    pub collision_groups: usize,
    /// Agents reverted by the obstacle check.
    pub obstacle_reverts: usize,
}

/// Apply each agent's action in isolation, clamping to the grid.
pub fn propose(locs: &[AgentLoc], actions: &[Action], rows: usize, cols: usize) -> Vec<AgentLoc> {
    locs.iter()
        .zip(actions)
        .map(|(loc, &action)| {
            let orientation = action.rotate(loc.orientation);
            let pos = loc.pos.offset(action.offset()).clamped(rows, cols);
            AgentLoc::new(pos, orientation)
        })
        .collect()
}

/// Arbitrate shared proposals in place. Returns the number of groups
/// resolved.
///
/// `prev` and `proposed` must have the same length.
pub fn resolve_collisions<R: Rng + ?Sized>(
    prev: &[AgentLoc],
    proposed: &mut [AgentLoc],
    rng: &mut R,
) -> usize {
    let n = prev.len().min(proposed.len());
    let targets: Vec<_> = proposed[..n].iter().map(|l| l.pos).collect();
    let moved: Vec<bool> = (0..n).map(|i| targets[i] != prev[i].pos).collect();

    let mut pending: Vec<bool> = (0..n)
        .map(|i| moved[i] && (0..n).any(|j| j != i && targets[j] == targets[i]))
        .collect();

    let mut groups = 0;
    while let Some(first) = pending.iter().position(|&p| p) {
        let cell = targets[first];
        let group: SmallVec<[usize; 8]> = (0..n).filter(|&j| targets[j] == cell).collect();

        if group.iter().any(|&j| !moved[j]) {
            for &j in &group {
                if moved[j] {
                    proposed[j] = prev[j];
                }
            }
        } else {
            let winner = group[rng.random_range(0..group.len())];
            for &j in &group {
                if j != winner {
                    proposed[j] = prev[j];
                }
            }
        }

        for &j in &group {
            pending[j] = false;
        }
        groups += 1;
    }
    groups
}

/// Revert agents whose destination is blocked on `grid`. Returns the
/// number of reverts.
pub fn revert_obstacles(grid: &Grid, prev: &[AgentLoc], resolved: &mut [AgentLoc]) -> usize {
    let mut reverts = 0;
    for (loc, before) in resolved.iter_mut().zip(prev) {
        if loc.pos == before.pos {
            continue;
        }
        let passable = matches!(
            grid.get(loc.pos).and_then(Item::from_code),
            Some(Item::Empty) | Some(Item::Apple)
        );
        if !passable {
            *loc = *before;
            reverts += 1;
        }
    }
    reverts
}

/// Full movement resolution for one step.
///
/// `grid` is the current grid with every agent stamped at `locs`.
pub fn resolve_movement(
    grid: &Grid,
    locs: &[AgentLoc],
    actions: &[Action],
    key: EnvKey,
) -> MovementOutcome {
    let mut resolved = propose(locs, actions, grid.rows(), grid.cols());
    let collision_groups = resolve_collisions(locs, &mut resolved, &mut key.rng());
    let obstacle_reverts = revert_obstacles(grid, locs, &mut resolved);
    MovementOutcome {
        locs: resolved,
        collision_groups,
        obstacle_reverts,
    }
}

//! The complete world snapshot.
//!
//! A [`GridState`] is produced by reset and replaced wholesale by every
//! step. Nothing aliases it: the step function takes the previous state
//! by reference and returns a new one.

use commons_core::{AgentId, AgentLoc, Item};
use smallvec::SmallVec;

use crate::error::StateError;
use crate::grid::Grid;

/// Two-slot inventory. Only slot 0 (apples) is filled in this environment.
pub type Inventory = [u32; 2];

/// Maximum number of agents whose inventory a viewer can see at once.
pub const MAX_REVEALED: usize = 12;

/// Square matrix of per-pair counters.
///
/// Read by the observation builder to gate inventory disclosure. The
/// step never writes it; reset fills it with `-1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FreezeMatrix {
    n: usize,
    data: Vec<i32>,
}

impl FreezeMatrix {
    /// `n × n` matrix with every entry set to `value`.
    pub fn filled(n: usize, value: i32) -> Self {
        Self {
            n,
            data: vec![value; n * n],
        }
    }

    /// Side length.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Entry `(row, col)`, or `None` out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        (row < self.n && col < self.n).then(|| self.data[row * self.n + col])
    }

    /// Set entry `(row, col)`. Out-of-range writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        if row < self.n && col < self.n {
            self.data[row * self.n + col] = value;
        }
    }

    /// Largest entry of `row`, or `None` out of range.
    pub fn row_max(&self, row: usize) -> Option<i32> {
        if row >= self.n {
            return None;
        }
        self.data[row * self.n..(row + 1) * self.n].iter().copied().max()
    }

    /// The first [`MAX_REVEALED`] columns of `row` with a positive entry.
    pub fn revealed(&self, row: usize) -> SmallVec<[usize; MAX_REVEALED]> {
        let mut out = SmallVec::new();
        if row >= self.n {
            return out;
        }
        for (col, &v) in self.data[row * self.n..(row + 1) * self.n].iter().enumerate() {
            if v > 0 {
                out.push(col);
                if out.len() == MAX_REVEALED {
                    break;
                }
            }
        }
        out
    }

    /// Raw row-major entries.
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

/// World snapshot for one environment instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GridState {
    /// Cell codes for the play area.
    pub grid: Grid,
    /// Current placement of every agent.
    pub agent_locs: Vec<AgentLoc>,
    /// Per-agent inventory counters.
    pub agent_invs: Vec<Inventory>,
    /// Per-pair freeze counters.
    pub freeze: FreezeMatrix,
    /// Placements swapped into `agent_locs` at the start of the next step.
    pub reborn_locs: Vec<AgentLoc>,
    /// Exponentially smoothed reward signal (inequity aversion only).
    pub smooth_rewards: Vec<f32>,
    /// Steps taken in the current inner episode.
    pub inner_t: u32,
    /// Completed inner episodes.
    pub outer_t: u32,
}

impl GridState {
    /// Number of agents.
    pub fn num_agents(&self) -> usize {
        self.agent_locs.len()
    }

    /// Apple cells currently on the grid.
    pub fn apple_count(&self) -> usize {
        self.grid.count(Item::Apple.code())
    }

    /// Placement of `agent`.
    pub fn loc(&self, agent: AgentId) -> Option<AgentLoc> {
        self.agent_locs.get(agent.index()).copied()
    }

    /// Check the structural invariants.
    ///
    /// Every per-agent vector has one entry per agent, every agent stands
    /// inside the grid on a cell holding its code, and no other cell holds
    /// an agent code.
    pub fn validate(&self) -> Result<(), StateError> {
        let n = self.num_agents();
        for (field, found) in [
            ("agent_invs", self.agent_invs.len()),
            ("reborn_locs", self.reborn_locs.len()),
            ("smooth_rewards", self.smooth_rewards.len()),
            ("freeze", self.freeze.len()),
        ] {
            if found != n {
                return Err(StateError::AgentCountMismatch {
                    expected: n,
                    found,
                    field,
                });
            }
        }

        for (i, loc) in self.agent_locs.iter().enumerate() {
            let agent = AgentId(i as u16);
            let code = self.grid.get(loc.pos).ok_or(StateError::OutOfBounds {
                agent,
                pos: loc.pos,
            })?;
            if code != agent.code() {
                return Err(StateError::MissingAgentCode {
                    agent,
                    pos: loc.pos,
                    found: code,
                });
            }
        }

        let cells = self.grid.agent_cell_count();
        if cells != n {
            return Err(StateError::StrayAgentCodes { agents: n, cells });
        }
        Ok(())
    }
}

//! Error types for layout parsing and state validation.

use commons_core::{AgentId, Pos};
use std::fmt;

/// Errors arising from parsing an ASCII map layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Grid dimensions contain a zero.
    EmptyGrid,
    /// The layout has more rows than the grid.
    TooManyRows {
        /// Rows in the layout.
        layout_rows: usize,
        /// Rows in the grid.
        grid_rows: usize,
    },
    /// A layout row is wider than the grid.
    RowTooWide {
        /// Index of the offending row.
        row: usize,
        /// Characters in the row.
        width: usize,
        /// Columns in the grid.
        grid_cols: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one row and one column"),
            Self::TooManyRows {
                layout_rows,
                grid_rows,
            } => write!(
                f,
                "layout has {layout_rows} rows but the grid has {grid_rows}"
            ),
            Self::RowTooWide {
                row,
                width,
                grid_cols,
            } => write!(
                f,
                "layout row {row} is {width} characters wide but the grid has {grid_cols} columns"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Structural invariant violations in a [`GridState`](crate::GridState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Per-agent vectors disagree on the number of agents.
    AgentCountMismatch {
        /// Expected agent count.
        expected: usize,
        /// Length found.
        found: usize,
        /// Which per-agent field was wrong.
        field: &'static str,
    },
    /// An agent stands outside the grid.
    OutOfBounds {
        /// The agent.
        agent: AgentId,
        /// Its position.
        pos: Pos,
    },
    /// The grid cell under an agent does not hold its code.
    MissingAgentCode {
        /// The agent.
        agent: AgentId,
        /// Its position.
        pos: Pos,
        /// The code found in the cell.
        found: u16,
    },
    /// The grid holds a different number of agent codes than there are agents.
    StrayAgentCodes {
        /// Agents in the state.
        agents: usize,
        /// Agent-coded cells on the grid.
        cells: usize,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentCountMismatch {
                expected,
                found,
                field,
            } => write!(f, "{field} has {found} entries, expected {expected}"),
            Self::OutOfBounds { agent, pos } => {
                write!(f, "agent {agent} at {pos} is outside the grid")
            }
            Self::MissingAgentCode { agent, pos, found } => {
                write!(f, "agent {agent} at {pos} but the cell holds code {found}")
            }
            Self::StrayAgentCodes { agents, cells } => {
                write!(f, "{cells} agent-coded cells for {agents} agents")
            }
        }
    }
}

impl std::error::Error for StateError {}

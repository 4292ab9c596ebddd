//! Step outputs and adapter-level step errors.

use std::error::Error;
use std::fmt;

use commons_core::ActionError;
use commons_obs::Observation;
use commons_space::GridState;
use indexmap::IndexMap;

use crate::metrics::StepMetrics;

// ── StepError ──────────────────────────────────────────────────────

/// Malformed step input, reported by
/// [`HarvestEnv::step_checked`](crate::HarvestEnv::step_checked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The action array does not have one entry per agent.
    ActionCount {
        /// Agents in the environment.
        expected: usize,
        /// Actions supplied.
        found: usize,
    },
    /// An action code is outside the action space.
    UnknownAction {
        /// Agent that supplied the code.
        agent: usize,
        /// Decode failure.
        error: ActionError,
    },
    /// The state was built for a different agent count.
    StateMismatch {
        /// Agents in the environment.
        expected: usize,
        /// Agents in the state.
        found: usize,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionCount { expected, found } => {
                write!(f, "expected {expected} actions, got {found}")
            }
            Self::UnknownAction { agent, error } => write!(f, "agent {agent}: {error}"),
            Self::StateMismatch { expected, found } => {
                write!(f, "state has {found} agents, environment has {expected}")
            }
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownAction { error, .. } => Some(error),
            _ => None,
        }
    }
}

// ── Outputs ────────────────────────────────────────────────────────

/// Termination flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Done {
    /// Per-agent flag (all equal: episodes end for everyone at once).
    pub agents: Vec<bool>,
    /// Aggregate flag.
    pub all: bool,
}

impl Done {
    /// Same flag for `num_agents` agents.
    pub fn uniform(num_agents: usize, done: bool) -> Self {
        Self {
            agents: vec![done; num_agents],
            all: done,
        }
    }
}

/// Reward diagnostics and world statistics for one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Pre-shaping rewards.
    pub original_rewards: Vec<f32>,
    /// Shaped rewards, before any inner-episode zeroing.
    pub shaped_rewards: Vec<f32>,
    /// Apple cells on the grid after the step's transition.
    pub apple_count: usize,
    /// Other agents caught in each agent's beam.
    pub valid_targets: Vec<u32>,
    /// Shaper side-channel values, keyed by name.
    pub diagnostics: IndexMap<&'static str, Vec<f32>>,
}

/// Result of [`HarvestEnv::step`](crate::HarvestEnv::step).
#[derive(Clone, Debug)]
pub struct StepResult {
    /// One observation per agent of [`state`](Self::state).
    pub obs: Vec<Observation>,
    /// The next state.
    pub state: GridState,
    /// Rewards handed to the learner (zero on an inner-episode reset).
    pub rewards: Vec<f32>,
    /// Termination flags.
    pub done: Done,
    /// Diagnostics.
    pub info: StepInfo,
    /// Timings and event counts.
    pub metrics: StepMetrics,
}

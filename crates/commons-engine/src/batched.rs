//! Batched execution over independent worlds.
//!
//! [`BatchedEnv`] owns one [`HarvestEnv`] and N [`GridState`]s and steps
//! them all in a single call. Worlds share only the immutable environment
//! description; each has its own state and its own key per call.
//!
//! Inputs for every world are validated before any world is stepped, so a
//! failed call leaves all states untouched.

use commons_core::{Action, EnvKey};
use commons_obs::Observation;
use commons_space::GridState;
use tracing::info;

use crate::config::{ConfigError, EnvConfig};
use crate::env::HarvestEnv;
use crate::metrics::StepMetrics;
use crate::step::{Done, StepError, StepInfo};

// ── Error type ──────────────────────────────────────────────────

/// Error from a batched operation, annotated with the failing world index.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    /// A world's step input was rejected.
    Step {
        /// Index of the world that failed (0-based).
        world_index: usize,
        /// The underlying step error.
        error: StepError,
    },
    /// Configuration error during construction.
    Config(ConfigError),
    /// World index out of bounds.
    InvalidIndex {
        /// The requested index.
        world_index: usize,
        /// Total number of worlds.
        num_worlds: usize,
    },
    /// Batch-level argument validation failed.
    InvalidArgument {
        /// Human-readable description of what's wrong.
        reason: String,
    },
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Step { world_index, error } => {
                write!(f, "world {world_index}: step failed: {error}")
            }
            BatchError::Config(e) => write!(f, "config error: {e}"),
            BatchError::InvalidIndex {
                world_index,
                num_worlds,
            } => write!(
                f,
                "world index {world_index} out of range (num_worlds={num_worlds})"
            ),
            BatchError::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Step { error, .. } => Some(error),
            BatchError::Config(e) => Some(e),
            _ => None,
        }
    }
}

// ── Result type ─────────────────────────────────────────────────

/// Result of stepping every world once.
#[derive(Clone, Debug)]
pub struct BatchStepResult {
    /// Per-world, per-agent observations.
    pub obs: Vec<Vec<Observation>>,
    /// Per-world rewards.
    pub rewards: Vec<Vec<f32>>,
    /// Per-world termination flags.
    pub done: Vec<Done>,
    /// Per-world diagnostics.
    pub infos: Vec<StepInfo>,
    /// Per-world metrics.
    pub metrics: Vec<StepMetrics>,
}

// ── BatchedEnv ──────────────────────────────────────────────────

/// N independent harvest worlds sharing one environment description.
pub struct BatchedEnv {
    env: HarvestEnv,
    states: Vec<GridState>,
}

impl BatchedEnv {
    /// Build `num_worlds` worlds from `config`, each reset from a key
    /// derived from `seed` and its index.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidArgument`] for zero worlds,
    /// [`BatchError::Config`] if the configuration is invalid.
    pub fn new(config: EnvConfig, num_worlds: usize, seed: u64) -> Result<Self, BatchError> {
        if num_worlds == 0 {
            return Err(BatchError::InvalidArgument {
                reason: "BatchedEnv requires at least one world".into(),
            });
        }
        let env = HarvestEnv::new(config).map_err(BatchError::Config)?;
        let root = EnvKey::new(seed);
        let states = (0..num_worlds as u64)
            .map(|i| env.reset_state(root.fold_in(i)))
            .collect();
        info!(num_worlds, seed, "batched environment ready");
        Ok(Self { env, states })
    }

    /// Shared environment description.
    pub fn env(&self) -> &HarvestEnv {
        &self.env
    }

    /// Number of worlds.
    pub fn num_worlds(&self) -> usize {
        self.states.len()
    }

    /// All world states.
    pub fn states(&self) -> &[GridState] {
        &self.states
    }

    /// State of world `world_index`.
    pub fn state(&self, world_index: usize) -> Result<&GridState, BatchError> {
        self.states.get(world_index).ok_or(BatchError::InvalidIndex {
            world_index,
            num_worlds: self.states.len(),
        })
    }

    fn check_keys(&self, keys: &[EnvKey]) -> Result<(), BatchError> {
        if keys.len() != self.states.len() {
            return Err(BatchError::InvalidArgument {
                reason: format!(
                    "expected {} keys, got {}",
                    self.states.len(),
                    keys.len()
                ),
            });
        }
        Ok(())
    }

    /// Reset every world with its own key.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidArgument`] if `keys` has the wrong length.
    pub fn reset_all(&mut self, keys: &[EnvKey]) -> Result<Vec<Vec<Observation>>, BatchError> {
        self.check_keys(keys)?;
        let env = &self.env;
        Ok(self
            .states
            .iter_mut()
            .zip(keys)
            .map(|(state, &key)| {
                let (obs, fresh) = env.reset(key);
                *state = fresh;
                obs
            })
            .collect())
    }

    /// Reset a single world.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidIndex`] for an unknown world.
    pub fn reset_world(
        &mut self,
        world_index: usize,
        key: EnvKey,
    ) -> Result<Vec<Observation>, BatchError> {
        let num_worlds = self.states.len();
        let state = self
            .states
            .get_mut(world_index)
            .ok_or(BatchError::InvalidIndex {
                world_index,
                num_worlds,
            })?;
        let (obs, fresh) = self.env.reset(key);
        *state = fresh;
        Ok(obs)
    }

    /// Step every world once with raw action codes.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidArgument`] for mismatched batch sizes,
    /// [`BatchError::Step`] naming the first world whose actions are
    /// malformed. No world is stepped on error.
    pub fn step_all(
        &mut self,
        keys: &[EnvKey],
        actions: &[Vec<u8>],
    ) -> Result<BatchStepResult, BatchError> {
        self.check_keys(keys)?;
        if actions.len() != self.states.len() {
            return Err(BatchError::InvalidArgument {
                reason: format!(
                    "expected {} action rows, got {}",
                    self.states.len(),
                    actions.len()
                ),
            });
        }
        let decoded: Vec<Vec<Action>> = actions
            .iter()
            .enumerate()
            .map(|(world_index, codes)| {
                self.env
                    .decode_actions(codes)
                    .map_err(|error| BatchError::Step { world_index, error })
            })
            .collect::<Result<_, _>>()?;

        let n = self.states.len();
        let mut out = BatchStepResult {
            obs: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
            done: Vec::with_capacity(n),
            infos: Vec::with_capacity(n),
            metrics: Vec::with_capacity(n),
        };
        for ((state, &key), acts) in self.states.iter_mut().zip(keys).zip(&decoded) {
            let result = self.env.step(key, state, acts);
            *state = result.state;
            out.obs.push(result.obs);
            out.rewards.push(result.rewards);
            out.done.push(result.done);
            out.infos.push(result.info);
            out.metrics.push(result.metrics);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for BatchedEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchedEnv")
            .field("env", &self.env)
            .field("num_worlds", &self.states.len())
            .finish()
    }
}

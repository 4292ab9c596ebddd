//! The harvest environment: reset and step.
//!
//! [`HarvestEnv`] holds only construction-time data (layout, spawn plan,
//! shaper, observation builder). All per-episode data lives in the
//! [`GridState`] threaded through [`reset`](HarvestEnv::reset) and
//! [`step`](HarvestEnv::step), so one environment can drive any number of
//! independent worlds.
//!
//! # Step order
//!
//! 1. regrowth against the previous grid
//! 2. respawn commit (`reborn_locs` become `agent_locs`)
//! 3. movement, collision worklist, obstacle reverts
//! 4. pickup, then movement commit on the grid
//! 5. zaps and respawn placement
//! 6. reward shaping
//! 7. counters; an inner-episode boundary swaps in a fresh reset state
//! 8. observation of the resulting state

use std::time::Instant;

use commons_core::{Action, AgentId, EnvKey, Item};
use commons_obs::{ObsShape, Observation, ObservationBuilder};
use commons_propagators::{
    regrow, resolve_movement, resolve_zaps, RewardShaper, SpawnPlan, ZapOutcome,
};
use commons_space::{FreezeMatrix, Grid, GridState, MapLayout};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EnvConfig};
use crate::metrics::StepMetrics;
use crate::step::{Done, StepError, StepInfo, StepResult};

#[inline]
fn micros(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

/// Multi-agent commons harvest environment.
pub struct HarvestEnv {
    config: EnvConfig,
    layout: MapLayout,
    spawn: SpawnPlan,
    shaper: RewardShaper,
    observer: ObservationBuilder,
    start_grid: Grid,
}

impl HarvestEnv {
    /// Environment name reported by [`name()`](Self::name).
    pub const NAME: &'static str = "commons_harvest_open";

    /// Build an environment from a validated configuration.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`EnvConfig::validate`].
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        if let Err(error) = config.validate() {
            warn!(%error, "rejected environment config");
            return Err(error);
        }
        let layout = config.map_layout()?;
        let spawn = SpawnPlan::new(&layout, config.num_agents)?;
        let shaper = config.reward.shaper(config.num_agents)?;
        let observer = ObservationBuilder::new(config.obs_size, config.obs_layout()).map_err(
            |_| ConfigError::WindowTooSmall {
                obs_size: config.obs_size,
            },
        )?;
        let start_grid = layout.initial_grid()?;

        info!(
            num_agents = config.num_agents,
            rows = config.grid_rows,
            cols = config.grid_cols,
            obs_size = config.obs_size,
            reward = shaper.name(),
            "harvest environment ready"
        );
        Ok(Self {
            config,
            layout,
            spawn,
            shaper,
            observer,
            start_grid,
        })
    }

    /// The configuration this environment was built from.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Parsed map layout.
    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    /// Active reward shaper.
    pub fn shaper(&self) -> &RewardShaper {
        &self.shaper
    }

    /// Observation builder.
    pub fn observer(&self) -> &ObservationBuilder {
        &self.observer
    }

    /// Number of agents.
    pub fn num_agents(&self) -> usize {
        self.config.num_agents
    }

    /// Size of each agent's discrete action space.
    pub fn num_actions(&self) -> usize {
        Action::COUNT
    }

    /// Shape of each agent's observation.
    pub fn observation_shape(&self) -> ObsShape {
        self.observer.shape()
    }

    /// Environment name.
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Fresh episode-start state.
    pub fn reset_state(&self, key: EnvKey) -> GridState {
        let n = self.config.num_agents;
        let locs = self.spawn.reset_placement(key);
        let mut grid = self.start_grid.clone();
        for (i, loc) in locs.iter().enumerate() {
            grid.set(loc.pos, AgentId(i as u16).code());
        }
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

    /// Start a new episode.
    pub fn reset(&self, key: EnvKey) -> (Vec<Observation>, GridState) {
        let state = self.reset_state(key);
        debug!(key = key.0, "reset");
        (self.observer.observe(&state), state)
    }

    /// Observations of `state`.
    pub fn observe(&self, state: &GridState) -> Vec<Observation> {
        self.observer.observe(state)
    }

    /// Decode raw action codes.
    ///
    /// # Errors
    ///
    /// [`StepError::ActionCount`] or [`StepError::UnknownAction`].
    pub fn decode_actions(&self, codes: &[u8]) -> Result<Vec<Action>, StepError> {
        let expected = self.num_agents();
        if codes.len() != expected {
            return Err(StepError::ActionCount {
                expected,
                found: codes.len(),
            });
        }
        codes
            .iter()
            .enumerate()
            .map(|(agent, &c)| {
                Action::try_from(c).map_err(|error| StepError::UnknownAction { agent, error })
            })
            .collect()
    }

    /// [`step`](Self::step) with input validation, for adapters that
    /// receive raw action codes.
    ///
    /// # Errors
    ///
    /// [`StepError`] if `codes` or `state` do not match this environment.
    pub fn step_checked(
        &self,
        key: EnvKey,
        state: &GridState,
        codes: &[u8],
    ) -> Result<StepResult, StepError> {
        if state.num_agents() != self.num_agents() {
            return Err(StepError::StateMismatch {
                expected: self.num_agents(),
                found: state.num_agents(),
            });
        }
        let actions = self.decode_actions(codes)?;
        Ok(self.step(key, state, &actions))
    }

    /// Advance `state` by one step.
    ///
    /// `actions[i]` is agent `i`'s action. A short slice is padded with
    /// [`Action::Stay`] and entries past the agent count are ignored; no
    /// error is raised either way. Callers holding raw or untrusted input
    /// should go through [`step_checked`](Self::step_checked), which
    /// rejects a wrong action count.
    ///
    /// Identical `(key, state, actions)` always yield identical results.
    pub fn step(&self, key: EnvKey, state: &GridState, actions: &[Action]) -> StepResult {
        let total = Instant::now();
        let n = state.num_agents();
        let actions: Vec<Action> = (0..n)
            .map(|i| actions.get(i).copied().unwrap_or(Action::Stay))
            .collect();
        let [regrow_key, move_key, respawn_key, reset_key] = key.split_n::<4>();
        let mut metrics = StepMetrics::default();

        // 1. Regrowth reads the grid as the previous step left it.
        let t = Instant::now();
        let regrowth = regrow(&state.grid, self.layout.apple_spawns(), regrow_key);
        let mut grid = regrowth.grid;
        metrics.regrown = regrowth.regrown;
        metrics.regrowth_us = micros(t);

        // 2. Respawn commit.
        let t = Instant::now();
        for loc in &state.agent_locs {
            grid.set(loc.pos, Item::Empty.code());
        }
        for (i, loc) in state.reborn_locs.iter().enumerate() {
            grid.set(loc.pos, AgentId(i as u16).code());
        }
        let locs = state.reborn_locs.clone();

        // 3. Movement.
        let movement = resolve_movement(&grid, &locs, &actions, move_key);

        // 4. Pickup, then commit.
        let pickups: Vec<bool> = movement
            .locs
            .iter()
            .map(|l| grid.is(l.pos, Item::Apple))
            .collect();
        let mut agent_invs = state.agent_invs.clone();
        for (inv, &picked) in agent_invs.iter_mut().zip(&pickups) {
            if picked {
                inv[0] += 1;
            }
        }
        for loc in &locs {
            grid.set(loc.pos, Item::Empty.code());
        }
        for (i, loc) in movement.locs.iter().enumerate() {
            grid.set(loc.pos, AgentId(i as u16).code());
        }
        metrics.collision_groups = movement.collision_groups;
        metrics.obstacle_reverts = movement.obstacle_reverts;
        metrics.pickups = pickups.iter().filter(|&&p| p).count();
        metrics.movement_us = micros(t);

        // 5. Zaps and respawn placement.
        let t = Instant::now();
        let ZapOutcome {
            grid,
            reborn,
            valid_targets,
            zaps,
        } = resolve_zaps(&grid, &movement.locs, &actions);
        let reborn_locs = self
            .spawn
            .respawn_placement(&movement.locs, &reborn, respawn_key);
        metrics.zaps = zaps;
        metrics.respawns = reborn.iter().filter(|&&r| r).count();
        metrics.interaction_us = micros(t);

        // 6. Rewards.
        let t = Instant::now();
        let shaped = self.shaper.shape(&pickups, &state.smooth_rewards);
        let smooth_rewards = shaped
            .smooth
            .clone()
            .unwrap_or_else(|| state.smooth_rewards.clone());
        metrics.reward_us = micros(t);

        // 7. Counters and episode boundaries.
        let mut next = GridState {
            grid,
            agent_locs: movement.locs,
            agent_invs,
            freeze: state.freeze.clone(),
            reborn_locs,
            smooth_rewards,
            inner_t: state.inner_t + 1,
            outer_t: state.outer_t,
        };
        let apple_count = next.apple_count();
        let mut rewards = shaped.shaped.clone();

        if next.inner_t >= self.config.num_inner_steps {
            let outer_t = state.outer_t + 1;
            next = self.reset_state(reset_key);
            next.outer_t = outer_t;
            rewards.fill(0.0);
            info!(outer_t, "inner episode complete");
        }
        let finished = next.outer_t >= self.config.num_outer_steps;
        if finished {
            info!(outer_t = next.outer_t, "outer episode complete");
        }

        // 8. Observation.
        let t = Instant::now();
        let obs = self.observer.observe(&next);
        metrics.observation_us = micros(t);
        metrics.total_us = micros(total);

        debug!(
            inner_t = next.inner_t,
            pickups = metrics.pickups,
            zaps = metrics.zaps,
            respawns = metrics.respawns,
            collisions = metrics.collision_groups,
            "step"
        );

        StepResult {
            obs,
            state: next,
            rewards,
            done: Done::uniform(n, finished),
            info: StepInfo {
                original_rewards: shaped.original,
                shaped_rewards: shaped.shaped,
                apple_count,
                valid_targets,
                diagnostics: shaped.diagnostics,
            },
            metrics,
        }
    }
}

impl std::fmt::Debug for HarvestEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestEnv")
            .field("num_agents", &self.config.num_agents)
            .field("grid", &(self.config.grid_rows, self.config.grid_cols))
            .field("obs_size", &self.config.obs_size)
            .field("reward", &self.shaper.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons_obs::ObsLayout;

    fn env() -> HarvestEnv {
        HarvestEnv::new(EnvConfig::default()).unwrap()
    }

    #[test]
    fn spaces_metadata() {
        let env = env();
        assert_eq!(env.num_actions(), 8);
        assert_eq!(env.name(), "commons_harvest_open");
        assert_eq!(env.observation_shape().dims().as_slice(), &[11, 11, 15]);
        let flat = HarvestEnv::new(EnvConfig {
            flat_obs: true,
            ..EnvConfig::default()
        })
        .unwrap();
        assert_eq!(flat.observation_shape().layout, ObsLayout::Flat);
    }

    #[test]
    fn reset_state_is_consistent() {
        let env = env();
        let (obs, state) = env.reset(EnvKey(11));
        state.validate().unwrap();
        assert_eq!(obs.len(), 7);
        assert_eq!(state.apple_count(), env.layout().apple_spawns().len());
        assert_eq!(state.agent_locs, state.reborn_locs);
        assert!(state.agent_invs.iter().all(|i| *i == [0, 0]));
        assert_eq!((state.inner_t, state.outer_t), (0, 0));
    }

    #[test]
    fn reset_orientations_never_face_left() {
        let env = env();
        for seed in 0..50 {
            let state = env.reset_state(EnvKey(seed));
            assert!(state
                .agent_locs
                .iter()
                .all(|l| l.orientation.index() < 3));
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = HarvestEnv::new(EnvConfig {
            num_agents: 0,
            ..EnvConfig::default()
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::AgentCount { num_agents: 0 });
    }

    #[test]
    fn step_checked_validates_input() {
        let env = env();
        let (_, state) = env.reset(EnvKey(1));
        assert_eq!(
            env.step_checked(EnvKey(2), &state, &[6; 3]).unwrap_err(),
            StepError::ActionCount {
                expected: 7,
                found: 3
            }
        );
        let err = env
            .step_checked(EnvKey(2), &state, &[6, 6, 6, 9, 6, 6, 6])
            .unwrap_err();
        assert!(matches!(err, StepError::UnknownAction { agent: 3, .. }));
        assert!(env.step_checked(EnvKey(2), &state, &[6; 7]).is_ok());
    }

    #[test]
    fn short_action_slice_pads_with_stay() {
        let env = env();
        let (_, state) = env.reset(EnvKey(4));
        let mut explicit = vec![Action::MoveUp, Action::TurnLeft];
        let short = env.step(EnvKey(5), &state, &explicit);
        explicit.resize(env.num_agents(), Action::Stay);
        let padded = env.step(EnvKey(5), &state, &explicit);
        assert_eq!(short.state, padded.state);
        assert_eq!(short.rewards, padded.rewards);

        explicit.push(Action::ZapForward);
        let long = env.step(EnvKey(5), &state, &explicit);
        assert_eq!(long.state, padded.state);
    }

    #[test]
    fn debug_summarises() {
        let text = format!("{:?}", env());
        assert!(text.contains("HarvestEnv"));
        assert!(text.contains("shared"));
    }
}

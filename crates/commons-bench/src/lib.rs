//! Benchmark profiles and rollout helpers for commons harvest.
//!
//! - [`reference_profile`]: the reference 16×22 map with 7 agents
//! - [`stress_profile`]: the reference map tiled 2×2 (32×44) with 32 agents
//! - [`random_actions`] and [`rollout`]: a seeded random policy driver

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use commons_core::{Action, EnvKey};
use commons_engine::{EnvConfig, HarvestEnv, RewardMode};
use commons_space::HARVEST_OPEN_MAP;
use rand::Rng;

/// The reference configuration: 16×22 open map, 7 agents, 11×11 windows.
pub fn reference_profile() -> EnvConfig {
    EnvConfig::default()
}

/// The reference map repeated `tiles × tiles`, with `num_agents` agents
/// and inequity-aversion shaping.
pub fn tiled_profile(tiles: usize, num_agents: usize) -> EnvConfig {
    let tiles = tiles.max(1);
    let row_block: Vec<String> = HARVEST_OPEN_MAP.iter().map(|r| r.repeat(tiles)).collect();
    let layout: Vec<String> = (0..tiles).flat_map(|_| row_block.iter().cloned()).collect();
    EnvConfig {
        grid_rows: HARVEST_OPEN_MAP.len() * tiles,
        grid_cols: HARVEST_OPEN_MAP[0].len() * tiles,
        num_agents,
        layout,
        reward: RewardMode::inequity_aversion(),
        ..EnvConfig::default()
    }
}

/// 2×2 tiling of the reference map (32×44) with 32 agents.
pub fn stress_profile() -> EnvConfig {
    tiled_profile(2, 32)
}

/// One uniformly random action per agent, drawn from `key`.
pub fn random_actions(key: EnvKey, num_agents: usize) -> Vec<Action> {
    let mut rng = key.rng();
    (0..num_agents)
        .map(|_| Action::ALL[rng.random_range(0..Action::COUNT)])
        .collect()
}

/// Totals over a [`rollout`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RolloutSummary {
    /// Steps taken.
    pub steps: usize,
    /// Sum of all rewards handed out.
    pub total_reward: f64,
    /// Apples harvested.
    pub pickups: usize,
    /// Zap actions fired.
    pub zaps: usize,
    /// Agents respawned.
    pub respawns: usize,
    /// Apples on the grid after the last step.
    pub final_apples: usize,
    /// Sum of per-step wall time.
    pub total_us: u64,
}

impl RolloutSummary {
    /// Mean wall time per step.
    pub fn mean_step_us(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_us as f64 / self.steps as f64
        }
    }
}

/// Run `steps` random-policy steps from a reset with `seed`.
pub fn rollout(env: &HarvestEnv, seed: u64, steps: usize) -> RolloutSummary {
    let root = EnvKey(seed);
    let (_, mut state) = env.reset(root.fold_in(0));
    let mut summary = RolloutSummary::default();
    for t in 0..steps {
        let [step_key, policy_key] = root.fold_in(t as u64 + 1).split_n::<2>();
        let actions = random_actions(policy_key, env.num_agents());
        let result = env.step(step_key, &state, &actions);
        summary.steps += 1;
        summary.total_reward += result.rewards.iter().map(|&r| r as f64).sum::<f64>();
        summary.pickups += result.metrics.pickups;
        summary.zaps += result.metrics.zaps;
        summary.respawns += result.metrics.respawns;
        summary.final_apples = result.info.apple_count;
        summary.total_us += result.metrics.total_us;
        state = result.state;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_validates() {
        reference_profile().validate().unwrap();
    }

    #[test]
    fn stress_profile_validates() {
        let config = stress_profile();
        config.validate().unwrap();
        assert_eq!((config.grid_rows, config.grid_cols), (32, 44));
        let layout = config.map_layout().unwrap();
        assert_eq!(layout.perimeter_spawns().len(), 4 * 60);
    }

    #[test]
    fn random_actions_deterministic() {
        assert_eq!(random_actions(EnvKey(4), 9), random_actions(EnvKey(4), 9));
        assert_eq!(random_actions(EnvKey(4), 9).len(), 9);
    }

    #[test]
    fn rollout_deterministic_apart_from_timing() {
        let env = HarvestEnv::new(reference_profile()).unwrap();
        let mut a = rollout(&env, 3, 40);
        let mut b = rollout(&env, 3, 40);
        a.total_us = 0;
        b.total_us = 0;
        assert_eq!(a, b);
        assert_eq!(a.steps, 40);
    }
}

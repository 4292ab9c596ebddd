//! Per-step performance and event metrics.
//!
//! [`StepMetrics`] captures stage timings and event counts for a single
//! step, for profiling and rollout telemetry.

/// Timing and event metrics collected during a single step.
///
/// All durations are in microseconds. The `*_us` fields are wall-clock
/// readings and are not part of the reproducibility contract: identical
/// inputs give identical event counts ([`counts`](Self::counts)) but not
/// identical timings, so `StepMetrics` has no `PartialEq`.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Apple regrowth, in microseconds.
    pub regrowth_us: u64,
    /// Respawn commit, movement and pickup, in microseconds.
    pub movement_us: u64,
    /// Zap resolution and respawn placement, in microseconds.
    pub interaction_us: u64,
    /// Reward shaping, in microseconds.
    pub reward_us: u64,
    /// Observation extraction, in microseconds.
    pub observation_us: u64,
    /// Spawn cells that regrew an apple.
    pub regrown: usize,
    /// Collision groups arbitrated.
    pub collision_groups: usize,
    /// Agents sent back by the obstacle check.
    pub obstacle_reverts: usize,
    /// Agents that fired a zap.
    pub zaps: usize,
    /// Agents marked for respawn.
    pub respawns: usize,
    /// Apples collected.
    pub pickups: usize,
}

impl StepMetrics {
    /// The deterministic event counts, in field order: regrown,
    /// collision groups, obstacle reverts, zaps, respawns, pickups.
    pub fn counts(&self) -> [usize; 6] {
        [
            self.regrown,
            self.collision_groups,
            self.obstacle_reverts,
            self.zaps,
            self.respawns,
            self.pickups,
        ]
    }

    /// Sum of the per-stage timings.
    pub fn stage_us(&self) -> u64 {
        self.regrowth_us + self.movement_us + self.interaction_us + self.reward_us + self.observation_us
    }
}

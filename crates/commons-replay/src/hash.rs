//! FNV-1a hashing of states and configurations.
//!
//! These hashes are fast equality checks for replay comparison, not
//! cryptographic digests.

use commons_core::AgentLoc;
use commons_engine::{EnvConfig, RewardMode};
use commons_space::GridState;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Running FNV-1a state.
#[derive(Clone, Copy)]
struct Fnv(u64);

impl Fnv {
    fn new() -> Self {
        Self(FNV_OFFSET)
    }

    #[inline]
    fn byte(&mut self, b: u8) {
        self.0 = (self.0 ^ b as u64).wrapping_mul(FNV_PRIME);
    }

    fn bytes(&mut self, bs: &[u8]) {
        for &b in bs {
            self.byte(b);
        }
    }

    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn loc(&mut self, loc: &AgentLoc) {
        self.i32(loc.pos.row);
        self.i32(loc.pos.col);
        self.byte(loc.orientation.index());
    }

    /// Length-prefixed, so adjacent sections cannot alias.
    fn section(&mut self, tag: u8, len: usize) {
        self.byte(tag);
        self.u64(len as u64);
    }
}

/// Hash every component of a state.
///
/// Covers grid dimensions and cells, placements, inventories, the
/// freeze matrix, pending respawn placements, smoothed rewards and both
/// episode counters. Section tags are folded in so component order
/// matters.
pub fn state_hash(state: &GridState) -> u64 {
    let mut h = Fnv::new();

    h.section(0, state.grid.cells().len());
    h.u64(state.grid.rows() as u64);
    h.u64(state.grid.cols() as u64);
    for &c in state.grid.cells() {
        h.u16(c);
    }

    h.section(1, state.agent_locs.len());
    state.agent_locs.iter().for_each(|l| h.loc(l));

    h.section(2, state.agent_invs.len());
    for inv in &state.agent_invs {
        inv.iter().for_each(|&v| h.u32(v));
    }

    h.section(3, state.freeze.as_slice().len());
    state.freeze.as_slice().iter().for_each(|&v| h.i32(v));

    h.section(4, state.reborn_locs.len());
    state.reborn_locs.iter().for_each(|l| h.loc(l));

    h.section(5, state.smooth_rewards.len());
    state.smooth_rewards.iter().for_each(|&v| h.f32(v));

    h.section(6, 2);
    h.u32(state.inner_t);
    h.u32(state.outer_t);

    h.0
}

fn targets(h: &mut Fnv, targets: &Option<Vec<usize>>) {
    match targets {
        None => h.byte(0),
        Some(t) => {
            h.byte(1);
            h.u64(t.len() as u64);
            t.iter().for_each(|&i| h.u64(i as u64));
        }
    }
}

/// Hash every configuration parameter that affects a rollout.
pub fn config_hash(config: &EnvConfig) -> u64 {
    let mut h = Fnv::new();
    h.u32(config.num_inner_steps);
    h.u32(config.num_outer_steps);
    h.u64(config.grid_rows as u64);
    h.u64(config.grid_cols as u64);
    h.u64(config.obs_size as u64);
    h.u64(config.num_agents as u64);
    h.byte(config.flat_obs as u8);

    h.u64(config.layout.len() as u64);
    for row in &config.layout {
        h.u64(row.len() as u64);
        h.bytes(row.as_bytes());
    }

    match &config.reward {
        RewardMode::Shared => h.byte(0),
        RewardMode::Individual => h.byte(1),
        RewardMode::InequityAversion {
            alpha,
            beta,
            smoothing,
            targets: t,
        } => {
            h.byte(2);
            h.f32(*alpha);
            h.f32(*beta);
            h.byte(*smoothing as u8);
            targets(&mut h, t);
        }
        RewardMode::Svo {
            w,
            ideal_angle_degrees,
            targets: t,
        } => {
            h.byte(3);
            h.f32(*w);
            h.f32(*ideal_angle_degrees);
            targets(&mut h, t);
        }
        RewardMode::StandardizedSvo {
            w,
            ideal_angle_degrees,
            targets: t,
        } => {
            h.byte(4);
            h.f32(*w);
            h.f32(*ideal_angle_degrees);
            targets(&mut h, t);
        }
    }
    h.0
}

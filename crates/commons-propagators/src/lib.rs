//! Step stages for the commons harvest environment.
//!
//! Each module is a pure function over the previous [`GridState`] (or
//! pieces of it) that returns fresh values; nothing here mutates shared
//! state. The engine composes them in a fixed order.
//!
//! # Stage order (each step)
//!
//! 1. [`regrowth`]: apple-spawn cells regrow from the *previous* grid
//! 2. respawn commit: `reborn_locs` become `agent_locs`
//! 3. [`movement`]: proposals, collision worklist, obstacle reverts
//! 4. pickup and grid commit
//! 5. [`interaction`]: zap beams, markers, respawn set; [`spawn`] places
//!    reborn agents
//! 6. [`reward`]: raw pickups shaped into per-agent rewards
//!
//! [`GridState`]: commons_space::GridState

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod grid_helpers;
pub mod interaction;
pub mod movement;
pub mod regrowth;
pub mod reward;
pub mod spawn;

pub use interaction::{beam, resolve_zaps, Beam, ZapOutcome};
pub use movement::{propose, resolve_collisions, resolve_movement, revert_obstacles, MovementOutcome};
pub use regrowth::{regrow, regrow_with_draws, regrows, RegrowthOutcome};
pub use reward::{
    InequityAversion, InequityAversionBuilder, RewardShaper, ShapedRewards, Svo, SvoBuilder,
};
pub use grid_helpers::draw_orientation;
pub use spawn::{SpawnError, SpawnPlan};

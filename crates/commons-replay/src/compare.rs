//! State comparison and replay verification.
//!
//! Hash-first comparison with a per-component fallback when both states
//! are at hand, plus streaming replay drivers.

use std::io::Read;

use commons_core::{Action, EnvKey};
use commons_engine::HarvestEnv;
use commons_space::GridState;
use tracing::{debug, info, warn};

use crate::error::ReplayError;
use crate::hash::{config_hash, state_hash};
use crate::reader::ReplayReader;

/// A part of [`GridState`] that can diverge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateComponent {
    /// Grid dimensions or cell codes.
    Grid,
    /// Agent placements.
    AgentLocs,
    /// Inventories.
    Inventories,
    /// Freeze matrix.
    Freeze,
    /// Pending respawn placements.
    RebornLocs,
    /// Smoothed rewards, compared bitwise.
    SmoothRewards,
    /// Inner or outer episode counter.
    Counters,
}

/// First divergence found while replaying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivergenceReport {
    /// Step at which the hashes differ.
    pub step: u64,
    /// Hash from the replay file.
    pub recorded_hash: u64,
    /// Hash of the replayed state.
    pub replayed_hash: u64,
    /// Components that differ; empty when only hashes were available.
    pub components: Vec<StateComponent>,
}

fn bits(v: &[f32]) -> impl Iterator<Item = u32> + '_ {
    v.iter().map(|x| x.to_bits())
}

/// Components on which two states differ.
pub fn compare_states(recorded: &GridState, replayed: &GridState) -> Vec<StateComponent> {
    let mut out = Vec::new();
    if recorded.grid != replayed.grid {
        out.push(StateComponent::Grid);
    }
    if recorded.agent_locs != replayed.agent_locs {
        out.push(StateComponent::AgentLocs);
    }
    if recorded.agent_invs != replayed.agent_invs {
        out.push(StateComponent::Inventories);
    }
    if recorded.freeze != replayed.freeze {
        out.push(StateComponent::Freeze);
    }
    if recorded.reborn_locs != replayed.reborn_locs {
        out.push(StateComponent::RebornLocs);
    }
    if !bits(&recorded.smooth_rewards).eq(bits(&replayed.smooth_rewards)) {
        out.push(StateComponent::SmoothRewards);
    }
    if (recorded.inner_t, recorded.outer_t) != (replayed.inner_t, replayed.outer_t) {
        out.push(StateComponent::Counters);
    }
    out
}

/// Replay a log through a caller-provided step function.
///
/// `step_fn` receives each frame's key and decoded actions, advances its
/// own state and returns the [`state_hash`] of the result. Returns the
/// first divergence, or `None` when every frame matches.
pub fn replay_with<R: Read>(
    mut reader: ReplayReader<R>,
    step_fn: &mut dyn FnMut(EnvKey, Vec<Action>) -> Result<u64, ReplayError>,
) -> Result<Option<DivergenceReport>, ReplayError> {
    let num_agents = reader.init_descriptor().num_agents as usize;
    while let Some(frame) = reader.next_frame()? {
        if frame.actions.len() != num_agents {
            return Err(ReplayError::MalformedFrame {
                detail: format!(
                    "step {}: expected {num_agents} actions, found {}",
                    frame.step,
                    frame.actions.len()
                ),
            });
        }
        let actions = frame
            .actions
            .iter()
            .map(|&c| {
                Action::try_from(c).map_err(|error| ReplayError::InvalidAction {
                    step: frame.step,
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let replayed_hash = step_fn(EnvKey(frame.key), actions)?;
        if replayed_hash != frame.state_hash {
            warn!(
                step = frame.step,
                recorded = frame.state_hash,
                replayed = replayed_hash,
                "replay diverged"
            );
            return Ok(Some(DivergenceReport {
                step: frame.step,
                recorded_hash: frame.state_hash,
                replayed_hash,
                components: Vec::new(),
            }));
        }
    }
    debug!(frames = reader.frames_read(), "replay matched");
    Ok(None)
}

/// Replay a log through `env`, starting from the recorded reset key.
///
/// # Errors
///
/// [`ReplayError::ConfigMismatch`] if `env` is configured differently
/// from the recording; decoding errors from the stream.
pub fn replay_and_compare<R: Read>(
    reader: ReplayReader<R>,
    env: &HarvestEnv,
) -> Result<Option<DivergenceReport>, ReplayError> {
    drive(reader, env, &mut 0)
}

/// Replay a log through `env` and fail on the first divergence.
///
/// Returns the number of frames verified.
pub fn verify_replay<R: Read>(reader: ReplayReader<R>, env: &HarvestEnv) -> Result<u64, ReplayError> {
    let mut frames = 0;
    match drive(reader, env, &mut frames)? {
        Some(report) => Err(ReplayError::StateMismatch {
            step: report.step,
            recorded: report.recorded_hash,
            replayed: report.replayed_hash,
        }),
        None => {
            info!(frames, "replay verified");
            Ok(frames)
        }
    }
}

fn drive<R: Read>(
    reader: ReplayReader<R>,
    env: &HarvestEnv,
    frames: &mut u64,
) -> Result<Option<DivergenceReport>, ReplayError> {
    let init = reader.init_descriptor();
    let current = config_hash(env.config());
    if current != init.config_hash {
        return Err(ReplayError::ConfigMismatch {
            recorded: init.config_hash,
            current,
        });
    }

    let mut state = env.reset_state(init.reset_key());
    replay_with(reader, &mut |key, actions| {
        *frames += 1;
        state = env.step(key, &state, &actions).state;
        Ok(state_hash(&state))
    })
}

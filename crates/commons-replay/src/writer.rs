//! Replay recording writer.
//!
//! [`ReplayWriter`] streams frames to any `Write` sink. The header is
//! written on construction.

use std::io::Write;

use commons_core::{Action, EnvKey};
use commons_engine::HarvestEnv;
use commons_space::GridState;

use crate::codec::{encode_frame, encode_header};
use crate::error::ReplayError;
use crate::hash::state_hash;
use crate::types::{BuildMetadata, Frame, InitDescriptor};

/// Writes replay data to a byte stream.
///
/// # Examples
///
/// ```
/// use commons_core::{Action, EnvKey};
/// use commons_engine::{EnvConfig, HarvestEnv};
/// use commons_replay::{verify_replay, ReplayReader, ReplayWriter};
///
/// let env = HarvestEnv::new(EnvConfig::default()).unwrap();
/// let reset_key = EnvKey(7);
/// let (_, mut state) = env.reset(reset_key);
///
/// let mut buf = Vec::new();
/// let mut writer = ReplayWriter::for_env(&mut buf, &env, reset_key).unwrap();
/// for step in 1..=3u64 {
///     let key = EnvKey(100 + step);
///     let actions = vec![Action::MoveUp; env.num_agents()];
///     state = env.step(key, &state, &actions).state;
///     writer.write_step(key, &actions, &state).unwrap();
/// }
/// drop(writer);
///
/// let reader = ReplayReader::open(buf.as_slice()).unwrap();
/// assert_eq!(verify_replay(reader, &env).unwrap(), 3);
/// ```
pub struct ReplayWriter<W: Write> {
    writer: W,
    num_agents: usize,
    frames_written: u64,
}

impl<W: Write> ReplayWriter<W> {
    /// Create a writer, immediately writing the header.
    pub fn new(
        mut writer: W,
        metadata: &BuildMetadata,
        init: &InitDescriptor,
    ) -> Result<Self, ReplayError> {
        encode_header(&mut writer, metadata, init)?;
        Ok(Self {
            writer,
            num_agents: init.num_agents as usize,
            frames_written: 0,
        })
    }

    /// Writer for a rollout of `env` reset with `reset_key`, stamped with
    /// the current build's metadata.
    pub fn for_env(writer: W, env: &HarvestEnv, reset_key: EnvKey) -> Result<Self, ReplayError> {
        let init = InitDescriptor::for_env(env, reset_key)?;
        Self::new(writer, &BuildMetadata::current(), &init)
    }

    /// Record one step: the key, every agent's action and the hash of the
    /// resulting state.
    pub fn write_step(
        &mut self,
        key: EnvKey,
        actions: &[Action],
        next_state: &GridState,
    ) -> Result<(), ReplayError> {
        if actions.len() != self.num_agents {
            return Err(ReplayError::MalformedFrame {
                detail: format!(
                    "expected {} actions, got {}",
                    self.num_agents,
                    actions.len()
                ),
            });
        }
        let frame = Frame {
            step: self.frames_written + 1,
            key: key.0,
            actions: actions.iter().map(|a| a.code()).collect(),
            state_hash: state_hash(next_state),
        };
        self.write_raw_frame(&frame)
    }

    /// Write a pre-built frame directly.
    pub fn write_raw_frame(&mut self, frame: &Frame) -> Result<(), ReplayError> {
        encode_frame(&mut self.writer, frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

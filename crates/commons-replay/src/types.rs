//! Data types for replay recording and playback.

use commons_core::EnvKey;
use commons_engine::{EnvConfig, HarvestEnv};

use crate::error::ReplayError;
use crate::hash::config_hash;

/// Build environment metadata stored in the replay header.
///
/// Lets a reader spot recordings made with a different toolchain or
/// profile, which can change floating-point results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Rust toolchain version, if known.
    pub toolchain: String,
    /// Compilation target (e.g. `"x86_64-linux"`).
    pub target_triple: String,
    /// Crate version (e.g. `"0.1.0"`).
    pub commons_version: String,
    /// Compilation profile (`"debug"` or `"release"`).
    pub compile_flags: String,
}

impl BuildMetadata {
    /// Metadata describing the running build.
    pub fn current() -> Self {
        Self {
            toolchain: option_env!("RUSTC_VERSION").unwrap_or("unknown").to_string(),
            target_triple: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
            commons_version: env!("CARGO_PKG_VERSION").to_string(),
            compile_flags: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            }
            .to_string(),
        }
    }
}

/// Everything needed to rebuild the recorded environment and its
/// initial state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitDescriptor {
    /// [`config_hash`] of the recorded configuration.
    pub config_hash: u64,
    /// Raw key passed to reset.
    pub reset_key: u64,
    /// Number of agents; every frame carries this many action codes.
    pub num_agents: u32,
    /// The configuration as JSON.
    pub config: Vec<u8>,
}

impl InitDescriptor {
    /// Describe `env` reset with `reset_key`.
    pub fn for_env(env: &HarvestEnv, reset_key: EnvKey) -> Result<Self, ReplayError> {
        let config = env.config();
        Ok(Self {
            config_hash: config_hash(config),
            reset_key: reset_key.0,
            num_agents: env.num_agents() as u32,
            config: config.to_json_string()?.into_bytes(),
        })
    }

    /// Decode the embedded configuration.
    pub fn env_config(&self) -> Result<EnvConfig, ReplayError> {
        let json = std::str::from_utf8(&self.config).map_err(|e| ReplayError::MalformedFrame {
            detail: format!("embedded config is not UTF-8: {e}"),
        })?;
        Ok(EnvConfig::from_json_str(json)?)
    }

    /// The reset key.
    pub fn reset_key(&self) -> EnvKey {
        EnvKey(self.reset_key)
    }
}

/// One recorded step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Steps since reset, starting at 1.
    pub step: u64,
    /// Raw key passed to step.
    pub key: u64,
    /// One action code per agent.
    pub actions: Vec<u8>,
    /// [`state_hash`](crate::state_hash) of the post-step state.
    pub state_hash: u64,
}

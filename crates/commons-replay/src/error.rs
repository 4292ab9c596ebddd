//! Failures while recording a harvest rollout, reading it back, or
//! re-simulating it.

use std::fmt;
use std::io;

use commons_core::ActionError;
use commons_engine::ConfigError;

/// Replay failure.
///
/// Decoding problems (`InvalidMagic` through `Config`) mean the log is
/// unusable. `ConfigMismatch` and `StateMismatch` mean the log is fine but
/// the environment does not reproduce it.
#[derive(Debug)]
pub enum ReplayError {
    /// Underlying reader or writer failed.
    Io(io::Error),
    /// Not a harvest action log: the first four bytes are not `CMNS`.
    InvalidMagic,
    /// Harvest log written by a newer or older format.
    UnsupportedVersion {
        /// Version byte in the header.
        found: u8,
    },
    /// A step record ends early or carries an oversized length prefix.
    MalformedFrame {
        /// Which field failed to decode.
        detail: String,
    },
    /// A step record holds an action code outside the eight harvest
    /// actions.
    InvalidAction {
        /// Step of the offending record.
        step: u64,
        /// Decode failure for the code.
        error: ActionError,
    },
    /// The environment config stored in the header does not parse or
    /// does not validate.
    Config(ConfigError),
    /// The log was recorded against a different map, agent count, episode
    /// length or reward mode.
    ConfigMismatch {
        /// Config hash stored in the header.
        recorded: u64,
        /// Config hash of the environment doing the replay.
        current: u64,
    },
    /// Re-simulating a step produced a different world.
    StateMismatch {
        /// First step whose state hash differs.
        step: u64,
        /// State hash written at record time.
        recorded: u64,
        /// State hash after re-simulation.
        replayed: u64,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "replay I/O: {e}"),
            Self::InvalidMagic => write!(f, "not a harvest action log (missing CMNS header)"),
            Self::UnsupportedVersion { found } => {
                write!(f, "harvest log format version {found} is not supported")
            }
            Self::MalformedFrame { detail } => write!(f, "corrupt step record: {detail}"),
            Self::InvalidAction { step, error } => {
                write!(f, "step {step} records a bad action: {error}")
            }
            Self::Config(e) => write!(f, "recorded environment config: {e}"),
            Self::ConfigMismatch { recorded, current } => {
                write!(
                    f,
                    "log recorded for config {recorded:#018x}, environment is {current:#018x}"
                )
            }
            Self::StateMismatch {
                step,
                recorded,
                replayed,
            } => {
                write!(
                    f,
                    "world diverged at step {step}: \
                     recorded {recorded:#018x}, replayed {replayed:#018x}"
                )
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidAction { error, .. } => Some(error),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_names_the_step() {
        let e = ReplayError::StateMismatch {
            step: 7,
            recorded: 1,
            replayed: 2,
        };
        assert!(e.to_string().starts_with("world diverged at step 7"));
        assert!(e.source().is_none());
    }

    #[test]
    fn wrapped_errors_expose_source() {
        let io = ReplayError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(io.source().is_some());
        let bad = ReplayError::InvalidAction {
            step: 3,
            error: ActionError::UnknownAction { code: 9 },
        };
        assert!(bad.source().is_some());
        assert!(bad.to_string().contains("step 3"));
    }
}

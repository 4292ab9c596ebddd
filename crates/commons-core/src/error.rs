//! Error types for core conversions.

use std::error::Error;
use std::fmt;

/// Errors from converting raw integers into core types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionError {
    /// The action code is outside `0..Action::COUNT`.
    UnknownAction {
        /// The rejected code.
        code: u8,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAction { code } => {
                write!(f, "unknown action code {code} (expected 0..8)")
            }
        }
    }
}

impl Error for ActionError {}

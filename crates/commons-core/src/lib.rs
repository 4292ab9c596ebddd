//! Core types for the commons harvest environment.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: cell codes,
//! agent identifiers, orientations, the discrete action set, grid
//! positions, and the deterministic [`EnvKey`] that threads randomness
//! through reset and step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod coord;
pub mod error;
pub mod id;
pub mod key;

pub use action::{Action, Orientation};
pub use coord::{AgentLoc, Pos};
pub use error::ActionError;
pub use id::{AgentId, Item, AGENT_CODE_OFFSET};
pub use key::EnvKey;

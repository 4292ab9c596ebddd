//! Deterministic action logs and replay verification.
//!
//! A replay records the reset key and, per step, the step key, the raw
//! action codes and a hash of the resulting state. Because
//! [`HarvestEnv::step`](commons_engine::HarvestEnv::step) is a pure
//! function of `(key, state, actions)`, replaying a log through a fresh
//! environment must reproduce every hash.
//!
//! - [`ReplayWriter`] records frames to any `Write` sink
//! - [`ReplayReader`] plays back frames from any `Read` source
//! - [`replay_and_compare`] and [`verify_replay`] check determinism
//!
//! # Format
//!
//! ```text
//! [MAGIC "CMNS"] [VERSION u8] [BuildMetadata] [InitDescriptor]
//! [Frame 1] [Frame 2] ... [Frame N]
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod hash;
pub mod reader;
pub mod types;
pub mod writer;

pub use compare::{
    compare_states, replay_and_compare, replay_with, verify_replay, DivergenceReport,
    StateComponent,
};
pub use error::ReplayError;
pub use hash::{config_hash, state_hash};
pub use reader::{FrameIter, ReplayReader};
pub use types::{BuildMetadata, Frame, InitDescriptor};
pub use writer::ReplayWriter;

/// Magic bytes at the start of every replay file.
pub const MAGIC: [u8; 4] = *b"CMNS";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

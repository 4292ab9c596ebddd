//! Egocentric observation extraction for the commons harvest environment.
//!
//! [`ObservationBuilder`] turns a [`GridState`] into one fresh
//! [`Observation`] tensor per agent: a square window cut from the
//! wall-padded grid, rotated so the agent faces "up", with every cell
//! encoded into [`FEATURES`] channels.
//!
//! [`GridState`]: commons_space::GridState

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod geometry;
pub mod metadata;

pub use builder::{ObsBuildError, Observation, ObservationBuilder, MIN_WINDOW};
pub use geometry::{rot90_source, WindowGeometry};
pub use metadata::{feature, ObsLayout, ObsShape, FEATURES};

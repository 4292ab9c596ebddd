//! Map layouts, grids and world state for the commons harvest environment.
//!
//! - [`MapLayout`] parses an ASCII map into fixed coordinate sets
//! - [`Grid`] stores one cell code per position, row-major
//! - [`GridState`] is the complete world snapshot replaced every step

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod layout;
pub mod state;

pub use error::{LayoutError, StateError};
pub use grid::Grid;
pub use layout::{MapLayout, HARVEST_OPEN_MAP};
pub use state::{FreezeMatrix, GridState, Inventory, MAX_REVEALED};

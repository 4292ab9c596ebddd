//! Tile rasteriser for commons harvest states.
//!
//! [`Renderer::render`] draws a [`GridState`] as an RGB [`Frame`]: one
//! supersampled tile per cell of the wall-padded grid, agent observation
//! windows highlighted, cropped to a one-tile wall border and turned 180°
//! so that row 0 is at the bottom. Tiles are memoised in a renderer-owned
//! [`TileCache`].
//!
//! [`GridState`]: commons_space::GridState

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod frame;
pub mod palette;
pub mod renderer;
pub mod tile;

pub use frame::Frame;
pub use palette::{agent_colors, hsv_to_rgb, Rgb};
pub use renderer::Renderer;
pub use tile::{draw_tile, TileCache, TileContent, TileKey};

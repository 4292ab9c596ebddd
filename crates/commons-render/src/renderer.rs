//! Whole-state rendering.

use commons_core::{AgentId, Item, Orientation, Pos};
use commons_obs::WindowGeometry;
use commons_space::GridState;
use tracing::debug;

use crate::frame::Frame;
use crate::palette::{self, Rgb};
use crate::tile::{TileCache, TileContent, TileKey};

/// Default tile side in pixels.
pub const TILE_SIZE: usize = 32;
/// Default supersampling factor per tile side.
pub const SUBDIVS: usize = 3;

/// Draws [`GridState`]s for one environment configuration.
pub struct Renderer {
    geometry: WindowGeometry,
    tile_size: usize,
    subdivs: usize,
    colors: Vec<Rgb>,
    cache: TileCache,
}

impl Renderer {
    /// Renderer for `num_agents` agents with `obs_size` windows.
    pub fn new(num_agents: usize, obs_size: usize) -> Self {
        Self::with_tile_size(num_agents, obs_size, TILE_SIZE, SUBDIVS)
    }

    /// Renderer with explicit tile size and supersampling.
    pub fn with_tile_size(
        num_agents: usize,
        obs_size: usize,
        tile_size: usize,
        subdivs: usize,
    ) -> Self {
        Self {
            geometry: WindowGeometry::new(obs_size),
            tile_size: tile_size.max(1),
            subdivs: subdivs.max(1),
            colors: palette::agent_colors(num_agents),
            cache: TileCache::new(),
        }
    }

    /// Tile side in pixels.
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Per-agent colours.
    pub fn agent_colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// The tile cache.
    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Cells of the padded grid inside any agent's observation window.
    fn highlight_mask(&self, state: &GridState, rows: usize, cols: usize) -> Vec<bool> {
        let size = self.geometry.size();
        let mut mask = vec![false; rows * cols];
        for &loc in &state.agent_locs {
            let (x0, y0) = self.geometry.origin(loc, rows, cols);
            for r in x0..(x0 + size).min(rows) {
                for c in y0..(y0 + size).min(cols) {
                    mask[r * cols + c] = true;
                }
            }
        }
        mask
    }

    /// Draw `state`.
    ///
    /// The play area is framed by one tile of wall and turned 180°, so
    /// grid row 0 is the bottom row of the frame.
    pub fn render(&mut self, state: &GridState) -> Frame {
        let pad = self.geometry.padding();
        let padded = state.grid.padded(pad, Item::Wall.code());
        let (rows, cols) = (padded.rows(), padded.cols());
        let mask = self.highlight_mask(state, rows, cols);

        let ts = self.tile_size;
        let mut full = Frame::filled(cols * ts, rows * ts, palette::SAND);
        for r in 0..rows {
            for c in 0..cols {
                let pos = Pos::new(r as i32, c as i32);
                let Some(code) = padded.get(pos) else {
                    continue;
                };
                let orientation = AgentId::from_code(code)
                    .and_then(|a| state.loc(a))
                    .map_or(Orientation::Up, |l| l.orientation);
                let key = TileKey {
                    content: TileContent::from_code(code, orientation),
                    highlight: mask[r * cols + c],
                    tile_size: ts,
                    subdivs: self.subdivs,
                };
                let tile = self.cache.get_or_draw(key, &self.colors);
                full.blit(tile, c * ts, r * ts);
            }
        }

        let crop = pad.saturating_sub(1);
        let frame = full
            .cropped(
                crop * ts,
                crop * ts,
                (cols - 2 * crop) * ts,
                (rows - 2 * crop) * ts,
            )
            .rotated_180();
        debug!(
            width = frame.width(),
            height = frame.height(),
            cached_tiles = self.cache.len(),
            "rendered frame"
        );
        frame
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("window", &self.geometry.size())
            .field("tile_size", &self.tile_size)
            .field("subdivs", &self.subdivs)
            .field("num_agents", &self.colors.len())
            .field("cached_tiles", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons_test_utils::{state_with, with_items};

    fn small() -> GridState {
        let s = state_with(4, 5, &[(0, 0, Orientation::Up), (3, 4, Orientation::Down)]);
        with_items(s, Item::Apple, &[(2, 2)])
    }

    #[test]
    fn frame_has_one_tile_border() {
        let mut r = Renderer::with_tile_size(2, 5, 4, 1);
        let f = r.render(&small());
        assert_eq!((f.width(), f.height()), ((5 + 2) * 4, (4 + 2) * 4));
    }

    #[test]
    fn border_is_wall_and_row_zero_at_bottom() {
        let mut r = Renderer::with_tile_size(2, 3, 4, 1);
        let s = small();
        let f = r.render(&s);
        // Top-right corner is border wall outside both windows.
        assert_eq!(f.pixel(f.width() - 1, 0), Some(palette::WALL));
        // Apple at grid (2, 2): after the 180° turn its tile sits at
        // x = (cols - c) tiles, y = (rows - r) tiles, counting the border.
        let (ts, rows, cols) = (4, 4, 5);
        let cx = (cols - 2) * ts + ts / 2;
        let cy = (rows - 2) * ts + ts / 2;
        assert_eq!(f.pixel(cx, cy), Some(palette::APPLE));
    }

    #[test]
    fn second_render_hits_cache() {
        let mut r = Renderer::with_tile_size(2, 5, 4, 2);
        let s = small();
        r.render(&s);
        let misses = r.cache().misses();
        r.render(&s);
        assert_eq!(r.cache().misses(), misses);
        assert!(r.cache().hits() > 0);
    }

    #[test]
    fn agent_tile_is_highlighted_agent_colour() {
        let mut r = Renderer::with_tile_size(2, 3, 8, 1);
        let f = r.render(&small());
        let base = r.agent_colors()[0];
        let lit: Rgb = base.map(|c| (c as f32 + 0.3 * (255.0 - c as f32)) as u8);
        // Agent 0 at grid (0, 0) lands in the bottom-right play tile.
        let (ts, rows, cols) = (8, 4, 5);
        assert_eq!(f.pixel(cols * ts + ts / 2, rows * ts + ts / 2), Some(lit));
    }
}

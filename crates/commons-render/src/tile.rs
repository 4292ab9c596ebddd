//! Per-cell tile rasterisation and the tile cache.
//!
//! Tiles are drawn at `tile_size * subdivs` pixels per side, each pixel
//! coloured by testing its centre against a shape in unit tile
//! coordinates, optionally blended towards white, then block-averaged
//! down to `tile_size`.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

use commons_core::{AgentId, Item, Orientation};

use crate::frame::Frame;
use crate::palette::{self, Rgb};

/// What a tile depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileContent {
    /// Bare floor. Spawn markers also draw as floor.
    Empty,
    /// Wall block.
    Wall,
    /// Zap marker.
    Interact,
    /// Apple on floor.
    Apple,
    /// Agent triangle pointing along its orientation.
    Agent {
        /// Which agent, for colour lookup.
        agent: AgentId,
        /// Facing direction.
        orientation: Orientation,
    },
}

impl TileContent {
    /// Content for a cell code; agents take `orientation`.
    pub fn from_code(code: u16, orientation: Orientation) -> Self {
        if let Some(agent) = AgentId::from_code(code) {
            return TileContent::Agent { agent, orientation };
        }
        match Item::from_code(code) {
            Some(Item::Wall) => TileContent::Wall,
            Some(Item::Interact) => TileContent::Interact,
            Some(Item::Apple) => TileContent::Apple,
            _ => TileContent::Empty,
        }
    }
}

/// Cache key for one rendered tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Depicted content.
    pub content: TileContent,
    /// Inside some agent's observation window.
    pub highlight: bool,
    /// Output side length in pixels.
    pub tile_size: usize,
    /// Supersampling factor per side.
    pub subdivs: usize,
}

// ── Shapes ──────────────────────────────────────────────────────

const APPLE_RADIUS: f64 = 0.31;
const TRIANGLE: [(f64, f64); 3] = [(0.12, 0.19), (0.87, 0.50), (0.12, 0.81)];

fn in_circle(x: f64, y: f64, cx: f64, cy: f64, r: f64) -> bool {
    (x - cx) * (x - cx) + (y - cy) * (y - cy) <= r * r
}

fn in_triangle(x: f64, y: f64, [a, b, c]: [(f64, f64); 3]) -> bool {
    let v0 = (c.0 - a.0, c.1 - a.1);
    let v1 = (b.0 - a.0, b.1 - a.1);
    let v2 = (x - a.0, y - a.1);
    let dot = |p: (f64, f64), q: (f64, f64)| p.0 * q.0 + p.1 * q.1;
    let (d00, d01, d02, d11, d12) = (dot(v0, v0), dot(v0, v1), dot(v0, v2), dot(v1, v1), dot(v1, v2));
    let inv = 1.0 / (d00 * d11 - d01 * d01);
    let u = (d11 * d02 - d01 * d12) * inv;
    let v = (d00 * d12 - d01 * d02) * inv;
    u >= 0.0 && v >= 0.0 && u + v < 1.0
}

/// Map `(x, y)` back through a rotation by `theta` about `(cx, cy)`.
fn unrotate(x: f64, y: f64, cx: f64, cy: f64, theta: f64) -> (f64, f64) {
    let (dx, dy) = (x - cx, y - cy);
    let (s, c) = (-theta).sin_cos();
    (cx + dx * c - dy * s, cy + dy * c + dx * s)
}

/// Rotation applied to the base right-pointing triangle.
fn agent_angle(orientation: Orientation) -> f64 {
    FRAC_PI_2 * (1.0 - orientation.index() as f64)
}

fn fill(img: &mut Frame, color: Rgb, inside: impl Fn(f64, f64) -> bool) {
    let (w, h) = (img.width(), img.height());
    for py in 0..h {
        let y = (py as f64 + 0.5) / h as f64;
        for px in 0..w {
            let x = (px as f64 + 0.5) / w as f64;
            if inside(x, y) {
                img.set_pixel(px, py, color);
            }
        }
    }
}

fn highlight(img: &mut Frame) {
    for y in 0..img.height() {
        for x in 0..img.width() {
            if let Some(px) = img.pixel(x, y) {
                let blended: Rgb = std::array::from_fn(|i| {
                    let c = px[i] as f32;
                    let t = palette::HIGHLIGHT[i] as f32;
                    (c + palette::HIGHLIGHT_ALPHA * (t - c)).clamp(0.0, 255.0) as u8
                });
                img.set_pixel(x, y, blended);
            }
        }
    }
}

fn downsample(img: &Frame, factor: usize) -> Frame {
    let factor = factor.max(1);
    let (w, h) = (img.width() / factor, img.height() / factor);
    let mut out = Frame::filled(w, h, [0, 0, 0]);
    let area = (factor * factor) as u32;
    for ty in 0..h {
        for tx in 0..w {
            let mut sum = [0u32; 3];
            for y in ty * factor..(ty + 1) * factor {
                for x in tx * factor..(tx + 1) * factor {
                    if let Some(px) = img.pixel(x, y) {
                        for (s, c) in sum.iter_mut().zip(px) {
                            *s += c as u32;
                        }
                    }
                }
            }
            out.set_pixel(tx, ty, sum.map(|s| (s / area) as u8));
        }
    }
    out
}

/// Rasterise one tile. `agent_colors[i]` colours agent `i`; agents past
/// the end of the palette draw in white.
pub fn draw_tile(key: TileKey, agent_colors: &[Rgb]) -> Frame {
    let side = key.tile_size * key.subdivs.max(1);
    let mut img = Frame::filled(side, side, palette::SAND);

    match key.content {
        TileContent::Empty => {}
        TileContent::Wall => fill(&mut img, palette::WALL, |_, _| true),
        TileContent::Interact => fill(&mut img, palette::INTERACT, |_, _| true),
        TileContent::Apple => fill(&mut img, palette::APPLE, |x, y| {
            in_circle(x, y, 0.5, 0.5, APPLE_RADIUS)
        }),
        TileContent::Agent { agent, orientation } => {
            let color = agent_colors
                .get(agent.index())
                .copied()
                .unwrap_or(palette::HIGHLIGHT);
            let theta = agent_angle(orientation);
            fill(&mut img, color, |x, y| {
                let (x, y) = unrotate(x, y, 0.5, 0.5, theta);
                in_triangle(x, y, TRIANGLE)
            });
        }
    }

    if key.highlight {
        highlight(&mut img);
    }
    downsample(&img, key.subdivs)
}

/// Memoised tiles, owned by one renderer.
#[derive(Debug, Default)]
pub struct TileCache {
    tiles: HashMap<TileKey, Frame>,
    hits: u64,
    misses: u64,
}

impl TileCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tile for `key`, drawing it on first use.
    pub fn get_or_draw(&mut self, key: TileKey, agent_colors: &[Rgb]) -> &Frame {
        if self.tiles.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.tiles
            .entry(key)
            .or_insert_with(|| draw_tile(key, agent_colors))
    }

    /// Distinct tiles stored.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile has been drawn yet.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that drew a new tile.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every stored tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

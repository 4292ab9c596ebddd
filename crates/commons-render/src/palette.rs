//! Colours.

/// An RGB triple.
pub type Rgb = [u8; 3];

/// Floor colour.
pub const SAND: Rgb = [210, 190, 140];
/// Wall colour.
pub const WALL: Rgb = [127, 127, 127];
/// Zap marker colour.
pub const INTERACT: Rgb = [188, 189, 34];
/// Apple colour.
pub const APPLE: Rgb = [214, 39, 40];
/// Highlight target colour.
pub const HIGHLIGHT: Rgb = [255, 255, 255];
/// Blend weight of [`HIGHLIGHT`] over a highlighted tile.
pub const HIGHLIGHT_ALPHA: f32 = 0.3;

/// Convert HSV in `[0, 1]` to RGB in `[0, 1]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// One colour per agent, hues evenly spaced around the wheel.
pub fn agent_colors(num_agents: usize) -> Vec<Rgb> {
    (0..num_agents)
        .map(|i| {
            let (r, g, b) = hsv_to_rgb(i as f64 / num_agents as f64, 0.8, 0.8);
            [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_agent_is_red() {
        assert_eq!(agent_colors(4)[0], [204, 40, 40]);
    }

    #[test]
    fn hues_are_distinct() {
        let colors = agent_colors(7);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn grey_without_saturation() {
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.5), (0.5, 0.5, 0.5));
    }
}

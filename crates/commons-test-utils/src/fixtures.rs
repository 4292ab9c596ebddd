//! Small layouts and input sequences.

use commons_core::{Action, EnvKey};

/// 6×7 arena: four perimeter spawns in the corners, two interior spawns
/// flanking a plus of five apple cells.
pub const DUEL_MAP: [&str; 6] = [
    "WWWWWWW",
    "WP A PW",
    "W QAQ W",
    "W AAA W",
    "WP   PW",
    "WWWWWWW",
];

/// 7×9 map with scattered apple spawns and a ring of perimeter spawns.
pub const SPARSE_MAP: [&str; 7] = [
    "WWWWWWWWW",
    "WP  P  PW",
    "W A   A W",
    "WP QAQ PW",
    "W A   A W",
    "WP  P  PW",
    "WWWWWWWWW",
];

/// Decode raw action codes, panicking on unknown codes.
pub fn actions(codes: &[u8]) -> Vec<Action> {
    codes
        .iter()
        .map(|&c| Action::try_from(c).expect("fixture action code"))
        .collect()
}

/// `n` copies of `action`.
pub fn repeat(action: Action, n: usize) -> Vec<Action> {
    vec![action; n]
}

/// `n` step keys derived from `seed`.
pub fn key_stream(seed: u64, n: usize) -> Vec<EnvKey> {
    (0..n as u64).map(|i| EnvKey::new(seed).fold_in(i)).collect()
}

//! Commons harvest: a multi-agent gridworld social dilemma.
//!
//! Agents walk a grid, eat apples that regrow only near other apples, and
//! can zap each other out of the orchard. This facade re-exports the
//! public API of every sub-crate; adding `commons` as a single dependency
//! is enough for most users.
//!
//! # Quick start
//!
//! ```rust
//! use commons::prelude::*;
//!
//! let env = HarvestEnv::new(EnvConfig::default()).unwrap();
//! let (obs, mut state) = env.reset(EnvKey(0));
//! assert_eq!(obs.len(), env.num_agents());
//!
//! for t in 0..10 {
//!     let actions = vec![Action::MoveUp; env.num_agents()];
//!     let result = env.step(EnvKey(0).fold_in(t), &state, &actions);
//!     assert_eq!(result.rewards.len(), env.num_agents());
//!     state = result.state;
//! }
//! assert_eq!(state.inner_t, 10);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `commons-core` | Cell codes, agent ids, actions, orientations, keys |
//! | [`space`] | `commons-space` | Map layouts, grids, the state snapshot |
//! | [`propagators`] | `commons-propagators` | Regrowth, movement, zaps, spawning, reward shaping |
//! | [`obs`] | `commons-obs` | Egocentric observation windows |
//! | [`engine`] | `commons-engine` | Configuration, reset/step, batching |
//! | [`render`] | `commons-render` | RGB frames and PPM export |
//! | [`replay`] | `commons-replay` | Action logs and determinism checks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Cell codes, agent ids, actions and randomness keys (`commons-core`).
pub use commons_core as types;

/// Map layouts, grids and [`space::GridState`] (`commons-space`).
pub use commons_space as space;

/// Per-step stages and reward shaping (`commons-propagators`).
pub use commons_propagators as propagators;

/// Observation windows (`commons-obs`).
pub use commons_obs as obs;

/// Configuration and the environment itself (`commons-engine`).
///
/// [`engine::HarvestEnv`] for a single world, [`engine::BatchedEnv`] for
/// many independent worlds sharing one configuration.
pub use commons_engine as engine;

/// Tile rendering (`commons-render`).
pub use commons_render as render;

/// Deterministic replay recording and verification (`commons-replay`).
pub use commons_replay as replay;

/// Common imports for typical usage.
///
/// ```rust
/// use commons::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use commons_core::{Action, AgentId, AgentLoc, EnvKey, Item, Orientation, Pos};

    // World model
    pub use commons_space::{GridState, MapLayout};

    // Observation
    pub use commons_obs::{ObsLayout, ObsShape, Observation};

    // Engine
    pub use commons_engine::{
        BatchedEnv, Done, EnvConfig, HarvestEnv, RewardMode, StepInfo, StepMetrics, StepResult,
    };

    // Errors
    pub use commons_engine::{BatchError, ConfigError, StepError};
    pub use commons_replay::ReplayError;

    // Rendering and replay
    pub use commons_render::Renderer;
    pub use commons_replay::{ReplayReader, ReplayWriter};
}

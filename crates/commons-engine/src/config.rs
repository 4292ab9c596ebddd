//! Environment configuration, validation, and error types.
//!
//! [`EnvConfig`] is the construction-time surface of the environment. Its
//! [`Default`] reproduces the reference harvest setup; every field can be
//! overridden in code or loaded from JSON via
//! [`from_json_str`](EnvConfig::from_json_str). [`validate()`](EnvConfig::validate)
//! checks everything [`HarvestEnv::new`](crate::HarvestEnv::new) relies on.

use std::error::Error;
use std::fmt;

use commons_core::AGENT_CODE_OFFSET;
use commons_obs::{ObsLayout, MIN_WINDOW};
use commons_propagators::{InequityAversion, RewardShaper, SpawnError, SpawnPlan, Svo};
use commons_space::{LayoutError, MapLayout, HARVEST_OPEN_MAP};
use serde::{Deserialize, Serialize};

/// Smallest supported agent count (shapers normalise by `N - 1`).
pub const MIN_AGENTS: usize = 2;

/// Largest agent count whose codes fit in a grid cell.
pub const MAX_AGENTS: usize = (u16::MAX - AGENT_CODE_OFFSET) as usize;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The ASCII layout does not fit the configured grid.
    Layout(LayoutError),
    /// The layout cannot seat the configured agents.
    Spawn(SpawnError),
    /// Agent count outside `MIN_AGENTS..=MAX_AGENTS`.
    AgentCount {
        /// The configured count.
        num_agents: usize,
    },
    /// Observation window below the minimum size.
    WindowTooSmall {
        /// The configured window.
        obs_size: usize,
    },
    /// An episode length is zero.
    ZeroEpisodeLength {
        /// Which length.
        field: &'static str,
    },
    /// Reward shaping parameters are invalid.
    InvalidReward {
        /// Description of the problem.
        reason: String,
    },
    /// The JSON document could not be decoded.
    Parse {
        /// Decoder message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(e) => write!(f, "layout: {e}"),
            Self::Spawn(e) => write!(f, "spawn: {e}"),
            Self::AgentCount { num_agents } => write!(
                f,
                "num_agents {num_agents} outside {MIN_AGENTS}..={MAX_AGENTS}"
            ),
            Self::WindowTooSmall { obs_size } => {
                write!(f, "obs_size {obs_size} is below minimum of {MIN_WINDOW}")
            }
            Self::ZeroEpisodeLength { field } => write!(f, "{field} must be at least 1"),
            Self::InvalidReward { reason } => write!(f, "invalid reward config: {reason}"),
            Self::Parse { reason } => write!(f, "config parse: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            Self::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

impl From<SpawnError> for ConfigError {
    fn from(e: SpawnError) -> Self {
        Self::Spawn(e)
    }
}

// ── RewardMode ─────────────────────────────────────────────────────

/// Reward shaping mode and its parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RewardMode {
    /// Total pickups broadcast to every agent.
    #[default]
    Shared,
    /// Own pickup scaled by the agent count.
    Individual,
    /// Inequity aversion with weights `alpha` (disadvantageous) and
    /// `beta` (advantageous).
    InequityAversion {
        /// Disadvantageous weight.
        alpha: f32,
        /// Advantageous weight.
        beta: f32,
        /// Smooth the reward signal across steps.
        #[serde(default)]
        smoothing: bool,
        /// Agents subject to shaping; `None` means all.
        #[serde(default)]
        targets: Option<Vec<usize>>,
    },
    /// Additive social value orientation.
    Svo {
        /// Penalty weight in `[0, 1]`.
        w: f32,
        /// Ideal reward angle in degrees.
        ideal_angle_degrees: f32,
        /// Agents subject to shaping; `None` means all.
        #[serde(default)]
        targets: Option<Vec<usize>>,
    },
    /// Multiplicative social value orientation with wrapped angles.
    StandardizedSvo {
        /// Penalty weight in `[0, 1]`.
        w: f32,
        /// Ideal reward angle in degrees.
        ideal_angle_degrees: f32,
        /// Agents subject to shaping; `None` means all.
        #[serde(default)]
        targets: Option<Vec<usize>>,
    },
}

impl RewardMode {
    /// Inequity aversion with the reference weights (`α = 5`, `β = 0.05`).
    pub fn inequity_aversion() -> Self {
        Self::InequityAversion {
            alpha: 5.0,
            beta: 0.05,
            smoothing: false,
            targets: None,
        }
    }

    /// SVO with the reference parameters (`w = 0.5`, 45°).
    pub fn svo() -> Self {
        Self::Svo {
            w: 0.5,
            ideal_angle_degrees: 45.0,
            targets: None,
        }
    }

    /// Build the shaper for `num_agents` agents.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidReward`] if the parameters are rejected.
    pub fn shaper(&self, num_agents: usize) -> Result<RewardShaper, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidReward { reason };
        Ok(match self {
            Self::Shared => RewardShaper::Shared,
            Self::Individual => RewardShaper::Individual,
            Self::InequityAversion {
                alpha,
                beta,
                smoothing,
                targets,
            } => {
                let mut b = InequityAversion::builder()
                    .alpha(*alpha)
                    .beta(*beta)
                    .smoothing(*smoothing);
                if let Some(t) = targets {
                    b = b.targets(t.clone());
                }
                RewardShaper::InequityAversion(b.build(num_agents).map_err(invalid)?)
            }
            Self::Svo {
                w,
                ideal_angle_degrees,
                targets,
            }
            | Self::StandardizedSvo {
                w,
                ideal_angle_degrees,
                targets,
            } => {
                let mut b = Svo::builder()
                    .w(*w)
                    .ideal_angle_degrees(*ideal_angle_degrees)
                    .standardized(matches!(self, Self::StandardizedSvo { .. }));
                if let Some(t) = targets {
                    b = b.targets(t.clone());
                }
                RewardShaper::Svo(b.build(num_agents).map_err(invalid)?)
            }
        })
    }
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Complete configuration for a harvest environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Steps per inner episode. Default: 1000.
    pub num_inner_steps: u32,
    /// Inner episodes per outer episode. Default: 1.
    pub num_outer_steps: u32,
    /// Play-area rows. Default: 16.
    pub grid_rows: usize,
    /// Play-area columns. Default: 22.
    pub grid_cols: usize,
    /// Observation window side. Default: 11.
    pub obs_size: usize,
    /// Number of agents. Default: 7.
    pub num_agents: usize,
    /// ASCII map, one string per row. Default: the open harvest map.
    pub layout: Vec<String>,
    /// Reward shaping. Default: [`RewardMode::Shared`].
    pub reward: RewardMode,
    /// Emit flat observation vectors instead of `(W, W, F)` tensors.
    pub flat_obs: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_inner_steps: 1000,
            num_outer_steps: 1,
            grid_rows: 16,
            grid_cols: 22,
            obs_size: 11,
            num_agents: 7,
            layout: HARVEST_OPEN_MAP.iter().map(|s| s.to_string()).collect(),
            reward: RewardMode::Shared,
            flat_obs: false,
        }
    }
}

impl EnvConfig {
    /// Decode a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON. The result is not
    /// validated.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Observation layout selected by [`flat_obs`](Self::flat_obs).
    pub fn obs_layout(&self) -> ObsLayout {
        if self.flat_obs {
            ObsLayout::Flat
        } else {
            ObsLayout::Spatial
        }
    }

    /// Parse [`layout`](Self::layout) against the configured grid.
    pub fn map_layout(&self) -> Result<MapLayout, ConfigError> {
        Ok(MapLayout::parse(&self.layout, self.grid_rows, self.grid_cols)?)
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Agent count.
        if !(MIN_AGENTS..=MAX_AGENTS).contains(&self.num_agents) {
            return Err(ConfigError::AgentCount {
                num_agents: self.num_agents,
            });
        }
        // 2. Episode lengths.
        if self.num_inner_steps == 0 {
            return Err(ConfigError::ZeroEpisodeLength {
                field: "num_inner_steps",
            });
        }
        if self.num_outer_steps == 0 {
            return Err(ConfigError::ZeroEpisodeLength {
                field: "num_outer_steps",
            });
        }
        // 3. Window.
        if self.obs_size < MIN_WINDOW {
            return Err(ConfigError::WindowTooSmall {
                obs_size: self.obs_size,
            });
        }
        // 4. Layout fits and seats everyone.
        let layout = self.map_layout()?;
        SpawnPlan::new(&layout, self.num_agents)?;
        // 5. Reward parameters.
        self.reward.shaper(self.num_agents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_reference_setup() {
        let cfg = EnvConfig::default();
        assert_eq!((cfg.grid_rows, cfg.grid_cols), (16, 22));
        assert_eq!(cfg.obs_size, 11);
        assert_eq!(cfg.num_agents, 7);
        assert_eq!(cfg.layout.len(), 16);
        assert!(matches!(cfg.reward, RewardMode::Shared));
        assert_eq!(RewardMode::default(), RewardMode::Shared);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_single_agent() {
        let cfg = EnvConfig {
            num_agents: 1,
            ..EnvConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::AgentCount { num_agents: 1 })
        );
    }

    #[test]
    fn rejects_zero_lengths_and_tiny_window() {
        let cfg = EnvConfig {
            num_inner_steps: 0,
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroEpisodeLength { field: "num_inner_steps" })
        ));
        let cfg = EnvConfig {
            obs_size: 2,
            ..EnvConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::WindowTooSmall { obs_size: 2 })
        );
    }

    #[test]
    fn rejects_layout_wider_than_grid() {
        let cfg = EnvConfig {
            grid_cols: 10,
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Layout(LayoutError::RowTooWide { .. }))
        ));
    }

    #[test]
    fn rejects_too_many_agents_for_spawns() {
        let cfg = EnvConfig {
            num_agents: 500,
            ..EnvConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Spawn(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn rejects_bad_reward_params() {
        let cfg = EnvConfig {
            reward: RewardMode::Svo {
                w: 2.0,
                ideal_angle_degrees: 45.0,
                targets: None,
            },
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidReward { .. })
        ));
        let cfg = EnvConfig {
            reward: RewardMode::InequityAversion {
                alpha: 5.0,
                beta: 0.05,
                smoothing: false,
                targets: Some(vec![7]),
            },
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_partial_override() {
        let cfg = EnvConfig::from_json_str(
            r#"{ "num_agents": 3, "reward": { "mode": "svo", "w": 0.2, "ideal_angle_degrees": 90.0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.num_agents, 3);
        assert_eq!(cfg.obs_size, 11);
        assert_eq!(
            cfg.reward,
            RewardMode::Svo {
                w: 0.2,
                ideal_angle_degrees: 90.0,
                targets: None
            }
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn json_round_trip_and_parse_error() {
        let cfg = EnvConfig {
            reward: RewardMode::inequity_aversion(),
            flat_obs: true,
            ..EnvConfig::default()
        };
        let text = cfg.to_json_string().unwrap();
        assert_eq!(EnvConfig::from_json_str(&text).unwrap(), cfg);
        assert!(matches!(
            EnvConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn standardized_svo_builds_standardized_shaper() {
        let mode = RewardMode::StandardizedSvo {
            w: 0.5,
            ideal_angle_degrees: 45.0,
            targets: None,
        };
        assert_eq!(mode.shaper(3).unwrap().name(), "standardized_svo");
        assert_eq!(RewardMode::svo().shaper(3).unwrap().name(), "svo");
    }
}

//! Per-agent observation extraction.

use std::fmt;

use commons_core::{AgentId, Item, Pos};
use commons_space::{Grid, GridState};
use smallvec::SmallVec;

use crate::geometry::{rot90_source, WindowGeometry};
use crate::metadata::{feature, ObsLayout, ObsShape, FEATURES};

/// Smallest supported window.
pub const MIN_WINDOW: usize = 3;

/// Errors from [`ObservationBuilder::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObsBuildError {
    /// The window is too small to hold the agent and its surroundings.
    WindowTooSmall {
        /// Requested window size.
        size: usize,
    },
}

impl fmt::Display for ObsBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowTooSmall { size } => {
                write!(f, "observation window {size} is smaller than {MIN_WINDOW}")
            }
        }
    }
}

impl std::error::Error for ObsBuildError {}

/// One agent's observation tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    data: Vec<f32>,
    shape: ObsShape,
}

impl Observation {
    /// Tensor shape.
    pub fn shape(&self) -> ObsShape {
        self.shape
    }

    /// Row-major tensor data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume into the raw data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Value of `feature` at window cell `(row, col)`.
    pub fn get(&self, row: usize, col: usize, feature: usize) -> Option<f32> {
        if row >= self.shape.window || col >= self.shape.window || feature >= FEATURES {
            return None;
        }
        self.data.get(self.shape.index(row, col, feature)).copied()
    }

    /// All features of window cell `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&[f32]> {
        if row >= self.shape.window || col >= self.shape.window {
            return None;
        }
        let start = self.shape.index(row, col, 0);
        self.data.get(start..start + FEATURES)
    }
}

/// Builds egocentric observations from a [`GridState`].
#[derive(Clone, Debug)]
pub struct ObservationBuilder {
    geometry: WindowGeometry,
    layout: ObsLayout,
}

impl ObservationBuilder {
    /// Builder for `window × window` observations in `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`ObsBuildError::WindowTooSmall`] for windows under 3 cells.
    pub fn new(window: usize, layout: ObsLayout) -> Result<Self, ObsBuildError> {
        if window < MIN_WINDOW {
            return Err(ObsBuildError::WindowTooSmall { size: window });
        }
        Ok(Self {
            geometry: WindowGeometry::new(window),
            layout,
        })
    }

    /// Shape of every produced observation.
    pub fn shape(&self) -> ObsShape {
        ObsShape {
            window: self.geometry.size(),
            layout: self.layout,
        }
    }

    /// Window geometry.
    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// One observation per agent, in agent order.
    pub fn observe(&self, state: &GridState) -> Vec<Observation> {
        let padded = self.pad(&state.grid);
        (0..state.num_agents())
            .map(|i| self.observe_padded(state, &padded, AgentId(i as u16)))
            .collect()
    }

    /// Observation for a single agent.
    pub fn observe_agent(&self, state: &GridState, viewer: AgentId) -> Observation {
        let padded = self.pad(&state.grid);
        self.observe_padded(state, &padded, viewer)
    }

    fn pad(&self, grid: &Grid) -> Grid {
        grid.padded(self.geometry.padding(), Item::Wall.code())
    }

    fn observe_padded(&self, state: &GridState, padded: &Grid, viewer: AgentId) -> Observation {
        let shape = self.shape();
        let w = shape.window;
        let mut data = vec![0.0f32; shape.len()];

        let Some(view) = state.loc(viewer) else {
            return Observation { data, shape };
        };
        let (ox, oy) = self.geometry.origin(view, padded.rows(), padded.cols());
        let k = view.orientation.index();

        let disclosing = state
            .freeze
            .row_max(viewer.index())
            .is_some_and(|m| m > 0);
        let revealed: SmallVec<[usize; commons_space::MAX_REVEALED]> = if disclosing {
            state.freeze.revealed(viewer.index())
        } else {
            SmallVec::new()
        };

        for i in 0..w {
            for j in 0..w {
                let (si, sj) = rot90_source(i, j, k, w);
                let pos = Pos::new((ox + si) as i32, (oy + sj) as i32);
                let code = padded.get(pos).unwrap_or(Item::Wall.code());
                let base = shape.index(i, j, 0);
                let cell = &mut data[base..base + FEATURES];

                if (1..=feature::ITEM_COUNT as u16).contains(&code) {
                    cell[feature::ITEMS + code as usize - 1] = 1.0;
                    continue;
                }
                let Some(occupant) = AgentId::from_code(code) else {
                    continue;
                };
                let Some(occ_loc) = state.loc(occupant) else {
                    continue;
                };
                let inv = state
                    .agent_invs
                    .get(occupant.index())
                    .copied()
                    .unwrap_or_default();
                if inv[0] + inv[1] > 0 {
                    cell[feature::CAN_INTERACT] = 1.0;
                }
                if occupant == viewer {
                    cell[feature::SELF] = 1.0;
                    continue;
                }

                cell[feature::OTHER] = 1.0;
                let rel = occ_loc.orientation.relative_to(view.orientation) as usize;
                cell[feature::ANGLE + rel] = 1.0;

                let permitted = state
                    .freeze
                    .get(viewer.index(), occupant.index())
                    .is_some_and(|v| v > 0);
                if permitted && revealed.contains(&occupant.index()) {
                    cell[feature::INVENTORY] = inv[0] as f32;
                    cell[feature::INVENTORY + 1] = inv[1] as f32;
                }
                if state
                    .freeze
                    .row_max(occupant.index())
                    .is_some_and(|m| m > 0)
                {
                    cell[feature::FROZEN] = 1.0;
                }
            }
        }

        Observation { data, shape }
    }
}

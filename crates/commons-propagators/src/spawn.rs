//! Agent placement at reset and after a zap.
//!
//! [`SpawnPlan`] is built once from a layout and an agent count and
//! checks up front that there are enough spawn cells, so the placement
//! functions themselves cannot run out.

use std::fmt;

use commons_core::{AgentLoc, EnvKey, Pos};
use commons_space::MapLayout;
use tracing::warn;

use crate::grid_helpers::{draw_orientation, permuted};

/// Agents guaranteed an interior spawn at reset.
pub const INTERIOR_SEATS: usize = 2;

/// Not enough spawn cells for the configured agents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnError {
    /// Fewer player spawn cells (interior and perimeter) than agents.
    TooFewSpawns {
        /// Agents to place.
        agents: usize,
        /// Spawn cells available.
        available: usize,
    },
    /// Fewer perimeter spawn cells than agents; respawns draw from them.
    TooFewPerimeterSpawns {
        /// Agents to place.
        agents: usize,
        /// Perimeter cells available.
        available: usize,
    },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSpawns { agents, available } => {
                write!(f, "{agents} agents but only {available} player spawn cells")
            }
            Self::TooFewPerimeterSpawns { agents, available } => write!(
                f,
                "{agents} agents but only {available} perimeter spawn cells for respawning"
            ),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Validated spawn cells for a fixed number of agents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnPlan {
    interior: Vec<Pos>,
    perimeter: Vec<Pos>,
    num_agents: usize,
}

impl SpawnPlan {
    /// Build a plan for `num_agents` agents on `layout`.
    ///
    /// # Errors
    ///
    /// [`SpawnError`] if the layout cannot seat every agent at reset, or
    /// cannot seat every agent on the perimeter at once.
    pub fn new(layout: &MapLayout, num_agents: usize) -> Result<Self, SpawnError> {
        let available = layout.player_spawn_count();
        if available < num_agents {
            return Err(SpawnError::TooFewSpawns {
                agents: num_agents,
                available,
            });
        }
        let perimeter = layout.perimeter_spawns().len();
        if perimeter < num_agents {
            return Err(SpawnError::TooFewPerimeterSpawns {
                agents: num_agents,
                available: perimeter,
            });
        }
        Ok(Self {
            interior: layout.interior_spawns().to_vec(),
            perimeter: layout.perimeter_spawns().to_vec(),
            num_agents,
        })
    }

    /// Number of agents this plan seats.
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Perimeter spawn cells.
    pub fn perimeter(&self) -> &[Pos] {
        &self.perimeter
    }

    /// Placements at episode start.
    ///
    /// The first agents (up to [`INTERIOR_SEATS`]) take cells from a
    /// permutation of the interior spawns; the rest take, in order, the
    /// untaken cells of a permutation of all player spawns. Orientations
    /// come from [`draw_orientation`].
    pub fn reset_placement(&self, key: EnvKey) -> Vec<AgentLoc> {
        let [interior_key, pool_key, facing_key] = key.split_n::<3>();
        let n = self.num_agents;

        let interior = permuted(&self.interior, &mut interior_key.rng());
        let seats = interior.len().min(INTERIOR_SEATS).min(n);
        let mut cells: Vec<Pos> = interior[..seats].to_vec();

        let pool: Vec<Pos> = self.interior.iter().chain(&self.perimeter).copied().collect();
        for p in permuted(&pool, &mut pool_key.rng()) {
            if cells.len() == n {
                break;
            }
            if !cells.contains(&p) {
                cells.push(p);
            }
        }

        let mut rng = facing_key.rng();
        cells
            .into_iter()
            .map(|p| AgentLoc::new(p, draw_orientation(&mut rng)))
            .collect()
    }

    /// Placements for the next step after a zap.
    ///
    /// Agents with `reborn[i]` walk a permutation of the perimeter spawns
    /// and take the next cell not held by a staying agent, not already
    /// assigned and not their own pre-zap cell, with a fresh orientation.
    /// The pre-zap cell is taken only when it is the last free one.
    /// Everyone else keeps `locs[i]`.
    pub fn respawn_placement(&self, locs: &[AgentLoc], reborn: &[bool], key: EnvKey) -> Vec<AgentLoc> {
        if !reborn.iter().any(|&r| r) {
            return locs.to_vec();
        }
        let (order_key, facing_key) = key.split();

        let held: Vec<Pos> = locs
            .iter()
            .zip(reborn)
            .filter(|&(_, &r)| !r)
            .map(|(l, _)| l.pos)
            .collect();
        let mut free: Vec<Pos> = permuted(&self.perimeter, &mut order_key.rng())
            .into_iter()
            .filter(|p| !held.contains(p))
            .collect();

        let mut rng = facing_key.rng();
        locs.iter()
            .zip(reborn)
            .enumerate()
            .map(|(agent, (loc, &r))| {
                if !r {
                    return *loc;
                }
                let slot = free
                    .iter()
                    .position(|&p| p != loc.pos)
                    .or_else(|| (!free.is_empty()).then_some(0));
                match slot {
                    Some(i) => AgentLoc::new(free.remove(i), draw_orientation(&mut rng)),
                    None => {
                        warn!(
                            agent,
                            row = loc.pos.row,
                            col = loc.pos.col,
                            "no free perimeter cell, agent keeps its place"
                        );
                        *loc
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons_core::Orientation;

    fn layout() -> MapLayout {
        MapLayout::parse(&["  Q  Q  ", "        ", "PPPPPPPP"], 3, 8).unwrap()
    }

    #[test]
    fn too_few_spawns_rejected() {
        let l = MapLayout::parse(&["QP"], 1, 2).unwrap();
        assert_eq!(
            SpawnPlan::new(&l, 3),
            Err(SpawnError::TooFewSpawns {
                agents: 3,
                available: 2
            })
        );
        assert_eq!(
            SpawnPlan::new(&l, 2),
            Err(SpawnError::TooFewPerimeterSpawns {
                agents: 2,
                available: 1
            })
        );
    }

    #[test]
    fn first_two_agents_seated_inside() {
        let plan = SpawnPlan::new(&layout(), 6).unwrap();
        for seed in 0..30 {
            let locs = plan.reset_placement(EnvKey(seed));
            assert_eq!(locs.len(), 6);
            assert_eq!(locs[0].pos.row, 0);
            assert_eq!(locs[1].pos.row, 0);
            assert_ne!(locs[0].pos, locs[1].pos);
            let mut cells: Vec<Pos> = locs.iter().map(|l| l.pos).collect();
            cells.sort();
            cells.dedup();
            assert_eq!(cells.len(), 6);
            assert!(locs.iter().all(|l| l.orientation != Orientation::Left));
        }
    }

    #[test]
    fn reset_is_keyed() {
        let plan = SpawnPlan::new(&layout(), 4).unwrap();
        assert_eq!(plan.reset_placement(EnvKey(1)), plan.reset_placement(EnvKey(1)));
    }

    #[test]
    fn respawn_moves_only_reborn_agents_to_free_perimeter_cells() {
        let plan = SpawnPlan::new(&layout(), 3).unwrap();
        let locs = vec![
            AgentLoc::new(Pos::new(2, 0), Orientation::Up),
            AgentLoc::new(Pos::new(1, 4), Orientation::Down),
            AgentLoc::new(Pos::new(2, 7), Orientation::Right),
        ];
        for seed in 0..50 {
            let out = plan.respawn_placement(&locs, &[false, true, false], EnvKey(seed));
            assert_eq!(out[0], locs[0]);
            assert_eq!(out[2], locs[2]);
            assert_eq!(out[1].pos.row, 2);
            assert_ne!(out[1].pos, locs[0].pos);
            assert_ne!(out[1].pos, locs[2].pos);
        }
    }

    #[test]
    fn reborn_agent_leaves_its_own_perimeter_cell() {
        // Agent 1 stands on a perimeter spawn; two cells stay free.
        let l = MapLayout::parse(&["Q  Q", "PPPP"], 2, 4).unwrap();
        let plan = SpawnPlan::new(&l, 3).unwrap();
        let locs = vec![
            AgentLoc::new(Pos::new(1, 0), Orientation::Up),
            AgentLoc::new(Pos::new(1, 1), Orientation::Up),
            AgentLoc::new(Pos::new(0, 0), Orientation::Up),
        ];
        for seed in 0..50 {
            let out = plan.respawn_placement(&locs, &[false, true, false], EnvKey(seed));
            assert_ne!(out[1].pos, locs[1].pos);
            assert_eq!(out[1].pos.row, 1);
            assert_ne!(out[1].pos, locs[0].pos);
        }
    }

    #[test]
    fn last_free_cell_may_be_the_pre_zap_cell() {
        let l = MapLayout::parse(&["Q  Q", "PP  "], 2, 4).unwrap();
        let plan = SpawnPlan::new(&l, 2).unwrap();
        let locs = vec![
            AgentLoc::new(Pos::new(1, 0), Orientation::Up),
            AgentLoc::new(Pos::new(1, 1), Orientation::Up),
        ];
        for seed in 0..20 {
            let out = plan.respawn_placement(&locs, &[false, true], EnvKey(seed));
            assert_eq!(out[1].pos, locs[1].pos);
        }
    }

    #[test]
    fn no_rebirth_keeps_everyone() {
        let plan = SpawnPlan::new(&layout(), 2).unwrap();
        let locs = plan.reset_placement(EnvKey(3));
        assert_eq!(plan.respawn_placement(&locs, &[false, false], EnvKey(4)), locs);
    }

    #[test]
    fn simultaneous_rebirths_get_distinct_cells() {
        let plan = SpawnPlan::new(&layout(), 8).unwrap();
        let locs = plan.reset_placement(EnvKey(5));
        let out = plan.respawn_placement(&locs, &[true; 8], EnvKey(6));
        let mut cells: Vec<Pos> = out.iter().map(|l| l.pos).collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 8);
        assert!(out.iter().all(|l| l.pos.row == 2));
    }
}

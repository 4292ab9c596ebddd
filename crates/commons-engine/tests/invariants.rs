//! Property tests: structural invariants hold along random trajectories.

use commons_core::{Action, EnvKey, Item};
use commons_engine::{EnvConfig, HarvestEnv, RewardMode};
use commons_propagators::resolve_zaps;
use commons_test_utils::{cells_of, SPARSE_MAP};
use proptest::prelude::*;

fn sparse(reward: RewardMode) -> HarvestEnv {
    HarvestEnv::new(EnvConfig {
        grid_rows: 7,
        grid_cols: 9,
        obs_size: 5,
        num_agents: 4,
        num_inner_steps: 12,
        num_outer_steps: 3,
        layout: SPARSE_MAP.iter().map(|s| s.to_string()).collect(),
        reward,
        ..EnvConfig::default()
    })
    .unwrap()
}

fn trajectory() -> impl Strategy<Value = (u64, Vec<(u64, Vec<u8>)>)> {
    (
        any::<u64>(),
        proptest::collection::vec(
            (any::<u64>(), proptest::collection::vec(0u8..8, 4)),
            1..40,
        ),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn structural_invariants_hold((seed, steps) in trajectory()) {
        let env = sparse(RewardMode::inequity_aversion());
        let (_, mut state) = env.reset(EnvKey(seed));
        let walls = cells_of(&state.grid, Item::Wall);
        let spawns = env.layout().apple_spawns();

        for (key, codes) in steps {
            let out = env.step_checked(EnvKey(key), &state, &codes).unwrap();
            state = out.state;

            prop_assert!(state.validate().is_ok());
            prop_assert_eq!(state.grid.agent_cell_count(), 4);
            for (i, a) in state.agent_locs.iter().enumerate() {
                prop_assert!(a.pos.in_bounds(7, 9));
                for b in &state.agent_locs[i + 1..] {
                    prop_assert_ne!(a.pos, b.pos);
                }
            }
            for b in &state.reborn_locs {
                prop_assert!(b.pos.in_bounds(7, 9));
            }
            prop_assert_eq!(&cells_of(&state.grid, Item::Wall), &walls);
            for apple in cells_of(&state.grid, Item::Apple) {
                prop_assert!(spawns.contains(&apple));
            }
            prop_assert!(state.inner_t < 12);
            prop_assert!(out.rewards.iter().all(|r| r.is_finite()));
            prop_assert_eq!(out.info.apple_count <= spawns.len(), true);
        }
    }

    #[test]
    fn reborn_agents_never_share_cells((seed, steps) in trajectory()) {
        let env = sparse(RewardMode::Individual);
        let (_, mut state) = env.reset(EnvKey(seed));
        for (key, _) in steps {
            let out = env.step(EnvKey(key), &state, &[Action::ZapForward; 4]);
            state = out.state;
            for (i, a) in state.reborn_locs.iter().enumerate() {
                for b in &state.reborn_locs[i + 1..] {
                    prop_assert_ne!(a.pos, b.pos);
                }
            }
        }
    }

    #[test]
    fn reborn_agents_leave_their_pre_zap_cell((seed, steps) in trajectory()) {
        let env = sparse(RewardMode::Shared);
        let perimeter = env.layout().perimeter_spawns();
        let (_, mut state) = env.reset(EnvKey(seed));
        for (key, codes) in steps {
            let actions = env.decode_actions(&codes).unwrap();
            let out = env.step(EnvKey(key), &state, &actions);
            state = out.state;
            if state.inner_t == 0 {
                continue;
            }
            // Markers only sit on empty cells, so clearing them gives back
            // the grid the zaps were resolved on.
            let reborn = resolve_zaps(&state.grid, &state.agent_locs, &actions).reborn;
            let free = perimeter
                .iter()
                .filter(|p| {
                    !state
                        .agent_locs
                        .iter()
                        .zip(&reborn)
                        .any(|(l, &r)| !r && l.pos == **p)
                })
                .count();
            let reborn_count = reborn.iter().filter(|&&r| r).count();
            prop_assert_eq!(out.metrics.respawns, reborn_count);
            for (i, &r) in reborn.iter().enumerate() {
                if r {
                    prop_assert!(perimeter.contains(&state.reborn_locs[i].pos));
                    if free > reborn_count {
                        prop_assert_ne!(state.reborn_locs[i].pos, state.agent_locs[i].pos);
                    }
                } else {
                    prop_assert_eq!(state.reborn_locs[i], state.agent_locs[i]);
                }
            }
        }
    }
}

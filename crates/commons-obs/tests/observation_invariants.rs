//! Property tests over random agent placements.

use commons_core::{AgentId, Orientation};
use commons_obs::{feature, ObsLayout, ObservationBuilder, FEATURES};
use commons_test_utils::state_with;
use proptest::prelude::*;

fn placements() -> impl Strategy<Value = (usize, usize, Vec<(i32, i32, Orientation)>)> {
    (3usize..8, 3usize..8).prop_flat_map(|(rows, cols)| {
        let cells = rows * cols;
        (
            Just(rows),
            Just(cols),
            proptest::sample::subsequence((0..cells).collect::<Vec<_>>(), 1..4),
            proptest::collection::vec(0u8..4, 4),
        )
            .prop_map(move |(rows, cols, picked, orients)| {
                let agents = picked
                    .into_iter()
                    .zip(orients)
                    .map(|(cell, o)| {
                        (
                            (cell / cols) as i32,
                            (cell % cols) as i32,
                            Orientation::from_index(o),
                        )
                    })
                    .collect();
                (rows, cols, agents)
            })
    })
}

proptest! {
    #[test]
    fn viewer_sees_itself_exactly_once(
        (rows, cols, agents) in placements(),
        window in prop_oneof![Just(3usize), Just(5), Just(7), Just(11)],
    ) {
        let state = state_with(rows, cols, &agents);
        let builder = ObservationBuilder::new(window, ObsLayout::Spatial).unwrap();
        for (i, obs) in builder.observe(&state).iter().enumerate() {
            let selves = (0..window)
                .flat_map(|r| (0..window).map(move |c| (r, c)))
                .filter(|&(r, c)| obs.get(r, c, feature::SELF) == Some(1.0))
                .count();
            prop_assert_eq!(selves, 1, "agent {} window {}", i, window);
        }
    }

    #[test]
    fn each_cell_has_one_occupant_class(
        (rows, cols, agents) in placements(),
    ) {
        let state = state_with(rows, cols, &agents);
        let builder = ObservationBuilder::new(5, ObsLayout::Flat).unwrap();
        let obs = builder.observe_agent(&state, AgentId(0));
        for cell in obs.as_slice().chunks(FEATURES) {
            let classes: f32 = cell[..feature::ANGLE].iter().sum();
            prop_assert!(classes <= 1.0);
            let angles: f32 = cell[feature::ANGLE..feature::CAN_INTERACT].iter().sum();
            prop_assert_eq!(angles, cell[feature::OTHER]);
        }
    }
}

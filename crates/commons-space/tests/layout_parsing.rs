//! Property tests for ASCII layout parsing.

use commons_core::{Item, Pos};
use commons_space::MapLayout;
use proptest::prelude::*;

fn layout_strategy() -> impl Strategy<Value = (Vec<String>, usize, usize)> {
    (1usize..8, 1usize..10).prop_flat_map(|(rows, cols)| {
        let row = proptest::collection::vec(
            prop_oneof![Just('W'), Just('A'), Just('P'), Just('Q'), Just(' '), Just('.')],
            0..=cols,
        )
        .prop_map(|cs| cs.into_iter().collect::<String>());
        (proptest::collection::vec(row, 0..=rows), Just(rows), Just(cols))
    })
}

proptest! {
    #[test]
    fn every_marked_cell_lands_in_exactly_one_set((lines, rows, cols) in layout_strategy()) {
        let layout = MapLayout::parse(&lines, rows, cols).unwrap();
        let count = |ch: char| lines.iter().map(|l| l.chars().filter(|&c| c == ch).count()).sum::<usize>();
        prop_assert_eq!(layout.walls().len(), count('W'));
        prop_assert_eq!(layout.apple_spawns().len(), count('A'));
        prop_assert_eq!(layout.perimeter_spawns().len(), count('P'));
        prop_assert_eq!(layout.interior_spawns().len(), count('Q'));
        prop_assert_eq!(layout.player_spawn_count(), count('P') + count('Q'));
    }

    #[test]
    fn initial_grid_matches_sets((lines, rows, cols) in layout_strategy()) {
        let layout = MapLayout::parse(&lines, rows, cols).unwrap();
        let grid = layout.initial_grid().unwrap();
        prop_assert_eq!(grid.count(Item::Wall.code()), layout.walls().len());
        prop_assert_eq!(grid.count(Item::Apple.code()), layout.apple_spawns().len());
        for p in layout.perimeter_spawns().iter().chain(layout.interior_spawns()) {
            prop_assert!(grid.is(*p, Item::Empty));
        }
        prop_assert!(grid.get(Pos::new(rows as i32, 0)).is_none());
    }
}

use std::sync::Arc;

use proptest::prelude::*;
use quarry_blocks::BlockRegistry;
use quarry_geom::{Aabb, Vec3};
use quarry_grid::OccupancyStore;
use quarry_net::{EventKind, MutationIntent};
use quarry_server::{ServerState, Tuning};

const BLOCKS_TOML: &str = r#"
    [[blocks]]
    name = "stone"
"#;

fn registry() -> Arc<BlockRegistry> {
    Arc::new(BlockRegistry::from_toml_str(BLOCKS_TOML).unwrap())
}

/// Floor slab whose top face is flush with the bottom of cell y = 0.
fn floor() -> Aabb {
    Aabb::new(
        Vec3::new(-20.0, -1.125, -20.0),
        Vec3::new(20.0, -0.375, 20.0),
    )
}

#[derive(Clone, Copy, Debug)]
struct Shot {
    place: bool,
    col_x: i32,
    col_z: i32,
}

fn arb_shot() -> impl Strategy<Value = Shot> {
    (any::<bool>(), -3i32..=3, -3i32..=3).prop_map(|(place, col_x, col_z)| Shot {
        place,
        col_x,
        col_z,
    })
}

/// Straight-down ray over a column of cells. Placement stacks onto
/// whatever the column currently holds; removal takes the stack top.
fn intent_for(shot: Shot, grid: f32) -> MutationIntent {
    let origin = Vec3::new(shot.col_x as f32 * grid, 5.0, shot.col_z as f32 * grid);
    let dir = Vec3::new(0.0, -1.0, 0.0);
    if shot.place {
        MutationIntent::Place {
            origin,
            dir,
            block: 0,
        }
    } else {
        MutationIntent::Remove { origin, dir }
    }
}

proptest! {
    // Any interleaving of place/remove intents keeps the store
    // consistent: every broadcast Placed lands on a cell that was empty
    // at apply time, every Removed clears a cell that was filled, and a
    // mirror replaying the stream in delivery order ends bit-for-bit
    // equal to the authoritative store.
    #[test]
    fn random_intent_sequences_stay_consistent(shots in prop::collection::vec(arb_shot(), 0..40)) {
        let mut st = ServerState::new(Tuning::default(), registry(), vec![floor()]);
        // Observer well away from every target column
        let boot = st.join(1, Vec3::new(15.0, -0.375, 15.0));

        for shot in shots {
            st.process(1, intent_for(shot, st.tuning.grid_size));
            st.advance_tick();
        }

        let mut replay = OccupancyStore::new();
        let mut broadcasts = 0u64;
        for event in boot.events.try_iter() {
            match event.kind {
                EventKind::Placed { cell, block } => {
                    broadcasts += 1;
                    prop_assert!(!replay.is_occupied(cell));
                    prop_assert!(replay.set(cell, Some(block)));
                }
                EventKind::Removed { cell } => {
                    broadcasts += 1;
                    prop_assert!(replay.is_occupied(cell));
                    prop_assert!(replay.set(cell, None));
                }
                EventKind::Rejected { .. } => {}
            }
        }

        prop_assert_eq!(broadcasts, st.applied());
        prop_assert!(replay.same_occupancy(&st.store));
    }
}

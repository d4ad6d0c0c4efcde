use quarry_blocks::{Block, BlockRegistry};
use quarry_geom::Aabb;
use quarry_grid::OccupancyStore;
use quarry_net::{ConnectionId, EventKind, MutationIntent, RejectReason};
use quarry_ray::{HitKind, resolve};

use crate::players::PlayerRegistry;
use crate::state::Tuning;

/// Terminal validate-and-apply step for one intent. The ray is re-run
/// against the server's own occupancy and scenery; nothing the client
/// claims about the hit is trusted. The caller holds exclusive access
/// to the store for the whole call, so intents racing for one cell are
/// decided purely by call order.
#[allow(clippy::too_many_arguments)]
pub fn apply_intent(
    tuning: &Tuning,
    registry: &BlockRegistry,
    scenery: &[Aabb],
    players: &PlayerRegistry,
    store: &mut OccupancyStore,
    conn: ConnectionId,
    intent: MutationIntent,
    tick: u64,
) -> Result<EventKind, RejectReason> {
    if !players.contains(conn) {
        return Err(RejectReason::StaleClient);
    }

    let (origin, dir) = intent.ray();
    // One cast serves both operations; the per-operation range check
    // happens on the resolved distance below.
    let reach = tuning.max_place_distance.max(tuning.max_remove_distance);
    let hit = {
        let occupancy = &*store;
        resolve(
            origin,
            dir,
            reach,
            tuning.grid_size,
            |cell| {
                occupancy
                    .get(cell)
                    .map(|b| registry.is_solid(b.id))
                    .unwrap_or(false)
            },
            scenery,
        )
    }
    .ok_or(RejectReason::InvalidTarget)?;

    match intent {
        MutationIntent::Place { block, .. } => {
            if hit.distance > tuning.max_place_distance {
                return Err(RejectReason::RangeExceeded);
            }
            if !registry.is_placeable(block) {
                return Err(RejectReason::InvalidTarget);
            }
            let cell = hit.adjacent;
            // Re-check against the authoritative store; the client's
            // local view may be stale.
            if store.is_occupied(cell) {
                return Err(RejectReason::OccupancyConflict);
            }
            if players.any_volume_intersects(cell.aabb(tuning.grid_size)) {
                return Err(RejectReason::OccupancyConflict);
            }
            let placed = Block::new(block, tick);
            store.set(cell, Some(placed));
            Ok(EventKind::Placed {
                cell,
                block: placed,
            })
        }
        MutationIntent::Remove { .. } => {
            if hit.distance > tuning.max_remove_distance {
                return Err(RejectReason::RangeExceeded);
            }
            if hit.kind != HitKind::Block {
                return Err(RejectReason::InvalidTarget);
            }
            let cell = hit.cell.ok_or(RejectReason::InvalidTarget)?;
            if !store.is_occupied(cell) {
                return Err(RejectReason::OccupancyConflict);
            }
            store.set(cell, None);
            Ok(EventKind::Removed { cell })
        }
    }
}

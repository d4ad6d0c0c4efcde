//! Client-side mirror of the authoritative occupancy, plus intent
//! construction from the local camera.
#![forbid(unsafe_code)]

use crossbeam_channel::Receiver;
use quarry_blocks::{BlockId, BlockRegistry};
use quarry_geom::{Aabb, Vec3};
use quarry_grid::OccupancyStore;
use quarry_net::{EventKind, MutationEvent, MutationIntent, Snapshot};
use quarry_ray::{RayHit, resolve};

/// Read-only, eventually-consistent copy of the server's occupancy.
/// Written exclusively by replicated events; may transiently lag the
/// server and converges once in-flight events are applied.
#[derive(Default)]
pub struct Mirror {
    store: OccupancyStore,
    last_seq: u64,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the join-time snapshot. Must run before incremental
    /// events are applied, or earlier mutations would be missed.
    pub fn bootstrap(snapshot: Snapshot) -> Self {
        let mut store = OccupancyStore::new();
        for (cell, block) in snapshot.cells {
            store.set(cell, Some(block));
        }
        Self {
            store,
            last_seq: snapshot.seq,
        }
    }

    /// Applies one replicated event with the same idempotent store
    /// write the server used. Rejections carry no state change; they
    /// are at most locally diagnosable.
    pub fn apply(&mut self, event: MutationEvent) {
        match event.kind {
            EventKind::Placed { cell, block } => {
                self.store.set(cell, Some(block));
            }
            EventKind::Removed { cell } => {
                self.store.set(cell, None);
            }
            EventKind::Rejected { reason } => {
                log::debug!("request rejected: {:?}", reason);
            }
        }
        self.last_seq = event.seq;
    }

    /// Applies every event currently pending on the stream. The
    /// presentation loop calls this once per frame; it never blocks on
    /// the server.
    pub fn drain(&mut self, events: &Receiver<MutationEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    pub fn store(&self) -> &OccupancyStore {
        &self.store
    }

    /// Seq of the last applied event (or of the snapshot).
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }
}

/// Local camera pose. Intents carry exactly this ray and nothing else;
/// the server re-resolves it against its own world.
#[derive(Clone, Copy, Debug)]
pub struct CameraPose {
    pub eye: Vec3,
    pub forward: Vec3,
}

impl CameraPose {
    pub fn new(eye: Vec3, forward: Vec3) -> Self {
        Self { eye, forward }
    }

    pub fn place_intent(&self, block: BlockId) -> MutationIntent {
        MutationIntent::Place {
            origin: self.eye,
            dir: self.forward,
            block,
        }
    }

    pub fn remove_intent(&self) -> MutationIntent {
        MutationIntent::Remove {
            origin: self.eye,
            dir: self.forward,
        }
    }

    /// Local predictive cast against the mirror, for aim gating and
    /// highlighting. Purely cosmetic: the server's own cast decides the
    /// outcome, and a locally-promising intent may still be rejected.
    pub fn aim(
        &self,
        mirror: &Mirror,
        registry: &BlockRegistry,
        scenery: &[Aabb],
        max_dist: f32,
        grid_size: f32,
    ) -> Option<RayHit> {
        let store = mirror.store();
        resolve(
            self.eye,
            self.forward,
            max_dist,
            grid_size,
            |cell| {
                store
                    .get(cell)
                    .map(|b| registry.is_solid(b.id))
                    .unwrap_or(false)
            },
            scenery,
        )
    }
}

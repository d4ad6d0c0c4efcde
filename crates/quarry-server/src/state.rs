use std::sync::Arc;

use quarry_blocks::BlockRegistry;
use quarry_geom::{Aabb, Vec3};
use quarry_grid::OccupancyStore;
use quarry_net::{ConnectionId, MutationEvent, MutationIntent};
use serde::{Deserialize, Serialize};

use crate::players::{DEFAULT_PLAYER_HALF_EXTENTS, PlayerRegistry, PlayerState};
use crate::replicate::{ClientBootstrap, ReplicationHub};
use crate::validate::apply_intent;

/// Per-session tuning, fixed at startup.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub grid_size: f32,
    pub max_place_distance: f32,
    pub max_remove_distance: f32,
    /// Body half extents applied to every connecting player.
    pub player_half_extents: Vec3,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid_size: 0.75,
            max_place_distance: 10.0,
            max_remove_distance: 10.0,
            player_half_extents: DEFAULT_PLAYER_HALF_EXTENTS,
        }
    }
}

/// The authoritative session: occupancy, connected players, and the
/// replication fan-out. Only one thread may drive this at a time; the
/// worker in `crate::worker` is the normal owner, and tests or embedded
/// drivers may call it synchronously instead.
pub struct ServerState {
    pub tuning: Tuning,
    pub registry: Arc<BlockRegistry>,
    pub scenery: Vec<Aabb>,
    pub store: OccupancyStore,
    pub players: PlayerRegistry,
    pub hub: ReplicationHub,
    tick: u64,
    applied: u64,
    rejected: u64,
}

impl ServerState {
    pub fn new(tuning: Tuning, registry: Arc<BlockRegistry>, scenery: Vec<Aabb>) -> Self {
        Self {
            tuning,
            registry,
            scenery,
            store: OccupancyStore::new(),
            players: PlayerRegistry::new(),
            hub: ReplicationHub::new(),
            tick: 0,
            applied: 0,
            rejected: 0,
        }
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Count of broadcast mutations.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Count of rejected intents.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn join(&mut self, conn: ConnectionId, pos: Vec3) -> ClientBootstrap {
        self.players
            .insert(PlayerState::new(conn, pos, self.tuning.player_half_extents));
        let boot = self.hub.join(conn, &self.store);
        log::info!(
            "conn {} joined at tick {} ({} cells in snapshot)",
            conn,
            self.tick,
            boot.snapshot.cells.len()
        );
        boot
    }

    pub fn leave(&mut self, conn: ConnectionId) {
        self.players.remove(conn);
        self.hub.leave(conn);
        log::info!("conn {} left at tick {}", conn, self.tick);
    }

    pub fn player_moved(&mut self, conn: ConnectionId, pos: Vec3) {
        if !self.players.set_pos(conn, pos) {
            log::debug!("movement update from unknown conn {}", conn);
        }
    }

    /// Runs the full validate-apply-replicate step for one intent and
    /// returns the outcome event.
    pub fn process(&mut self, conn: ConnectionId, intent: MutationIntent) -> MutationEvent {
        match apply_intent(
            &self.tuning,
            &self.registry,
            &self.scenery,
            &self.players,
            &mut self.store,
            conn,
            intent,
            self.tick,
        ) {
            Ok(kind) => {
                self.applied += 1;
                let event = self.hub.broadcast(kind);
                log::info!("tick {}: applied {:?}", self.tick, event.kind);
                event
            }
            Err(reason) => {
                self.rejected += 1;
                log::debug!(
                    "tick {}: rejected intent from conn {}: {:?}",
                    self.tick,
                    conn,
                    reason
                );
                self.hub.reject(conn, reason)
            }
        }
    }
}

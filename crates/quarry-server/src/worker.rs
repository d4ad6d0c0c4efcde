use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, bounded, unbounded};
use quarry_blocks::BlockRegistry;
use quarry_geom::{Aabb, Vec3};
use quarry_net::{ConnectionId, MutationIntent};

use crate::replicate::ClientBootstrap;
use crate::state::{ServerState, Tuning};

/// Control and intent traffic multiplexed onto one queue. A single
/// consumer thread serializes every read-validate-write sequence, so a
/// race between two clients targeting the same cell resolves to exactly
/// one winner by arrival order.
pub enum ServerMsg {
    Join {
        conn: ConnectionId,
        pos: Vec3,
        reply: Sender<ClientBootstrap>,
    },
    Leave {
        conn: ConnectionId,
    },
    PlayerMoved {
        conn: ConnectionId,
        pos: Vec3,
    },
    Intent {
        conn: ConnectionId,
        intent: MutationIntent,
    },
    Tick,
    Shutdown,
}

/// Cheap cloneable submission side of the worker queue. This is the
/// in-process stand-in for the reliable ordered client->server channel.
#[derive(Clone)]
pub struct ServerHandle {
    tx: Sender<ServerMsg>,
}

impl ServerHandle {
    /// Connects a client: registers its player state and returns the
    /// join snapshot plus its event stream. `None` when the worker has
    /// shut down.
    pub fn join(&self, conn: ConnectionId, pos: Vec3) -> Option<ClientBootstrap> {
        let (reply, rx) = bounded(1);
        self.tx.send(ServerMsg::Join { conn, pos, reply }).ok()?;
        rx.recv().ok()
    }

    pub fn leave(&self, conn: ConnectionId) {
        let _ = self.tx.send(ServerMsg::Leave { conn });
    }

    pub fn player_moved(&self, conn: ConnectionId, pos: Vec3) {
        let _ = self.tx.send(ServerMsg::PlayerMoved { conn, pos });
    }

    pub fn submit(&self, conn: ConnectionId, intent: MutationIntent) {
        let _ = self.tx.send(ServerMsg::Intent { conn, intent });
    }

    pub fn tick(&self) {
        let _ = self.tx.send(ServerMsg::Tick);
    }
}

/// Owns the dedicated intent worker.
pub struct Server {
    handle: ServerHandle,
    worker: Option<JoinHandle<ServerState>>,
}

impl Server {
    pub fn spawn(tuning: Tuning, registry: Arc<BlockRegistry>, scenery: Vec<Aabb>) -> Self {
        let (tx, rx) = unbounded();
        let worker = thread::spawn(move || {
            let mut state = ServerState::new(tuning, registry, scenery);
            while let Ok(msg) = rx.recv() {
                match msg {
                    ServerMsg::Join { conn, pos, reply } => {
                        let boot = state.join(conn, pos);
                        let _ = reply.send(boot);
                    }
                    ServerMsg::Leave { conn } => state.leave(conn),
                    ServerMsg::PlayerMoved { conn, pos } => state.player_moved(conn, pos),
                    ServerMsg::Intent { conn, intent } => {
                        state.process(conn, intent);
                    }
                    ServerMsg::Tick => state.advance_tick(),
                    ServerMsg::Shutdown => break,
                }
            }
            state
        });
        Self {
            handle: ServerHandle { tx },
            worker: Some(worker),
        }
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Stops the worker after it drains messages already queued, and
    /// returns the final authoritative state for inspection.
    pub fn shutdown(mut self) -> Option<ServerState> {
        let _ = self.handle.tx.send(ServerMsg::Shutdown);
        self.worker.take().and_then(|w| w.join().ok())
    }
}

use std::error::Error;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use quarry_blocks::{BlockId, BlockRegistry};
use quarry_client::{CameraPose, Mirror};
use quarry_geom::Vec3;
use quarry_net::{ConnectionId, MutationEvent};
use quarry_server::Server;

use crate::config::SessionConfig;

enum Action {
    Place { x: f32, z: f32 },
    Remove { x: f32, z: f32 },
}

struct Step {
    tick: u64,
    conn: ConnectionId,
    action: Action,
}

struct ScriptedClient {
    conn: ConnectionId,
    mirror: Mirror,
    events: Receiver<MutationEvent>,
}

/// Camera hovering over a floor spot, looking straight down.
fn overhead_pose(x: f32, z: f32) -> CameraPose {
    CameraPose::new(Vec3::new(x, 3.0, z), Vec3::new(0.0, -1.0, 0.0))
}

/// Explicit per-tick driver for a headless loopback session: pump the
/// scripted inputs, let the worker validate and apply, then drain
/// replication into every mirror. The mirrors must match the
/// authoritative store once the queue runs dry.
pub fn run(
    cfg: SessionConfig,
    registry: Arc<BlockRegistry>,
    ticks: u64,
) -> Result<(), Box<dyn Error>> {
    let server = Server::spawn(cfg.tuning, registry.clone(), cfg.scenery_aabbs());
    let handle = server.handle();

    let stone: BlockId = registry
        .id_by_name("stone")
        .ok_or("block registry defines no \"stone\" type")?;

    let spawns = [
        (1u64, Vec3::new(4.0, -0.375, 4.0)),
        (2u64, Vec3::new(-4.0, -0.375, 4.0)),
    ];
    let mut clients = Vec::new();
    for (conn, pos) in spawns {
        let boot = handle.join(conn, pos).ok_or("server worker unavailable")?;
        clients.push(ScriptedClient {
            conn,
            mirror: Mirror::bootstrap(boot.snapshot),
            events: boot.events,
        });
    }

    // Small build-and-clear routine. Tick 3 aims into the cell column
    // occupied by client 2's body and is refused; tick 5 aims a removal
    // at bare floor and is refused.
    let script = [
        Step {
            tick: 1,
            conn: 1,
            action: Action::Place { x: 1.5, z: 1.5 },
        },
        Step {
            tick: 2,
            conn: 2,
            action: Action::Place { x: 1.5, z: 1.5 },
        },
        Step {
            tick: 3,
            conn: 1,
            action: Action::Place { x: -4.0, z: 4.0 },
        },
        Step {
            tick: 4,
            conn: 2,
            action: Action::Remove { x: 1.5, z: 1.5 },
        },
        Step {
            tick: 5,
            conn: 1,
            action: Action::Remove { x: 12.0, z: 0.0 },
        },
        Step {
            tick: 6,
            conn: 2,
            action: Action::Remove { x: 1.5, z: 1.5 },
        },
        Step {
            tick: 7,
            conn: 1,
            action: Action::Place { x: 0.0, z: 0.0 },
        },
    ];

    for tick in 1..=ticks {
        handle.tick();
        for step in script.iter().filter(|s| s.tick == tick) {
            let intent = match step.action {
                Action::Place { x, z } => overhead_pose(x, z).place_intent(stone),
                Action::Remove { x, z } => overhead_pose(x, z).remove_intent(),
            };
            handle.submit(step.conn, intent);
        }
        for client in clients.iter_mut() {
            let applied = client.mirror.drain(&client.events);
            if applied > 0 {
                log::debug!("conn {}: applied {} replicated events", client.conn, applied);
            }
        }
    }

    // Shutdown drains everything still queued; a final drain then
    // brings each mirror fully up to date.
    let state = server.shutdown().ok_or("server worker panicked")?;
    for client in clients.iter_mut() {
        client.mirror.drain(&client.events);
        if !client.mirror.store().same_occupancy(&state.store) {
            return Err(format!(
                "mirror for conn {} diverged from the authoritative store",
                client.conn
            )
            .into());
        }
    }

    log::info!(
        "session over after {} ticks: {} applied, {} rejected, {} cells occupied, {} mirrors converged",
        ticks,
        state.applied(),
        state.rejected(),
        state.store.len(),
        clients.len()
    );
    Ok(())
}

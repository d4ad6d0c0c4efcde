use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;
use quarry_grid::OccupancyStore;
use quarry_net::{ConnectionId, EventKind, MutationEvent, RejectReason, Snapshot};

/// What a joining client receives before any incremental event: the
/// full non-empty-cell snapshot and its personal event stream.
pub struct ClientBootstrap {
    pub snapshot: Snapshot,
    pub events: Receiver<MutationEvent>,
}

/// Fan-out of validated outcomes. One unbounded channel per client
/// keeps delivery order identical to apply order, which is what makes
/// per-cell causal order hold on every mirror.
pub struct ReplicationHub {
    clients: HashMap<ConnectionId, Sender<MutationEvent>>,
    next_seq: u64,
}

impl ReplicationHub {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            next_seq: 1,
        }
    }

    /// Registers the client and snapshots the store at join time, so
    /// the mirror never misses mutations applied before it connected.
    pub fn join(&mut self, conn: ConnectionId, store: &OccupancyStore) -> ClientBootstrap {
        let (tx, rx) = unbounded();
        self.clients.insert(conn, tx);
        ClientBootstrap {
            snapshot: Snapshot {
                seq: self.next_seq - 1,
                cells: store.snapshot(),
            },
            events: rx,
        }
    }

    pub fn leave(&mut self, conn: ConnectionId) {
        self.clients.remove(&conn);
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Applied mutations reach every connected client. Clients whose
    /// receiver is gone are pruned on the spot.
    pub fn broadcast(&mut self, kind: EventKind) -> MutationEvent {
        let event = MutationEvent {
            seq: self.alloc_seq(),
            kind,
        };
        self.clients.retain(|_, tx| tx.send(event).is_ok());
        event
    }

    /// Rejections are visible only to the submitter.
    pub fn reject(&mut self, conn: ConnectionId, reason: RejectReason) -> MutationEvent {
        let event = MutationEvent {
            seq: self.alloc_seq(),
            kind: EventKind::Rejected { reason },
        };
        if let Some(tx) = self.clients.get(&conn) {
            if tx.send(event).is_err() {
                self.clients.remove(&conn);
            }
        }
        event
    }
}

impl Default for ReplicationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_blocks::Block;
    use quarry_grid::GridCell;

    #[test]
    fn broadcast_reaches_all_clients_in_order() {
        let mut hub = ReplicationHub::new();
        let store = OccupancyStore::new();
        let a = hub.join(1, &store);
        let b = hub.join(2, &store);

        let cell = GridCell::new(0, 1, 0);
        let e1 = hub.broadcast(EventKind::Placed {
            cell,
            block: Block::new(0, 1),
        });
        let e2 = hub.broadcast(EventKind::Removed { cell });
        assert!(e2.seq > e1.seq);

        for boot in [&a, &b] {
            let got: Vec<MutationEvent> = boot.events.try_iter().collect();
            assert_eq!(got, vec![e1, e2]);
        }
    }

    #[test]
    fn rejects_reach_only_the_submitter() {
        let mut hub = ReplicationHub::new();
        let store = OccupancyStore::new();
        let a = hub.join(1, &store);
        let b = hub.join(2, &store);

        hub.reject(1, RejectReason::RangeExceeded);
        assert_eq!(a.events.try_iter().count(), 1);
        assert_eq!(b.events.try_iter().count(), 0);
    }

    #[test]
    fn snapshot_reflects_store_at_join_time() {
        let mut hub = ReplicationHub::new();
        let mut store = OccupancyStore::new();
        store.set(GridCell::new(1, 0, 0), Some(Block::new(0, 1)));

        let boot = hub.join(1, &store);
        assert_eq!(boot.snapshot.cells.len(), 1);

        // Mutations after join arrive as events, not snapshot contents
        store.set(GridCell::new(2, 0, 0), Some(Block::new(0, 2)));
        assert_eq!(boot.snapshot.cells.len(), 1);
    }

    #[test]
    fn disconnected_receivers_are_pruned() {
        let mut hub = ReplicationHub::new();
        let store = OccupancyStore::new();
        let a = hub.join(1, &store);
        let _b = hub.join(2, &store);
        drop(a);

        hub.broadcast(EventKind::Removed {
            cell: GridCell::new(0, 0, 0),
        });
        assert_eq!(hub.client_count(), 1);
    }
}

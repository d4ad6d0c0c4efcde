use hashbrown::HashMap;
use quarry_geom::{Aabb, Vec3};
use quarry_net::ConnectionId;

/// Body half extents of the 1.8-unit-tall player box used for
/// occupancy-overlap checks.
pub const DEFAULT_PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.375, 0.9, 0.375);

#[derive(Clone, Copy, Debug)]
pub struct PlayerState {
    pub conn: ConnectionId,
    /// Feet position; the body volume extends upward from here.
    pub pos: Vec3,
    pub half_extents: Vec3,
}

impl PlayerState {
    pub fn new(conn: ConnectionId, pos: Vec3, half_extents: Vec3) -> Self {
        Self {
            conn,
            pos,
            half_extents,
        }
    }

    /// Body volume centered above the feet.
    #[inline]
    pub fn volume(&self) -> Aabb {
        Aabb::from_center_half_extents(
            self.pos + Vec3::new(0.0, self.half_extents.y, 0.0),
            self.half_extents,
        )
    }
}

/// Explicit connection -> player mapping, iterated directly for the
/// occupancy-overlap check against all connected players.
#[derive(Default)]
pub struct PlayerRegistry {
    players: HashMap<ConnectionId, PlayerState>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: PlayerState) {
        self.players.insert(state.conn, state);
    }

    pub fn remove(&mut self, conn: ConnectionId) -> Option<PlayerState> {
        self.players.remove(&conn)
    }

    #[inline]
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.players.contains_key(&conn)
    }

    pub fn get(&self, conn: ConnectionId) -> Option<&PlayerState> {
        self.players.get(&conn)
    }

    /// Updates a connected player's feet position. Returns false for
    /// unknown connections.
    pub fn set_pos(&mut self, conn: ConnectionId, pos: Vec3) -> bool {
        match self.players.get_mut(&conn) {
            Some(p) => {
                p.pos = pos;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// True when the box overlaps any connected player's volume.
    pub fn any_volume_intersects(&self, aabb: Aabb) -> bool {
        self.players.values().any(|p| p.volume().intersects(aabb))
    }
}

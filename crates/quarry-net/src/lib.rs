//! Wire-level data model for the mutation protocol. Pure data; the
//! transport that would carry it is out of scope.
#![forbid(unsafe_code)]

use quarry_blocks::{Block, BlockId};
use quarry_geom::Vec3;
use quarry_grid::GridCell;
use serde::{Deserialize, Serialize};

pub type ConnectionId = u64;

/// Unvalidated client request. Carries only the camera ray at
/// submission time; never a target cell or world coordinate, so the
/// server stays the sole authority on what was actually hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MutationIntent {
    Place {
        origin: Vec3,
        dir: Vec3,
        /// Registry id of the block type to place.
        block: BlockId,
    },
    Remove {
        origin: Vec3,
        dir: Vec3,
    },
}

impl MutationIntent {
    #[inline]
    pub fn ray(&self) -> (Vec3, Vec3) {
        match *self {
            MutationIntent::Place { origin, dir, .. } => (origin, dir),
            MutationIntent::Remove { origin, dir } => (origin, dir),
        }
    }
}

/// Why an intent was turned down. Rejections are data, not errors; they
/// are visible only to the submitter and never retried automatically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// No hit, or the struck surface is ineligible for the operation.
    InvalidTarget,
    /// Resolved distance beyond the configured maximum.
    RangeExceeded,
    /// Place target filled or inside a player volume; remove target
    /// already empty.
    OccupancyConflict,
    /// Intent from a disconnected or unknown connection.
    StaleClient,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Placed { cell: GridCell, block: Block },
    Removed { cell: GridCell },
    Rejected { reason: RejectReason },
}

/// Validated outcome. `Placed`/`Removed` reach every connected client
/// in `seq` order; `Rejected` reaches only the submitter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub seq: u64,
    pub kind: EventKind,
}

impl MutationEvent {
    /// Cell the event touches; `None` for rejections.
    #[inline]
    pub fn cell(&self) -> Option<GridCell> {
        match self.kind {
            EventKind::Placed { cell, .. } | EventKind::Removed { cell } => Some(cell),
            EventKind::Rejected { .. } => None,
        }
    }
}

/// Join-time bootstrap: all non-empty cells as of `seq`. Incremental
/// events resume after it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub seq: u64,
    pub cells: Vec<(GridCell, Block)>,
}

use hashbrown::HashMap;
use quarry_blocks::Block;

use crate::cell::GridCell;

/// Sparse cell -> block mapping. The server owns the one instance that
/// is written directly; client mirrors are written only through
/// replicated events, using the same idempotent `set`.
#[derive(Default, Clone)]
pub struct OccupancyStore {
    inner: HashMap<GridCell, Block>,
    rev: u64,
}

impl OccupancyStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, cell: GridCell) -> Option<Block> {
        self.inner.get(&cell).copied()
    }

    #[inline]
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.inner.contains_key(&cell)
    }

    /// Idempotent write. Filling a cell with a block of the identity it
    /// already holds, or clearing an already-empty cell, succeeds
    /// without changing anything. Returns whether the store changed.
    pub fn set(&mut self, cell: GridCell, value: Option<Block>) -> bool {
        match value {
            Some(block) => {
                if let Some(prev) = self.inner.get(&cell) {
                    if prev.same_identity(block) {
                        return false;
                    }
                }
                self.inner.insert(cell, block);
                self.bump();
                true
            }
            None => {
                if self.inner.remove(&cell).is_some() {
                    self.bump();
                    true
                } else {
                    false
                }
            }
        }
    }

    #[inline]
    fn bump(&mut self) {
        self.rev = self.rev.wrapping_add(1).max(1);
    }

    /// Count of effective changes applied so far. Local write history,
    /// not replicated state.
    #[inline]
    pub fn rev(&self) -> u64 {
        self.rev
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All non-empty cells, sorted by cell for deterministic iteration.
    /// This is the join-time bootstrap payload for new clients.
    pub fn snapshot(&self) -> Vec<(GridCell, Block)> {
        let mut out: Vec<(GridCell, Block)> = self.inner.iter().map(|(k, v)| (*k, *v)).collect();
        out.sort_by_key(|(cell, _)| *cell);
        out
    }

    /// Block-identity equality per cell; placement ticks and revision
    /// counters are local and excluded.
    pub fn same_occupancy(&self, other: &OccupancyStore) -> bool {
        self.inner.len() == other.inner.len()
            && self.inner.iter().all(|(cell, block)| {
                other
                    .inner
                    .get(cell)
                    .map(|b| b.same_identity(*block))
                    .unwrap_or(false)
            })
    }
}

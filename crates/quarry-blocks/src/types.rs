use serde::{Deserialize, Serialize};

pub type BlockId = u16;

/// A placed voxel. Presence in a store is the existence of this value;
/// there is no "empty" block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Server tick at which the block was applied. Diagnostic only; not
    /// part of block identity.
    pub placed_tick: u64,
}

impl Block {
    #[inline]
    pub const fn new(id: BlockId, placed_tick: u64) -> Self {
        Self { id, placed_tick }
    }

    #[inline]
    pub fn same_identity(self, other: Block) -> bool {
        self.id == other.id
    }
}

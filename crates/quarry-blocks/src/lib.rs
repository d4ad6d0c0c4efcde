//! Block identity and the TOML-configured block type registry.
#![forbid(unsafe_code)]

pub mod registry;
pub mod types;

pub use registry::{BlockRegistry, BlockType, BlocksConfig};
pub use types::{Block, BlockId};

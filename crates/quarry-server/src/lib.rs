//! Authoritative protocol core: player registry, mutation validation
//! and application, replication fan-out, and the intent worker.
#![forbid(unsafe_code)]

pub mod players;
pub mod replicate;
pub mod state;
pub mod validate;
pub mod worker;

pub use players::{DEFAULT_PLAYER_HALF_EXTENTS, PlayerRegistry, PlayerState};
pub use replicate::{ClientBootstrap, ReplicationHub};
pub use state::{ServerState, Tuning};
pub use validate::apply_intent;
pub use worker::{Server, ServerHandle, ServerMsg};

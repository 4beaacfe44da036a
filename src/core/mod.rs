//! Core primitives shared by the request table and the host layer.

pub mod slot;
pub mod position;

// Re-export core types
pub use slot::{PlayerSlot, MAX_PLAYERS};
pub use position::WorldPosition;

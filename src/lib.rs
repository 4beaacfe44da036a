//! # TPAccept Server
//!
//! Teleport requests with accept/deny and timed expiry for a slot-based
//! multiplayer game server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TPACCEPT SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── slot.rs     - Host-assigned player slots                │
//! │  └── position.rs - World coordinates                         │
//! │                                                              │
//! │  game/           - Request state (single-threaded)           │
//! │  ├── config.rs   - Capacity and timing                       │
//! │  ├── request.rs  - Pending request record                    │
//! │  ├── table.rs    - Slot-indexed request table                │
//! │  └── events.rs   - Request transitions                       │
//! │                                                              │
//! │  host/           - Host integration                          │
//! │  ├── registry.rs - Session/messaging/teleport traits         │
//! │  ├── command.rs  - /tpa and /tpdeny                          │
//! │  ├── plugin.rs   - Hooks, shared table, update loop          │
//! │  └── memory.rs   - In-memory host                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Slot Reuse
//!
//! Slots are recycled by the host. Requests are keyed by slot and never
//! hold on to a session, so clearing a slot on greet/leave is enough to keep
//! a new occupant from inheriting someone else's request.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod host;

// Re-export commonly used types
pub use core::slot::{PlayerSlot, MAX_PLAYERS};
pub use core::position::WorldPosition;
pub use game::config::RequestConfig;
pub use game::request::PendingRequest;
pub use game::table::{RequestTable, RequestError, AcceptOutcome};
pub use host::plugin::TpaPlugin;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Request lifetime in ticks (10 seconds * 60 Hz)
pub const REQUEST_DURATION_TICKS: u32 = 600;

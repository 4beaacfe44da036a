//! Request Logic Module
//!
//! Teleport-request state and its expiration policy.
//!
//! ## Module Structure
//!
//! - `config`: Table capacity and timing
//! - `request`: Pending request record
//! - `table`: Slot-indexed request table
//! - `events`: Transitions for logging/export

pub mod config;
pub mod request;
pub mod table;
pub mod events;

// Re-export key types
pub use config::{RequestConfig, ConfigError};
pub use request::PendingRequest;
pub use table::{RequestTable, RequestError, AcceptOutcome, TickResult};
pub use events::{RequestEvent, RequestEventData};

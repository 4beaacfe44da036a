//! Host Integration
//!
//! Collaborator traits, command glue and plugin hooks around the request
//! table. Nothing here owns request state; it all lives in `game/`.

pub mod registry;
pub mod command;
pub mod plugin;
pub mod memory;

pub use registry::{Host, Messenger, Session, SessionRegistry, Teleporter};
pub use command::{CommandError, CommandOutcome};
pub use plugin::{SharedRequestTable, TpaPlugin};
pub use memory::InMemoryHost;

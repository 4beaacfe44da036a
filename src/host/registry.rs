//! Host Collaborators
//!
//! Everything the request table needs from the game server, expressed as
//! traits. The table never caches a [`Session`]; it resolves one by slot at
//! the moment it acts, so a reconnect only has to clear a table slot.

use serde::{Serialize, Deserialize};

use crate::core::position::WorldPosition;
use crate::core::slot::PlayerSlot;

/// Permission required to use `/tpa` and `/tpdeny`.
pub const PERMISSION_USE: &str = "tpa.use";

/// Permission that bypasses a target's TPAllow setting.
pub const PERMISSION_TP_OVERRIDE: &str = "tshock.tp.override";

/// Snapshot of a live session, resolved from the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Slot the session occupies.
    pub slot: PlayerSlot,
    /// Display name.
    pub name: String,
    /// Current world position.
    pub position: WorldPosition,
    /// Whether the player accepts incoming teleports.
    pub tp_allow: bool,
}

impl Session {
    /// Create a session that accepts teleports.
    pub fn new(slot: PlayerSlot, name: impl Into<String>, position: WorldPosition) -> Self {
        Self {
            slot,
            name: name.into(),
            position,
            tp_allow: true,
        }
    }
}

/// Live session lookup.
pub trait SessionRegistry {
    /// Session currently at `slot`, or `None` if the slot is unoccupied.
    fn resolve_session(&self, slot: PlayerSlot) -> Option<Session>;

    /// Sessions matching a name or slot id typed by a player.
    fn find_players(&self, query: &str) -> Vec<Session>;

    /// Whether the player at `slot` holds `permission`.
    fn has_permission(&self, slot: PlayerSlot, permission: &str) -> bool;
}

/// Player-facing notifications. Fire-and-forget.
pub trait Messenger {
    /// Neutral information.
    fn send_info(&mut self, session: &Session, text: &str);

    /// Something went wrong for this player.
    fn send_error(&mut self, session: &Session, text: &str);

    /// Something went right for this player.
    fn send_success(&mut self, session: &Session, text: &str);
}

/// Position mutation primitive.
pub trait Teleporter {
    /// Move a live session to world coordinates.
    fn teleport(&mut self, session: &Session, x: f32, y: f32);
}

/// Everything the request table calls out to.
pub trait Host: SessionRegistry + Messenger + Teleporter {}

impl<T: SessionRegistry + Messenger + Teleporter> Host for T {}

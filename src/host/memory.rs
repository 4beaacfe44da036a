//! In-Memory Host
//!
//! Slot-array host used by the demo binary and the tests. Records every
//! message and teleport so callers can inspect what players would have seen.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::position::WorldPosition;
use crate::core::slot::PlayerSlot;
use crate::host::registry::{Messenger, Session, SessionRegistry, Teleporter};

/// Message category, mirroring the three messaging calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// `send_info`
    Info,
    /// `send_error`
    Error,
    /// `send_success`
    Success,
}

/// A message delivered to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient slot.
    pub slot: PlayerSlot,
    /// Recipient name at delivery time.
    pub name: String,
    /// Category.
    pub kind: MessageKind,
    /// Text as shown to the player.
    pub text: String,
}

/// Host backed by a fixed slot array.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    /// Connected sessions by slot.
    sessions: Vec<Option<Session>>,
    /// Granted permissions per slot.
    permissions: BTreeMap<PlayerSlot, BTreeSet<String>>,
    /// Delivery log.
    messages: Vec<SentMessage>,
    /// Teleport log.
    teleports: Vec<(PlayerSlot, WorldPosition)>,
}

impl InMemoryHost {
    /// Create a host with `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: vec![None; capacity],
            ..Default::default()
        }
    }

    /// Connect a player at `slot`, replacing whoever was there.
    ///
    /// Permissions of the previous occupant are dropped.
    pub fn join(&mut self, slot: PlayerSlot, name: &str, position: WorldPosition) -> Option<Session> {
        let index = slot.index(self.sessions.len())?;
        let session = Session::new(slot, name, position);
        self.permissions.remove(&slot);
        self.sessions[index] = Some(session.clone());
        Some(session)
    }

    /// Disconnect the player at `slot`.
    pub fn leave(&mut self, slot: PlayerSlot) -> Option<Session> {
        let index = slot.index(self.sessions.len())?;
        self.permissions.remove(&slot);
        self.sessions[index].take()
    }

    /// Move a connected player.
    pub fn set_position(&mut self, slot: PlayerSlot, position: WorldPosition) {
        if let Some(session) = self.session_mut(slot) {
            session.position = position;
        }
    }

    /// Toggle whether a player accepts incoming teleports.
    pub fn set_tp_allow(&mut self, slot: PlayerSlot, allow: bool) {
        if let Some(session) = self.session_mut(slot) {
            session.tp_allow = allow;
        }
    }

    /// Grant a permission to the player at `slot`.
    pub fn grant(&mut self, slot: PlayerSlot, permission: &str) {
        self.permissions
            .entry(slot)
            .or_default()
            .insert(permission.to_string());
    }

    /// Number of connected players.
    pub fn session_count(&self) -> usize {
        self.sessions.iter().flatten().count()
    }

    /// Every message delivered so far.
    pub fn messages(&self) -> &[SentMessage] {
        &self.messages
    }

    /// Messages delivered to `slot`.
    pub fn messages_for(&self, slot: PlayerSlot) -> Vec<&SentMessage> {
        self.messages.iter().filter(|m| m.slot == slot).collect()
    }

    /// Every teleport performed so far.
    pub fn teleports(&self) -> &[(PlayerSlot, WorldPosition)] {
        &self.teleports
    }

    /// Forget delivered messages and teleports.
    pub fn clear_log(&mut self) {
        self.messages.clear();
        self.teleports.clear();
    }

    fn session_mut(&mut self, slot: PlayerSlot) -> Option<&mut Session> {
        let index = slot.index(self.sessions.len())?;
        self.sessions[index].as_mut()
    }

    fn record(&mut self, session: &Session, kind: MessageKind, text: &str) {
        // Sessions that left since they were resolved get nothing
        if self.resolve_session(session.slot).is_none() {
            return;
        }
        self.messages.push(SentMessage {
            slot: session.slot,
            name: session.name.clone(),
            kind,
            text: text.to_string(),
        });
    }
}

impl SessionRegistry for InMemoryHost {
    fn resolve_session(&self, slot: PlayerSlot) -> Option<Session> {
        let index = slot.index(self.sessions.len())?;
        self.sessions[index].clone()
    }

    fn find_players(&self, query: &str) -> Vec<Session> {
        let query = query.trim();

        // Slot id takes precedence over names
        if let Ok(raw) = query.parse::<i32>() {
            if let Some(session) = self.resolve_session(PlayerSlot::new(raw)) {
                return vec![session];
            }
        }

        let connected = self.sessions.iter().flatten();
        let lowered = query.to_lowercase();

        if let Some(exact) = connected
            .clone()
            .find(|s| s.name.to_lowercase() == lowered)
        {
            return vec![exact.clone()];
        }

        connected
            .filter(|s| s.name.to_lowercase().starts_with(&lowered))
            .cloned()
            .collect()
    }

    fn has_permission(&self, slot: PlayerSlot, permission: &str) -> bool {
        self.permissions
            .get(&slot)
            .is_some_and(|granted| granted.contains(permission) || granted.contains("*"))
    }
}

impl Messenger for InMemoryHost {
    fn send_info(&mut self, session: &Session, text: &str) {
        self.record(session, MessageKind::Info, text);
    }

    fn send_error(&mut self, session: &Session, text: &str) {
        self.record(session, MessageKind::Error, text);
    }

    fn send_success(&mut self, session: &Session, text: &str) {
        self.record(session, MessageKind::Success, text);
    }
}

impl Teleporter for InMemoryHost {
    fn teleport(&mut self, session: &Session, x: f32, y: f32) {
        let position = WorldPosition::new(x, y);
        if let Some(live) = self.session_mut(session.slot) {
            live.position = position;
            self.teleports.push((session.slot, position));
        }
    }
}

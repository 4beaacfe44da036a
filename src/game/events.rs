//! Request Events
//!
//! Transitions recorded by the request table, drained by the host after each
//! hook call for logging or export.

use serde::{Serialize, Deserialize};

use crate::core::slot::PlayerSlot;

/// Request event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestEventData {
    /// New request installed at the target slot
    Created {
        target: PlayerSlot,
        requester: PlayerSlot,
    },

    /// Older request silently replaced by a newer one
    Superseded {
        target: PlayerSlot,
        previous_requester: PlayerSlot,
    },

    /// Target accepted and the requester was moved
    Accepted {
        target: PlayerSlot,
        requester: PlayerSlot,
    },

    /// Target accepted but the requester had left
    RequesterMissing {
        target: PlayerSlot,
        requester: PlayerSlot,
    },

    /// Target denied the request
    Denied {
        target: PlayerSlot,
        requester: PlayerSlot,
    },

    /// Request ran out of ticks
    Expired {
        target: PlayerSlot,
        requester: PlayerSlot,
    },

    /// Requester's session ended; the request stays pending unbound
    RequesterLeft {
        target: PlayerSlot,
        requester: PlayerSlot,
    },

    /// Request dropped because the target's session ended
    Invalidated {
        target: PlayerSlot,
        requester: PlayerSlot,
    },
}

/// A request event stamped with the table tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEvent {
    /// Table tick when the event occurred
    pub tick: u64,

    /// Event data
    pub data: RequestEventData,
}

impl RequestEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: RequestEventData) -> Self {
        Self { tick, data }
    }

    /// Target slot the event concerns.
    pub fn target(&self) -> PlayerSlot {
        match &self.data {
            RequestEventData::Created { target, .. }
            | RequestEventData::Superseded { target, .. }
            | RequestEventData::Accepted { target, .. }
            | RequestEventData::RequesterMissing { target, .. }
            | RequestEventData::Denied { target, .. }
            | RequestEventData::Expired { target, .. }
            | RequestEventData::RequesterLeft { target, .. }
            | RequestEventData::Invalidated { target, .. } => *target,
        }
    }

    /// Whether this event ended a pending request.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self.data,
            RequestEventData::Created { .. }
                | RequestEventData::Superseded { .. }
                | RequestEventData::RequesterLeft { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        let t = PlayerSlot::new(1);
        let r = PlayerSlot::new(2);

        let created = RequestEvent::new(0, RequestEventData::Created { target: t, requester: r });
        let expired = RequestEvent::new(600, RequestEventData::Expired { target: t, requester: r });

        let left = RequestEvent::new(9, RequestEventData::RequesterLeft { target: t, requester: r });

        assert!(!created.is_terminal());
        assert!(!left.is_terminal());
        assert_eq!(left.target(), t);
        assert!(expired.is_terminal());
        assert_eq!(expired.target(), t);
    }

    #[test]
    fn test_event_serializes() {
        let event = RequestEvent::new(
            5,
            RequestEventData::Denied {
                target: PlayerSlot::new(3),
                requester: PlayerSlot::new(4),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Denied"));

        let back: RequestEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}

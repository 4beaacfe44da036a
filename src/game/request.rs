//! Pending Teleport Requests

use serde::{Serialize, Deserialize};

use crate::core::slot::PlayerSlot;

/// One outstanding teleport solicitation.
///
/// Display names are snapshots taken when the request was created so that
/// accept and expiry messages stay meaningful after either side leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Player who must accept.
    pub target_slot: PlayerSlot,
    /// Player asking to be moved.
    pub requester_slot: PlayerSlot,
    /// Target name at creation time.
    pub target_name: String,
    /// Requester name at creation time.
    pub requester_name: String,
    /// Ticks left before the request expires.
    pub remaining_ticks: u32,
    /// Table tick at which the request was created.
    pub created_tick: u64,
    /// Set once the requester's session has ended. The slot may since
    /// belong to someone else, so it must not be resolved again.
    #[serde(default)]
    pub requester_left: bool,
}

impl PendingRequest {
    /// Create a request with a full countdown.
    pub fn new(
        target_slot: PlayerSlot,
        requester_slot: PlayerSlot,
        target_name: impl Into<String>,
        requester_name: impl Into<String>,
        duration_ticks: u32,
        created_tick: u64,
    ) -> Self {
        Self {
            target_slot,
            requester_slot,
            target_name: target_name.into(),
            requester_name: requester_name.into(),
            remaining_ticks: duration_ticks,
            created_tick,
            requester_left: false,
        }
    }

    /// Count down one tick. Returns true once the request has run out.
    #[inline]
    pub fn decrement(&mut self) -> bool {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        self.remaining_ticks == 0
    }

    /// Whether `slot` is the requester of this request.
    #[inline]
    pub fn is_from(&self, slot: PlayerSlot) -> bool {
        self.requester_slot == slot
    }

    /// Unbind the requester after its session ended.
    pub fn detach_requester(&mut self) {
        self.requester_left = true;
    }

    /// Ticks elapsed since creation, as of table tick `now`.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_counts_to_zero() {
        let mut request = PendingRequest::new(
            PlayerSlot::new(1),
            PlayerSlot::new(2),
            "Target",
            "Requester",
            3,
            0,
        );

        assert!(!request.decrement());
        assert!(!request.decrement());
        assert_eq!(request.remaining_ticks, 1);
        assert!(request.decrement());
        assert_eq!(request.remaining_ticks, 0);

        // Saturates instead of wrapping
        assert!(request.decrement());
        assert_eq!(request.remaining_ticks, 0);
    }

    #[test]
    fn test_is_from() {
        let request = PendingRequest::new(
            PlayerSlot::new(1),
            PlayerSlot::new(2),
            "Target",
            "Requester",
            600,
            0,
        );
        assert!(request.is_from(PlayerSlot::new(2)));
        assert!(!request.is_from(PlayerSlot::new(1)));
    }

    #[test]
    fn test_detach_and_age() {
        let mut request = PendingRequest::new(
            PlayerSlot::new(1),
            PlayerSlot::new(2),
            "Target",
            "Requester",
            600,
            40,
        );
        assert!(!request.requester_left);
        assert_eq!(request.age(100), 60);
        assert_eq!(request.age(10), 0);

        request.detach_requester();
        assert!(request.requester_left);
        // Slot is kept for logging
        assert!(request.is_from(PlayerSlot::new(2)));
    }
}

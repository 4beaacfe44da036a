//! Request Table
//!
//! Fixed-capacity, slot-indexed store of pending teleport requests.
//!
//! ## Slot reuse
//!
//! The host reassigns slots to new connections. A request addressed to slot
//! K must never be honored once the session that held K at creation time is
//! gone, so [`RequestTable::on_session_end`] is the single invalidation path
//! and must run before a new session is considered joined at that slot.
//!
//! The requester side is handled by unbinding instead of dropping: a request
//! whose requester left stays pending until accepted, denied or expired, but
//! its requester slot is never resolved again. Accepting it reports the
//! requester as missing.
//!
//! ## Events
//!
//! Transitions are buffered until [`RequestTable::tick`] or
//! [`RequestTable::take_events`] drains them. At most
//! [`MAX_BUFFERED_EVENTS`] are kept; the oldest are dropped first.
//!
//! ## Threading
//!
//! The table is not internally synchronised. Every operation is expected to
//! come from the host's update loop; see
//! [`SharedRequestTable`](crate::host::plugin::SharedRequestTable) for the
//! locked wrapper.

use thiserror::Error;
use tracing::debug;

use crate::core::position::WorldPosition;
use crate::core::slot::PlayerSlot;
use crate::game::config::RequestConfig;
use crate::game::events::{RequestEvent, RequestEventData};
use crate::game::request::PendingRequest;
use crate::host::registry::{Host, Session};

/// Undrained events kept before the oldest are discarded.
pub const MAX_BUFFERED_EVENTS: usize = 4096;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<RequestEvent>,
    /// Requests that expired this tick
    pub expired: usize,
}

/// How an accepted request was resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum AcceptOutcome {
    /// Requester was moved to the target.
    Teleported {
        /// Slot of the player that was moved.
        requester: PlayerSlot,
        /// Where the requester landed.
        destination: WorldPosition,
    },
    /// Requester had disconnected; nobody was moved.
    RequesterMissing {
        /// Slot the requester used to occupy.
        requester: PlayerSlot,
    },
}

/// Request table errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Slot outside the table capacity.
    #[error("Slot {0} is out of range")]
    InvalidSlot(PlayerSlot),

    /// Nothing pending for this slot.
    #[error("No pending request for slot {0}")]
    NoPendingRequest(PlayerSlot),

    /// Accepting player has no live session.
    #[error("Target {0} is not connected")]
    TargetNotConnected(PlayerSlot),
}

/// Pending requests indexed by target slot.
pub struct RequestTable {
    /// Table configuration.
    config: RequestConfig,
    /// One entry per host slot.
    slots: Box<[Option<PendingRequest>]>,
    /// Ticks processed since creation.
    tick: u64,
    /// Events not yet drained by the host.
    events: Vec<RequestEvent>,
}

impl RequestTable {
    /// Create an empty table sized to `config.max_players`.
    pub fn new(config: RequestConfig) -> Self {
        let slots = vec![None; config.max_players].into_boxed_slice();

        Self {
            config,
            slots,
            tick: 0,
            events: Vec::new(),
        }
    }

    /// Table configuration.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Ticks processed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Pending requests in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.slots.iter().flatten()
    }

    /// Install a request from `requester` to `target`.
    ///
    /// Any request already pending for `target` is replaced without telling
    /// its requester; the replaced request is returned. An out-of-range
    /// target is ignored.
    pub fn add_request<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        target: PlayerSlot,
        requester: PlayerSlot,
        target_name: impl Into<String>,
        requester_name: impl Into<String>,
    ) -> Option<PendingRequest> {
        let index = target.index(self.capacity())?;

        let request = PendingRequest::new(
            target,
            requester,
            target_name,
            requester_name,
            self.config.request_duration_ticks,
            self.tick,
        );

        if let Some(session) = host.resolve_session(target) {
            host.send_info(
                &session,
                &format!(
                    "{} has requested to teleport to you. Type '/tpa' to accept. Ignore to deny.",
                    request.requester_name
                ),
            );
        }

        debug!(
            "Request {} -> {} ({} -> {})",
            requester, target, request.requester_name, request.target_name
        );

        let previous = self.slots[index].replace(request);
        if let Some(ref old) = previous {
            debug!("Request {} -> {} superseded", old.requester_slot, target);
            self.push_event(RequestEventData::Superseded {
                target,
                previous_requester: old.requester_slot,
            });
        }
        self.push_event(RequestEventData::Created { target, requester });

        previous
    }

    /// Request pending for `slot`, if any.
    pub fn check(&self, slot: PlayerSlot) -> Option<&PendingRequest> {
        let index = slot.index(self.capacity())?;
        self.slots[index].as_ref()
    }

    /// Accept the request pending for `slot`.
    ///
    /// Sessions are resolved now, not at creation: the requester is moved to
    /// wherever the target currently stands.
    pub fn accept_request<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        slot: PlayerSlot,
    ) -> Result<AcceptOutcome, RequestError> {
        let index = self.pending_index(slot)?;

        let Some(target) = host.resolve_session(slot) else {
            return Err(RequestError::TargetNotConnected(slot));
        };

        let Some(request) = self.slots[index].take() else {
            return Err(RequestError::NoPendingRequest(slot));
        };
        let requester_slot = request.requester_slot;

        let Some(requester) = Self::requester_session(host, &request) else {
            host.send_error(
                &target,
                &format!("Could not find player \"{}\" to teleport.", request.requester_name),
            );
            debug!("Accept at {}: requester {} gone", slot, requester_slot);
            self.push_event(RequestEventData::RequesterMissing {
                target: slot,
                requester: requester_slot,
            });
            return Ok(AcceptOutcome::RequesterMissing { requester: requester_slot });
        };

        let destination = target.position;
        host.teleport(&requester, destination.x, destination.y);
        host.send_success(
            &target,
            &format!("Successfully teleported {} to you.", request.requester_name),
        );

        debug!(
            "Accept at {}: moved {} to {:?} after {} ticks",
            slot,
            requester_slot,
            destination,
            request.age(self.tick)
        );
        self.push_event(RequestEventData::Accepted {
            target: slot,
            requester: requester_slot,
        });

        Ok(AcceptOutcome::Teleported {
            requester: requester_slot,
            destination,
        })
    }

    /// Deny the request pending for `slot`.
    pub fn deny<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        slot: PlayerSlot,
    ) -> Result<PendingRequest, RequestError> {
        let index = self.pending_index(slot)?;
        let Some(request) = self.slots[index].take() else {
            return Err(RequestError::NoPendingRequest(slot));
        };

        if let Some(requester) = Self::requester_session(host, &request) {
            host.send_error(
                &requester,
                &format!("{} has denied your teleport request.", request.target_name),
            );
        }
        if let Some(target) = host.resolve_session(slot) {
            host.send_info(
                &target,
                &format!("Denied the teleport request from {}.", request.requester_name),
            );
        }

        debug!("Deny at {}: request from {}", slot, request.requester_slot);
        self.push_event(RequestEventData::Denied {
            target: slot,
            requester: request.requester_slot,
        });

        Ok(request)
    }

    /// Age every pending request by one tick and expire those that run out.
    ///
    /// Linear sweep over all slots.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> TickResult {
        self.tick += 1;
        let mut expired = 0;

        for index in 0..self.slots.len() {
            let ran_out = match self.slots[index].as_mut() {
                Some(request) => request.decrement(),
                None => continue,
            };

            if ran_out {
                if let Some(request) = self.slots[index].take() {
                    self.expire(host, request);
                    expired += 1;
                }
            }
        }

        TickResult {
            events: self.take_events(),
            expired,
        }
    }

    /// Handle the end of the session at `slot`.
    ///
    /// The request addressed to `slot` is dropped so the next occupant does
    /// not inherit it. Requests `slot` sent stay pending with their requester
    /// unbound. No player is notified. Returns the number of requests
    /// dropped or unbound.
    pub fn on_session_end(&mut self, slot: PlayerSlot) -> usize {
        let Some(index) = slot.index(self.capacity()) else {
            return 0;
        };

        let mut affected = 0;
        if let Some(request) = self.slots[index].take() {
            debug!(
                "Session end at {}: dropped request from {}",
                slot, request.requester_slot
            );
            self.push_event(RequestEventData::Invalidated {
                target: slot,
                requester: request.requester_slot,
            });
            affected += 1;
        }

        let mut unbound = Vec::new();
        for request in self.slots.iter_mut().flatten() {
            if request.is_from(slot) && !request.requester_left {
                request.detach_requester();
                unbound.push(request.target_slot);
            }
        }
        for target in unbound {
            debug!("Session end at {}: request to {} left unbound", slot, target);
            self.push_event(RequestEventData::RequesterLeft {
                target,
                requester: slot,
            });
            affected += 1;
        }

        affected
    }

    /// Drop every pending request without notification.
    pub fn clear(&mut self) -> usize {
        let mut cleared = 0;
        for entry in self.slots.iter_mut() {
            if entry.take().is_some() {
                cleared += 1;
            }
        }
        cleared
    }

    /// Drain events recorded since the last call.
    ///
    /// Hosts that never tick must call this to keep the buffer from
    /// discarding events.
    pub fn take_events(&mut self) -> Vec<RequestEvent> {
        std::mem::take(&mut self.events)
    }

    fn pending_index(&self, slot: PlayerSlot) -> Result<usize, RequestError> {
        let index = slot
            .index(self.capacity())
            .ok_or(RequestError::InvalidSlot(slot))?;
        if self.slots[index].is_none() {
            return Err(RequestError::NoPendingRequest(slot));
        }
        Ok(index)
    }

    fn requester_session<H: Host + ?Sized>(host: &H, request: &PendingRequest) -> Option<Session> {
        if request.requester_left {
            return None;
        }
        host.resolve_session(request.requester_slot)
    }

    fn expire<H: Host + ?Sized>(&mut self, host: &mut H, request: PendingRequest) {
        if let Some(requester) = Self::requester_session(host, &request) {
            host.send_error(
                &requester,
                &format!("{} has not accepted your request in time.", request.target_name),
            );
        }
        if self.config.notify_target_on_expiry {
            if let Some(target) = host.resolve_session(request.target_slot) {
                host.send_info(
                    &target,
                    &format!(
                        "Teleport request from {} was automatically denied.",
                        request.requester_name
                    ),
                );
            }
        }

        debug!(
            "Request {} -> {} expired after {} ticks",
            request.requester_slot,
            request.target_slot,
            request.age(self.tick)
        );
        self.push_event(RequestEventData::Expired {
            target: request.target_slot,
            requester: request.requester_slot,
        });
    }

    fn push_event(&mut self, data: RequestEventData) {
        if self.events.len() >= MAX_BUFFERED_EVENTS {
            let overflow = self.events.len() + 1 - MAX_BUFFERED_EVENTS;
            self.events.drain(..overflow);
            debug!("Event buffer full, dropped {} oldest", overflow);
        }
        self.events.push(RequestEvent::new(self.tick, data));
    }
}

impl Default for RequestTable {
    fn default() -> Self {
        Self::new(RequestConfig::default())
    }
}

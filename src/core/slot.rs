//! Player Slots
//!
//! Slot identifiers as handed out by the host. A slot is an index into the
//! host's fixed player array and is reused when a player disconnects and a
//! new one joins.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Host capacity observed on live servers.
pub const MAX_PLAYERS: usize = 256;

/// Connection slot assigned by the host.
///
/// Kept as a signed integer because hosts hand out raw indices and use
/// negative values as "no player" markers. Whether a slot is in range is
/// decided by the table that receives it, never by the constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerSlot(pub i32);

impl PlayerSlot {
    /// Create from a raw host index.
    pub const fn new(index: i32) -> Self {
        Self(index)
    }

    /// Raw host index.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Array index if the slot lies in `[0, capacity)`.
    #[inline]
    pub fn index(self, capacity: usize) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|&i| i < capacity)
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i32> for PlayerSlot {
    fn from(index: i32) -> Self {
        Self(index)
    }
}

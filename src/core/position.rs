//! World Position
//!
//! Float world coordinates as reported by the host for a live session.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Position of a player in world space (pixels).
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl WorldPosition {
    /// World origin
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new position.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance to another position.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl fmt::Debug for WorldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = WorldPosition::new(0.0, 0.0);
        let b = WorldPosition::new(3.0, 4.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(b.distance_squared(b), 0.0);
    }
}

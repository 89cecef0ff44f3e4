//! Gesture lifecycle: move, transform and marquee gestures.
//!
//! Each gesture carries a [`GestureToken`]. Cancellation and timeouts are
//! addressed to a token, so a late timer for an old gesture can never cancel a
//! newer one.

use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

use crate::element::{ElementId, Point};
use crate::selection::Marquee;

/// Identity of a single gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureToken {
    serial: u64,
    started_at: Instant,
}

impl GestureToken {
    /// The first token of a session.
    #[must_use]
    pub fn first() -> Self {
        Self {
            serial: 1,
            started_at: Instant::now(),
        }
    }

    /// The token that follows this one, stamped with the current time.
    #[must_use]
    pub fn next(self) -> Self {
        self.next_at(Instant::now())
    }

    /// The token that follows this one, stamped with `started_at`.
    #[must_use]
    pub fn next_at(self, started_at: Instant) -> Self {
        Self {
            serial: self.serial.wrapping_add(1),
            started_at,
        }
    }

    /// Sequence number of this gesture within the session.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// When the gesture started.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Whether `timeout` has elapsed since the gesture started, as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.started_at) >= timeout
    }
}

/// The gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture.
    #[default]
    Idle,
    /// An element is being dragged.
    Dragging {
        /// Gesture identity.
        token: GestureToken,
        /// Element being moved.
        id: ElementId,
        /// Element position when the drag started.
        origin: Point,
        /// Latest preview position. Not written to the scene until the drag ends.
        current: Point,
    },
    /// An element is being resized or rotated.
    Transforming {
        /// Gesture identity.
        token: GestureToken,
        /// Element being transformed.
        id: ElementId,
    },
    /// A marquee selection is open.
    Selecting(Marquee),
}

impl Gesture {
    /// Whether no gesture is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Token of the active gesture, if any.
    #[must_use]
    pub const fn token(&self) -> Option<GestureToken> {
        match self {
            Self::Idle => None,
            Self::Dragging { token, .. } | Self::Transforming { token, .. } => Some(*token),
            Self::Selecting(marquee) => Some(marquee.token),
        }
    }

    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Transforming { .. } => "transforming",
            Self::Selecting(_) => "selecting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_sequential() {
        let first = GestureToken::first();
        let second = first.next();
        assert_eq!(first.serial() + 1, second.serial());
        assert_ne!(first, second);
    }

    #[test]
    fn test_expiry() {
        let start = Instant::now();
        let token = GestureToken::first().next_at(start);
        let timeout = Duration::from_secs(5);
        assert!(!token.is_expired(start + Duration::from_secs(4), timeout));
        assert!(token.is_expired(start + Duration::from_secs(5), timeout));
        // A clock reading from before the gesture never counts as expired.
        assert!(!GestureToken::first()
            .next_at(start + Duration::from_secs(1))
            .is_expired(start, timeout));
    }

    #[test]
    fn test_gesture_token_lookup() {
        let token = GestureToken::first();
        assert!(Gesture::Idle.token().is_none());
        let gesture = Gesture::Transforming {
            token,
            id: ElementId::new(),
        };
        assert_eq!(gesture.token(), Some(token));
        assert_eq!(gesture.name(), "transforming");
        assert!(!gesture.is_idle());
    }
}

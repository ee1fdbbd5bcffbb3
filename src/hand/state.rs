//! Grab state machine - one explicit state per hand.
//!
//! Hover and hold are mutually exclusive, so they live in one enum instead
//! of two optional fields that could both be set.
//!
//! ## State Transitions
//!
//! ```text
//! Idle     -> Hovering   (nearest candidate found)
//! Hovering -> Hovering   (a nearer candidate replaces the old one)
//! Hovering -> Idle       (candidate left range or became unavailable)
//! Hovering -> Holding    (grab value reached the grab threshold)
//! Holding  -> Idle       (grab value fell to the release threshold, or forced)
//! ```

use crate::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrabState {
    /// Nothing in reach, nothing held
    #[default]
    Idle,

    /// A candidate is in reach; informational only
    Hovering { target: EntityId },

    /// The hand owns this target
    Holding { target: EntityId },
}

impl GrabState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_holding(&self) -> bool {
        matches!(self, Self::Holding { .. })
    }

    pub fn held_target(&self) -> Option<EntityId> {
        match self {
            Self::Holding { target } => Some(*target),
            _ => None,
        }
    }

    pub fn hover_target(&self) -> Option<EntityId> {
        match self {
            Self::Hovering { target } => Some(*target),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

//! Core types for the interaction system.
//!
//! Identifiers, poses, ownership and the small enums shared by hands,
//! sockets, pointers and buttons.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// A world object registered with the spatial index (targets, buttons, scenery).
    EntityId,
    "entity"
);
id_type!(
    /// A hand agent.
    HandId,
    "hand"
);
id_type!(
    /// A socket.
    SocketId,
    "socket"
);
id_type!(
    /// A ray pointer.
    PointerId,
    "pointer"
);

// ============================================================================
// Pose
// ============================================================================

/// Position and orientation in world space. Forward is +Z, up is +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Compose a pose expressed in this pose's local frame into world space.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }

    /// Angular distance to another pose, in degrees.
    pub fn angle_deg(&self, other: &Pose) -> f32 {
        self.rotation.angle_between(other.rotation).to_degrees()
    }
}

// ============================================================================
// Ownership
// ============================================================================

/// Who may act on a target right now. Exactly one variant at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "by")]
pub enum Ownership {
    #[default]
    Unowned,
    HeldBy(HandId),
    Socketed(SocketId),
}

impl Ownership {
    pub fn is_unowned(&self) -> bool {
        matches!(self, Self::Unowned)
    }

    pub fn is_held(&self) -> bool {
        matches!(self, Self::HeldBy(_))
    }

    pub fn holder(&self) -> Option<HandId> {
        match self {
            Self::HeldBy(hand) => Some(*hand),
            _ => None,
        }
    }

    pub fn socket(&self) -> Option<SocketId> {
        match self {
            Self::Socketed(socket) => Some(*socket),
            _ => None,
        }
    }
}

/// The actor that caused a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Actor {
    Hand(HandId),
    Pointer(PointerId),
    Socket(SocketId),
    /// Programmatic call with no physical actor (toggle, manual press)
    Script,
}

// ============================================================================
// Input Configuration Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSide {
    Left,
    Right,
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandSide::Left => write!(f, "left"),
            HandSide::Right => write!(f, "right"),
        }
    }
}

/// How the grab value is derived from the analog axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabInput {
    #[default]
    Grip,
    Trigger,
    /// Maximum of grip and trigger
    GripOrTrigger,
}

impl GrabInput {
    pub fn combine(&self, grip: f32, trigger: f32) -> f32 {
        let value = match self {
            GrabInput::Grip => grip,
            GrabInput::Trigger => trigger,
            GrabInput::GripOrTrigger => grip.max(trigger),
        };
        value.clamp(0.0, 1.0)
    }
}

/// Bit set of collision layers a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    /// Mask containing a single layer index (0..32).
    pub fn layer(index: u8) -> Self {
        LayerMask(1u32.checked_shl(index as u32).unwrap_or(0))
    }

    #[inline]
    pub fn contains(&self, layer: u8) -> bool {
        self.0 & LayerMask::layer(layer).0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

//! Sockets - fixed acceptors that claim released objects and snap them
//! into an exact pose.
//!
//! ## State Transitions
//!
//! ```text
//! Empty    -> Snapping   (tracked candidate released in range, or manual place)
//! Snapping -> Occupied   (position and angle under the convergence epsilons)
//! Snapping -> Empty      (remove_object / disable)
//! Occupied -> Empty      (remove_object / disable / grab-out)
//! ```
//!
//! The snap is an exponential approach advanced once per tick, so the
//! result depends on elapsed time rather than on frame count.

use crate::config::SocketConfig;
use crate::constants::{SNAP_ANGLE_EPSILON_DEG, SNAP_POSITION_EPSILON};
use crate::events::{Emitter, Event, Listeners};
use crate::types::{EntityId, Pose, SocketId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    /// Free; `hovering` is the nearest held object in range that passes the filter
    Empty { hovering: Option<EntityId> },

    /// Claimed and converging
    Snapping { target: EntityId },

    /// Settled at the socket pose
    Occupied { target: EntityId },
}

impl Default for SocketState {
    fn default() -> Self {
        Self::Empty { hovering: None }
    }
}

impl SocketState {
    pub fn occupant(&self) -> Option<EntityId> {
        match self {
            Self::Snapping { target } | Self::Occupied { target } => Some(*target),
            Self::Empty { .. } => None,
        }
    }

    pub fn hovering(&self) -> Option<EntityId> {
        match self {
            Self::Empty { hovering } => *hovering,
            _ => None,
        }
    }

    pub fn is_snapping(&self) -> bool {
        matches!(self, Self::Snapping { .. })
    }

    pub fn is_occupied(&self) -> bool {
        !matches!(self, Self::Empty { .. })
    }
}

pub struct Socket {
    id: SocketId,
    name: String,
    pose: Pose,
    pub(crate) config: SocketConfig,
    enabled: bool,
    pub(crate) state: SocketState,
    listeners: Listeners,
}

impl Socket {
    pub(crate) fn new(id: SocketId, name: String, pose: Pose, config: SocketConfig) -> Self {
        Self {
            id,
            name,
            pose,
            config,
            enabled: true,
            state: SocketState::default(),
            listeners: Listeners::new(),
        }
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    pub fn state(&self) -> SocketState {
        self.state
    }

    pub fn occupant(&self) -> Option<EntityId> {
        self.state.occupant()
    }

    pub fn hovering(&self) -> Option<EntityId> {
        self.state.hovering()
    }

    pub fn is_occupied(&self) -> bool {
        self.state.is_occupied()
    }

    pub fn is_snapping(&self) -> bool {
        self.state.is_snapping()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn contains(&self, target: EntityId) -> bool {
        self.state.occupant() == Some(target)
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    /// Whether a collider of `radius` centred at `position` overlaps the
    /// acceptance sphere.
    pub fn in_range(&self, position: glam::Vec3, radius: f32) -> bool {
        self.pose.position.distance(position) <= self.config.radius + radius
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.listeners.emit(&event);
    }

    pub(crate) fn emitter(&self) -> Emitter {
        Emitter::Socket(self.id)
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Result of one snap step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapStep {
    pub pose: Pose,
    pub converged: bool,
}

/// Advance `current` toward `goal` by one tick of exponential approach.
///
/// Converged poses are returned as exactly `goal`.
pub fn snap_step(current: Pose, goal: Pose, speed: f32, dt: f32) -> SnapStep {
    if within_epsilon(&current, &goal) {
        return SnapStep {
            pose: goal,
            converged: true,
        };
    }

    let alpha = 1.0 - (-speed * dt.max(0.0)).exp();
    let next = Pose {
        position: current.position.lerp(goal.position, alpha),
        rotation: current.rotation.slerp(goal.rotation, alpha).normalize(),
    };

    if within_epsilon(&next, &goal) {
        SnapStep {
            pose: goal,
            converged: true,
        }
    } else {
        SnapStep {
            pose: next,
            converged: false,
        }
    }
}

fn within_epsilon(a: &Pose, b: &Pose) -> bool {
    a.distance(b) < SNAP_POSITION_EPSILON && a.angle_deg(b) < SNAP_ANGLE_EPSILON_DEG
}

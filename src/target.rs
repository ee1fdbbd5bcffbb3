//! Interaction targets - the manipulable objects hands and sockets fight over.
//!
//! A target's [`Ownership`] is the single source of truth for who may act
//! on it. Only the protocol in [`crate::world`] writes it, and every write
//! goes through [`InteractionTarget::transfer`], which refuses transitions
//! that would skip the `Unowned` state.

use crate::constants::DEFAULT_TARGET_RADIUS;
use crate::events::{Emitter, Event, Listeners};
use crate::physics::RigidBody;
use crate::types::{EntityId, Ownership, Pose, SocketId};
use std::fmt;

/// Description used to register a target with the world.
pub struct TargetDesc {
    pub name: String,
    pub tag: Option<String>,
    pub pose: Pose,
    pub radius: f32,
    pub layer: u8,
    pub grabbable: bool,
    pub body: Option<Box<dyn RigidBody>>,
    /// Pre-authored placement; the target starts settled in this socket
    pub socketed_in: Option<SocketId>,
}

impl TargetDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            pose: Pose::IDENTITY,
            radius: DEFAULT_TARGET_RADIUS,
            layer: 0,
            grabbable: true,
            body: None,
            socketed_in: None,
        }
    }

    pub fn at(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn at_position(mut self, position: glam::Vec3) -> Self {
        self.pose = Pose::from_position(position);
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn grabbable(mut self, grabbable: bool) -> Self {
        self.grabbable = grabbable;
        self
    }

    pub fn body(mut self, body: impl RigidBody + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    pub fn socketed_in(mut self, socket: SocketId) -> Self {
        self.socketed_in = Some(socket);
        self
    }
}

pub struct InteractionTarget {
    id: EntityId,
    name: String,
    tag: Option<String>,
    pose: Pose,
    radius: f32,
    layer: u8,
    ownership: Ownership,
    grabbable: bool,
    /// Socket that cleared `grabbable` on placement
    locked_by: Option<SocketId>,
    body: Option<Box<dyn RigidBody>>,
    kinematic_before_grab: bool,
    listeners: Listeners,
}

impl InteractionTarget {
    pub(crate) fn from_desc(id: EntityId, desc: TargetDesc) -> Self {
        Self {
            id,
            name: desc.name,
            tag: desc.tag,
            pose: desc.pose,
            radius: desc.radius,
            layer: desc.layer,
            ownership: Ownership::Unowned,
            grabbable: desc.grabbable,
            locked_by: None,
            body: desc.body,
            kinematic_before_grab: false,
            listeners: Listeners::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_grabbable(&self) -> bool {
        self.grabbable
    }

    pub fn locked_by(&self) -> Option<SocketId> {
        self.locked_by
    }

    pub fn body(&self) -> Option<&dyn RigidBody> {
        self.body.as_deref()
    }

    /// `None` when no physics proxy is attached.
    pub fn is_kinematic(&self) -> Option<bool> {
        self.body.as_ref().map(|body| body.is_kinematic())
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// External toggle. Drops any socket lock so a later removal cannot
    /// overwrite the value set here.
    pub(crate) fn set_grabbable(&mut self, grabbable: bool) {
        self.grabbable = grabbable;
        self.locked_by = None;
    }

    pub(crate) fn lock(&mut self, socket: SocketId) {
        self.grabbable = false;
        self.locked_by = Some(socket);
    }

    /// Undo a lock placed by `socket`. Returns true if one was lifted.
    pub(crate) fn unlock(&mut self, socket: SocketId) -> bool {
        if self.locked_by == Some(socket) {
            self.locked_by = None;
            self.grabbable = true;
            true
        } else {
            false
        }
    }

    /// Move ownership along a legal edge of the protocol.
    ///
    /// Legal edges are `Unowned -> HeldBy | Socketed` and `owner -> Unowned`.
    /// Anything else is refused and leaves the target untouched.
    pub(crate) fn transfer(&mut self, to: Ownership) -> bool {
        let legal = match (self.ownership, to) {
            (Ownership::Unowned, Ownership::HeldBy(_) | Ownership::Socketed(_)) => true,
            (Ownership::HeldBy(_) | Ownership::Socketed(_), Ownership::Unowned) => true,
            _ => false,
        };
        if legal {
            tracing::trace!(target_id = %self.id, from = ?self.ownership, to = ?to, "Ownership transfer");
            self.ownership = to;
        } else {
            tracing::warn!(
                target_id = %self.id,
                from = ?self.ownership,
                to = ?to,
                "Rejected illegal ownership transfer"
            );
        }
        legal
    }

    pub(crate) fn begin_hold(&mut self) {
        if let Some(body) = self.body.as_mut() {
            self.kinematic_before_grab = body.is_kinematic();
            body.set_kinematic(true);
            body.clear_velocity();
        }
    }

    pub(crate) fn end_hold(&mut self) {
        if let Some(body) = self.body.as_mut() {
            body.set_kinematic(self.kinematic_before_grab);
        }
    }

    pub(crate) fn freeze(&mut self) {
        if let Some(body) = self.body.as_mut() {
            body.set_kinematic(true);
            body.clear_velocity();
        }
    }

    pub(crate) fn unfreeze(&mut self) {
        if let Some(body) = self.body.as_mut() {
            body.set_kinematic(false);
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.listeners.emit(&event);
    }

    pub(crate) fn emitter(&self) -> Emitter {
        Emitter::Target(self.id)
    }
}

impl fmt::Debug for InteractionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionTarget")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("ownership", &self.ownership)
            .field("grabbable", &self.grabbable)
            .field("pose", &self.pose)
            .finish()
    }
}

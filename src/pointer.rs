//! Ray pointers for distant interaction.
//!
//! A pointer never touches ownership. It reports what its ray hits, drives
//! hover notifications on hoverable entities and emits edge-detected clicks.

use crate::config::{PointerActivation, PointerConfig};
use crate::device::{self, Axis, DeviceHandle};
use crate::events::{Emitter, Event, Listeners};
use crate::spatial_index::RayHit;
use crate::types::{EntityId, HandSide, PointerId, Pose};
use std::fmt;
use std::sync::Arc;

pub struct PointerAgent {
    id: PointerId,
    side: HandSide,
    pub(crate) config: PointerConfig,
    device: Option<Arc<dyn DeviceHandle>>,
    active: bool,
    /// Overrides the activation rule while set
    forced: Option<bool>,
    pub(crate) current_hit: Option<RayHit>,
    click_was_down: bool,
    pose: Pose,
    listeners: Listeners,
}

impl PointerAgent {
    pub(crate) fn new(id: PointerId, side: HandSide, config: PointerConfig) -> Self {
        Self {
            id,
            side,
            config,
            device: None,
            active: false,
            forced: None,
            current_hit: None,
            click_was_down: false,
            pose: Pose::IDENTITY,
            listeners: Listeners::new(),
        }
    }

    pub fn id(&self) -> PointerId {
        self.id
    }

    pub fn side(&self) -> HandSide {
        self.side
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_hovering(&self) -> bool {
        self.current_hit.is_some()
    }

    pub fn current_hit(&self) -> Option<RayHit> {
        self.current_hit
    }

    pub fn hover_entity(&self) -> Option<EntityId> {
        self.current_hit.map(|hit| hit.entity)
    }

    /// Ray origin pose; the ray points along its +Z axis.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    /// End point of the visible ray: the hit point, or full length on a miss.
    pub fn ray_end(&self) -> glam::Vec3 {
        match self.current_hit {
            Some(hit) => hit.point,
            None => self.pose.position + self.pose.forward() * self.config.max_distance,
        }
    }

    pub(crate) fn force_active(&mut self, forced: Option<bool>) {
        self.forced = forced;
    }

    pub(crate) fn set_max_distance(&mut self, distance: f32) {
        self.config.max_distance = distance.max(0.0);
    }

    pub(crate) fn attach_device(&mut self, device: Arc<dyn DeviceHandle>) {
        self.device = Some(device);
    }

    pub(crate) fn detach_device(&mut self) {
        self.device = None;
        self.active = false;
        self.click_was_down = false;
    }

    pub(crate) fn device_lost(&self) -> bool {
        self.device.as_ref().is_some_and(|d| !d.is_valid())
    }

    /// Poll pose, activation and click state. Returns true on a click
    /// rising edge this tick.
    pub(crate) fn poll(&mut self) -> bool {
        let Some(device) = self.device.as_ref() else {
            return false;
        };

        self.pose = device
            .poll_pose()
            .compose(&Pose::from_position(self.config.origin_offset));

        self.active = match self.forced {
            Some(forced) => forced,
            None => match self.config.activation {
                PointerActivation::Trigger { threshold } => {
                    device.poll_axis(Axis::Trigger) > threshold
                }
                PointerActivation::Button { button } => device.poll_button(button),
                PointerActivation::Always => true,
            },
        };

        let click_down = device.poll_button(self.config.click_button);
        let rising = click_down && !self.click_was_down;
        self.click_was_down = click_down;
        rising
    }

    pub(crate) fn pulse(&self, (amplitude, duration): (f32, f32)) {
        if !self.config.haptics {
            return;
        }
        if let Some(device) = self.device.as_deref() {
            device::pulse(device, amplitude, duration);
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.listeners.emit(&event);
    }

    pub(crate) fn emitter(&self) -> Emitter {
        Emitter::Pointer(self.id)
    }
}

impl fmt::Debug for PointerAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerAgent")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("active", &self.active)
            .field("current_hit", &self.current_hit)
            .finish()
    }
}

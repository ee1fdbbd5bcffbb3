use super::state::GrabState;
use crate::config::HandConfig;
use crate::device::{self, Axis, DeviceHandle};
use crate::types::{EntityId, HandId, HandSide, Pose};
use std::fmt;
use std::sync::Arc;

/// What the hysteresis band asks for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabDecision {
    Stay,
    Grab,
    Release,
}

/// One controller's grab/release state machine.
///
/// The agent owns its device handle and its [`GrabState`]; the world drives
/// it once per tick and performs the cross-object ownership changes.
pub struct HandAgent {
    id: HandId,
    side: HandSide,
    pub(crate) config: HandConfig,
    device: Option<Arc<dyn DeviceHandle>>,
    enabled: bool,
    pub(crate) state: GrabState,
    grab_value: f32,
    /// False after a forced release until the input drops to the release threshold
    armed: bool,
    controller_pose: Pose,
    grab_point: Pose,
}

impl HandAgent {
    pub(crate) fn new(id: HandId, side: HandSide, config: HandConfig) -> Self {
        Self {
            id,
            side,
            config,
            device: None,
            enabled: true,
            state: GrabState::Idle,
            grab_value: 0.0,
            armed: true,
            controller_pose: Pose::IDENTITY,
            grab_point: Pose::IDENTITY,
        }
    }

    pub fn id(&self) -> HandId {
        self.id
    }

    pub fn side(&self) -> HandSide {
        self.side
    }

    pub fn config(&self) -> &HandConfig {
        &self.config
    }

    pub fn state(&self) -> GrabState {
        self.state
    }

    pub fn held_target(&self) -> Option<EntityId> {
        self.state.held_target()
    }

    pub fn hover_target(&self) -> Option<EntityId> {
        self.state.hover_target()
    }

    pub fn is_holding(&self) -> bool {
        self.state.is_holding()
    }

    pub fn grab_value(&self) -> f32 {
        self.grab_value
    }

    pub fn grab_point(&self) -> Pose {
        self.grab_point
    }

    pub fn controller_pose(&self) -> Pose {
        self.controller_pose
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn device(&self) -> Option<&Arc<dyn DeviceHandle>> {
        self.device.as_ref()
    }

    /// Pulse this hand's controller, if haptics are enabled and a device is attached.
    pub fn trigger_haptic(&self, amplitude: f32, duration: f32) {
        if !self.config.haptics {
            return;
        }
        if let Some(device) = self.device.as_deref() {
            device::pulse(device, amplitude, duration);
        }
    }

    pub fn trigger_default_haptic(&self) {
        self.trigger_haptic(self.config.haptic_amplitude, self.config.haptic_duration);
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn attach_device(&mut self, device: Arc<dyn DeviceHandle>) {
        self.device = Some(device);
    }

    pub(crate) fn detach_device(&mut self) -> Option<Arc<dyn DeviceHandle>> {
        self.grab_value = 0.0;
        self.device.take()
    }

    /// True if the attached device has stopped reporting valid.
    pub(crate) fn device_lost(&self) -> bool {
        self.device.as_ref().is_some_and(|d| !d.is_valid())
    }

    /// Read pose and analog input from the device.
    pub(crate) fn poll(&mut self) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        self.controller_pose = device.poll_pose();
        self.grab_point = self
            .controller_pose
            .compose(&Pose::from_position(self.config.grab_point_offset));

        let grip = device.poll_axis(Axis::Grip);
        let trigger = device.poll_axis(Axis::Trigger);
        self.grab_value = self.config.grab_input.combine(grip, trigger);
    }

    /// Apply the hysteresis band to the current grab value.
    pub(crate) fn decide(&mut self) -> GrabDecision {
        if self.grab_value <= self.config.release_threshold {
            self.armed = true;
        }
        if self.state.is_holding() {
            if self.grab_value <= self.config.release_threshold {
                return GrabDecision::Release;
            }
        } else if self.armed && self.grab_value >= self.config.grab_threshold {
            return GrabDecision::Grab;
        }
        GrabDecision::Stay
    }

    /// Require the input to fall back through the release threshold before
    /// the next grab.
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl fmt::Debug for HandAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandAgent")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("state", &self.state)
            .field("grab_value", &self.grab_value)
            .field("enabled", &self.enabled)
            .field("device", &self.device.as_ref().map(|d| d.name().to_string()))
            .finish()
    }
}

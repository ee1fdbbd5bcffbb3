//! Controller device abstraction.
//!
//! The interaction core never talks to a driver directly. It polls a
//! [`DeviceHandle`] once per tick and asks a [`DeviceProvider`] for a new
//! handle whenever the current one is missing or has gone invalid.
//!
//! [`ScriptedDevice`] is an in-memory implementation whose state can be
//! driven from outside after the world has taken a handle to it. It backs
//! the headless simulator and the test suite.

use crate::types::{HandSide, Pose};
use glam::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Analog axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Grip,
    Trigger,
}

/// Two-dimensional axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis2 {
    Thumbstick,
}

/// Digital buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Trigger,
    Grip,
    Primary,
    Secondary,
    Menu,
    ThumbstickClick,
}

/// One physical controller.
///
/// Every method is a cheap poll. Implementations return neutral values
/// (0.0, `false`, last known pose) for features the hardware lacks.
pub trait DeviceHandle: Send + Sync {
    fn name(&self) -> &str;

    /// `false` once the device has disconnected. The handle is dropped and
    /// the provider is asked again on the next tick.
    fn is_valid(&self) -> bool;

    fn poll_axis(&self, axis: Axis) -> f32;

    fn poll_axis2(&self, axis: Axis2) -> Vec2;

    fn poll_button(&self, button: Button) -> bool;

    fn poll_pose(&self) -> Pose;

    fn send_haptic_pulse(&self, amplitude: f32, duration: f32);

    fn supports_haptics(&self) -> bool {
        true
    }
}

/// Discovers controllers for a hand side.
pub trait DeviceProvider {
    fn acquire(&mut self, side: HandSide) -> Option<Arc<dyn DeviceHandle>>;
}

/// Send a pulse if the device is live and can vibrate.
pub(crate) fn pulse(device: &dyn DeviceHandle, amplitude: f32, duration: f32) {
    if device.is_valid() && device.supports_haptics() {
        device.send_haptic_pulse(amplitude, duration);
    }
}

// ============================================================================
// Scripted device
// ============================================================================

/// A haptic pulse recorded by a [`ScriptedDevice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub amplitude: f32,
    pub duration: f32,
}

#[derive(Debug)]
struct ScriptedState {
    valid: bool,
    haptics: bool,
    pose: Pose,
    axes: HashMap<Axis, f32>,
    thumbstick: Vec2,
    buttons: HashMap<Button, bool>,
    pulses: Vec<HapticPulse>,
}

/// In-memory controller. Clones share the same state.
#[derive(Debug, Clone)]
pub struct ScriptedDevice {
    name: Arc<str>,
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedDevice {
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            state: Arc::new(Mutex::new(ScriptedState {
                valid: true,
                haptics: true,
                pose: Pose::IDENTITY,
                axes: HashMap::new(),
                thumbstick: Vec2::ZERO,
                buttons: HashMap::new(),
                pulses: Vec::new(),
            })),
        }
    }

    pub fn set_axis(&self, axis: Axis, value: f32) {
        self.state.lock().axes.insert(axis, value);
    }

    pub fn set_grip(&self, value: f32) {
        self.set_axis(Axis::Grip, value);
    }

    pub fn set_trigger(&self, value: f32) {
        self.set_axis(Axis::Trigger, value);
    }

    pub fn set_thumbstick(&self, value: Vec2) {
        self.state.lock().thumbstick = value;
    }

    pub fn set_button(&self, button: Button, pressed: bool) {
        self.state.lock().buttons.insert(button, pressed);
    }

    pub fn set_pose(&self, pose: Pose) {
        self.state.lock().pose = pose;
    }

    pub fn set_valid(&self, valid: bool) {
        self.state.lock().valid = valid;
    }

    pub fn set_haptics_supported(&self, supported: bool) {
        self.state.lock().haptics = supported;
    }

    /// Pulses received so far, oldest first.
    pub fn pulses(&self) -> Vec<HapticPulse> {
        self.state.lock().pulses.clone()
    }

    pub fn clear_pulses(&self) {
        self.state.lock().pulses.clear();
    }

    /// Boxed handle for handing to a provider.
    pub fn handle(&self) -> Arc<dyn DeviceHandle> {
        Arc::new(self.clone())
    }
}

impl DeviceHandle for ScriptedDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self) -> bool {
        self.state.lock().valid
    }

    fn poll_axis(&self, axis: Axis) -> f32 {
        self.state.lock().axes.get(&axis).copied().unwrap_or(0.0)
    }

    fn poll_axis2(&self, axis: Axis2) -> Vec2 {
        match axis {
            Axis2::Thumbstick => self.state.lock().thumbstick,
        }
    }

    fn poll_button(&self, button: Button) -> bool {
        self.state.lock().buttons.get(&button).copied().unwrap_or(false)
    }

    fn poll_pose(&self) -> Pose {
        self.state.lock().pose
    }

    fn send_haptic_pulse(&self, amplitude: f32, duration: f32) {
        self.state.lock().pulses.push(HapticPulse {
            amplitude,
            duration,
        });
    }

    fn supports_haptics(&self) -> bool {
        self.state.lock().haptics
    }
}

/// Provider backed by a fixed table of devices per side.
///
/// A device that reports itself invalid is not handed out.
#[derive(Default)]
pub struct DevicePool {
    devices: HashMap<HandSide, Arc<dyn DeviceHandle>>,
}

impl DevicePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, side: HandSide, device: Arc<dyn DeviceHandle>) -> Self {
        self.insert(side, device);
        self
    }

    pub fn insert(&mut self, side: HandSide, device: Arc<dyn DeviceHandle>) {
        self.devices.insert(side, device);
    }

    pub fn remove(&mut self, side: HandSide) -> Option<Arc<dyn DeviceHandle>> {
        self.devices.remove(&side)
    }
}

impl DeviceProvider for DevicePool {
    fn acquire(&mut self, side: HandSide) -> Option<Arc<dyn DeviceHandle>> {
        self.devices
            .get(&side)
            .filter(|device| device.is_valid())
            .cloned()
    }
}

//! Interaction configuration.
//!
//! All tuning lives in [`InteractionConfig`], loadable from JSON. Every
//! field has a default (see `constants`), so a config file only needs the
//! values it overrides:
//!
//! ```json
//! { "hand": { "grab_input": "grip_or_trigger", "grab_radius": 0.12 } }
//! ```

use crate::constants::*;
use crate::device::Button;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{GrabInput, LayerMask};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for an [`InteractionWorld`](crate::world::InteractionWorld).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hand: HandConfig,
    pub socket: SocketConfig,
    pub pointer: PointerConfig,
    pub button: ButtonConfig,
    pub perf: PerfConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    pub grab_input: GrabInput,
    pub grab_threshold: f32,
    pub release_threshold: f32,
    pub grab_radius: f32,
    pub grab_layers: LayerMask,
    /// Grab point relative to the controller pose
    pub grab_point_offset: Vec3,
    pub haptics: bool,
    pub haptic_amplitude: f32,
    pub haptic_duration: f32,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            grab_input: GrabInput::Grip,
            grab_threshold: DEFAULT_GRAB_THRESHOLD,
            release_threshold: DEFAULT_RELEASE_THRESHOLD,
            grab_radius: DEFAULT_GRAB_RADIUS,
            grab_layers: LayerMask::ALL,
            grab_point_offset: Vec3::ZERO,
            haptics: true,
            haptic_amplitude: DEFAULT_HAPTIC_AMPLITUDE,
            haptic_duration: DEFAULT_HAPTIC_DURATION,
        }
    }
}

impl HandConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit("hand.grab_threshold", self.grab_threshold)?;
        check_unit("hand.release_threshold", self.release_threshold)?;
        if self.release_threshold >= self.grab_threshold {
            return Err(ConfigError::InvalidThresholds {
                grab: self.grab_threshold,
                release: self.release_threshold,
            });
        }
        check_positive("hand.grab_radius", self.grab_radius)?;
        check_unit("hand.haptic_amplitude", self.haptic_amplitude)
    }
}

/// Conjunction of optional predicates a socket applies to candidates.
///
/// A `None` or empty field is disabled; with both disabled the socket
/// accepts anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceFilter {
    /// Exact tag (category) match
    pub tag: Option<String>,
    /// Substring of the target's name
    pub name_contains: Option<String>,
}

impl AcceptanceFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn accepts(&self, name: &str, tag: Option<&str>) -> bool {
        if let Some(required) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if tag != Some(required) {
                return false;
            }
        }
        if let Some(needle) = self.name_contains.as_deref().filter(|n| !n.is_empty()) {
            if !name.contains(needle) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    pub radius: f32,
    pub snap_on_release: bool,
    pub snap_speed: f32,
    /// Clear the occupant's grabbable flag once it is placed
    pub lock_on_snap: bool,
    /// Let a hand take a settled, unlocked occupant straight out of the socket
    pub allow_grab_out: bool,
    pub filter: AcceptanceFilter,
    pub layers: LayerMask,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_SOCKET_RADIUS,
            snap_on_release: true,
            snap_speed: DEFAULT_SNAP_SPEED,
            lock_on_snap: false,
            allow_grab_out: false,
            filter: AcceptanceFilter::default(),
            layers: LayerMask::ALL,
        }
    }
}

impl SocketConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("socket.radius", self.radius)?;
        check_positive("socket.snap_speed", self.snap_speed)
    }
}

/// What makes a pointer live.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PointerActivation {
    /// Analog trigger strictly above the threshold
    Trigger { threshold: f32 },
    /// Digital button held
    Button { button: Button },
    Always,
}

impl Default for PointerActivation {
    fn default() -> Self {
        PointerActivation::Trigger {
            threshold: DEFAULT_POINTER_ACTIVATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub max_distance: f32,
    pub layers: LayerMask,
    pub activation: PointerActivation,
    /// Button whose rising edge produces a click
    pub click_button: Button,
    /// Ray origin relative to the controller pose
    pub origin_offset: Vec3,
    pub haptics: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_POINTER_MAX_DISTANCE,
            layers: LayerMask::ALL,
            activation: PointerActivation::default(),
            click_button: Button::Trigger,
            origin_offset: Vec3::ZERO,
            haptics: true,
        }
    }
}

impl PointerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("pointer.max_distance", self.max_distance)?;
        if let PointerActivation::Trigger { threshold } = self.activation {
            check_unit("pointer.activation.threshold", threshold)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub touch_radius: f32,
    pub press_depth: f32,
    pub return_speed: f32,
    /// Seconds between two accepted presses
    pub cooldown: f64,
    pub stay_pressed: bool,
    pub haptics: bool,
    pub haptic_amplitude: f32,
    pub haptic_duration: f32,
    pub haptic_on_release: bool,
    pub layer: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            touch_radius: DEFAULT_TOUCH_RADIUS,
            press_depth: DEFAULT_PRESS_DEPTH,
            return_speed: DEFAULT_RETURN_SPEED,
            cooldown: DEFAULT_BUTTON_COOLDOWN,
            stay_pressed: false,
            haptics: true,
            haptic_amplitude: DEFAULT_HAPTIC_AMPLITUDE,
            haptic_duration: DEFAULT_HAPTIC_DURATION,
            haptic_on_release: false,
            layer: 0,
        }
    }
}

impl ButtonConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("button.touch_radius", self.touch_radius)?;
        if self.cooldown < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "button.cooldown",
                value: self.cooldown,
            });
        }
        if self.layer >= 32 {
            return Err(ConfigError::OutOfRange {
                field: "button.layer",
                value: self.layer as f64,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfConfig {
    /// Ticks slower than this are logged as warnings
    pub slow_tick_ms: f64,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            slow_tick_ms: TARGET_TICK_MS * 2.0,
        }
    }
}

impl InteractionConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: InteractionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.as_ref().display(), "No interaction config, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.hand.validate()?;
        self.socket.validate()?;
        self.pointer.validate()?;
        self.button.validate()
    }
}

/// Default location of the interaction config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("grabkit").join("interaction.json"))
}

fn check_unit(field: &'static str, value: f32) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
        })
    }
}

fn check_positive(field: &'static str, value: f32) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
        })
    }
}

//! Interaction-wide constants.
//!
//! Centralizes tuning defaults so hands, sockets, pointers and buttons
//! share one source of truth for their magic numbers.

// ============================================================================
// Hand Defaults
// ============================================================================

/// Analog value at or above which a free hand grabs
pub const DEFAULT_GRAB_THRESHOLD: f32 = 0.7;

/// Analog value at or below which a holding hand releases
pub const DEFAULT_RELEASE_THRESHOLD: f32 = 0.3;

/// Radius of the grab sphere around the grab point, in meters
pub const DEFAULT_GRAB_RADIUS: f32 = 0.1;

/// Amplitude of the pulse sent when a hand grabs
pub const DEFAULT_HAPTIC_AMPLITUDE: f32 = 0.5;

/// Duration of the pulse sent when a hand grabs, in seconds
pub const DEFAULT_HAPTIC_DURATION: f32 = 0.1;

// ============================================================================
// Target Defaults
// ============================================================================

/// Proximity radius for targets created without an explicit size
pub const DEFAULT_TARGET_RADIUS: f32 = 0.1;

// ============================================================================
// Socket Defaults
// ============================================================================

/// Acceptance radius of a socket
pub const DEFAULT_SOCKET_RADIUS: f32 = 0.15;

/// Exponential approach rate of the snap animation (per second)
pub const DEFAULT_SNAP_SPEED: f32 = 10.0;

/// Positional tolerance below which a snap is complete, in meters
pub const SNAP_POSITION_EPSILON: f32 = 0.01;

/// Angular tolerance below which a snap is complete, in degrees
pub const SNAP_ANGLE_EPSILON_DEG: f32 = 1.0;

/// Pulse sent to the holding hand when a socket starts tracking its object
pub const SOCKET_HOVER_HAPTIC: (f32, f32) = (0.2, 0.1);

// ============================================================================
// Pointer Defaults
// ============================================================================

/// Maximum ray length
pub const DEFAULT_POINTER_MAX_DISTANCE: f32 = 10.0;

/// Trigger value above which a trigger-activated pointer is live
pub const DEFAULT_POINTER_ACTIVATION: f32 = 0.1;

/// Pulse sent when the ray enters a new object
pub const POINTER_HOVER_HAPTIC: (f32, f32) = (0.1, 0.05);

/// Pulse sent on a pointer click
pub const POINTER_CLICK_HAPTIC: (f32, f32) = (0.3, 0.1);

// ============================================================================
// Button Defaults
// ============================================================================

/// How far the button surface travels when pressed, in meters
pub const DEFAULT_PRESS_DEPTH: f32 = 0.02;

/// Exponential return rate of the button surface (per second)
pub const DEFAULT_RETURN_SPEED: f32 = 5.0;

/// Minimum time between two presses, in seconds
pub const DEFAULT_BUTTON_COOLDOWN: f64 = 0.5;

/// Radius of the button's touch volume
pub const DEFAULT_TOUCH_RADIUS: f32 = 0.03;

/// Time a momentary button holds its pressed travel before returning
pub const PRESS_HOLD_SECONDS: f64 = 0.2;

// ============================================================================
// Timing
// ============================================================================

/// Target tick time for 90 Hz headsets
pub const TARGET_TICK_MS: f64 = 11.1;

/// Largest dt accepted by a single tick; longer stalls are clamped
pub const MAX_TICK_DT: f32 = 0.1;

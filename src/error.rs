//! Error types for interaction operations
//!
//! The per-tick protocol never fails; these errors are returned by the
//! explicit API calls (manual placement, removal, lookups) and by config
//! loading. A returned error always means nothing changed.

use crate::types::{EntityId, HandId, PointerId, SocketId};
use thiserror::Error;

/// Errors returned by explicit world operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    /// No target registered under this id
    #[error("Unknown target: {0}")]
    UnknownTarget(EntityId),

    /// No button registered under this id
    #[error("Unknown button: {0}")]
    UnknownButton(EntityId),

    #[error("Unknown hand: {0}")]
    UnknownHand(HandId),

    #[error("Unknown socket: {0}")]
    UnknownSocket(SocketId),

    #[error("Unknown pointer: {0}")]
    UnknownPointer(PointerId),

    /// Manual placement into a socket that already has an occupant
    #[error("Socket {0} is already occupied")]
    SocketOccupied(SocketId),

    /// Removal from a socket with no occupant
    #[error("Socket {0} is empty")]
    SocketEmpty(SocketId),

    /// Operation on a disabled socket
    #[error("Socket {0} is disabled")]
    SocketDisabled(SocketId),

    /// The target already sits in another socket
    #[error("Target {target} is already socketed in {socket}")]
    AlreadySocketed { target: EntityId, socket: SocketId },

    /// A config passed to a registration call failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<ConfigError> for InteractionError {
    fn from(err: ConfigError) -> Self {
        InteractionError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for world operations
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Errors that can occur while loading interaction configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error from serde_json
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Release threshold must sit strictly below the grab threshold
    #[error("Invalid thresholds: release {release} must be below grab {grab}")]
    InvalidThresholds { grab: f32, release: f32 },

    /// A numeric field is outside its legal range
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Result type alias for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

//! grabkit - tick-driven ownership protocol for VR hands, sockets and
//! pointers.
//!
//! Hands grab and release world objects with hysteresis, sockets claim
//! released objects and snap them into place, pointers target objects at a
//! distance, and touch buttons react to hands entering them. Everything is
//! owned by one [`InteractionWorld`] and advanced by [`InteractionWorld::tick`].

pub mod button;
pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod events;
pub mod hand;
pub mod perf;
pub mod physics;
pub mod pointer;
pub mod socket;
pub mod spatial_index;
pub mod target;
pub mod types;
pub mod world;

pub use button::{ButtonState, TouchButton};
pub use config::{
    AcceptanceFilter, ButtonConfig, HandConfig, InteractionConfig, PointerActivation,
    PointerConfig, SocketConfig,
};
pub use device::{DeviceHandle, DevicePool, DeviceProvider, ScriptedDevice};
pub use error::{ConfigError, ConfigResult, InteractionError, InteractionResult};
pub use events::{Event, EventKind, Listeners, SubscriptionId};
pub use hand::{GrabState, HandAgent};
pub use pointer::PointerAgent;
pub use socket::{Socket, SocketState};
pub use spatial_index::{RayHit, SpatialIndex, SpatialQuery};
pub use target::{InteractionTarget, TargetDesc};
pub use types::{Actor, EntityId, HandId, HandSide, Ownership, PointerId, Pose, SocketId};
pub use world::InteractionWorld;

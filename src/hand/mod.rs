//! Hand agents.
//!
//! ## Modules
//!
//! - `state` - Grab state machine enum
//! - `agent` - Per-controller agent: device polling and the hysteresis band
//!
//! Candidate search, grabbing and releasing touch other objects' ownership
//! and therefore live in `world::hands`.

mod agent;
mod state;

pub use agent::{GrabDecision, HandAgent};
pub use state::GrabState;

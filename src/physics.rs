//! Rigid-body proxy.
//!
//! Collision response belongs to an external engine. The interaction core
//! only switches a body between simulated and kinematic and zeroes its
//! velocity when it takes control.

use glam::Vec3;

pub trait RigidBody {
    fn is_kinematic(&self) -> bool;

    fn set_kinematic(&mut self, kinematic: bool);

    fn clear_velocity(&mut self);
}

/// Plain-data body used when no engine is attached.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub kinematic: bool,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodyState {
    pub fn dynamic() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, linear: Vec3) -> Self {
        self.linear_velocity = linear;
        self
    }
}

impl RigidBody for BodyState {
    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    fn clear_velocity(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

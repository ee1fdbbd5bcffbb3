//! Touch buttons - pressed by putting a hand on them, not by grabbing.
//!
//! ```text
//! Released -> Pressed   (hand enters touch volume, cooldown elapsed)
//! Pressed  -> Released  (last touching hand leaves, unless stay-pressed)
//! ```
//!
//! The surface travel is animation state advanced per tick; it has no
//! influence on the press logic.

use crate::config::ButtonConfig;
use crate::constants::PRESS_HOLD_SECONDS;
use crate::events::{Emitter, Event, Listeners};
use crate::types::{Actor, EntityId, HandId, Pose};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed {
        by: Option<HandId>,
        /// World clock at the press
        at: f64,
    },
}

impl ButtonState {
    pub fn is_pressed(&self) -> bool {
        matches!(self, Self::Pressed { .. })
    }

    pub fn presser(&self) -> Option<HandId> {
        match self {
            Self::Pressed { by, .. } => *by,
            Self::Released => None,
        }
    }
}

pub struct TouchButton {
    id: EntityId,
    name: String,
    pose: Pose,
    pub(crate) config: ButtonConfig,
    state: ButtonState,
    last_press_at: Option<f64>,
    travel: f32,
    hovered: bool,
    pub(crate) touching: BTreeSet<HandId>,
    listeners: Listeners,
}

impl TouchButton {
    pub(crate) fn new(id: EntityId, name: String, pose: Pose, config: ButtonConfig) -> Self {
        Self {
            id,
            name,
            pose,
            config,
            state: ButtonState::Released,
            last_press_at: None,
            travel: 0.0,
            hovered: false,
            touching: BTreeSet::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rest pose of the button surface.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn is_pressed(&self) -> bool {
        self.state.is_pressed()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Current depression of the surface, 0..=press_depth.
    pub fn travel(&self) -> f32 {
        self.travel
    }

    /// Where the surface is drawn this tick.
    pub fn surface_pose(&self) -> Pose {
        Pose {
            position: self.pose.position - self.pose.up() * self.travel,
            rotation: self.pose.rotation,
        }
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    /// Try to press. Returns true if the state changed.
    pub(crate) fn press(&mut self, by: Option<HandId>, now: f64) -> bool {
        if self.state.is_pressed() {
            return false;
        }
        if let Some(last) = self.last_press_at {
            if now - last < self.config.cooldown {
                tracing::trace!(button = %self.id, "Press ignored during cooldown");
                return false;
            }
        }

        self.state = ButtonState::Pressed { by, at: now };
        self.last_press_at = Some(now);
        self.travel = self.config.press_depth;
        tracing::debug!(button = %self.id, name = %self.name, "Button pressed");

        let actor = by.map_or(Actor::Script, Actor::Hand);
        self.emit(Event::new(crate::events::EventKind::ButtonPressed, self.emitter()).by(actor));
        true
    }

    /// Release if pressed. Returns the hand that pressed it, if the state changed.
    pub(crate) fn release(&mut self) -> Option<Option<HandId>> {
        let ButtonState::Pressed { by, .. } = self.state else {
            return None;
        };
        self.state = ButtonState::Released;
        tracing::debug!(button = %self.id, name = %self.name, "Button released");

        let actor = by.map_or(Actor::Script, Actor::Hand);
        self.emit(Event::new(crate::events::EventKind::ButtonReleased, self.emitter()).by(actor));
        Some(by)
    }

    /// Ease the surface back toward rest unless it is being held down.
    pub(crate) fn animate(&mut self, now: f64, dt: f32) {
        let held_down = match self.state {
            ButtonState::Pressed { at, .. } => {
                self.config.stay_pressed || now - at <= PRESS_HOLD_SECONDS
            }
            ButtonState::Released => false,
        };
        if held_down || self.travel == 0.0 {
            return;
        }
        let alpha = 1.0 - (-self.config.return_speed * dt.max(0.0)).exp();
        self.travel -= self.travel * alpha;
        if self.travel < 1e-5 {
            self.travel = 0.0;
        }
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.listeners.emit(&event);
    }

    pub(crate) fn emitter(&self) -> Emitter {
        Emitter::Button(self.id)
    }
}

impl fmt::Debug for TouchButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchButton")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("travel", &self.travel)
            .finish()
    }
}

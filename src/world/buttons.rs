//! Button phase: hands entering and leaving touch volumes, travel
//! animation, and the explicit press/release/toggle calls.

use super::InteractionWorld;
use crate::error::{InteractionError, InteractionResult};
use crate::profile_scope;
use crate::types::{EntityId, HandId};
use std::collections::BTreeSet;
use tracing::trace;

impl InteractionWorld {
    pub(super) fn update_buttons(&mut self, dt: f32) {
        profile_scope!("world::buttons");
        let now = self.elapsed;
        let ids: Vec<EntityId> = self.buttons.keys().copied().collect();
        for id in ids {
            self.update_touch(id, now);
            if let Some(button) = self.buttons.get_mut(&id) {
                button.animate(now, dt);
            }
        }
    }

    fn update_touch(&mut self, id: EntityId, now: f64) {
        let Some(button) = self.buttons.get(&id) else {
            return;
        };
        let center = button.pose().position;
        let touch_radius = button.config().touch_radius;

        let touching: BTreeSet<HandId> = self
            .hands
            .values()
            .filter(|hand| hand.is_enabled() && hand.has_device())
            .filter(|hand| {
                hand.grab_point().position.distance(center) <= touch_radius + hand.config().grab_radius
            })
            .map(|hand| hand.id())
            .collect();

        let Some(button) = self.buttons.get_mut(&id) else {
            return;
        };
        let entered: Vec<HandId> = touching.difference(&button.touching).copied().collect();
        let was_touched = !button.touching.is_empty();
        button.touching = touching;
        let now_touched = !button.touching.is_empty();

        for hand in entered {
            trace!(button = %id, hand = %hand, "Hand entered button");
            self.press_button_by(id, Some(hand), now);
        }

        let stay_pressed = self
            .buttons
            .get(&id)
            .is_some_and(|button| button.config().stay_pressed);
        if was_touched && !now_touched && !stay_pressed {
            self.release_button_inner(id);
        }
    }

    fn press_button_by(&mut self, id: EntityId, by: Option<HandId>, now: f64) -> bool {
        let Some(button) = self.buttons.get_mut(&id) else {
            return false;
        };
        if !button.press(by, now) {
            return false;
        }
        let config = button.config();
        if config.haptics {
            if let Some(hand) = by.and_then(|h| self.hands.get(&h)) {
                hand.trigger_haptic(config.haptic_amplitude, config.haptic_duration);
            }
        }
        true
    }

    fn release_button_inner(&mut self, id: EntityId) -> bool {
        let Some(button) = self.buttons.get_mut(&id) else {
            return false;
        };
        let Some(presser) = button.release() else {
            return false;
        };
        let config = button.config();
        if config.haptics && config.haptic_on_release {
            if let Some(hand) = presser.and_then(|h| self.hands.get(&h)) {
                hand.trigger_haptic(config.haptic_amplitude, config.haptic_duration);
            }
        }
        true
    }

    /// Press without a hand. Returns whether the button changed state;
    /// presses while pressed or inside the cooldown are ignored.
    pub fn press_button(&mut self, id: EntityId) -> InteractionResult<bool> {
        if !self.buttons.contains_key(&id) {
            return Err(InteractionError::UnknownButton(id));
        }
        let now = self.elapsed;
        Ok(self.press_button_by(id, None, now))
    }

    pub fn release_button(&mut self, id: EntityId) -> InteractionResult<bool> {
        if !self.buttons.contains_key(&id) {
            return Err(InteractionError::UnknownButton(id));
        }
        Ok(self.release_button_inner(id))
    }

    /// Release if pressed, otherwise press with no actor.
    pub fn toggle_button(&mut self, id: EntityId) -> InteractionResult<bool> {
        let button = self
            .buttons
            .get(&id)
            .ok_or(InteractionError::UnknownButton(id))?;
        if button.is_pressed() {
            self.release_button(id)
        } else {
            self.press_button(id)
        }
    }
}

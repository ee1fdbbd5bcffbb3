//! Touch buttons: hand presses, cooldown, latching and the scripted API.

use crate::helpers::{Recorder, TestWorld, TestWorldBuilder, at};
use grabkit::config::ButtonConfig;
use grabkit::error::InteractionError;
use grabkit::events::EventKind;
use grabkit::types::{Actor, EntityId, HandId, HandSide};

fn button_world(config: ButtonConfig) -> (TestWorld, EntityId, HandId, Recorder) {
    let mut t = TestWorldBuilder::new().build();
    let button = t.world.add_button_with("Call", at(0.0, 1.0, 0.0), config).unwrap();
    let hand = t.world.add_hand(HandSide::Right);
    t.right.set_pose(at(1.0, 1.0, 0.0));
    let events = Recorder::new();
    events.attach(t.world.button_listeners(button).unwrap());
    (t, button, hand, events)
}

fn touch(t: &mut TestWorld) {
    t.right.set_pose(at(0.0, 1.05, 0.0));
    t.tick();
}

fn leave(t: &mut TestWorld) {
    t.right.set_pose(at(1.0, 1.0, 0.0));
    t.tick();
}

#[test]
fn test_touch_presses_and_leaving_releases() {
    let (mut t, button, hand, events) = button_world(ButtonConfig::default());
    t.tick();

    touch(&mut t);
    assert!(t.world.button(button).unwrap().is_pressed());
    assert_eq!(t.world.button(button).unwrap().state().presser(), Some(hand));
    let pressed = &events.events()[0];
    assert_eq!(pressed.kind, EventKind::ButtonPressed);
    assert_eq!(pressed.actor, Some(Actor::Hand(hand)));

    // Staying inside does not press again
    t.tick_n(10);
    assert_eq!(events.count(EventKind::ButtonPressed), 1);

    leave(&mut t);
    assert!(!t.world.button(button).unwrap().is_pressed());
    assert_eq!(
        events.kinds(),
        vec![EventKind::ButtonPressed, EventKind::ButtonReleased]
    );
}

#[test]
fn test_press_pulses_presser_only() {
    let (mut t, _button, _hand, _events) = button_world(ButtonConfig::default());
    t.tick();

    touch(&mut t);
    let pulses = t.right.pulses();
    assert_eq!(pulses.len(), 1);
    assert_eq!((pulses[0].amplitude, pulses[0].duration), (0.5, 0.1));

    leave(&mut t);
    assert_eq!(t.right.pulses().len(), 1);
    assert!(t.left.pulses().is_empty());
}

#[test]
fn test_release_haptic_when_configured() {
    let config = ButtonConfig {
        haptic_on_release: true,
        ..ButtonConfig::default()
    };
    let (mut t, _button, _hand, _events) = button_world(config);
    t.tick();

    touch(&mut t);
    leave(&mut t);
    assert_eq!(t.right.pulses().len(), 2);
}

#[test]
fn test_cooldown_blocks_quick_repress() {
    let (mut t, button, _hand, events) = button_world(ButtonConfig::default());
    t.tick();

    touch(&mut t);
    leave(&mut t);
    touch(&mut t);
    assert!(!t.world.button(button).unwrap().is_pressed());
    assert_eq!(events.count(EventKind::ButtonPressed), 1);

    // Wait out the cooldown away from the button
    leave(&mut t);
    t.tick_n(50);
    touch(&mut t);
    assert!(t.world.button(button).unwrap().is_pressed());
    assert_eq!(events.count(EventKind::ButtonPressed), 2);
}

#[test]
fn test_stay_pressed_latches() {
    let config = ButtonConfig {
        stay_pressed: true,
        ..ButtonConfig::default()
    };
    let (mut t, button, _hand, events) = button_world(config);
    t.tick();

    touch(&mut t);
    leave(&mut t);
    t.tick_n(60);
    assert!(t.world.button(button).unwrap().is_pressed());
    assert_eq!(events.count(EventKind::ButtonReleased), 0);

    // Touching a latched button does nothing
    touch(&mut t);
    assert_eq!(events.count(EventKind::ButtonPressed), 1);

    assert!(t.world.release_button(button).unwrap());
    let released = events.events().into_iter().last().unwrap();
    assert_eq!(released.kind, EventKind::ButtonReleased);
}

#[test]
fn test_scripted_press_release_toggle() {
    let (mut t, button, _hand, events) = button_world(ButtonConfig::default());

    assert!(t.world.press_button(button).unwrap());
    assert!(!t.world.press_button(button).unwrap());
    assert_eq!(events.events()[0].actor, Some(Actor::Script));

    assert!(t.world.release_button(button).unwrap());
    assert!(!t.world.release_button(button).unwrap());

    // Inside the cooldown
    assert!(!t.world.toggle_button(button).unwrap());
    assert!(!t.world.button(button).unwrap().is_pressed());

    t.tick_n(50);
    assert!(t.world.toggle_button(button).unwrap());
    assert!(t.world.button(button).unwrap().is_pressed());
    assert!(t.world.toggle_button(button).unwrap());
    assert!(!t.world.button(button).unwrap().is_pressed());

    assert_eq!(
        events.kinds(),
        vec![
            EventKind::ButtonPressed,
            EventKind::ButtonReleased,
            EventKind::ButtonPressed,
            EventKind::ButtonReleased,
        ]
    );
}

#[test]
fn test_unknown_button_errors() {
    let mut t = TestWorldBuilder::new().build();
    let missing = EntityId(77);

    assert!(matches!(
        t.world.press_button(missing),
        Err(InteractionError::UnknownButton(id)) if id == missing
    ));
    assert!(t.world.release_button(missing).is_err());
    assert!(t.world.toggle_button(missing).is_err());
    assert!(t.world.button_listeners(missing).is_err());
}

#[test]
fn test_travel_returns_to_rest() {
    let (mut t, button, _hand, _events) = button_world(ButtonConfig::default());
    t.tick();

    touch(&mut t);
    let depth = t.world.button(button).unwrap().config().press_depth;
    assert_eq!(t.world.button(button).unwrap().travel(), depth);

    leave(&mut t);
    t.tick_n(30);
    let partial = t.world.button(button).unwrap().travel();
    assert!(partial > 0.0 && partial < depth, "travel = {}", partial);

    t.tick_n(300);
    assert_eq!(t.world.button(button).unwrap().travel(), 0.0);
}

#[test]
fn test_disabled_hand_does_not_touch() {
    let (mut t, button, hand, _events) = button_world(ButtonConfig::default());
    t.world.set_hand_enabled(hand, false).unwrap();

    touch(&mut t);
    assert!(!t.world.button(button).unwrap().is_pressed());
}

#[test]
fn test_second_hand_keeps_button_down() {
    let (mut t, button, _right, events) = button_world(ButtonConfig::default());
    t.world.add_hand(HandSide::Left);
    t.left.set_pose(at(-1.0, 1.0, 0.0));
    t.tick();

    touch(&mut t);
    t.left.set_pose(at(0.0, 0.95, 0.0));
    t.tick();
    leave(&mut t);
    assert!(t.world.button(button).unwrap().is_pressed());

    t.left.set_pose(at(-1.0, 1.0, 0.0));
    t.tick();
    assert!(!t.world.button(button).unwrap().is_pressed());
    assert_eq!(events.count(EventKind::ButtonPressed), 1);
    assert_eq!(events.count(EventKind::ButtonReleased), 1);
}

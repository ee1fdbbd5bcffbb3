//! Pointer targeting: hover transitions, per-tick hits, clicks, misses.

use crate::helpers::{Recorder, TestWorldBuilder, at};
use glam::Vec3;
use grabkit::config::{PointerActivation, PointerConfig};
use grabkit::device::Button;
use grabkit::events::{Emitter, EventKind};
use grabkit::target::TargetDesc;
use grabkit::types::{Actor, HandSide};

#[test]
fn test_hover_hit_and_miss_sequence() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);
    let target_events = Recorder::new();
    target_events.attach(t.world.target_listeners(target).unwrap());
    let pointer_events = Recorder::new();
    pointer_events.attach(t.world.pointer_listeners(pointer).unwrap());

    t.right.set_trigger(0.5);
    t.tick_n(3);

    assert_eq!(target_events.kinds(), vec![EventKind::HoverStart]);
    assert_eq!(
        target_events.events()[0].actor,
        Some(Actor::Pointer(pointer))
    );
    assert_eq!(pointer_events.count(EventKind::PointerHit), 3);

    let hit = t.world.pointer(pointer).unwrap().current_hit().unwrap();
    assert_eq!(hit.entity, target);
    assert!((hit.distance - 1.9).abs() < 1e-4);
    assert!((hit.point - Vec3::new(0.0, 0.0, 1.9)).length() < 1e-4);

    // Aim away
    t.right.set_pose(at(5.0, 0.0, 0.0));
    t.tick_n(2);

    assert_eq!(
        target_events.kinds(),
        vec![EventKind::HoverStart, EventKind::HoverEnd]
    );
    assert_eq!(pointer_events.count(EventKind::PointerMiss), 2);
    assert!(!t.world.pointer(pointer).unwrap().is_hovering());
}

#[test]
fn test_hover_moves_between_targets() {
    let mut t = TestWorldBuilder::new().build();
    let first = t
        .world
        .add_target(TargetDesc::new("A").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let second = t
        .world
        .add_target(TargetDesc::new("B").at(at(1.0, 0.0, 2.0)))
        .unwrap();
    t.world.add_pointer(HandSide::Right);
    let first_events = Recorder::new();
    first_events.attach(t.world.target_listeners(first).unwrap());
    let second_events = Recorder::new();
    second_events.attach(t.world.target_listeners(second).unwrap());

    t.right.set_trigger(1.0);
    t.tick();
    t.right.set_pose(at(1.0, 0.0, 0.0));
    t.tick();

    assert_eq!(
        first_events.kinds(),
        vec![EventKind::HoverStart, EventKind::HoverEnd]
    );
    assert_eq!(second_events.kinds(), vec![EventKind::HoverStart]);

    // One hover pulse per entered target
    let pulses = t.right.pulses();
    assert_eq!(pulses.len(), 2);
    assert!(pulses.iter().all(|p| (p.amplitude, p.duration) == (0.1, 0.05)));
}

#[test]
fn test_click_is_edge_triggered() {
    let mut t = TestWorldBuilder::new().build();
    t.world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.pointer_listeners(pointer).unwrap());

    t.right.set_trigger(1.0);
    t.tick();
    t.right.clear_pulses();

    t.right.set_button(Button::Trigger, true);
    t.tick_n(5);
    assert_eq!(events.count(EventKind::PointerClick), 1);

    let click = events
        .events()
        .into_iter()
        .find(|e| e.kind == EventKind::PointerClick)
        .unwrap();
    assert_eq!(click.emitter, Emitter::Pointer(pointer));
    assert!(click.hit.is_some());

    let pulses = t.right.pulses();
    assert_eq!(pulses.len(), 1);
    assert_eq!((pulses[0].amplitude, pulses[0].duration), (0.3, 0.1));

    t.right.set_button(Button::Trigger, false);
    t.tick();
    t.right.set_button(Button::Trigger, true);
    t.tick();
    assert_eq!(events.count(EventKind::PointerClick), 2);
}

#[test]
fn test_click_on_miss_is_not_reported() {
    let mut t = TestWorldBuilder::new().build();
    let pointer = t.world.add_pointer(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.pointer_listeners(pointer).unwrap());

    t.right.set_trigger(1.0);
    t.right.set_button(Button::Trigger, true);
    t.tick_n(3);

    assert_eq!(events.count(EventKind::PointerClick), 0);
    assert_eq!(events.count(EventKind::PointerMiss), 3);
}

#[test]
fn test_deactivation_ends_hover_without_miss() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);
    let target_events = Recorder::new();
    target_events.attach(t.world.target_listeners(target).unwrap());
    let pointer_events = Recorder::new();
    pointer_events.attach(t.world.pointer_listeners(pointer).unwrap());

    t.right.set_trigger(0.5);
    t.tick();
    t.right.set_trigger(0.0);
    t.tick_n(3);

    assert!(!t.world.pointer(pointer).unwrap().is_active());
    assert_eq!(
        target_events.kinds(),
        vec![EventKind::HoverStart, EventKind::HoverEnd]
    );
    assert_eq!(pointer_events.count(EventKind::PointerMiss), 0);
    assert_eq!(pointer_events.count(EventKind::PointerHit), 1);
}

#[test]
fn test_activation_threshold_is_strict() {
    let mut t = TestWorldBuilder::new().build();
    t.world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);

    t.right.set_trigger(0.1);
    t.tick();
    assert!(!t.world.pointer(pointer).unwrap().is_active());

    t.right.set_trigger(0.11);
    t.tick();
    assert!(t.world.pointer(pointer).unwrap().is_active());
}

#[test]
fn test_scenery_occludes_without_hover() {
    let mut t = TestWorldBuilder::new().build();
    let behind = t
        .world
        .add_target(TargetDesc::new("Behind").at(at(0.0, 0.0, 4.0)))
        .unwrap();
    let wall = t.world.add_static_collider(Vec3::new(0.0, 0.0, 2.0), 0.5, 0);
    let pointer = t.world.add_pointer(HandSide::Right);
    let target_events = Recorder::new();
    target_events.attach(t.world.target_listeners(behind).unwrap());
    let pointer_events = Recorder::new();
    pointer_events.attach(t.world.pointer_listeners(pointer).unwrap());

    t.right.set_trigger(1.0);
    t.tick();

    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(wall));
    assert_eq!(pointer_events.count(EventKind::PointerHit), 1);
    assert!(target_events.kinds().is_empty());

    // Remove the wall and the target behind it becomes visible
    assert!(t.world.remove_static_collider(wall));
    t.tick();
    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(behind));
    assert_eq!(target_events.kinds(), vec![EventKind::HoverStart]);
}

#[test]
fn test_button_hover_flag_follows_pointer() {
    let mut t = TestWorldBuilder::new().build();
    let button = t.world.add_button("Call", at(0.0, 0.0, 2.0));
    t.world.add_pointer(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.button_listeners(button).unwrap());

    t.right.set_trigger(1.0);
    t.tick();
    assert!(t.world.button(button).unwrap().is_hovered());

    t.right.set_pose(at(3.0, 0.0, 0.0));
    t.tick();
    assert!(!t.world.button(button).unwrap().is_hovered());
    assert_eq!(events.kinds(), vec![EventKind::HoverStart, EventKind::HoverEnd]);
    // Pointing is not pressing
    assert!(!t.world.button(button).unwrap().is_pressed());
}

#[test]
fn test_forced_activation_overrides_trigger() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);

    t.world.set_pointer_active(pointer, Some(true)).unwrap();
    t.tick();
    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(target));

    t.right.set_trigger(1.0);
    t.world.set_pointer_active(pointer, Some(false)).unwrap();
    t.tick();
    assert!(!t.world.pointer(pointer).unwrap().is_hovering());

    t.world.set_pointer_active(pointer, None).unwrap();
    t.tick();
    assert!(t.world.pointer(pointer).unwrap().is_hovering());
}

#[test]
fn test_max_distance_limits_ray() {
    let mut t = TestWorldBuilder::new().build();
    t.world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);
    t.world.set_pointer_max_distance(pointer, 1.0).unwrap();

    t.right.set_trigger(1.0);
    t.tick();
    let agent = t.world.pointer(pointer).unwrap();
    assert!(!agent.is_hovering());
    assert!((agent.ray_end() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
}

#[test]
fn test_button_activation_and_layer_mask() {
    let config = PointerConfig {
        activation: PointerActivation::Button {
            button: Button::Primary,
        },
        layers: grabkit::types::LayerMask::layer(3),
        ..PointerConfig::default()
    };
    let mut t = TestWorldBuilder::new().build();
    t.world
        .add_target(TargetDesc::new("Near").at(at(0.0, 0.0, 1.0)).layer(1))
        .unwrap();
    let far = t
        .world
        .add_target(TargetDesc::new("Far").at(at(0.0, 0.0, 3.0)).layer(3))
        .unwrap();
    let pointer = t.world.add_pointer_with(HandSide::Right, config).unwrap();

    t.right.set_trigger(1.0);
    t.tick();
    assert!(!t.world.pointer(pointer).unwrap().is_active());

    t.right.set_button(Button::Primary, true);
    t.tick();
    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(far));
}

#[test]
fn test_pointer_never_changes_ownership() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    t.world.add_pointer(HandSide::Right);

    t.right.set_trigger(1.0);
    t.right.set_button(Button::Trigger, true);
    t.tick_n(5);

    assert!(t.world.owner_of(target).unwrap().is_unowned());
}

//! Registration, removal, enable/disable and the tick clock.

use crate::helpers::{Recorder, TestWorldBuilder, approx_eq, at};
use glam::Vec3;
use grabkit::config::SocketConfig;
use grabkit::constants::MAX_TICK_DT;
use grabkit::error::InteractionError;
use grabkit::events::EventKind;
use grabkit::target::TargetDesc;
use grabkit::types::{HandId, HandSide, Ownership, PointerId};

#[test]
fn test_remove_held_target_clears_hand() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 0.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.target_listeners(target).unwrap());

    t.right.set_grip(1.0);
    t.tick();
    events.clear();

    let removed = t.world.remove_target(target).unwrap();
    assert_eq!(removed.name(), "Cube");
    assert!(t.world.hand(hand).unwrap().state().is_idle());
    assert!(t.world.target(target).is_none());
    assert!(events.kinds().is_empty());

    t.tick_n(3);
    assert!(matches!(
        t.world.remove_target(target),
        Err(InteractionError::UnknownTarget(_))
    ));
}

#[test]
fn test_remove_socketed_target_empties_socket() {
    let mut t = TestWorldBuilder::new().build();
    let socket = t
        .world
        .add_socket("Slot", at(0.0, 0.0, 0.0), SocketConfig::default()).unwrap();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").socketed_in(socket))
        .unwrap();

    t.world.remove_target(target).unwrap();
    assert!(!t.world.socket(socket).unwrap().is_occupied());
}

#[test]
fn test_disabling_hand_releases() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 0.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);

    t.right.set_grip(1.0);
    t.tick();
    t.world.set_hand_enabled(hand, false).unwrap();
    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));

    // Re-enabled while still squeezing: waits for the hand to open
    t.world.set_hand_enabled(hand, true).unwrap();
    t.tick_n(3);
    assert!(!t.world.hand(hand).unwrap().is_holding());
    t.right.set_grip(0.0);
    t.tick();
    t.right.set_grip(1.0);
    t.tick();
    assert!(t.world.hand(hand).unwrap().is_holding());
}

#[test]
fn test_remove_hand_releases() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 0.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.target_listeners(target).unwrap());

    t.right.set_grip(1.0);
    t.tick();
    t.world.remove_hand(hand).unwrap();

    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));
    assert_eq!(events.count(EventKind::Released), 1);
    assert!(t.world.hand(hand).is_none());
    assert!(matches!(
        t.world.force_release(hand),
        Err(InteractionError::UnknownHand(_))
    ));
}

#[test]
fn test_remove_socket_ejects_occupant() {
    let mut t = TestWorldBuilder::new().build();
    let socket = t
        .world
        .add_socket("Slot", at(0.0, 0.0, 0.0), SocketConfig::default()).unwrap();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").socketed_in(socket))
        .unwrap();

    let removed = t.world.remove_socket(socket).unwrap();
    assert_eq!(removed.name(), "Slot");
    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));
    assert!(t.world.socket(socket).is_none());
}

#[test]
fn test_set_target_pose_ignored_while_owned() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 0.0, 0.0)))
        .unwrap();
    t.world.add_hand(HandSide::Right);

    t.world.set_target_pose(target, at(0.02, 0.0, 0.0)).unwrap();
    assert!(approx_eq(
        t.world.target(target).unwrap().pose().position,
        Vec3::new(0.02, 0.0, 0.0)
    ));

    t.right.set_grip(1.0);
    t.tick();
    t.world.set_target_pose(target, at(9.0, 9.0, 9.0)).unwrap();
    assert!(approx_eq(
        t.world.target(target).unwrap().pose().position,
        Vec3::ZERO
    ));
}

#[test]
fn test_dt_is_clamped() {
    let mut t = TestWorldBuilder::new().build();

    t.world.tick(f32::NAN);
    t.world.tick(-1.0);
    assert_eq!(t.world.elapsed(), 0.0);

    t.world.tick(10.0);
    assert!((t.world.elapsed() - MAX_TICK_DT as f64).abs() < 1e-9);
    assert_eq!(t.world.monitor().total_ticks(), 3);
}

#[test]
fn test_phases_are_recorded() {
    let mut t = TestWorldBuilder::new().build();
    t.tick_n(4);

    for phase in ["hands", "sockets", "pointers", "buttons"] {
        let stats = t.world.monitor().phase_stats(phase).unwrap();
        assert_eq!(stats.count(), 4, "phase {}", phase);
    }
}

#[test]
fn test_without_spatial_index_nothing_is_found() {
    let mut t = TestWorldBuilder::new().without_spatial_index().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 0.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);
    let pointer = t.world.add_pointer(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.pointer_listeners(pointer).unwrap());

    t.right.set_grip(1.0);
    t.right.set_trigger(1.0);
    t.tick_n(3);

    assert!(t.world.hand(hand).unwrap().state().is_idle());
    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));
    assert_eq!(events.count(EventKind::PointerMiss), 3);
}

#[test]
fn test_unknown_ids_are_errors() {
    let mut t = TestWorldBuilder::new().build();

    assert!(matches!(
        t.world.set_hand_enabled(HandId(9), false),
        Err(InteractionError::UnknownHand(_))
    ));
    assert!(matches!(
        t.world.set_pointer_active(PointerId(9), Some(true)),
        Err(InteractionError::UnknownPointer(_))
    ));
    assert!(matches!(
        t.world.remove_pointer(PointerId(9)),
        Err(InteractionError::UnknownPointer(_))
    ));
    assert!(t.world.remove_hand(HandId(9)).is_err());
    assert!(t.world.target_listeners(grabkit::types::EntityId(9)).is_err());
}

#[test]
fn test_remove_pointer_ends_hover() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Sign").at(at(0.0, 0.0, 2.0)))
        .unwrap();
    let pointer = t.world.add_pointer(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.target_listeners(target).unwrap());

    t.right.set_trigger(1.0);
    t.tick();
    t.world.remove_pointer(pointer).unwrap();

    assert_eq!(events.kinds(), vec![EventKind::HoverStart, EventKind::HoverEnd]);
    assert!(t.world.pointer(pointer).is_none());
}

#[test]
fn test_remove_button_unregisters_collider() {
    let mut t = TestWorldBuilder::new().build();
    let button = t.world.add_button("Call", at(0.0, 0.0, 2.0));
    let pointer = t.world.add_pointer(HandSide::Right);

    t.right.set_trigger(1.0);
    t.tick();
    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(button));

    t.world.remove_button(button).unwrap();
    t.tick();
    assert!(!t.world.pointer(pointer).unwrap().is_hovering());
    assert!(t.world.button(button).is_none());
}

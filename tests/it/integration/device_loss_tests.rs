//! Controller disconnects: release within one tick, reacquire, re-arm.

use crate::helpers::{Recorder, TestWorldBuilder, at};
use grabkit::config::SocketConfig;
use grabkit::events::EventKind;
use grabkit::target::TargetDesc;
use grabkit::types::{Actor, HandSide, Ownership};

#[test]
fn test_loss_releases_within_one_tick() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 1.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);
    let events = Recorder::new();
    events.attach(t.world.target_listeners(target).unwrap());

    t.right.set_pose(at(0.0, 1.0, 0.0));
    t.right.set_grip(1.0);
    t.tick();
    assert_eq!(t.world.owner_of(target), Some(Ownership::HeldBy(hand)));

    t.right.set_valid(false);
    t.tick();

    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));
    let hand_ref = t.world.hand(hand).unwrap();
    assert!(!hand_ref.has_device());
    assert!(hand_ref.state().is_idle());

    let released: Vec<_> = events
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Released)
        .collect();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].actor, Some(Actor::Hand(hand)));
}

#[test]
fn test_reacquired_device_must_reopen_before_grabbing() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 1.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);

    t.right.set_pose(at(0.0, 1.0, 0.0));
    t.right.set_grip(1.0);
    t.tick();
    t.right.set_valid(false);
    t.tick_n(3);
    assert!(!t.world.hand(hand).unwrap().has_device());

    // Comes back with the grip still squeezed
    t.right.set_valid(true);
    t.tick();
    let agent = t.world.hand(hand).unwrap();
    assert!(agent.has_device());
    assert_eq!(agent.device().map(|d| d.name()), Some("right"));
    t.tick_n(5);
    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));

    t.right.set_grip(0.0);
    t.tick();
    t.right.set_grip(1.0);
    t.tick();
    assert_eq!(t.world.owner_of(target), Some(Ownership::HeldBy(hand)));
}

#[test]
fn test_loss_over_socket_lets_socket_claim() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 1.0, 0.0)))
        .unwrap();
    let socket = t
        .world
        .add_socket("Slot", at(0.3, 1.0, 0.0), SocketConfig::default()).unwrap();
    t.world.add_hand(HandSide::Right);

    t.right.set_pose(at(0.0, 1.0, 0.0));
    t.right.set_grip(1.0);
    t.tick();
    t.right.set_pose(at(0.3, 1.0, 0.0));
    t.tick();
    assert_eq!(t.world.socket(socket).unwrap().hovering(), Some(target));

    t.right.set_valid(false);
    t.tick();
    assert_eq!(t.world.owner_of(target), Some(Ownership::Socketed(socket)));
}

#[test]
fn test_no_provider_is_harmless() {
    let mut t = TestWorldBuilder::new().without_devices().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Cube").at(at(0.0, 0.0, 0.0)))
        .unwrap();
    let hand = t.world.add_hand(HandSide::Right);
    let pointer = t.world.add_pointer(HandSide::Right);

    t.tick_n(10);

    assert!(!t.world.hand(hand).unwrap().has_device());
    assert!(!t.world.pointer(pointer).unwrap().has_device());
    assert_eq!(t.world.owner_of(target), Some(Ownership::Unowned));
    assert_eq!(t.world.monitor().total_ticks(), 10);
}

#[test]
fn test_pointer_loss_ends_hover() {
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
    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(target));

    t.right.set_valid(false);
    t.tick();
    assert!(!t.world.pointer(pointer).unwrap().is_hovering());
    assert_eq!(events.kinds(), vec![EventKind::HoverStart, EventKind::HoverEnd]);

    t.right.set_valid(true);
    t.tick();
    assert_eq!(t.world.pointer(pointer).unwrap().hover_entity(), Some(target));
}

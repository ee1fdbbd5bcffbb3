//! Snapshot tests using the insta crate.
//!
//! Event sequences and wire shapes are captured as inline JSON snapshots.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use crate::helpers::{Recorder, TestWorldBuilder, at};
use grabkit::config::SocketConfig;
use grabkit::events::{Emitter, Event, EventKind};
use grabkit::target::TargetDesc;
use grabkit::types::{Actor, EntityId, HandId, HandSide, Ownership, SocketId};

#[test]
fn snapshot_ownership_held_by() {
    insta::assert_json_snapshot!(Ownership::HeldBy(HandId(3)), @r###"
    {
      "kind": "held_by",
      "by": 3
    }
    "###);
}

#[test]
fn snapshot_placed_event() {
    let event = Event::new(EventKind::Placed, Emitter::Socket(SocketId(1)))
        .by(Actor::Socket(SocketId(1)))
        .with_object(EntityId(2));
    insta::assert_json_snapshot!(event, @r###"
    {
      "kind": "placed",
      "emitter": {
        "kind": "socket",
        "id": 1
      },
      "actor": {
        "kind": "socket",
        "id": 1
      },
      "object": 2
    }
    "###);
}

#[test]
fn snapshot_grab_carry_place_sequence() {
    let mut t = TestWorldBuilder::new().build();
    let target = t
        .world
        .add_target(TargetDesc::new("Battery").tag("battery").at(at(0.0, 1.0, 0.0)))
        .unwrap();
    let socket = t.world.add_socket("Slot", at(0.3, 1.0, 0.0), SocketConfig::default()).unwrap();
    t.world.add_hand(HandSide::Right);

    let target_events = Recorder::new();
    target_events.attach(t.world.target_listeners(target).unwrap());
    let socket_events = Recorder::new();
    socket_events.attach(t.world.socket_listeners(socket).unwrap());

    t.right.set_pose(at(0.0, 1.0, 0.0));
    t.right.set_grip(1.0);
    t.tick();

    t.right.set_pose(at(0.3, 1.0, 0.0));
    t.tick();

    t.right.set_grip(0.0);
    t.tick_n(60);

    insta::assert_json_snapshot!(target_events.kinds(), @r###"
    [
      "hover_start",
      "hover_end",
      "grabbed",
      "released"
    ]
    "###);
    insta::assert_json_snapshot!(socket_events.kinds(), @r###"
    [
      "placed",
      "placed_matching"
    ]
    "###);
}

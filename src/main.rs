//! Headless interaction simulator.
//!
//! Runs a scripted scene through the interaction world: grab an object,
//! carry it to a socket, let go so the socket snaps it in, press a button
//! and click on a wall with the pointer.
//!
//! ```text
//! RUST_LOG=grabkit=debug grabkit-sim [config.json]
//! ```

use anyhow::{Context, Result};
use glam::Vec3;
use grabkit::config::{AcceptanceFilter, InteractionConfig, SocketConfig, default_config_path};
use grabkit::device::{Button, DevicePool, ScriptedDevice};
use grabkit::events::EventKind;
use grabkit::target::TargetDesc;
use grabkit::types::{HandSide, Pose};
use grabkit::world::InteractionWorld;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DT: f32 = 1.0 / 90.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grabkit=info")),
        )
        .init();

    let config = load_config()?;
    let controller = ScriptedDevice::new("sim-right");
    let pool = DevicePool::new().with_device(HandSide::Right, controller.handle());
    let mut world = InteractionWorld::new(config)
        .context("Invalid interaction config")?
        .with_device_provider(pool);

    let crystal = world
        .add_target(
            TargetDesc::new("Crystal")
                .tag("key")
                .at_position(Vec3::new(0.0, 1.0, 0.4)),
        )
        .context("Failed to add crystal")?;
    let altar = world.add_socket(
        "Altar",
        Pose::from_position(Vec3::new(0.6, 1.0, 0.4)),
        SocketConfig {
            filter: AcceptanceFilter::any().with_tag("key"),
            lock_on_snap: true,
            ..SocketConfig::default()
        },
    )
    .context("Failed to add altar")?;
    let bell = world.add_button("Bell", Pose::from_position(Vec3::new(-0.4, 1.0, 0.4)));
    world.add_static_collider(Vec3::new(0.0, 1.5, 3.0), 0.5, 0);
    let hand = world.add_hand(HandSide::Right);
    let pointer = world.add_pointer(HandSide::Right);

    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    for kind in [EventKind::Placed, EventKind::PlacedMatching] {
        let log = log.clone();
        world
            .socket_listeners(altar)?
            .subscribe(kind, move |event| log.borrow_mut().push(format!("{:?}", event.kind)));
    }
    for kind in [EventKind::Grabbed, EventKind::Released] {
        let log = log.clone();
        world
            .target_listeners(crystal)?
            .subscribe(kind, move |event| log.borrow_mut().push(format!("{:?}", event.kind)));
    }
    {
        let log = log.clone();
        world.button_listeners(bell)?.subscribe(EventKind::ButtonPressed, move |event| {
            log.borrow_mut().push(format!("{:?}", event.kind))
        });
    }
    {
        let log = log.clone();
        world.pointer_listeners(pointer)?.subscribe(EventKind::PointerClick, move |event| {
            log.borrow_mut().push(format!("{:?}", event.kind))
        });
    }

    // Reach for the crystal and close the hand
    controller.set_pose(Pose::from_position(Vec3::new(0.0, 1.0, 0.4)));
    for step in 0..=10 {
        controller.set_grip(step as f32 / 10.0);
        world.tick(DT);
    }
    info!(held = ?world.hand(hand).and_then(|h| h.held_target()), "Hand closed");

    // Carry it over the altar
    let from = Vec3::new(0.0, 1.0, 0.4);
    let to = Vec3::new(0.62, 1.03, 0.4);
    for step in 1..=45 {
        let t = step as f32 / 45.0;
        controller.set_pose(Pose::from_position(from.lerp(to, t)));
        world.tick(DT);
    }

    // Let go and give the socket time to settle
    controller.set_grip(0.0);
    for _ in 0..90 {
        world.tick(DT);
    }
    info!(
        ownership = ?world.owner_of(crystal),
        socket = ?world.socket(altar).map(|s| s.state()),
        "After release"
    );

    // Tap the bell
    controller.set_pose(Pose::from_position(Vec3::new(-0.4, 1.0, 0.4)));
    for _ in 0..5 {
        world.tick(DT);
    }
    controller.set_pose(Pose::from_position(Vec3::new(-0.4, 1.5, 0.4)));
    for _ in 0..30 {
        world.tick(DT);
    }

    // Point at the wall and click
    controller.set_pose(Pose::from_position(Vec3::new(0.0, 1.5, 0.0)));
    controller.set_trigger(0.5);
    world.tick(DT);
    controller.set_button(Button::Trigger, true);
    world.tick(DT);
    controller.set_button(Button::Trigger, false);
    controller.set_trigger(0.0);
    world.tick(DT);

    info!(events = ?log.borrow(), "Scenario finished");
    info!(
        ticks = world.monitor().total_ticks(),
        avg_tick_ms = format!("{:.3}", world.monitor().average_tick_time()),
        max_tick_ms = format!("{:.3}", world.monitor().max_tick_time()),
        "Tick timing"
    );
    world.monitor().log_summary();
    Ok(())
}

fn load_config() -> Result<InteractionConfig> {
    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => match default_config_path() {
            Some(path) => path,
            None => return Ok(InteractionConfig::default()),
        },
    };
    InteractionConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

//! The interaction world - owner of every entity and driver of the tick.
//!
//! ## Architecture
//!
//! `InteractionWorld` is an explicit context object. It owns the targets,
//! hands, sockets, pointers and buttons, the spatial index, the device
//! provider and the clock. Nothing is global.
//!
//! One call to [`InteractionWorld::tick`] runs the phases in a fixed order:
//!
//! 1. hands - device upkeep, hover, grab/release, follow
//! 2. sockets - candidate scan, snap convergence
//! 3. pointers - activation, raycast, hover/hit/click/miss
//! 4. buttons - touch detection, travel animation
//!
//! ## Modules
//!
//! - `hands` - Hand phase and the grab/release protocol
//! - `sockets` - Socket phase, claiming, manual placement and removal
//! - `pointers` - Pointer phase and hover fan-out
//! - `buttons` - Button phase and explicit press/release/toggle

mod buttons;
mod hands;
mod pointers;
mod sockets;

use crate::button::TouchButton;
use crate::config::{ButtonConfig, HandConfig, InteractionConfig, PointerConfig, SocketConfig};
use crate::constants::MAX_TICK_DT;
use crate::device::DeviceProvider;
use crate::error::{ConfigResult, InteractionError, InteractionResult};
use crate::events::Listeners;
use crate::hand::HandAgent;
use crate::perf::{TickMonitor, measure};
use crate::pointer::PointerAgent;
use crate::profile_scope;
use crate::socket::Socket;
use crate::spatial_index::{SpatialIndex, SpatialQuery};
use crate::target::{InteractionTarget, TargetDesc};
use crate::types::{Actor, EntityId, HandId, HandSide, Ownership, PointerId, Pose, SocketId};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What an entity registered with the spatial index is. Decides whether a
/// pointer may send it hover notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Target,
    Button,
    /// Plain collider; blocks rays, receives nothing
    Scenery,
}

impl EntityKind {
    fn is_hoverable(self) -> bool {
        matches!(self, EntityKind::Target | EntityKind::Button)
    }
}

pub struct InteractionWorld {
    config: InteractionConfig,
    targets: BTreeMap<EntityId, InteractionTarget>,
    buttons: BTreeMap<EntityId, TouchButton>,
    kinds: BTreeMap<EntityId, EntityKind>,
    hands: BTreeMap<HandId, HandAgent>,
    sockets: BTreeMap<SocketId, Socket>,
    pointers: BTreeMap<PointerId, PointerAgent>,
    spatial: Option<Box<dyn SpatialQuery>>,
    devices: Option<Box<dyn DeviceProvider>>,
    next_entity: u64,
    next_hand: u64,
    next_socket: u64,
    next_pointer: u64,
    /// Seconds of simulated time
    elapsed: f64,
    monitor: TickMonitor,
}

impl InteractionWorld {
    /// A world with the built-in R-tree index and no device provider.
    /// Fails if `config` does not validate.
    pub fn new(config: InteractionConfig) -> ConfigResult<Self> {
        config.validate()?;
        let monitor = TickMonitor::new(config.perf.slow_tick_ms);
        Ok(Self {
            config,
            targets: BTreeMap::new(),
            buttons: BTreeMap::new(),
            kinds: BTreeMap::new(),
            hands: BTreeMap::new(),
            sockets: BTreeMap::new(),
            pointers: BTreeMap::new(),
            spatial: Some(Box::new(SpatialIndex::new())),
            devices: None,
            next_entity: 1,
            next_hand: 1,
            next_socket: 1,
            next_pointer: 1,
            elapsed: 0.0,
            monitor,
        })
    }

    pub fn with_device_provider(mut self, provider: impl DeviceProvider + 'static) -> Self {
        self.devices = Some(Box::new(provider));
        self
    }

    /// Replace the built-in index with an engine adapter.
    pub fn with_spatial_query(mut self, spatial: impl SpatialQuery + 'static) -> Self {
        self.spatial = Some(Box::new(spatial));
        self
    }

    /// Run without collision queries. Hover search, socket scans and
    /// raycasts are skipped.
    pub fn without_spatial_index(mut self) -> Self {
        self.spatial = None;
        self
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Simulated seconds since the world was created.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn monitor(&self) -> &TickMonitor {
        &self.monitor
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the world by `dt` seconds.
    ///
    /// Never fails. `dt` is clamped to `[0, MAX_TICK_DT]`.
    pub fn tick(&mut self, dt: f32) {
        profile_scope!("world::tick");
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_TICK_DT)
        } else {
            0.0
        };

        self.monitor.begin_tick();
        self.elapsed += dt as f64;

        let ((), ms) = measure(|| self.update_hands());
        self.monitor.record_phase("hands", ms);

        let ((), ms) = measure(|| self.update_sockets(dt));
        self.monitor.record_phase("sockets", ms);

        let ((), ms) = measure(|| self.update_pointers());
        self.monitor.record_phase("pointers", ms);

        let ((), ms) = measure(|| self.update_buttons(dt));
        self.monitor.record_phase("buttons", ms);

        self.monitor.end_tick();
    }

    // ========================================================================
    // Targets and scenery
    // ========================================================================

    /// Register a target. A target described as `socketed_in` a socket starts
    /// settled there with no animation.
    pub fn add_target(&mut self, desc: TargetDesc) -> InteractionResult<EntityId> {
        if let Some(socket_id) = desc.socketed_in {
            let socket = self
                .sockets
                .get(&socket_id)
                .ok_or(InteractionError::UnknownSocket(socket_id))?;
            if !socket.is_enabled() {
                return Err(InteractionError::SocketDisabled(socket_id));
            }
            if socket.is_occupied() {
                return Err(InteractionError::SocketOccupied(socket_id));
            }
        }

        let id = self.alloc_entity();
        let preplaced = desc.socketed_in;
        let target = InteractionTarget::from_desc(id, desc);
        debug!(target_id = %id, name = target.name(), "Target registered");

        self.kinds.insert(id, EntityKind::Target);
        self.targets.insert(id, target);
        self.sync_target_collider(id);

        if let Some(socket_id) = preplaced {
            self.place_settled(socket_id, id);
        }
        Ok(id)
    }

    /// Unregister a target. Whoever owned or tracked it forgets it without
    /// notifications.
    pub fn remove_target(&mut self, id: EntityId) -> InteractionResult<InteractionTarget> {
        let target = self
            .targets
            .remove(&id)
            .ok_or(InteractionError::UnknownTarget(id))?;
        self.kinds.remove(&id);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.remove(id);
        }

        for hand in self.hands.values_mut() {
            if hand.held_target() == Some(id) || hand.hover_target() == Some(id) {
                hand.state.reset();
            }
        }
        for socket in self.sockets.values_mut() {
            if socket.occupant() == Some(id) || socket.hovering() == Some(id) {
                socket.state = Default::default();
            }
        }
        for pointer in self.pointers.values_mut() {
            if pointer.hover_entity() == Some(id) {
                pointer.current_hit = None;
            }
        }

        debug!(target_id = %id, "Target removed");
        Ok(target)
    }

    /// Add a collider that blocks rays but never receives notifications.
    pub fn add_static_collider(&mut self, center: glam::Vec3, radius: f32, layer: u8) -> EntityId {
        let id = self.alloc_entity();
        self.kinds.insert(id, EntityKind::Scenery);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.upsert_sphere(id, center, radius, layer);
        }
        id
    }

    pub fn remove_static_collider(&mut self, id: EntityId) -> bool {
        if self.kinds.get(&id) != Some(&EntityKind::Scenery) {
            return false;
        }
        self.kinds.remove(&id);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.remove(id);
        }
        true
    }

    /// Teleport an unowned target. Held and socketed targets are posed by
    /// their owner.
    pub fn set_target_pose(&mut self, id: EntityId, pose: Pose) -> InteractionResult<()> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(InteractionError::UnknownTarget(id))?;
        if !target.ownership().is_unowned() {
            debug!(target_id = %id, ownership = ?target.ownership(), "Ignoring pose write on owned target");
            return Ok(());
        }
        target.set_pose(pose);
        self.sync_target_collider(id);
        Ok(())
    }

    pub fn set_grabbable(&mut self, id: EntityId, grabbable: bool) -> InteractionResult<()> {
        let target = self
            .targets
            .get_mut(&id)
            .ok_or(InteractionError::UnknownTarget(id))?;
        target.set_grabbable(grabbable);
        Ok(())
    }

    pub fn target(&self, id: EntityId) -> Option<&InteractionTarget> {
        self.targets.get(&id)
    }

    pub fn targets(&self) -> impl Iterator<Item = &InteractionTarget> {
        self.targets.values()
    }

    pub fn target_listeners(&mut self, id: EntityId) -> InteractionResult<&mut Listeners> {
        self.targets
            .get_mut(&id)
            .map(InteractionTarget::listeners_mut)
            .ok_or(InteractionError::UnknownTarget(id))
    }

    // ========================================================================
    // Hands
    // ========================================================================

    pub fn add_hand(&mut self, side: HandSide) -> HandId {
        let config = self.config.hand.clone();
        self.insert_hand(side, config)
    }

    /// Add a hand with its own thresholds.
    pub fn add_hand_with(
        &mut self,
        side: HandSide,
        config: HandConfig,
    ) -> InteractionResult<HandId> {
        config.validate()?;
        Ok(self.insert_hand(side, config))
    }

    fn insert_hand(&mut self, side: HandSide, config: HandConfig) -> HandId {
        let id = HandId(self.next_hand);
        self.next_hand += 1;
        self.hands.insert(id, HandAgent::new(id, side, config));
        info!(hand = %id, side = %side, "Hand added");
        id
    }

    /// Remove a hand, releasing whatever it holds first.
    pub fn remove_hand(&mut self, id: HandId) -> InteractionResult<HandAgent> {
        if !self.hands.contains_key(&id) {
            return Err(InteractionError::UnknownHand(id));
        }
        self.release_from_hand(id, true);
        self.end_hand_hover(id);
        self.hands
            .remove(&id)
            .ok_or(InteractionError::UnknownHand(id))
    }

    pub fn set_hand_enabled(&mut self, id: HandId, enabled: bool) -> InteractionResult<()> {
        let hand = self
            .hands
            .get_mut(&id)
            .ok_or(InteractionError::UnknownHand(id))?;
        if hand.is_enabled() == enabled {
            return Ok(());
        }
        hand.set_enabled(enabled);
        if !enabled {
            self.release_from_hand(id, true);
            self.end_hand_hover(id);
            if let Some(hand) = self.hands.get_mut(&id) {
                hand.disarm();
            }
        }
        debug!(hand = %id, enabled, "Hand enabled changed");
        Ok(())
    }

    /// Drop the held target as if the input had been released. The hand
    /// will not grab again until its input falls to the release threshold.
    pub fn force_release(&mut self, id: HandId) -> InteractionResult<Option<EntityId>> {
        if !self.hands.contains_key(&id) {
            return Err(InteractionError::UnknownHand(id));
        }
        let released = self.release_from_hand(id, true);
        if let Some(hand) = self.hands.get_mut(&id) {
            hand.disarm();
        }
        Ok(released)
    }

    pub fn hand(&self, id: HandId) -> Option<&HandAgent> {
        self.hands.get(&id)
    }

    pub fn hands(&self) -> impl Iterator<Item = &HandAgent> {
        self.hands.values()
    }

    // ========================================================================
    // Sockets
    // ========================================================================

    pub fn add_socket(
        &mut self,
        name: impl Into<String>,
        pose: Pose,
        config: SocketConfig,
    ) -> InteractionResult<SocketId> {
        config.validate()?;
        Ok(self.insert_socket(name, pose, config))
    }

    /// Add a socket with the world's default socket config.
    pub fn add_default_socket(&mut self, name: impl Into<String>, pose: Pose) -> SocketId {
        let config = self.config.socket.clone();
        self.insert_socket(name, pose, config)
    }

    fn insert_socket(&mut self, name: impl Into<String>, pose: Pose, config: SocketConfig) -> SocketId {
        let id = SocketId(self.next_socket);
        self.next_socket += 1;
        let socket = Socket::new(id, name.into(), pose, config);
        info!(socket = %id, name = socket.name(), "Socket added");
        self.sockets.insert(id, socket);
        id
    }

    /// Remove a socket, ejecting its occupant first.
    pub fn remove_socket(&mut self, id: SocketId) -> InteractionResult<Socket> {
        if !self.sockets.contains_key(&id) {
            return Err(InteractionError::UnknownSocket(id));
        }
        self.release_from_socket(id, Actor::Script);
        self.sockets
            .remove(&id)
            .ok_or(InteractionError::UnknownSocket(id))
    }

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.sockets.get(&id)
    }

    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.sockets.values()
    }

    pub fn socket_listeners(&mut self, id: SocketId) -> InteractionResult<&mut Listeners> {
        self.sockets
            .get_mut(&id)
            .map(Socket::listeners_mut)
            .ok_or(InteractionError::UnknownSocket(id))
    }

    // ========================================================================
    // Pointers
    // ========================================================================

    pub fn add_pointer(&mut self, side: HandSide) -> PointerId {
        let config = self.config.pointer.clone();
        self.insert_pointer(side, config)
    }

    pub fn add_pointer_with(
        &mut self,
        side: HandSide,
        config: PointerConfig,
    ) -> InteractionResult<PointerId> {
        config.validate()?;
        Ok(self.insert_pointer(side, config))
    }

    fn insert_pointer(&mut self, side: HandSide, config: PointerConfig) -> PointerId {
        let id = PointerId(self.next_pointer);
        self.next_pointer += 1;
        self.pointers.insert(id, PointerAgent::new(id, side, config));
        info!(pointer = %id, side = %side, "Pointer added");
        id
    }

    pub fn remove_pointer(&mut self, id: PointerId) -> InteractionResult<PointerAgent> {
        if !self.pointers.contains_key(&id) {
            return Err(InteractionError::UnknownPointer(id));
        }
        self.end_pointer_hover(id);
        self.pointers
            .remove(&id)
            .ok_or(InteractionError::UnknownPointer(id))
    }

    /// Force the pointer on or off; `None` restores its activation rule.
    pub fn set_pointer_active(&mut self, id: PointerId, active: Option<bool>) -> InteractionResult<()> {
        let pointer = self
            .pointers
            .get_mut(&id)
            .ok_or(InteractionError::UnknownPointer(id))?;
        pointer.force_active(active);
        Ok(())
    }

    pub fn set_pointer_max_distance(&mut self, id: PointerId, distance: f32) -> InteractionResult<()> {
        let pointer = self
            .pointers
            .get_mut(&id)
            .ok_or(InteractionError::UnknownPointer(id))?;
        pointer.set_max_distance(distance);
        Ok(())
    }

    pub fn pointer(&self, id: PointerId) -> Option<&PointerAgent> {
        self.pointers.get(&id)
    }

    pub fn pointer_listeners(&mut self, id: PointerId) -> InteractionResult<&mut Listeners> {
        self.pointers
            .get_mut(&id)
            .map(PointerAgent::listeners_mut)
            .ok_or(InteractionError::UnknownPointer(id))
    }

    // ========================================================================
    // Buttons
    // ========================================================================

    pub fn add_button(&mut self, name: impl Into<String>, pose: Pose) -> EntityId {
        let config = self.config.button.clone();
        self.insert_button(name, pose, config)
    }

    pub fn add_button_with(
        &mut self,
        name: impl Into<String>,
        pose: Pose,
        config: ButtonConfig,
    ) -> InteractionResult<EntityId> {
        config.validate()?;
        Ok(self.insert_button(name, pose, config))
    }

    fn insert_button(&mut self, name: impl Into<String>, pose: Pose, config: ButtonConfig) -> EntityId {
        let id = self.alloc_entity();
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.upsert_sphere(id, pose.position, config.touch_radius, config.layer);
        }
        let button = TouchButton::new(id, name.into(), pose, config);
        debug!(button = %id, name = button.name(), "Button registered");
        self.kinds.insert(id, EntityKind::Button);
        self.buttons.insert(id, button);
        id
    }

    pub fn remove_button(&mut self, id: EntityId) -> InteractionResult<TouchButton> {
        let button = self
            .buttons
            .remove(&id)
            .ok_or(InteractionError::UnknownButton(id))?;
        self.kinds.remove(&id);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.remove(id);
        }
        for pointer in self.pointers.values_mut() {
            if pointer.hover_entity() == Some(id) {
                pointer.current_hit = None;
            }
        }
        Ok(button)
    }

    pub fn button(&self, id: EntityId) -> Option<&TouchButton> {
        self.buttons.get(&id)
    }

    pub fn button_listeners(&mut self, id: EntityId) -> InteractionResult<&mut Listeners> {
        self.buttons
            .get_mut(&id)
            .map(TouchButton::listeners_mut)
            .ok_or(InteractionError::UnknownButton(id))
    }

    // ========================================================================
    // Internals shared by the phases
    // ========================================================================

    fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    /// Push a target's current pose into the spatial index.
    fn sync_target_collider(&mut self, id: EntityId) {
        let (Some(spatial), Some(target)) = (self.spatial.as_mut(), self.targets.get(&id)) else {
            return;
        };
        spatial.upsert_sphere(id, target.pose().position, target.radius(), target.layer());
    }

    fn acquire_device(
        &mut self,
        side: HandSide,
    ) -> Option<std::sync::Arc<dyn crate::device::DeviceHandle>> {
        self.devices.as_mut().and_then(|provider| provider.acquire(side))
    }

    /// Who currently owns `target`, if anyone.
    pub fn owner_of(&self, target: EntityId) -> Option<Ownership> {
        self.targets.get(&target).map(InteractionTarget::ownership)
    }
}

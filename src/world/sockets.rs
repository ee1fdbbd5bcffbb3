//! Socket phase: candidate scan, claiming and snap convergence, plus the
//! explicit place/remove operations.

use super::InteractionWorld;
use crate::constants::SOCKET_HOVER_HAPTIC;
use crate::error::{InteractionError, InteractionResult};
use crate::events::{Event, EventKind};
use crate::profile_scope;
use crate::socket::{SocketState, snap_step};
use crate::types::{Actor, EntityId, Ownership, SocketId};
use tracing::{debug, info, trace};

impl InteractionWorld {
    pub(super) fn update_sockets(&mut self, dt: f32) {
        profile_scope!("world::sockets");
        let ids: Vec<SocketId> = self.sockets.keys().copied().collect();
        for id in ids {
            let Some(socket) = self.sockets.get(&id) else {
                continue;
            };
            if !socket.is_enabled() {
                continue;
            }
            match socket.state {
                SocketState::Empty { hovering } => self.scan_socket(id, hovering),
                SocketState::Snapping { target } => self.advance_snap(id, target, dt),
                SocketState::Occupied { .. } => {}
            }
        }
    }

    /// Track the nearest held target in range that passes the filter.
    fn scan_socket(&mut self, id: SocketId, hovering: Option<EntityId>) {
        let candidate = self.socket_candidate(id);
        if candidate == hovering {
            return;
        }
        if let Some(socket) = self.sockets.get_mut(&id) {
            socket.state = SocketState::Empty { hovering: candidate };
        }

        let Some(new) = candidate else {
            trace!(socket = %id, "Socket lost its candidate");
            return;
        };
        trace!(socket = %id, target_id = %new, "Socket tracking candidate");
        let holder = self.targets.get(&new).and_then(|t| t.ownership().holder());
        if let Some(hand) = holder.and_then(|h| self.hands.get(&h)) {
            let (amplitude, duration) = SOCKET_HOVER_HAPTIC;
            hand.trigger_haptic(amplitude, duration);
        }
    }

    fn socket_candidate(&self, id: SocketId) -> Option<EntityId> {
        let socket = self.sockets.get(&id)?;
        let spatial = self.spatial.as_ref()?;
        let center = socket.pose().position;

        let mut found = spatial.overlap_sphere(center, socket.config.radius, socket.config.layers);
        found.sort_unstable();

        let mut best: Option<(EntityId, f32)> = None;
        for entity in found {
            let Some(target) = self.targets.get(&entity) else {
                continue;
            };
            if !target.ownership().is_held() {
                continue;
            }
            if !socket.config.filter.accepts(target.name(), target.tag()) {
                continue;
            }
            let distance = target.pose().position.distance(center);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((entity, distance));
            }
        }
        best.map(|(entity, _)| entity)
    }

    fn advance_snap(&mut self, id: SocketId, target_id: EntityId, dt: f32) {
        let Some(socket) = self.sockets.get_mut(&id) else {
            return;
        };
        let Some(target) = self.targets.get_mut(&target_id) else {
            socket.state = SocketState::default();
            return;
        };

        let step = snap_step(target.pose(), socket.pose(), socket.config.snap_speed, dt);
        target.set_pose(step.pose);
        if step.converged {
            self.settle(id, target_id);
        }
        self.sync_target_collider(target_id);
    }

    /// Finish a placement: Occupied, optional lock, then notifications.
    fn settle(&mut self, id: SocketId, target_id: EntityId) {
        let (Some(socket), Some(target)) = (self.sockets.get_mut(&id), self.targets.get_mut(&target_id))
        else {
            return;
        };
        socket.state = SocketState::Occupied { target: target_id };
        target.set_pose(socket.pose());
        if socket.config.lock_on_snap {
            target.lock(id);
        }
        let matching = socket.config.filter.accepts(target.name(), target.tag());
        info!(socket = %id, target_id = %target_id, name = target.name(), matching, "Object placed");

        socket.emit(
            Event::new(EventKind::Placed, socket.emitter())
                .by(Actor::Socket(id))
                .with_object(target_id),
        );
        if matching {
            socket.emit(
                Event::new(EventKind::PlacedMatching, socket.emitter())
                    .by(Actor::Socket(id))
                    .with_object(target_id),
            );
        }
    }

    // ========================================================================
    // Claiming
    // ========================================================================

    /// The socket that takes a target the moment its hand lets go.
    ///
    /// Qualifying sockets are enabled, empty, snap on release, track the
    /// target as their candidate and still have it in range. Nearest wins;
    /// the lowest id wins a tie.
    pub(super) fn find_claimant(&self, target_id: EntityId) -> Option<SocketId> {
        let target = self.targets.get(&target_id)?;
        let position = target.pose().position;

        let mut best: Option<(SocketId, f32)> = None;
        for (id, socket) in &self.sockets {
            let qualifies = socket.is_enabled()
                && socket.config.snap_on_release
                && socket.hovering() == Some(target_id)
                && socket.in_range(position, target.radius())
                && socket.config.filter.accepts(target.name(), target.tag());
            if !qualifies {
                continue;
            }
            let distance = socket.pose().position.distance(position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((*id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Take an `Unowned` target and start snapping it. No notifications.
    pub(super) fn claim(&mut self, id: SocketId, target_id: EntityId) -> bool {
        let (Some(socket), Some(target)) = (self.sockets.get_mut(&id), self.targets.get_mut(&target_id))
        else {
            return false;
        };
        if socket.is_occupied() || !target.transfer(Ownership::Socketed(id)) {
            return false;
        }
        target.freeze();
        socket.state = SocketState::Snapping { target: target_id };
        debug!(socket = %id, target_id = %target_id, "Socket claimed target");
        true
    }

    /// Stop every socket from tracking `target_id` as a candidate.
    pub(super) fn forget_socket_hover(&mut self, target_id: EntityId) {
        for socket in self.sockets.values_mut() {
            if socket.hovering() == Some(target_id) {
                socket.state = SocketState::Empty { hovering: None };
            }
        }
    }

    /// Register-time placement: exact pose, no animation.
    pub(super) fn place_settled(&mut self, id: SocketId, target_id: EntityId) {
        if self.claim(id, target_id) {
            self.settle(id, target_id);
            self.sync_target_collider(target_id);
        }
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Empty the socket and hand its occupant back to physics. No
    /// notifications.
    pub(super) fn detach_occupant(&mut self, id: SocketId) -> Option<EntityId> {
        let socket = self.sockets.get_mut(&id)?;
        let target_id = socket.occupant()?;
        socket.state = SocketState::Empty { hovering: None };

        if let Some(target) = self.targets.get_mut(&target_id) {
            target.unfreeze();
            target.unlock(id);
            target.transfer(Ownership::Unowned);
        }
        Some(target_id)
    }

    pub(super) fn emit_removed(&mut self, id: SocketId, target_id: EntityId, actor: Actor) {
        if let Some(socket) = self.sockets.get_mut(&id) {
            info!(socket = %id, target_id = %target_id, "Object removed");
            let event = Event::new(EventKind::Removed, socket.emitter())
                .by(actor)
                .with_object(target_id);
            socket.emit(event);
        }
    }

    pub(super) fn release_from_socket(&mut self, id: SocketId, actor: Actor) -> Option<EntityId> {
        let target_id = self.detach_occupant(id)?;
        self.emit_removed(id, target_id, actor);
        Some(target_id)
    }

    // ========================================================================
    // Explicit operations
    // ========================================================================

    /// Put `target_id` into the socket. A hand holding it lets go first,
    /// and no other socket may intercept that release.
    pub fn place_object(&mut self, id: SocketId, target_id: EntityId) -> InteractionResult<()> {
        let socket = self
            .sockets
            .get(&id)
            .ok_or(InteractionError::UnknownSocket(id))?;
        let target = self
            .targets
            .get(&target_id)
            .ok_or(InteractionError::UnknownTarget(target_id))?;

        if !socket.is_enabled() {
            return Err(InteractionError::SocketDisabled(id));
        }
        if socket.is_occupied() {
            return Err(InteractionError::SocketOccupied(id));
        }
        match target.ownership() {
            Ownership::Socketed(other) => {
                return Err(InteractionError::AlreadySocketed {
                    target: target_id,
                    socket: other,
                });
            }
            Ownership::HeldBy(hand) => {
                self.release_from_hand(hand, false);
                if let Some(agent) = self.hands.get_mut(&hand) {
                    agent.disarm();
                }
            }
            Ownership::Unowned => {}
        }

        self.forget_socket_hover(target_id);
        self.claim(id, target_id);
        Ok(())
    }

    /// Eject the occupant, settled or still snapping.
    pub fn remove_object(&mut self, id: SocketId) -> InteractionResult<EntityId> {
        let socket = self
            .sockets
            .get(&id)
            .ok_or(InteractionError::UnknownSocket(id))?;
        if socket.occupant().is_none() {
            return Err(InteractionError::SocketEmpty(id));
        }
        self.release_from_socket(id, Actor::Script)
            .ok_or(InteractionError::SocketEmpty(id))
    }

    /// Disabling ejects the occupant and drops any tracked candidate.
    pub fn set_socket_enabled(&mut self, id: SocketId, enabled: bool) -> InteractionResult<()> {
        let socket = self
            .sockets
            .get_mut(&id)
            .ok_or(InteractionError::UnknownSocket(id))?;
        if socket.is_enabled() == enabled {
            return Ok(());
        }
        socket.set_enabled(enabled);
        if !enabled {
            if socket.occupant().is_some() {
                self.release_from_socket(id, Actor::Script);
            } else {
                socket.state = SocketState::Empty { hovering: None };
            }
        }
        debug!(socket = %id, enabled, "Socket enabled changed");
        Ok(())
    }

    /// Whether `target_id` is this socket's occupant.
    pub fn socket_contains(&self, id: SocketId, target_id: EntityId) -> bool {
        self.sockets
            .get(&id)
            .is_some_and(|socket| socket.contains(target_id))
    }
}

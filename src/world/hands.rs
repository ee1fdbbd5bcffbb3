//! Hand phase: device upkeep, hover, grab/release and follow.
//!
//! Every ownership change a hand causes goes through `grab` or
//! `release_from_hand`. The release resolves its socket claim before any
//! listener runs, so no callback can observe a target that is about to be
//! socketed as `Unowned`.

use super::InteractionWorld;
use crate::events::{Event, EventKind};
use crate::hand::{GrabDecision, GrabState};
use crate::profile_scope;
use crate::socket::SocketState;
use crate::types::{Actor, EntityId, HandId, Ownership, Pose, SocketId};
use tracing::{debug, info, trace, warn};

impl InteractionWorld {
    pub(super) fn update_hands(&mut self) {
        profile_scope!("world::hands");
        let ids: Vec<HandId> = self.hands.keys().copied().collect();
        for id in ids {
            self.update_hand(id);
        }
    }

    fn update_hand(&mut self, id: HandId) {
        let Some(hand) = self.hands.get(&id) else {
            return;
        };
        if !hand.is_enabled() {
            return;
        }

        if hand.device_lost() {
            warn!(hand = %id, "Controller lost, releasing");
            self.handle_device_loss(id);
            return;
        }

        if !hand.has_device() {
            let side = hand.side();
            let Some(device) = self.acquire_device(side) else {
                trace!(hand = %id, "No controller available");
                return;
            };
            info!(hand = %id, device = device.name(), "Controller attached");
            if let Some(hand) = self.hands.get_mut(&id) {
                hand.attach_device(device);
            }
        }

        let Some(hand) = self.hands.get_mut(&id) else {
            return;
        };
        hand.poll();
        let decision = hand.decide();
        let grab_point = hand.grab_point();

        if !hand.is_holding() {
            self.update_hover(id, grab_point);
        }

        match decision {
            GrabDecision::Grab => {
                self.grab(id);
            }
            GrabDecision::Release => {
                self.release_from_hand(id, true);
            }
            GrabDecision::Stay => {}
        }

        self.follow(id);
    }

    /// Release, end hover and detach. Acquisition is retried next tick.
    fn handle_device_loss(&mut self, id: HandId) {
        self.release_from_hand(id, true);
        self.end_hand_hover(id);
        if let Some(hand) = self.hands.get_mut(&id) {
            hand.disarm();
            hand.detach_device();
        }
    }

    // ========================================================================
    // Hover
    // ========================================================================

    fn update_hover(&mut self, id: HandId, grab_point: Pose) {
        let candidate = self.find_candidate(id, grab_point);
        let Some(hand) = self.hands.get_mut(&id) else {
            return;
        };
        let previous = hand.hover_target();
        if previous == candidate {
            return;
        }

        hand.state = match candidate {
            Some(target) => GrabState::Hovering { target },
            None => GrabState::Idle,
        };

        if let Some(old) = previous {
            self.emit_target(old, EventKind::HoverEnd, Actor::Hand(id));
        }
        if let Some(new) = candidate {
            trace!(hand = %id, target_id = %new, "Hover start");
            self.emit_target(new, EventKind::HoverStart, Actor::Hand(id));
        }
    }

    pub(super) fn end_hand_hover(&mut self, id: HandId) {
        let Some(hand) = self.hands.get_mut(&id) else {
            return;
        };
        if let Some(old) = hand.hover_target() {
            hand.state = GrabState::Idle;
            self.emit_target(old, EventKind::HoverEnd, Actor::Hand(id));
        }
    }

    /// Nearest grabbable target overlapping the grab sphere.
    ///
    /// Candidates are visited in id order with a strict less-than, so the
    /// lowest id wins a distance tie.
    fn find_candidate(&self, id: HandId, grab_point: Pose) -> Option<EntityId> {
        let hand = self.hands.get(&id)?;
        let spatial = self.spatial.as_ref()?;
        let config = hand.config();

        let mut found =
            spatial.overlap_sphere(grab_point.position, config.grab_radius, config.grab_layers);
        found.sort_unstable();

        let mut best: Option<(EntityId, f32)> = None;
        for entity in found {
            if !self.is_grab_candidate(entity) {
                continue;
            }
            let Some(target) = self.targets.get(&entity) else {
                continue;
            };
            let distance = target.pose().position.distance(grab_point.position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((entity, distance));
            }
        }
        best.map(|(entity, _)| entity)
    }

    fn is_grab_candidate(&self, entity: EntityId) -> bool {
        let Some(target) = self.targets.get(&entity) else {
            return false;
        };
        if !target.is_grabbable() {
            return false;
        }
        match target.ownership() {
            Ownership::Unowned => true,
            Ownership::HeldBy(_) => false,
            Ownership::Socketed(socket_id) => self.grab_out_allowed(socket_id, entity),
        }
    }

    /// A settled occupant may be taken out of a socket that allows it and
    /// has not locked it.
    fn grab_out_allowed(&self, socket_id: SocketId, entity: EntityId) -> bool {
        let (Some(socket), Some(target)) = (self.sockets.get(&socket_id), self.targets.get(&entity))
        else {
            return false;
        };
        socket.config.allow_grab_out
            && matches!(socket.state, SocketState::Occupied { target: occupant } if occupant == entity)
            && target.locked_by() != Some(socket_id)
    }

    // ========================================================================
    // Grab / release protocol
    // ========================================================================

    fn grab(&mut self, id: HandId) -> bool {
        let Some(target_id) = self.hands.get(&id).and_then(|h| h.hover_target()) else {
            return false;
        };
        if !self.is_grab_candidate(target_id) {
            debug!(hand = %id, target_id = %target_id, "Hover target no longer grabbable");
            return false;
        }

        // Grab-out: the socket lets go and the hand takes over before anyone
        // is notified
        let mut from_socket = None;
        if let Some(socket_id) = self.targets.get(&target_id).and_then(|t| t.ownership().socket()) {
            if self.detach_occupant(socket_id).is_some() {
                from_socket = Some(socket_id);
            }
        }

        let (Some(hand), Some(target)) = (self.hands.get_mut(&id), self.targets.get_mut(&target_id))
        else {
            return false;
        };
        if !target.transfer(Ownership::HeldBy(id)) {
            return false;
        }
        target.begin_hold();
        hand.state = GrabState::Holding { target: target_id };

        if let Some(socket_id) = from_socket {
            self.emit_removed(socket_id, target_id, Actor::Hand(id));
        }
        let (Some(hand), Some(target)) = (self.hands.get(&id), self.targets.get_mut(&target_id))
        else {
            return false;
        };
        target.emit(Event::new(EventKind::HoverEnd, target.emitter()).by(Actor::Hand(id)));
        target.emit(Event::new(EventKind::Grabbed, target.emitter()).by(Actor::Hand(id)));
        hand.trigger_default_haptic();

        debug!(hand = %id, target_id = %target_id, name = target.name(), "Grabbed");
        true
    }

    /// Let go of the held target.
    ///
    /// With `claimable`, the nearest socket tracking the target claims it in
    /// the same step. Returns the released target.
    pub(super) fn release_from_hand(&mut self, id: HandId, claimable: bool) -> Option<EntityId> {
        let hand = self.hands.get_mut(&id)?;
        let target_id = hand.held_target()?;
        hand.state = GrabState::Idle;

        let claimant = if claimable {
            self.find_claimant(target_id)
        } else {
            None
        };

        let Some(target) = self.targets.get_mut(&target_id) else {
            return Some(target_id);
        };
        target.end_hold();
        target.transfer(Ownership::Unowned);
        if let Some(socket_id) = claimant {
            self.claim(socket_id, target_id);
        }
        self.forget_socket_hover(target_id);

        debug!(hand = %id, target_id = %target_id, claimed_by = ?claimant, "Released");
        self.emit_target(target_id, EventKind::Released, Actor::Hand(id));
        Some(target_id)
    }

    /// Rigidly attach the held target to the grab point.
    fn follow(&mut self, id: HandId) {
        let Some(hand) = self.hands.get(&id) else {
            return;
        };
        let Some(target_id) = hand.held_target() else {
            return;
        };
        let grab_point = hand.grab_point();
        if let Some(target) = self.targets.get_mut(&target_id) {
            target.set_pose(grab_point);
            self.sync_target_collider(target_id);
        }
    }

    pub(super) fn emit_target(&mut self, id: EntityId, kind: EventKind, actor: Actor) {
        if let Some(target) = self.targets.get_mut(&id) {
            let event = Event::new(kind, target.emitter()).by(actor);
            target.emit(event);
        }
    }
}

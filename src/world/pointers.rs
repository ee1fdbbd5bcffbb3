//! Pointer phase: activation, raycast and the hover/hit/click/miss fan-out.
//!
//! Pointers never read or write ownership.

use super::InteractionWorld;
use crate::constants::{POINTER_CLICK_HAPTIC, POINTER_HOVER_HAPTIC};
use crate::events::{Event, EventKind};
use crate::profile_scope;
use crate::spatial_index::RayHit;
use crate::types::{Actor, EntityId, PointerId};
use tracing::{debug, info, trace, warn};

impl InteractionWorld {
    pub(super) fn update_pointers(&mut self) {
        profile_scope!("world::pointers");
        let ids: Vec<PointerId> = self.pointers.keys().copied().collect();
        for id in ids {
            self.update_pointer(id);
        }
    }

    fn update_pointer(&mut self, id: PointerId) {
        let Some(pointer) = self.pointers.get(&id) else {
            return;
        };

        if pointer.device_lost() {
            warn!(pointer = %id, "Pointer controller lost");
            self.end_pointer_hover(id);
            if let Some(pointer) = self.pointers.get_mut(&id) {
                pointer.detach_device();
            }
            return;
        }

        if !pointer.has_device() {
            let side = pointer.side();
            let Some(device) = self.acquire_device(side) else {
                return;
            };
            info!(pointer = %id, device = device.name(), "Pointer controller attached");
            if let Some(pointer) = self.pointers.get_mut(&id) {
                pointer.attach_device(device);
            }
        }

        let Some(pointer) = self.pointers.get_mut(&id) else {
            return;
        };
        let clicked = pointer.poll();
        if !pointer.is_active() {
            self.end_pointer_hover(id);
            return;
        }

        let pose = pointer.pose();
        let config = pointer.config();
        let hit = self.spatial.as_ref().and_then(|spatial| {
            spatial.raycast(pose.position, pose.forward(), config.max_distance, config.layers)
        });

        match hit {
            Some(hit) => self.pointer_hit(id, hit, clicked),
            None => self.pointer_miss(id),
        }
    }

    fn pointer_hit(&mut self, id: PointerId, hit: RayHit, clicked: bool) {
        let Some(pointer) = self.pointers.get_mut(&id) else {
            return;
        };
        let previous = pointer.hover_entity();
        pointer.current_hit = Some(hit);

        if previous != Some(hit.entity) {
            if let Some(old) = previous {
                self.notify_pointer_hover(old, EventKind::HoverEnd, id);
            }
            if let Some(pointer) = self.pointers.get(&id) {
                pointer.pulse(POINTER_HOVER_HAPTIC);
            }
            trace!(pointer = %id, entity = %hit.entity, "Pointer hover start");
            self.notify_pointer_hover(hit.entity, EventKind::HoverStart, id);
        }

        let Some(pointer) = self.pointers.get_mut(&id) else {
            return;
        };
        pointer.emit(
            Event::new(EventKind::PointerHit, pointer.emitter())
                .by(Actor::Pointer(id))
                .with_hit(hit),
        );
        if clicked {
            debug!(pointer = %id, entity = %hit.entity, "Pointer click");
            pointer.emit(
                Event::new(EventKind::PointerClick, pointer.emitter())
                    .by(Actor::Pointer(id))
                    .with_hit(hit),
            );
            pointer.pulse(POINTER_CLICK_HAPTIC);
        }
    }

    fn pointer_miss(&mut self, id: PointerId) {
        self.end_pointer_hover(id);
        if let Some(pointer) = self.pointers.get_mut(&id) {
            pointer.emit(Event::new(EventKind::PointerMiss, pointer.emitter()).by(Actor::Pointer(id)));
        }
    }

    /// Clear the pointer's hit and tell the hovered entity.
    pub(super) fn end_pointer_hover(&mut self, id: PointerId) {
        let Some(pointer) = self.pointers.get_mut(&id) else {
            return;
        };
        if let Some(old) = pointer.current_hit.take() {
            self.notify_pointer_hover(old.entity, EventKind::HoverEnd, id);
        }
    }

    /// Deliver a pointer hover transition to an entity that can take it.
    fn notify_pointer_hover(&mut self, entity: EntityId, kind: EventKind, pointer: PointerId) {
        let Some(entity_kind) = self.kinds.get(&entity).copied() else {
            return;
        };
        if !entity_kind.is_hoverable() {
            return;
        }
        let actor = Actor::Pointer(pointer);
        match entity_kind {
            super::EntityKind::Target => self.emit_target(entity, kind, actor),
            super::EntityKind::Button => {
                if let Some(button) = self.buttons.get_mut(&entity) {
                    button.set_hovered(kind == EventKind::HoverStart);
                    let event = Event::new(kind, button.emitter()).by(actor);
                    button.emit(event);
                }
            }
            super::EntityKind::Scenery => {}
        }
    }
}

//! Notification fan-out.
//!
//! Every target, socket, pointer and button owns a [`Listeners`] table
//! mapping an [`EventKind`] to an ordered list of callbacks. Callbacks run
//! synchronously, in registration order, inside the tick that caused the
//! event. There is no global bus.

use crate::spatial_index::RayHit;
use crate::types::{Actor, EntityId, PointerId, SocketId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    HoverStart,
    HoverEnd,
    Grabbed,
    Released,
    Placed,
    /// Fired after `Placed` when the occupant passes the socket's filter
    PlacedMatching,
    Removed,
    PointerHit,
    PointerClick,
    PointerMiss,
    ButtonPressed,
    ButtonReleased,
}

/// The entity that emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Emitter {
    Target(EntityId),
    Button(EntityId),
    Socket(SocketId),
    Pointer(PointerId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub emitter: Emitter,
    pub actor: Option<Actor>,
    /// The object involved, for socket placement and pointer events
    pub object: Option<EntityId>,
    #[serde(skip)]
    pub hit: Option<RayHit>,
}

impl Event {
    pub fn new(kind: EventKind, emitter: Emitter) -> Self {
        Self {
            kind,
            emitter,
            actor: None,
            object: None,
            hit: None,
        }
    }

    pub fn by(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_object(mut self, object: EntityId) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_hit(mut self, hit: RayHit) -> Self {
        self.object = Some(hit.entity);
        self.hit = Some(hit);
        self
    }
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Callback = Box<dyn FnMut(&Event)>;

/// Per-entity callback table.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    slots: HashMap<EventKind, Vec<(SubscriptionId, Callback)>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.slots
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for callbacks in self.slots.values_mut() {
            if let Some(index) = callbacks.iter().position(|(sub, _)| *sub == id) {
                callbacks.remove(index);
                return true;
            }
        }
        false
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.slots.get(&kind).map_or(0, Vec::len)
    }

    pub fn emit(&mut self, event: &Event) {
        if let Some(callbacks) = self.slots.get_mut(&event.kind) {
            for (_, callback) in callbacks.iter_mut() {
                callback(event);
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .slots
            .iter()
            .map(|(kind, callbacks)| (*kind, callbacks.len()))
            .collect();
        counts.sort_by_key(|(kind, _)| format!("{:?}", kind));
        f.debug_struct("Listeners").field("slots", &counts).finish()
    }
}

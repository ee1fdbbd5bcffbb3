//! Spatial Index Module
//!
//! R-tree over sphere colliders used for grab-radius overlap queries and
//! pointer ray casts. Envelope queries narrow the candidate set to
//! O(log n) before the exact sphere test.

use crate::types::{EntityId, LayerMask};
use glam::Vec3;
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// A ray cast result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: EntityId,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Queries the interaction core issues against the collision world.
///
/// [`SpatialIndex`] is the built-in implementation. An engine adapter can
/// implement this directly and ignore `upsert_sphere`/`remove` if it tracks
/// colliders itself.
pub trait SpatialQuery {
    fn upsert_sphere(&mut self, entity: EntityId, center: Vec3, radius: f32, layer: u8);

    fn remove(&mut self, entity: EntityId) -> bool;

    /// Entities whose collider intersects the sphere, in no particular order.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<EntityId>;

    /// Nearest hit along the ray. Colliders containing the origin are ignored.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;
}

/// A sphere collider stored in the tree.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: EntityId,
    pub center: Vec3,
    pub radius: f32,
    pub layer: u8,
}

impl SpatialEntry {
    pub fn new(entity: EntityId, center: Vec3, radius: f32, layer: u8) -> Self {
        Self {
            entity,
            center,
            radius,
            layer,
        }
    }

    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.center.distance_squared(center) <= (self.radius + radius).powi(2)
    }

    /// Entry distance along a normalized ray, if the ray starts outside.
    fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let oc = origin - self.center;
        let c = oc.length_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return None;
        }
        let b = oc.dot(direction);
        if b > 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        Some(-b - discriminant.sqrt())
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let r = Vec3::splat(self.radius);
        AABB::from_corners((self.center - r).to_array(), (self.center + r).to_array())
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

/// Spatial index for sphere colliders using an R-tree.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<EntityId, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, entry: SpatialEntry) {
        if let Some(old_entry) = self.entries.remove(&entry.entity) {
            self.tree.remove(&old_entry);
        }
        self.tree.insert(entry);
        self.entries.insert(entry.entity, entry);
    }

    pub fn get(&self, entity: EntityId) -> Option<&SpatialEntry> {
        self.entries.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialQuery for SpatialIndex {
    fn upsert_sphere(&mut self, entity: EntityId, center: Vec3, radius: f32, layer: u8) {
        self.insert(SpatialEntry::new(entity, center, radius, layer));
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        if let Some(entry) = self.entries.remove(&entity) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<EntityId> {
        let r = Vec3::splat(radius);
        let envelope = AABB::from_corners((center - r).to_array(), (center + r).to_array());

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| mask.contains(entry.layer))
            .filter(|entry| entry.intersects_sphere(center, radius))
            .map(|entry| entry.entity)
            .collect()
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        let end = origin + direction * max_distance;
        let envelope = AABB::from_corners(origin.to_array(), end.to_array());

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| mask.contains(entry.layer))
            .filter_map(|entry| {
                let distance = entry.ray_entry(origin, direction)?;
                if distance > max_distance {
                    return None;
                }
                let point = origin + direction * distance;
                let normal = (point - entry.center).try_normalize().unwrap_or(-direction);
                Some(RayHit {
                    entity: entry.entity,
                    point,
                    normal,
                    distance,
                })
            })
            .min_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then_with(|| a.entity.cmp(&b.entity))
            })
    }
}

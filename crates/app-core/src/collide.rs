//! Ray queries against the static collidable set.
//!
//! The camera controller casts one ray per frame from the focus point toward
//! its candidate position; only the nearest hit matters. The collidable set
//! is externally owned and never mutated here.

use glam::Vec3;
use smallvec::SmallVec;

/// A static surface the camera ray-tests against.
#[derive(Clone, Copy, Debug)]
pub enum Collider {
    Sphere { center: Vec3, radius: f32 },
    Aabb { min: Vec3, max: Vec3 },
}

impl Collider {
    /// Distance along the ray to the first intersection, if any.
    /// `dir` must be normalized.
    pub fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        match *self {
            Collider::Sphere { center, radius } => ray_sphere(origin, dir, center, radius),
            Collider::Aabb { min, max } => ray_aabb(origin, dir, min, max),
        }
    }
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Slab-method ray/box intersection. Returns the entry distance, or the exit
/// distance when the ray starts inside the box.
#[inline]
pub fn ray_aabb(ray_origin: Vec3, ray_dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray_dir.recip();
    let t1 = (min - ray_origin) * inv;
    let t2 = (max - ray_origin) * inv;
    let t_enter = t1.min(t2).max_element();
    let t_exit = t1.max(t2).min_element();
    if t_exit < t_enter.max(0.0) {
        return None;
    }
    let t = if t_enter >= 0.0 { t_enter } else { t_exit };
    (t >= 0.0).then_some(t)
}

/// All hit distances within `max_dist`, nearest first.
pub fn intersect_ray(
    colliders: &[Collider],
    origin: Vec3,
    dir: Vec3,
    max_dist: f32,
) -> SmallVec<[f32; 4]> {
    let mut hits: SmallVec<[f32; 4]> = colliders
        .iter()
        .filter_map(|c| c.raycast(origin, dir))
        .filter(|&t| t <= max_dist)
        .collect();
    hits.sort_by(|a, b| a.total_cmp(b));
    hits
}

/// Nearest hit distance within `max_dist`, if any surface is in the way.
pub fn nearest_hit(colliders: &[Collider], origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32> {
    intersect_ray(colliders, origin, dir, max_dist).first().copied()
}

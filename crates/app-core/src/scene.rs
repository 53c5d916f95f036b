//! Scene visibility registry and GPU upload structs.
//!
//! Effects never self-register; the driver attaches and detaches them and
//! consults the registry when collecting draw data each frame. An attach
//! covers everything the effect renders (point cloud and any trail lines) in
//! a single entry, so visibility flips are atomic from the caller's side.

use bytemuck::{Pod, Zeroable};
use fnv::FnvHashMap;

use crate::effect::EffectId;

/// What one attached effect contributes to the render set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneEntry {
    /// Number of trail polylines (ring-trail: one per particle; 0 otherwise).
    pub trail_count: usize,
}

/// The set of currently visible effects.
#[derive(Default)]
pub struct Scene {
    entries: FnvHashMap<EffectId, SceneEntry>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, id: EffectId, trail_count: usize) {
        self.entries.insert(id, SceneEntry { trail_count });
    }

    pub(crate) fn detach(&mut self, id: EffectId) {
        self.entries.remove(&id);
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn entry(&self, id: EffectId) -> Option<SceneEntry> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectId, SceneEntry)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, *e))
    }
}

/// Instanced billboard quad data, one per visible particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

/// One vertex of a trail polyline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TrailVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

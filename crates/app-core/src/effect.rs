//! Particle simulation kernel.
//!
//! Every effect variant shares one lifecycle: spawn, integrate, age-based
//! fade, respawn on expiry. Variants differ only in their [`SpawnStrategy`]
//! (spawn geometry and velocity policy). Ring-trail is the exception: its
//! motion is a periodic angular advance rather than velocity integration, and
//! it keeps a bounded position history per particle for trail rendering.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use rand::prelude::*;

use crate::constants::*;
use crate::scene::{ParticleInstance, Scene};

/// Process-unique identity used by the scene visibility registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectId(pub u64);

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

impl EffectId {
    fn next() -> Self {
        EffectId(NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One simulated particle.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds since spawn, always >= 0 and <= lifetime after an update.
    pub age: f32,
    pub lifetime: f32,
    /// Derived fade, `1 - age / lifetime`, clamped to [0, 1].
    pub alpha: f32,
}

/// Spawn geometry and velocity policy for one effect variant.
#[derive(Clone, Copy, Debug)]
pub enum SpawnStrategy {
    /// Uniform random point in a sphere; velocity outward along the spawn
    /// direction at `speed` scaled by a random factor in [0.8, 1.2].
    Explosion { radius: f32, speed: f32 },
    /// Fixed at the origin, fixed upward velocity.
    Firework { velocity: Vec3 },
    /// Random point in a ground disk, fixed upward velocity.
    Fountain { spawn_radius: f32, velocity: Vec3 },
    /// Disk (ground) or sphere (volumetric) spawn; drift is either a random
    /// unit direction at a random speed or the fixed base vector.
    Smoke {
        spawn_radius: f32,
        spawn_in_sphere: bool,
        randomize: bool,
        min_speed: f32,
        max_speed: f32,
        base_velocity: Vec3,
    },
    /// Fixed at the origin; the burst direction is assigned externally.
    Starburst { velocity: Vec3 },
    /// Evenly spaced slots on a circle of radius 1.2; motion is angular,
    /// not integrated, so no velocity is drawn.
    RingTrail {
        trail_length: usize,
        angular_speed: f32,
    },
}

impl SpawnStrategy {
    /// Initial position and velocity for particle `index` of `count`,
    /// anchored at `origin`.
    pub fn spawn(
        &self,
        origin: Vec3,
        index: usize,
        count: usize,
        rng: &mut StdRng,
    ) -> (Vec3, Vec3) {
        match *self {
            SpawnStrategy::Explosion { radius, speed } => {
                let dir = random_unit_vector(rng);
                // Cube-root radial draw keeps the volumetric density uniform.
                let r = radius * rng.gen::<f32>().cbrt();
                let factor = 0.8 + rng.gen::<f32>() * 0.4;
                (origin + dir * r, dir * (speed * factor))
            }
            SpawnStrategy::Firework { velocity } => (origin, velocity),
            SpawnStrategy::Fountain {
                spawn_radius,
                velocity,
            } => {
                let (dx, dz) = random_in_disk(rng, spawn_radius);
                (origin + Vec3::new(dx, 0.0, dz), velocity)
            }
            SpawnStrategy::Smoke {
                spawn_radius,
                spawn_in_sphere,
                randomize,
                min_speed,
                max_speed,
                base_velocity,
            } => {
                let position = if spawn_in_sphere {
                    origin + random_unit_vector(rng) * (spawn_radius * rng.gen::<f32>().cbrt())
                } else {
                    let (dx, dz) = random_in_disk(rng, spawn_radius);
                    origin + Vec3::new(dx, 0.0, dz)
                };
                let velocity = if randomize {
                    random_unit_vector(rng) * rng.gen_range(min_speed..=max_speed)
                } else {
                    base_velocity
                };
                (position, velocity)
            }
            SpawnStrategy::Starburst { velocity } => (origin, velocity),
            SpawnStrategy::RingTrail { .. } => {
                (ring_position(origin, ring_slot_angle(index, count)), Vec3::ZERO)
            }
        }
    }
}

pub(crate) fn ring_slot_angle(index: usize, count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        index as f32 / count as f32 * TAU
    }
}

pub(crate) fn ring_position(origin: Vec3, angle: f32) -> Vec3 {
    origin + Vec3::new(angle.cos() * RING_RADIUS, 0.0, angle.sin() * RING_RADIUS)
}

/// Uniform direction over the sphere via the usual (theta, phi) draw.
fn random_unit_vector(rng: &mut StdRng) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

fn random_in_disk(rng: &mut StdRng, radius: f32) -> (f32, f32) {
    let angle = rng.gen::<f32>() * TAU;
    let r = rng.gen::<f32>() * radius;
    (angle.cos() * r, angle.sin() * r)
}

/// Common construction parameters shared by every variant.
#[derive(Clone, Debug)]
pub struct EffectParams {
    pub origin: Vec3,
    pub color: [f32; 3],
    pub size: f32,
    pub lifetime: f32,
    pub particle_count: usize,
}

/// A fixed-size particle system instance.
///
/// Constructed fully spawned; `update(dt)` mutates every particle in place.
/// The effect is either attached to a [`Scene`] or not; there is no
/// intermediate visibility state.
#[derive(Debug)]
pub struct ParticleEffect {
    id: EffectId,
    origin: Vec3,
    color: [f32; 3],
    size: f32,
    lifetime: f32,
    strategy: SpawnStrategy,
    particles: Vec<Particle>,
    /// Ring-trail angular phase per particle; empty for other variants.
    phases: Vec<f32>,
    /// Ring-trail position history per particle, oldest first; empty for
    /// other variants.
    trails: Vec<VecDeque<Vec3>>,
    rng: StdRng,
}

// A clone gets its own identity so the scene registry can tell the copy
// and its source apart.
impl Clone for ParticleEffect {
    fn clone(&self) -> Self {
        Self {
            id: EffectId::next(),
            origin: self.origin,
            color: self.color,
            size: self.size,
            lifetime: self.lifetime,
            strategy: self.strategy,
            particles: self.particles.clone(),
            phases: self.phases.clone(),
            trails: self.trails.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl ParticleEffect {
    pub fn new(params: EffectParams, strategy: SpawnStrategy, seed: u64) -> Self {
        let mut effect = Self {
            id: EffectId::next(),
            origin: params.origin,
            color: params.color,
            size: params.size,
            lifetime: params.lifetime,
            strategy,
            particles: Vec::new(),
            phases: Vec::new(),
            trails: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        effect.init_particles(params.particle_count);
        effect
    }

    /// Allocate and spawn the full particle array.
    fn init_particles(&mut self, count: usize) {
        self.particles = Vec::with_capacity(count);
        self.phases.clear();
        self.trails.clear();
        let is_ring = matches!(self.strategy, SpawnStrategy::RingTrail { .. });
        for i in 0..count {
            let (position, velocity) = self.strategy.spawn(self.origin, i, count, &mut self.rng);
            self.particles.push(Particle {
                position,
                velocity,
                age: 0.0,
                lifetime: self.lifetime,
                alpha: 1.0,
            });
            if is_ring {
                self.phases.push(ring_slot_angle(i, count));
                let mut trail = VecDeque::new();
                trail.push_back(position);
                self.trails.push(trail);
            }
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        match self.strategy {
            SpawnStrategy::RingTrail {
                trail_length,
                angular_speed,
            } => self.update_ring(dt, trail_length, angular_speed),
            _ => self.update_kinematic(dt),
        }
    }

    fn update_kinematic(&mut self, dt: f32) {
        let count = self.particles.len();
        for i in 0..count {
            self.particles[i].age += dt;
            if self.particles[i].age > self.particles[i].lifetime {
                let (position, velocity) =
                    self.strategy.spawn(self.origin, i, count, &mut self.rng);
                let p = &mut self.particles[i];
                p.position = position;
                p.velocity = velocity;
                p.age = 0.0;
                p.alpha = 1.0;
                // Respawned particles integrate from the next frame.
                continue;
            }
            let p = &mut self.particles[i];
            p.position += p.velocity * dt;
            p.alpha = (1.0 - p.age / p.lifetime).clamp(0.0, 1.0);
        }
    }

    fn update_ring(&mut self, dt: f32, trail_length: usize, angular_speed: f32) {
        for i in 0..self.particles.len() {
            self.phases[i] += angular_speed * dt * RING_PHASE_SCALE;
            let position = ring_position(self.origin, self.phases[i]);
            self.particles[i].position = position;
            let trail = &mut self.trails[i];
            trail.push_back(position);
            while trail.len() > trail_length {
                trail.pop_front();
            }
        }
    }

    /// Reassign the effect origin. Existing particle state is untouched:
    /// future spawns and the ring orbit center use the new value.
    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Register this effect's renderables (point cloud, plus every trail
    /// line for ring-trail) in the scene as one entry.
    pub fn add_to_scene(&self, scene: &mut Scene) {
        scene.attach(self.id, self.trails.len());
    }

    /// Remove all of this effect's renderables from the scene.
    pub fn remove_from_scene(&self, scene: &mut Scene) {
        scene.detach(self.id);
    }

    /// Append per-particle instance data for the renderer.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        let [r, g, b] = self.color;
        for p in &self.particles {
            out.push(ParticleInstance {
                position: p.position.to_array(),
                size: self.size,
                color: [r, g, b, p.alpha],
            });
        }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Ring-trail position histories, one per particle (empty otherwise).
    pub fn trails(&self) -> &[VecDeque<Vec3>] {
        &self.trails
    }

    /// Maximum trail history length (0 for non-trail variants).
    pub fn trail_capacity(&self) -> usize {
        match self.strategy {
            SpawnStrategy::RingTrail { trail_length, .. } => trail_length,
            _ => 0,
        }
    }
}

//! Effect catalog: variant lookup by name and per-variant construction
//! defaults.
//!
//! Requesting an unknown variant name is a construction-time fault: it means
//! the showcase definition and the catalog disagree, which should surface
//! immediately rather than silently default.

use glam::Vec3;
use thiserror::Error;

use crate::constants::*;
use crate::effect::{EffectParams, ParticleEffect, SpawnStrategy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown VFX type \"{0}\"")]
    UnknownKind(String),
}

/// The closed set of built-in effect variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Explosion,
    Firework,
    Fountain,
    Smoke,
    Starburst,
    RingTrail,
}

impl EffectKind {
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Explosion,
        EffectKind::Firework,
        EffectKind::Fountain,
        EffectKind::Smoke,
        EffectKind::Starburst,
        EffectKind::RingTrail,
    ];

    /// Catalog name, as used in showcase definitions.
    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Explosion => "explosion",
            EffectKind::Firework => "firework",
            EffectKind::Fountain => "fountain",
            EffectKind::Smoke => "smoke",
            EffectKind::Starburst => "starburst",
            EffectKind::RingTrail => "ringtrail",
        }
    }

    /// Look up a variant by catalog name.
    pub fn parse(name: &str) -> Result<Self, CatalogError> {
        match name {
            "explosion" => Ok(EffectKind::Explosion),
            "firework" => Ok(EffectKind::Firework),
            "fountain" => Ok(EffectKind::Fountain),
            "smoke" => Ok(EffectKind::Smoke),
            "starburst" => Ok(EffectKind::Starburst),
            "ringtrail" => Ok(EffectKind::RingTrail),
            other => Err(CatalogError::UnknownKind(other.to_string())),
        }
    }
}

/// Optional construction parameters. Unset fields take the per-variant
/// preset values; fields a variant does not use are ignored.
#[derive(Clone, Debug, Default)]
pub struct EffectDesc {
    pub position: Vec3,
    pub color: Option<[f32; 3]>,
    pub size: Option<f32>,
    pub lifetime: Option<f32>,
    pub particle_count: Option<usize>,
    pub radius: Option<f32>,
    pub speed: Option<f32>,
    pub spawn_radius: Option<f32>,
    pub spawn_in_sphere: Option<bool>,
    pub randomize: Option<bool>,
    pub min_speed: Option<f32>,
    pub max_speed: Option<f32>,
    pub height: Option<f32>,
    pub velocity: Option<Vec3>,
    pub trail_length: Option<usize>,
}

impl EffectDesc {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Build an effect by catalog name. Fails only on an unknown name.
pub fn build_effect(
    kind_name: &str,
    desc: &EffectDesc,
    seed: u64,
) -> Result<ParticleEffect, CatalogError> {
    let kind = EffectKind::parse(kind_name)?;
    Ok(build_kind(kind, desc, seed))
}

/// Build an effect from an already-resolved kind.
pub fn build_kind(kind: EffectKind, desc: &EffectDesc, seed: u64) -> ParticleEffect {
    let (params, strategy) = match kind {
        EffectKind::Explosion => (
            common(desc, [1.0, 0.4, 0.0], 0.15, 1.0, 80),
            SpawnStrategy::Explosion {
                radius: desc.radius.unwrap_or(0.3),
                speed: desc.speed.unwrap_or(0.5),
            },
        ),
        EffectKind::Firework => (
            common(desc, [1.0, 1.0, 1.0], 0.12, 1.2, 120),
            SpawnStrategy::Firework {
                velocity: desc.velocity.unwrap_or(Vec3::new(0.0, 2.5, 0.0)),
            },
        ),
        EffectKind::Fountain => (
            common(desc, [0.4, 0.8, 1.0], 0.09, 1.5, 100),
            SpawnStrategy::Fountain {
                spawn_radius: desc.spawn_radius.unwrap_or(0.2),
                velocity: desc
                    .velocity
                    .unwrap_or_else(|| Vec3::new(0.0, desc.height.unwrap_or(2.5), 0.0)),
            },
        ),
        EffectKind::Smoke => (
            common(desc, [0.53, 0.53, 0.53], 0.18, 2.0, 60),
            SpawnStrategy::Smoke {
                spawn_radius: desc.spawn_radius.unwrap_or(0.25),
                spawn_in_sphere: desc.spawn_in_sphere.unwrap_or(false),
                randomize: desc.randomize.unwrap_or(false),
                min_speed: desc.min_speed.unwrap_or(0.3),
                max_speed: desc.max_speed.unwrap_or(0.7),
                base_velocity: desc.velocity.unwrap_or(Vec3::new(0.0, 0.5, 0.0)),
            },
        ),
        EffectKind::Starburst => (
            common(desc, [1.0, 1.0, 0.4], 0.13, 1.0, 40),
            SpawnStrategy::Starburst {
                velocity: desc.velocity.unwrap_or(Vec3::new(0.0, 0.5, 0.0)),
            },
        ),
        EffectKind::RingTrail => (
            common(desc, [1.0, 1.0, 1.0], 0.15, 1.0, 10),
            SpawnStrategy::RingTrail {
                trail_length: desc.trail_length.unwrap_or(DEFAULT_TRAIL_LENGTH),
                angular_speed: desc.speed.unwrap_or(RING_ANGULAR_SPEED),
            },
        ),
    };
    log::debug!(
        "catalog: building {} with {} particles",
        kind.name(),
        params.particle_count
    );
    ParticleEffect::new(params, strategy, seed)
}

fn common(
    desc: &EffectDesc,
    color: [f32; 3],
    size: f32,
    lifetime: f32,
    count: usize,
) -> EffectParams {
    EffectParams {
        origin: desc.position,
        color: desc.color.unwrap_or(color),
        size: desc.size.unwrap_or(size),
        lifetime: desc.lifetime.unwrap_or(lifetime),
        particle_count: desc.particle_count.unwrap_or(count),
    }
}

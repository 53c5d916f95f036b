//! Orbit camera and particle simulation core for the VFX showcase.
//!
//! Pure simulation/control math over `glam` types. A front-end drives one
//! [`OrbitCameraController::update`] and the active
//! [`ParticleEffect::update`] per frame, then draws whatever the [`Scene`]
//! registry says is visible. The two subsystems touch only through the
//! camera's focus-position accessor, which the driver points at the selected
//! effect's origin.

pub mod camera;
pub mod catalog;
pub mod collide;
pub mod constants;
pub mod effect;
pub mod scene;
pub mod state;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use camera::{CameraConfig, FocusProvider, OrbitCameraController, PointerKind};
pub use catalog::{build_effect, build_kind, CatalogError, EffectDesc, EffectKind};
pub use collide::{nearest_hit, Collider};
pub use constants::*;
pub use effect::{EffectId, EffectParams, Particle, ParticleEffect, SpawnStrategy};
pub use scene::{ParticleInstance, Scene, SceneEntry, TrailVertex};
pub use state::Camera;

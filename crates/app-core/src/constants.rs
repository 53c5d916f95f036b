// Shared tuning constants for the orbit camera and the VFX catalog.

// Orbit camera defaults (degrees where angle-like)
pub const DEFAULT_MIN_YAW_DEG: f32 = -360.0;
pub const DEFAULT_MAX_YAW_DEG: f32 = 360.0;
pub const DEFAULT_MIN_PITCH_DEG: f32 = -30.0;
pub const DEFAULT_MAX_PITCH_DEG: f32 = 30.0;
pub const DEFAULT_MIN_DISTANCE: f32 = 2.0;
pub const DEFAULT_MAX_DISTANCE: f32 = 20.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.01; // pointer pixels -> radians

// Orbit camera behavior
pub const WHEEL_DISTANCE_SCALE: f32 = 0.01; // wheel delta-y -> distance units
pub const CAMERA_LERP_ALPHA: f32 = 0.12; // per-frame position smoothing
pub const OVERSHOOT_DECAY: f32 = 0.15; // per-frame ease back toward the hard bound
pub const OVERSHOOT_SNAP_EPSILON: f32 = 0.001; // radians; snap to the bound below this
pub const DEFAULT_COLLISION_RADIUS: f32 = 0.25; // closest camera approach to obstacles

// Ring-trail effect
pub const RING_RADIUS: f32 = 1.2;
pub const RING_ANGULAR_SPEED: f32 = 1.2;
pub const RING_PHASE_SCALE: f32 = 0.5; // angle advance = angular_speed * dt * this
pub const DEFAULT_TRAIL_LENGTH: usize = 30;
pub const TRAIL_OPACITY: f32 = 0.5; // trail polylines render dimmer than points

// Showcase driver
pub const RECENTER_RATE: f32 = 0.15; // selected-effect x eases toward 0 per frame

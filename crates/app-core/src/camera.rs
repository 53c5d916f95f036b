//! Orbit camera controller.
//!
//! Converts pointer drags and wheel zoom into a smoothed, constrained,
//! collision-aware camera pose. Input methods may be called at any time;
//! `update` runs once per frame. Yaw and pitch get an elastic overshoot band
//! past their hard bounds that eases back when the drag pressure stops;
//! distance is hard-clamped with no such band.

use glam::Vec3;

use crate::collide::{nearest_hit, Collider};
use crate::constants::*;
use crate::state::Camera;

/// Zero-argument accessor returning the current point the camera orbits.
pub type FocusProvider = Box<dyn Fn() -> Vec3>;

/// Pointer device classification for drag-start decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse with the given button index (0 = primary).
    Mouse(u8),
    Touch,
    Pen,
}

impl PointerKind {
    fn starts_drag(self) -> bool {
        matches!(
            self,
            PointerKind::Mouse(0) | PointerKind::Touch | PointerKind::Pen
        )
    }
}

/// Orbit camera configuration. Angle-like fields are in degrees and are
/// converted to radians internally.
#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    pub initial_yaw: f32,
    pub initial_pitch: f32,
    pub initial_distance: f32,
    pub min_yaw: f32,
    pub max_yaw: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub overshoot_yaw: f32,
    pub overshoot_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_yaw: 0.0,
            initial_pitch: 0.0,
            initial_distance: 5.0,
            min_yaw: DEFAULT_MIN_YAW_DEG,
            max_yaw: DEFAULT_MAX_YAW_DEG,
            min_pitch: DEFAULT_MIN_PITCH_DEG,
            max_pitch: DEFAULT_MAX_PITCH_DEG,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            sensitivity: DEFAULT_SENSITIVITY,
            overshoot_yaw: 0.0,
            overshoot_pitch: 0.0,
        }
    }
}

impl CameraConfig {
    /// Replace non-finite fields with the documented defaults. Malformed
    /// configuration degrades silently instead of failing.
    pub fn sanitize(mut self) -> Self {
        let d = Self::default();
        self.initial_yaw = finite_or(self.initial_yaw, d.initial_yaw, "initial_yaw");
        self.initial_pitch = finite_or(self.initial_pitch, d.initial_pitch, "initial_pitch");
        self.initial_distance =
            finite_or(self.initial_distance, d.initial_distance, "initial_distance");
        self.min_yaw = finite_or(self.min_yaw, d.min_yaw, "min_yaw");
        self.max_yaw = finite_or(self.max_yaw, d.max_yaw, "max_yaw");
        self.min_pitch = finite_or(self.min_pitch, d.min_pitch, "min_pitch");
        self.max_pitch = finite_or(self.max_pitch, d.max_pitch, "max_pitch");
        self.min_distance = finite_or(self.min_distance, d.min_distance, "min_distance");
        self.max_distance = finite_or(self.max_distance, d.max_distance, "max_distance");
        self.sensitivity = finite_or(self.sensitivity, d.sensitivity, "sensitivity");
        if self.sensitivity <= 0.0 {
            log::warn!("camera config: sensitivity must be positive, using default");
            self.sensitivity = d.sensitivity;
        }
        self.overshoot_yaw = finite_or(self.overshoot_yaw, d.overshoot_yaw, "overshoot_yaw");
        self.overshoot_pitch =
            finite_or(self.overshoot_pitch, d.overshoot_pitch, "overshoot_pitch");
        if self.min_yaw > self.max_yaw {
            log::warn!("camera config: min_yaw > max_yaw, using default yaw bounds");
            self.min_yaw = d.min_yaw;
            self.max_yaw = d.max_yaw;
        }
        if self.min_pitch > self.max_pitch {
            log::warn!("camera config: min_pitch > max_pitch, using default pitch bounds");
            self.min_pitch = d.min_pitch;
            self.max_pitch = d.max_pitch;
        }
        if self.min_distance > self.max_distance {
            log::warn!("camera config: min_distance > max_distance, using default distance bounds");
            self.min_distance = d.min_distance;
            self.max_distance = d.max_distance;
        }
        self
    }
}

fn finite_or(value: f32, fallback: f32, name: &str) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::warn!("camera config: {name} is not finite, using {fallback}");
        fallback
    }
}

/// One clamped angle axis with an elastic overshoot band.
///
/// Two phases: a drag may push the angle into `[min - margin, max + margin]`,
/// recording the signed deviation past the hard bound; frame ticks then ease
/// the angle back to the bound and clear the deviation once snapped.
#[derive(Clone, Copy, Debug)]
struct OvershootAxis {
    min: f32,
    max: f32,
    margin: f32,
    deviation: f32,
}

impl OvershootAxis {
    fn new(min: f32, max: f32, margin: f32) -> Self {
        Self {
            min,
            max,
            margin,
            deviation: 0.0,
        }
    }

    /// Record the deviation for a freshly dragged angle and clamp it to the
    /// overshoot band.
    fn apply_drag(&mut self, angle: f32) -> f32 {
        self.deviation = if angle < self.min {
            angle - self.min
        } else if angle > self.max {
            angle - self.max
        } else {
            0.0
        };
        angle.clamp(self.min - self.margin, self.max + self.margin)
    }

    /// One frame of ease-back toward the nearest hard bound.
    fn ease_back(&mut self, mut angle: f32) -> f32 {
        if self.deviation == 0.0 {
            return angle;
        }
        if angle < self.min {
            angle += (self.min - angle) * OVERSHOOT_DECAY;
            if (angle - self.min).abs() < OVERSHOOT_SNAP_EPSILON {
                angle = self.min;
                self.deviation = 0.0;
            }
        } else if angle > self.max {
            angle += (self.max - angle) * OVERSHOOT_DECAY;
            if (angle - self.max).abs() < OVERSHOOT_SNAP_EPSILON {
                angle = self.max;
                self.deviation = 0.0;
            }
        } else {
            self.deviation = 0.0;
        }
        angle
    }
}

pub struct OrbitCameraController {
    focus: FocusProvider,
    colliders: Vec<Collider>,
    collision_radius: f32,
    yaw: f32,
    pitch: f32,
    distance: f32,
    yaw_axis: OvershootAxis,
    pitch_axis: OvershootAxis,
    min_distance: f32,
    max_distance: f32,
    sensitivity: f32,
    lerp_alpha: f32,
    eye: Vec3,
    target: Vec3,
    dragging: bool,
    last_x: f32,
    last_y: f32,
}

impl OrbitCameraController {
    pub fn new(config: CameraConfig, focus: FocusProvider) -> Self {
        Self::with_colliders(config, focus, Vec::new(), DEFAULT_COLLISION_RADIUS)
    }

    pub fn with_colliders(
        config: CameraConfig,
        focus: FocusProvider,
        colliders: Vec<Collider>,
        collision_radius: f32,
    ) -> Self {
        let config = config.sanitize();
        let mut ctrl = Self {
            focus,
            colliders,
            collision_radius,
            yaw: config.initial_yaw.to_radians(),
            pitch: config.initial_pitch.to_radians(),
            distance: config.initial_distance,
            yaw_axis: OvershootAxis::new(
                config.min_yaw.to_radians(),
                config.max_yaw.to_radians(),
                config.overshoot_yaw.to_radians(),
            ),
            pitch_axis: OvershootAxis::new(
                config.min_pitch.to_radians(),
                config.max_pitch.to_radians(),
                config.overshoot_pitch.to_radians(),
            ),
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            sensitivity: config.sensitivity,
            lerp_alpha: CAMERA_LERP_ALPHA,
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            dragging: false,
            last_x: 0.0,
            last_y: 0.0,
        };
        // Start the smoothed position on the orbit so the first frames do
        // not sweep in from the world origin.
        let focus0 = (ctrl.focus)();
        ctrl.eye = ctrl.orbit_position(focus0);
        ctrl.target = focus0;
        ctrl
    }

    /// Wheel zoom: distance moves by `delta_y * 0.01` and is hard-clamped.
    pub fn wheel(&mut self, delta_y: f32) {
        self.distance = (self.distance + delta_y * WHEEL_DISTANCE_SCALE)
            .clamp(self.min_distance, self.max_distance);
    }

    /// Begin a drag for a primary button, touch, or pen contact.
    pub fn pointer_down(&mut self, x: f32, y: f32, kind: PointerKind) {
        if kind.starts_drag() {
            self.dragging = true;
            self.last_x = x;
            self.last_y = y;
        }
    }

    /// Ends any drag, regardless of which pointer released.
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Apply a pointer movement. Ignored unless a drag is active.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        let dx = x - self.last_x;
        let dy = y - self.last_y;
        self.last_x = x;
        self.last_y = y;
        let yaw = self.yaw - dx * self.sensitivity;
        let pitch = self.pitch + dy * self.sensitivity;
        self.yaw = self.yaw_axis.apply_drag(yaw);
        self.pitch = self.pitch_axis.apply_drag(pitch);
    }

    /// Per-frame tick: overshoot ease-back, spherical candidate position,
    /// collision pull-in, then smoothing toward the result. The look target
    /// is always the raw focus point, independent of any pull-in.
    pub fn update(&mut self) {
        self.yaw = self.yaw_axis.ease_back(self.yaw);
        self.pitch = self.pitch_axis.ease_back(self.pitch);

        let focus = (self.focus)();
        self.eye = self.eye.lerp(self.resolve_position(focus), self.lerp_alpha);
        self.target = focus;
    }

    /// Collision-adjusted position the camera eases toward this frame.
    pub fn desired_eye(&self) -> Vec3 {
        self.resolve_position((self.focus)())
    }

    fn resolve_position(&self, focus: Vec3) -> Vec3 {
        let candidate = self.orbit_position(focus);
        if self.colliders.is_empty() {
            return candidate;
        }
        let dir = (candidate - focus).normalize_or_zero();
        if dir == Vec3::ZERO {
            return candidate;
        }
        match nearest_hit(&self.colliders, focus, dir, self.distance) {
            Some(hit) if hit < self.distance - self.collision_radius => {
                // Pull the camera in front of the obstruction.
                focus + dir * (hit - self.collision_radius)
            }
            _ => candidate,
        }
    }

    fn orbit_position(&self, focus: Vec3) -> Vec3 {
        focus
            + Vec3::new(
                self.distance * self.pitch.cos() * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                self.distance * self.pitch.cos() * self.yaw.cos(),
            )
    }

    /// Replace the focus accessor.
    pub fn set_focus_provider(&mut self, focus: FocusProvider) {
        self.focus = focus;
    }

    /// Pin the focus to a fixed point (replaces the accessor).
    pub fn update_focus_position(&mut self, position: Vec3) {
        self.focus = Box::new(move || position);
    }

    /// Snapshot as a renderable camera.
    pub fn camera(&self, aspect: f32) -> Camera {
        Camera {
            eye: self.eye,
            target: self.target,
            up: Vec3::Y,
            aspect,
            fovy_radians: std::f32::consts::FRAC_PI_4,
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn look_target(&self) -> Vec3 {
        self.target
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

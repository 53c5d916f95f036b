// Integration tests for the orbit camera controller: clamping, overshoot
// decay, collision avoidance, and focus handling.

use app_core::{CameraConfig, Collider, OrbitCameraController, PointerKind};
use glam::Vec3;

fn fixed_focus(p: Vec3) -> Box<dyn Fn() -> Vec3> {
    Box::new(move || p)
}

fn make_camera(config: CameraConfig) -> OrbitCameraController {
    OrbitCameraController::new(config, fixed_focus(Vec3::ZERO))
}

#[test]
fn wheel_distance_is_hard_clamped() {
    let mut cam = make_camera(CameraConfig::default());
    for delta in [3.0, -10.0, 25000.0, -90000.0, 0.5, 640.0, -640.0] {
        cam.wheel(delta);
        assert!(cam.distance() >= 2.0, "distance below min after {delta}");
        assert!(cam.distance() <= 20.0, "distance above max after {delta}");
    }
    // No overshoot band on distance: a huge delta lands exactly on the bound.
    cam.wheel(1.0e9);
    assert_eq!(cam.distance(), 20.0);
    cam.wheel(-1.0e9);
    assert_eq!(cam.distance(), 2.0);
}

#[test]
fn drag_rotates_yaw_and_pitch() {
    let mut cam = make_camera(CameraConfig::default());
    cam.pointer_down(100.0, 100.0, PointerKind::Mouse(0));
    cam.pointer_move(110.0, 95.0);
    // yaw -= dx * sensitivity, pitch += dy * sensitivity
    assert!((cam.yaw() - (-0.1)).abs() < 1e-6);
    assert!((cam.pitch() - (-0.05)).abs() < 1e-6);
}

#[test]
fn secondary_button_does_not_start_a_drag() {
    let mut cam = make_camera(CameraConfig::default());
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(2));
    assert!(!cam.is_dragging());
    cam.pointer_move(50.0, 0.0);
    assert_eq!(cam.yaw(), 0.0);

    // Touch and pen both count as primary.
    cam.pointer_down(0.0, 0.0, PointerKind::Touch);
    assert!(cam.is_dragging());
    cam.pointer_up();
    cam.pointer_down(0.0, 0.0, PointerKind::Pen);
    assert!(cam.is_dragging());
}

#[test]
fn pointer_up_ends_the_drag_unconditionally() {
    let mut cam = make_camera(CameraConfig::default());
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    cam.pointer_up();
    assert!(!cam.is_dragging());
    cam.pointer_move(100.0, 0.0);
    assert_eq!(cam.yaw(), 0.0);
}

fn banded_config() -> CameraConfig {
    CameraConfig {
        min_yaw: -180.0,
        max_yaw: 180.0,
        overshoot_yaw: 30.0,
        min_pitch: -30.0,
        max_pitch: 30.0,
        overshoot_pitch: 10.0,
        ..CameraConfig::default()
    }
}

#[test]
fn drags_never_leave_the_overshoot_band() {
    let mut cam = make_camera(banded_config());
    let yaw_lo = (-180.0f32 - 30.0).to_radians();
    let yaw_hi = (180.0f32 + 30.0).to_radians();
    let pitch_lo = (-30.0f32 - 10.0).to_radians();
    let pitch_hi = (30.0f32 + 10.0).to_radians();

    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    let mut x = 0.0;
    let mut y = 0.0;
    for step in 0..200 {
        // Alternate large sweeps in both directions.
        let sign = if step % 3 == 0 { -1.0 } else { 1.0 };
        x += sign * 500.0;
        y += sign * 300.0;
        cam.pointer_move(x, y);
        assert!(cam.yaw() >= yaw_lo - 1e-5 && cam.yaw() <= yaw_hi + 1e-5);
        assert!(cam.pitch() >= pitch_lo - 1e-5 && cam.pitch() <= pitch_hi + 1e-5);
    }
}

#[test]
fn overshoot_eases_back_to_the_hard_bound() {
    let mut cam = make_camera(banded_config());
    // Push yaw far past the band; it clamps to max + overshoot (210 deg).
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    cam.pointer_move(-(250.0f32.to_radians() / 0.01), 0.0);
    let band_edge = (180.0f32 + 30.0).to_radians();
    assert!((cam.yaw() - band_edge).abs() < 1e-4);
    cam.pointer_up();

    // Frames without input decay back to the hard bound and snap.
    let hard = 180.0f32.to_radians();
    let mut converged_at = None;
    for frame in 0..100 {
        cam.update();
        if (cam.yaw() - hard).abs() <= 0.001 {
            converged_at = Some(frame);
            break;
        }
    }
    let frame = converged_at.expect("yaw never converged to the hard bound");
    assert!(frame < 60, "decay took too long: {frame} frames");

    // Once snapped it stays put.
    for _ in 0..5 {
        cam.update();
    }
    assert_eq!(cam.yaw(), hard);
}

#[test]
fn overshoot_from_below_decays_too() {
    let mut cam = make_camera(banded_config());
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    cam.pointer_move(250.0f32.to_radians() / 0.01, 0.0);
    assert!((cam.yaw() - (-(180.0f32 + 30.0).to_radians())).abs() < 1e-4);
    cam.pointer_up();
    for _ in 0..100 {
        cam.update();
    }
    assert!((cam.yaw() - (-180.0f32.to_radians())).abs() <= 0.001);
}

#[test]
fn in_band_overshoot_is_not_clamped_early() {
    // A drag to 200 deg raw sits inside the 210 deg band and is kept as-is.
    let mut cam = make_camera(banded_config());
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    cam.pointer_move(-(200.0f32.to_radians() / 0.01), 0.0);
    assert!((cam.yaw() - 200.0f32.to_radians()).abs() < 1e-4);
}

#[test]
fn zero_overshoot_margin_means_hard_clamp() {
    let mut cam = make_camera(CameraConfig::default());
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    // Default pitch bounds are +/-30 deg with no margin.
    cam.pointer_move(0.0, 10_000.0);
    assert!((cam.pitch() - 30.0f32.to_radians()).abs() < 1e-5);
}

fn collision_camera(colliders: Vec<Collider>) -> OrbitCameraController {
    let config = CameraConfig {
        initial_distance: 10.0,
        ..CameraConfig::default()
    };
    OrbitCameraController::with_colliders(config, fixed_focus(Vec3::ZERO), colliders, 0.25)
}

#[test]
fn camera_is_pulled_in_front_of_obstructions() {
    // Wall slab crossing the view ray at z = 4.
    let wall = Collider::Aabb {
        min: Vec3::new(-5.0, -5.0, 4.0),
        max: Vec3::new(5.0, 5.0, 4.5),
    };
    let cam = collision_camera(vec![wall]);
    // yaw 0, pitch 0 puts the candidate at (0, 0, 10); the hit is at 4.
    let desired = cam.desired_eye();
    assert!((desired.z - 3.75).abs() < 1e-4);
    assert!(desired.distance(Vec3::ZERO) <= 4.0 - 0.25 + 1e-4);
}

#[test]
fn smoothed_eye_never_clips_through_the_obstruction() {
    let wall = Collider::Aabb {
        min: Vec3::new(-5.0, -5.0, 4.0),
        max: Vec3::new(5.0, 5.0, 4.5),
    };
    let mut cam = collision_camera(vec![wall]);
    for _ in 0..500 {
        cam.update();
    }
    assert!(cam.eye().distance(Vec3::ZERO) <= 3.75 + 1e-3);
}

#[test]
fn surfaces_beyond_the_orbit_distance_are_ignored() {
    let far_wall = Collider::Aabb {
        min: Vec3::new(-5.0, -5.0, 40.0),
        max: Vec3::new(5.0, 5.0, 41.0),
    };
    let cam = collision_camera(vec![far_wall]);
    assert!((cam.desired_eye().z - 10.0).abs() < 1e-4);
}

#[test]
fn look_target_is_the_raw_focus_even_when_pulled_in() {
    let wall = Collider::Aabb {
        min: Vec3::new(-5.0, -5.0, 4.0),
        max: Vec3::new(5.0, 5.0, 4.5),
    };
    let focus = Vec3::new(0.0, 1.0, 0.0);
    let config = CameraConfig {
        initial_distance: 10.0,
        initial_pitch: 0.0,
        ..CameraConfig::default()
    };
    let mut cam =
        OrbitCameraController::with_colliders(config, fixed_focus(focus), vec![wall], 0.25);
    cam.update();
    assert_eq!(cam.look_target(), focus);
}

#[test]
fn update_focus_position_pins_the_focus() {
    let mut cam = make_camera(CameraConfig::default());
    let pinned = Vec3::new(5.0, 1.0, -2.0);
    cam.update_focus_position(pinned);
    for _ in 0..400 {
        cam.update();
    }
    assert_eq!(cam.look_target(), pinned);
    // Eye settles on the orbit sphere around the new focus.
    assert!((cam.eye().distance(pinned) - cam.distance()).abs() < 1e-2);
}

#[test]
fn inverted_angle_bounds_fall_back_to_defaults() {
    let config = CameraConfig {
        min_pitch: 50.0,
        max_pitch: -50.0,
        ..CameraConfig::default()
    };
    let mut cam = make_camera(config);
    // The inverted pair is replaced wholesale; a drag clamps against the
    // default +/-30 deg pitch bounds instead of panicking.
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    cam.pointer_move(0.0, 10_000.0);
    assert!((cam.pitch() - 30.0f32.to_radians()).abs() < 1e-5);
}

#[test]
fn inverted_distance_bounds_fall_back_to_defaults() {
    let config = CameraConfig {
        min_distance: 30.0,
        max_distance: 20.0,
        ..CameraConfig::default()
    };
    let mut cam = make_camera(config);
    cam.wheel(1.0e9);
    assert_eq!(cam.distance(), 20.0);
    cam.wheel(-1.0e9);
    assert_eq!(cam.distance(), 2.0);
}

#[test]
fn non_finite_config_fields_fall_back_to_defaults() {
    let config = CameraConfig {
        initial_distance: f32::INFINITY,
        sensitivity: f32::NAN,
        max_pitch: f32::NAN,
        ..CameraConfig::default()
    };
    let mut cam = make_camera(config);
    assert_eq!(cam.distance(), 5.0);
    cam.pointer_down(0.0, 0.0, PointerKind::Mouse(0));
    cam.pointer_move(-10.0, 0.0);
    // Default sensitivity 0.01 applies.
    assert!((cam.yaw() - 0.1).abs() < 1e-6);
}

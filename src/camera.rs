//! Free-flying camera driven by spherical look angles.
//!
//! Orientation is stored as a longitude (`theta`) and an elevation (`phi`),
//! both in degrees. Theta is zero when looking along +X; phi is zero when
//! looking horizontally, negative when looking down. Phi is not
//! clamped: dragging past the poles flips the forward vector.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{InputState, KeyCode, MouseButton};

/// Vertical field of view in radians.
pub const FIELD_OF_VIEW: f32 = std::f32::consts::PI * 0.25;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;
/// Degrees of rotation per pixel of pointer travel while looking.
pub const LOOK_SENSITIVITY: f32 = 0.05;
/// Distance moved per update call with the default [`MoveStep`].
pub const DEFAULT_STEP: f32 = 0.1;

/// How far a held movement key moves the camera on each update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveStep {
    /// Fixed distance per update, independent of frame time. Motion speed
    /// therefore scales with the frame rate.
    PerFrame(f32),
    /// Units per second, multiplied by the elapsed frame time.
    PerSecond(f32),
}

impl MoveStep {
    pub fn distance(self, elapsed: f32) -> f32 {
        match self {
            Self::PerFrame(step) => step,
            Self::PerSecond(speed) => speed * elapsed,
        }
    }
}

impl Default for MoveStep {
    fn default() -> Self {
        Self::PerFrame(DEFAULT_STEP)
    }
}

/// Keys and button that drive the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBindings {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub look: MouseButton,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            up: KeyCode::letter('X'),
            down: KeyCode::letter('Z'),
            left: KeyCode::letter('A'),
            right: KeyCode::letter('D'),
            forward: KeyCode::letter('W'),
            backward: KeyCode::letter('S'),
            look: MouseButton::RIGHT,
        }
    }
}

/// Viewer position and orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Longitude in degrees.
    pub theta: f32,
    /// Elevation in degrees.
    pub phi: f32,
    pub position: Vec3,
    pub last_cursor: Vec2,
    pub bindings: CameraBindings,
    pub step: MoveStep,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: -20.0,
            position: Vec3::new(-10.0, 4.0, 0.0),
            last_cursor: Vec2::ZERO,
            bindings: CameraBindings::default(),
            step: MoveStep::default(),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: MoveStep) -> Self {
        self.step = step;
        self
    }

    /// Perspective projection for a viewport of the given size.
    ///
    /// `height` must be positive; the aspect ratio is `width / height`.
    pub fn projection_matrix(&self, width: f32, height: f32) -> Mat4 {
        debug_assert!(height > 0.0, "viewport height must be positive");
        Mat4::perspective_rh_gl(FIELD_OF_VIEW, width / height, NEAR_PLANE, FAR_PLANE)
    }

    /// Unit vector the camera is looking along.
    pub fn forward(&self) -> Vec3 {
        let theta = self.theta.to_radians();
        let phi = self.phi.to_radians();
        Vec3::new(phi.cos() * theta.cos(), phi.sin(), phi.cos() * theta.sin())
    }

    /// Horizontal strafe axis; ignores elevation.
    pub fn right(&self) -> Vec3 {
        let theta = self.theta.to_radians();
        Vec3::new(-theta.sin(), 0.0, theta.cos())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Integrates one frame of input.
    ///
    /// `elapsed` is the frame time in seconds and only matters for
    /// [`MoveStep::PerSecond`].
    pub fn update(&mut self, input: &InputState, elapsed: f32) {
        let forward = self.forward();
        let right = self.right();
        let up = Vec3::Y;
        let step = self.step.distance(elapsed);
        let bindings = self.bindings;

        let moves = [
            (bindings.up, up),
            (bindings.down, -up),
            (bindings.left, -right),
            (bindings.right, right),
            (bindings.forward, forward),
            (bindings.backward, -forward),
        ];
        for (key, axis) in moves {
            if input.is_key_down(key) {
                self.position += axis * step;
            }
        }

        let cursor = input.mouse_position();
        if input.is_mouse_button_down(bindings.look) {
            let delta = cursor - self.last_cursor;
            self.theta += LOOK_SENSITIVITY * delta.x;
            self.phi -= LOOK_SENSITIVITY * delta.y;
        }
        self.last_cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat3;

    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(basis: Mat3) {
        let cols = [basis.x_axis, basis.y_axis, basis.z_axis];
        for (i, a) in cols.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-4, "column {i} not unit: {a}");
            for b in cols.iter().skip(i + 1) {
                assert!(a.dot(*b).abs() < 1e-4, "columns not perpendicular");
            }
        }
    }

    #[test]
    fn view_basis_is_orthonormal_away_from_poles() {
        let mut camera = Camera::new();
        for theta in [-270.0, -45.0, 0.0, 33.0, 180.0, 725.0] {
            for phi in [-89.0, -20.0, 0.0, 10.0, 60.0, 89.0, 150.0] {
                camera.theta = theta;
                camera.phi = phi;
                assert_orthonormal(Mat3::from_mat4(camera.view_matrix()));
            }
        }
    }

    #[test]
    fn projection_bakes_in_aspect_ratio() {
        let camera = Camera::new();
        for (w, h) in [(1280.0, 720.0), (300.0, 900.0), (1.0, 1.0)] {
            let projection = camera.projection_matrix(w, h);
            let expected = projection.col(1)[1] * (h / w);
            assert!((projection.col(0)[0] - expected).abs() < EPS);
        }
    }

    #[test]
    fn default_projection_at_720p() {
        let camera = Camera::new();
        let projection = camera.projection_matrix(1280.0, 720.0);
        let cot = 1.0 / (22.5f32).to_radians().tan();
        assert!((projection.col(1)[1] - cot).abs() < 1e-4);
        assert!((projection.col(1)[1] - 2.414).abs() < 1e-3);
        assert!((projection.col(0)[0] - cot * 720.0 / 1280.0).abs() < 1e-4);
    }

    #[test]
    fn projection_uses_fixed_clip_planes() {
        let projection = Camera::new().projection_matrix(1280.0, 720.0);
        let near = projection.project_point3(Vec3::new(0.0, 0.0, -NEAR_PLANE));
        let far = projection.project_point3(Vec3::new(0.0, 0.0, -FAR_PLANE));
        assert!((near.z + 1.0).abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn idle_update_changes_nothing() {
        let mut camera = Camera::new();
        let mut input = InputState::new();
        input.set_mouse_position(Vec2::new(300.0, 200.0));
        camera.update(&input, 0.016);
        let before = camera.clone();
        camera.update(&input, 0.016);
        assert_eq!(camera, before);
    }

    #[test]
    fn pointer_moves_without_look_button_do_not_rotate() {
        let mut camera = Camera::new();
        let mut input = InputState::new();
        input.set_mouse_position(Vec2::new(50.0, -20.0));
        camera.update(&input, 0.016);
        assert_eq!(camera.theta, 0.0);
        assert_eq!(camera.phi, -20.0);
        assert_eq!(camera.last_cursor, Vec2::new(50.0, -20.0));
    }

    #[test]
    fn holding_forward_integrates_linearly() {
        let mut camera = Camera::new();
        let start = camera.position;
        let forward = camera.forward();
        let mut input = InputState::new();
        input.set_key_down(camera.bindings.forward);
        let frames = 25;
        for _ in 0..frames {
            camera.update(&input, 0.5);
        }
        let expected = start + forward * DEFAULT_STEP * frames as f32;
        assert!(camera.position.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn strafe_right_moves_along_right_axis() {
        let mut camera = Camera::new();
        camera.theta = 30.0;
        let start = camera.position;
        let mut input = InputState::new();
        input.set_key_down(camera.bindings.right);
        camera.update(&input, 0.0);
        let theta = 30.0f32.to_radians();
        let expected = start + 0.1 * Vec3::new(-theta.sin(), 0.0, theta.cos());
        assert!(camera.position.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn vertical_keys_ignore_orientation() {
        let mut camera = Camera::new();
        camera.theta = 77.0;
        camera.phi = 40.0;
        let start = camera.position;
        let mut input = InputState::new();
        input.set_key_down(camera.bindings.up);
        camera.update(&input, 0.0);
        assert!(camera.position.abs_diff_eq(start + Vec3::Y * DEFAULT_STEP, EPS));
        input.set_key_up(camera.bindings.up);
        input.set_key_down(camera.bindings.down);
        camera.update(&input, 0.0);
        assert!(camera.position.abs_diff_eq(start, EPS));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut camera = Camera::new();
        let start = camera.position;
        let mut input = InputState::new();
        input.set_key_down(camera.bindings.left);
        input.set_key_down(camera.bindings.right);
        input.set_key_down(camera.bindings.forward);
        input.set_key_down(camera.bindings.backward);
        camera.update(&input, 0.0);
        assert!(camera.position.abs_diff_eq(start, EPS));
    }

    #[test]
    fn look_drag_applies_sensitivity_once_per_update() {
        let mut camera = Camera::new();
        let mut input = InputState::new();
        input.set_mouse_position(Vec2::new(100.0, 100.0));
        camera.update(&input, 0.0);

        input.set_mouse_button_down(camera.bindings.look);
        input.set_mouse_position(Vec2::new(140.0, 90.0));
        camera.update(&input, 0.0);
        assert!((camera.theta - 0.05 * 40.0).abs() < EPS);
        assert!((camera.phi - (-20.0 - 0.05 * -10.0)).abs() < EPS);

        // Cursor unchanged: no further rotation.
        camera.update(&input, 0.0);
        assert!((camera.theta - 2.0).abs() < EPS);
        assert!((camera.phi + 19.5).abs() < EPS);
    }

    #[test]
    fn per_second_step_scales_with_elapsed_time() {
        let mut camera = Camera::new().with_step(MoveStep::PerSecond(4.0));
        let start = camera.position;
        let mut input = InputState::new();
        input.set_key_down(camera.bindings.up);
        camera.update(&input, 0.25);
        assert!(camera.position.abs_diff_eq(start + Vec3::Y, EPS));
    }

    // Known edge case: elevation is never clamped, so dragging far enough
    // flips the view over the pole.
    #[test]
    fn elevation_is_unclamped_and_flips_past_the_pole() {
        let mut camera = Camera::new();
        let mut input = InputState::new();
        camera.update(&input, 0.0);
        input.set_mouse_button_down(camera.bindings.look);
        input.set_mouse_position(Vec2::new(0.0, -2400.0));
        camera.update(&input, 0.0);
        assert!((camera.phi - 100.0).abs() < 1e-3);
        assert!(camera.forward().x < 0.0);
    }
}

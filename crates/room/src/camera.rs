use glam::{Mat4, Vec3};
use glassroom_render::{FrameUniforms, UniformValue};

/// Camera orbiting a target point on a sphere of variable radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Around +Y, radians.
    pub yaw: f32,
    /// Elevation, radians; kept strictly inside ±90°.
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 4.0, 0.0),
            distance: 8.0,
            yaw: 0.0,
            pitch: 10.0_f32.to_radians(),
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            sensitivity: 0.002,
            min_distance: 0.1,
            max_distance: 10.0,
        }
    }
}

impl OrbitCamera {
    const PITCH_LIMIT: f32 = 89.0 * (std::f32::consts::PI / 180.0);

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        );
        self.target + offset * self.distance
    }

    /// Rotate by a pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Scale the orbit radius; factors below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor > 0.0 {
            self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// `u_PvMatrix` and `u_Eye` for the current pose.
    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms::from([
            ("u_PvMatrix".to_string(), UniformValue::Mat4(self.view_projection())),
            ("u_Eye".to_string(), UniformValue::Vec3(self.eye())),
        ])
    }
}

use glam::{Mat4, Quat, Vec3, Vec4};

const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 200.0;

/// Camera pose plus perspective parameters.
///
/// The pose is written every scroll tick from the interpolated tour path;
/// picking reads it back to build world rays from pointer coordinates.
/// Looks down -Z in its local frame.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    aspect: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            aspect: aspect.max(1e-3),
        }
    }

    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
    }

    /// Update the projection for a resized viewport.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.aspect = (width / height.max(1.0)).max(1e-3);
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y, self.aspect, Z_NEAR, Z_FAR)
    }

    /// World-space ray through normalized device coordinates
    /// ([-1, 1] per axis, +Y up).
    pub fn screen_ray(&self, ndc_x: f32, ndc_y: f32) -> (Vec3, Vec3) {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let target = far.truncate() / far.w;
        (self.position, (target - self.position).normalize())
    }

    /// Normalized device coordinates of a world point, if it lies in front
    /// of the camera.
    pub fn project(&self, point: Vec3) -> Option<(f32, f32)> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some((clip.x / clip.w, clip.y / clip.w))
    }
}

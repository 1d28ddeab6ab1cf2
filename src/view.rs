use egui::{pos2, Pos2, Rect};
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};

/// Fixed camera orbiting the scene center, z up.
pub struct SceneCamera {
    eye: Point3<f32>,
    target: Point3<f32>,
    fov_y: f32,
}

impl SceneCamera {
    /// Places the eye on an elevation/azimuth orbit around `target`.
    pub fn orbit(target: Point3<f32>, radius: f32, elevation_deg: f32, azimuth_deg: f32) -> Self {
        let elevation = elevation_deg.to_radians();
        let azimuth = azimuth_deg.to_radians();
        let eye = target
            + Vector3::new(
                radius * elevation.cos() * azimuth.cos(),
                radius * elevation.cos() * azimuth.sin(),
                radius * elevation.sin(),
            );
        Self {
            eye,
            target,
            fov_y: 45.0_f32.to_radians(),
        }
    }

    /// One matrix from world space into egui screen points for the given
    /// panel rect.
    pub fn screen_from_world(&self, rect: &Rect) -> Matrix4<f32> {
        let aspect = rect.width() / rect.height();
        let view = Isometry3::look_at_rh(&self.eye, &self.target, &Vector3::z());
        let projection = Perspective3::new(aspect, self.fov_y, 0.01, 100.0);
        Matrix4::new_translation(&Vector3::new(rect.center().x, rect.center().y, 0.0))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(
                0.5 * rect.width(),
                -0.5 * rect.height(),
                1.0,
            ))
            * projection.as_matrix()
            * view.to_homogeneous()
    }

    /// Distance from the eye, used to order faces back to front.
    pub fn depth(&self, point: &Point3<f32>) -> f32 {
        (point - self.eye).norm()
    }
}

/// Projects a world point onto the panel; `None` when it falls behind the
/// camera.
pub fn project(screen_from_world: &Matrix4<f32>, point: &Point3<f32>) -> Option<Pos2> {
    let clip = screen_from_world * point.to_homogeneous();
    if clip.w <= 0.0 {
        return None;
    }
    Some(pos2(clip.x / clip.w, clip.y / clip.w))
}

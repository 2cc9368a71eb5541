//! Transform composition
//!
//! Free functions build pure matrices. The `RenderContext::set_*` methods
//! build the same matrices and fold them into the current lane with
//! `combine_matrix`, so each call applies on top of what is already there.

use super::context::RenderContext;
use super::math::{deg_to_rad, Mat43, Vec3, EPSILON_E6};
use super::plane::Frustum;
use super::types::MatrixMode;
use crate::error::RasterError;

/// World-to-camera matrix for a camera at `eye` looking at `center`.
///
/// The basis is orthonormal, so the matrix is written directly from the
/// basis vectors instead of inverting a camera-to-world matrix.
pub fn look_at_matrix(eye: Vec3, center: Vec3, up: Vec3) -> Result<Mat43, RasterError> {
    // camera looks down -n
    let n = eye - center;
    let u = up.cross(n);
    if u.len() < EPSILON_E6 || n.len() < EPSILON_E6 {
        return Err(RasterError::ParallelLookAt);
    }
    let v = n.cross(u);

    let n = n.normalize();
    let u = u.normalize();
    let v = v.normalize();

    Ok(Mat43::from_array([
        u.x, v.x, n.x,
        u.y, v.y, n.y,
        u.z, v.z, n.z,
        -eye.dot(u), -eye.dot(v), -eye.dot(n),
    ]))
}

/// Scale to normalized device range: `diag(1/tan, aspect/tan, 1)`
pub fn projection_matrix(fovy: f32, aspect: f32) -> Mat43 {
    let inv_tan = 1.0 / deg_to_rad(fovy * 0.5).tan();
    Mat43::from_array([
        inv_tan, 0.0, 0.0,
        0.0, aspect * inv_tan, 0.0,
        0.0, 0.0, 1.0,
        0.0, 0.0, 0.0,
    ])
}

/// Normalized device to pixel coordinates, Y flipped
pub fn viewport_matrix(width: usize, height: usize) -> Mat43 {
    let a = (width as f32 - 1.0) * 0.5;
    let b = (height as f32 - 1.0) * 0.5;
    Mat43::from_array([
        a, 0.0, 0.0,
        0.0, -b, 0.0,
        a, b, 1.0,
        0.0, 0.0, 0.0,
    ])
}

impl RenderContext {
    /// Combine a translation into the current lane
    pub fn set_translation(&mut self, v: Vec3) {
        self.combine_matrix(&Mat43::translation(v));
    }

    /// Combine a rotation of `degrees` about `axis` into the current lane
    pub fn set_rotation(&mut self, axis: Vec3, degrees: f32) {
        self.combine_matrix(&Mat43::rotation(axis, deg_to_rad(degrees)));
    }

    /// Combine a scale into the current lane
    pub fn set_scale(&mut self, v: Vec3) {
        self.combine_matrix(&Mat43::scale(v));
    }

    /// Switch to the model-view lane and combine a world-to-camera matrix.
    /// The context is untouched when `up` is parallel to the view direction.
    pub fn set_look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) -> Result<(), RasterError> {
        let m = look_at_matrix(eye, center, up)?;
        self.set_matrix_mode(MatrixMode::ModelView);
        self.combine_matrix(&m);
        Ok(())
    }

    /// Switch to the projection lane, combine the projection matrix and
    /// rebuild the culling frustum from the same parameters
    pub fn set_projection(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) -> Result<(), RasterError> {
        // validate before touching any state
        Frustum::new(fovy, aspect, near, far)?;
        self.set_matrix_mode(MatrixMode::Projection);
        self.combine_matrix(&projection_matrix(fovy, aspect));
        self.set_frustum(fovy, aspect, near, far)
    }

    /// Switch to the viewport lane, combine the viewport matrix and set the
    /// screen size. The viewport cannot be larger than the pixel buffer.
    pub fn set_viewport(&mut self, width: usize, height: usize) -> Result<(), RasterError> {
        self.set_screen_size(width, height)?;
        self.set_matrix_mode(MatrixMode::Viewport);
        self.combine_matrix(&viewport_matrix(width, height));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 0.001
    }

    #[test]
    fn test_look_at_down_z() {
        let m = look_at_matrix(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UP).unwrap();
        assert!(close(m.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -10.0)));
        assert!(close(m.transform_point(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, -7.0)));
    }

    #[test]
    fn test_look_at_from_side() {
        let m = look_at_matrix(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, Vec3::UP).unwrap();
        // the target is straight ahead
        assert!(close(m.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -10.0)));
        // world -z is to the camera's right
        assert!(m.transform_point(Vec3::new(0.0, 0.0, -1.0)).x > 0.0);
    }

    #[test]
    fn test_look_at_parallel_up_leaves_context() {
        let mut ctx = RenderContext::with_size(8, 8, 32).unwrap();
        ctx.set_matrix_mode(MatrixMode::Texture);
        let r = ctx.set_look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::UP);
        assert_eq!(r, Err(RasterError::ParallelLookAt));
        assert_eq!(ctx.matrix_mode(), MatrixMode::Texture);
        assert_eq!(*ctx.model_view(), Mat43::IDENTITY);
    }

    #[test]
    fn test_projection_updates_frustum() {
        let mut ctx = RenderContext::with_size(8, 8, 32).unwrap();
        ctx.set_projection(60.0, 1.5, -1.5, -50.0).unwrap();
        assert_eq!(ctx.matrix_mode(), MatrixMode::Projection);
        assert_eq!(ctx.fovy(), 60.0);
        assert_eq!(ctx.aspect(), 1.5);
        let inv_tan = 1.0 / deg_to_rad(30.0).tan();
        assert!((ctx.projection().m[0] - inv_tan).abs() < 0.001);
        assert!((ctx.projection().m[4] - 1.5 * inv_tan).abs() < 0.001);
    }

    #[test]
    fn test_bad_projection_changes_nothing() {
        let mut ctx = RenderContext::with_size(8, 8, 32).unwrap();
        assert!(ctx.set_projection(90.0, 1.0, -0.5, -50.0).is_err());
        assert_eq!(ctx.matrix_mode(), MatrixMode::ModelView);
        assert_eq!(*ctx.projection(), Mat43::IDENTITY);
        assert_eq!(ctx.fovy(), 90.0);
    }

    #[test]
    fn test_viewport() {
        let mut ctx = RenderContext::with_size(640, 480, 32).unwrap();
        ctx.set_viewport(320, 240).unwrap();
        assert_eq!(ctx.width(), 320);
        assert_eq!(ctx.height(), 240);
        assert_eq!(ctx.matrix_mode(), MatrixMode::Viewport);
        assert_eq!(ctx.viewport().m[0], 159.5);
        assert_eq!(ctx.viewport().m[4], -119.5);
        assert!(ctx.set_viewport(641, 480).is_err());
        assert_eq!(ctx.width(), 320);
    }

    #[test]
    fn test_set_transforms_compose() {
        let mut ctx = RenderContext::with_size(8, 8, 32).unwrap();
        ctx.set_scale(Vec3::new(2.0, 2.0, 2.0));
        ctx.set_translation(Vec3::new(1.0, 0.0, 0.0));
        ctx.set_rotation(Vec3::UNIT_Z, 90.0);
        // rotate, then translate, then scale
        let p = ctx.model_view().transform_point(Vec3::UNIT_X);
        assert!(close(p, Vec3::new(2.0, 2.0, 0.0)));
    }
}

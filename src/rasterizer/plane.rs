//! Planes and the view frustum used for bounding-sphere culling

use super::math::{deg_to_rad, Vec3, Vec4};
use crate::error::RasterError;

/// Plane `ax + by + cz + d = 0` with a unit normal pointing to the inside
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane through three points. Counter-clockwise winding seen from the
    /// positive side gives the normal.
    pub fn from_points(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let normal = Vec3::plane_normal(p1, p2, p3).normalize();
        Self {
            normal,
            d: -normal.dot(p1),
        }
    }

    /// Signed distance, positive on the normal side
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Coefficients as `(a, b, c, d)`
    pub fn coefficients(&self) -> Vec4 {
        Vec4::new(self.normal.x, self.normal.y, self.normal.z, self.d)
    }
}

/// Six inward-facing planes bounding the camera-space view volume.
///
/// The camera looks down -Z, so `near` and `far` are negative with
/// `far < near`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub near: Plane,
    pub far: Plane,
    pub top: Plane,
    pub bottom: Plane,
    pub left: Plane,
    pub right: Plane,
    fovy: f32,
    aspect: f32,
    z_near: f32,
    z_far: f32,
}

impl Frustum {
    /// Build from vertical field of view (degrees), aspect and clip depths
    pub fn new(fovy: f32, aspect: f32, near: f32, far: f32) -> Result<Self, RasterError> {
        let valid = fovy > 0.0 && fovy < 180.0 && aspect > 0.0 && near < -1.0 && far < near;
        if !valid {
            return Err(RasterError::InvalidFrustum { fovy, aspect, near, far });
        }
        Ok(Self::build(fovy, aspect, near, far))
    }

    fn build(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        let tan_theta = deg_to_rad(fovy * 0.5).tan();

        let hw_near = -near * tan_theta;
        let hh_near = hw_near / aspect;
        let hw_far = -far * tan_theta;
        let hh_far = hw_far / aspect;

        let n_ul = Vec3::new(-hw_near, hh_near, near);
        let n_ur = Vec3::new(hw_near, hh_near, near);
        let n_ll = Vec3::new(-hw_near, -hh_near, near);
        let n_lr = Vec3::new(hw_near, -hh_near, near);

        let f_ul = Vec3::new(-hw_far, hh_far, far);
        let f_ur = Vec3::new(hw_far, hh_far, far);
        let f_ll = Vec3::new(-hw_far, -hh_far, far);
        let f_lr = Vec3::new(hw_far, -hh_far, far);

        Self {
            near: Plane::from_points(n_ul, n_ur, n_ll),
            far: Plane::from_points(f_lr, f_ur, f_ll),
            top: Plane::from_points(f_ul, f_ur, n_ul),
            bottom: Plane::from_points(n_lr, f_lr, n_ll),
            left: Plane::from_points(f_ul, n_ul, f_ll),
            right: Plane::from_points(n_lr, n_ur, f_lr),
            fovy,
            aspect,
            z_near: near,
            z_far: far,
        }
    }

    pub fn planes(&self) -> [&Plane; 6] {
        [&self.near, &self.far, &self.top, &self.bottom, &self.left, &self.right]
    }

    /// Conservative sphere test: the sphere must sit at least `radius`
    /// inside every plane. Spheres in the gap near frustum edges can be
    /// rejected even though part of them is on screen.
    pub fn is_visible(&self, center: Vec3, radius: f32) -> bool {
        debug_assert!(radius > 0.0, "bounding radius must be positive");
        self.planes().iter().all(|p| p.distance(center) >= radius)
    }

    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }
}

impl Default for Frustum {
    /// 90 degree square frustum from z = -2 to z = -100
    fn default() -> Self {
        Self::build(90.0, 1.0, -2.0, -100.0)
    }
}

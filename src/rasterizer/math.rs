//! Vector and matrix math for the transform pipeline
//!
//! Vectors are row vectors: a point is transformed as `v * M`.
//! Matrices are 4x3 affine transforms with an implicit fourth column
//! `[0, 0, 0, 1]`, stored row-major:
//!
//! ```text
//! | 0  1  2 |   linear part
//! | 3  4  5 |
//! | 6  7  8 |
//! | 9 10 11 |   translation
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

pub const EPSILON_E5: f32 = 1.0e-5;
pub const EPSILON_E6: f32 = 1.0e-6;

/// Degrees to radians
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * std::f32::consts::PI / 180.0
}

/// True if `a` is close enough to zero to skip work that depends on it
pub fn is_zero(a: f32) -> bool {
    a.abs() < EPSILON_E5
}

/// Round half up, `floor(f + 0.5)`
pub fn round_to_int(f: f32) -> i32 {
    (f + 0.5).floor() as i32
}

/// 2D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn len_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn len(self) -> f32 {
        self.len_squared().sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).len()
    }

    pub fn normalize(self) -> Vec2 {
        let l = self.len();
        if l == 0.0 {
            return Vec2::ZERO;
        }
        Vec2 {
            x: self.x / l,
            y: self.y / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Component-wise product
    pub fn scale_each(self, s: Vec2) -> Vec2 {
        Vec2 {
            x: self.x * s.x,
            y: self.y * s.y,
        }
    }

    /// Angle between two vectors in radians
    pub fn angle(self, other: Vec2) -> f32 {
        self.normalize().dot(other.normalize()).clamp(-1.0, 1.0).acos()
    }

    pub fn is_zero(self) -> bool {
        is_zero(self.x) && is_zero(self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };
    pub const UP: Vec3 = Vec3::UNIT_Y;

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn len(self) -> f32 {
        self.len_squared().sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).len()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component-wise product (non-uniform scale)
    pub fn scale_each(self, s: Vec3) -> Vec3 {
        Vec3 {
            x: self.x * s.x,
            y: self.y * s.y,
            z: self.z * s.z,
        }
    }

    /// Largest of the three components
    pub fn max_element(self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    /// Angle between two vectors in radians
    pub fn angle(self, other: Vec3) -> f32 {
        self.normalize().dot(other.normalize()).clamp(-1.0, 1.0).acos()
    }

    pub fn is_zero(self) -> bool {
        is_zero(self.x) && is_zero(self.y) && is_zero(self.z)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Unnormalized normal of the plane through three points,
    /// `(p2 - p1) x (p3 - p1)`. Counter-clockwise points give a normal
    /// facing the viewer.
    pub fn plane_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
        (p2 - p1).cross(p3 - p1)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 4D Vector (homogeneous points, plane coefficients)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous point (w = 1)
    pub fn point(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 1.0)
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn scale(self, s: f32) -> Vec4 {
        Vec4::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, o: Vec4) -> Vec4 {
        Vec4::new(self.x + o.x, self.y + o.y, self.z + o.z, self.w + o.w)
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, o: Vec4) -> Vec4 {
        Vec4::new(self.x - o.x, self.y - o.y, self.z - o.z, self.w - o.w)
    }
}

/// 4x3 affine matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat43 {
    pub m: [f32; 12],
}

impl Default for Mat43 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat43 {
    pub const IDENTITY: Mat43 = Mat43 {
        m: [
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
            0.0, 0.0, 0.0,
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_array(m: [f32; 12]) -> Self {
        Self { m }
    }

    /// Translation row
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.m[9], self.m[10], self.m[11])
    }

    /// Determinant of the 3x3 linear block
    pub fn determinant(&self) -> f32 {
        let m = &self.m;
        m[0] * (m[4] * m[8] - m[5] * m[7])
            - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// `self * other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Mat43) -> Mat43 {
        let a = &self.m;
        let b = &other.m;
        Mat43 {
            m: [
                a[0] * b[0] + a[1] * b[3] + a[2] * b[6],
                a[0] * b[1] + a[1] * b[4] + a[2] * b[7],
                a[0] * b[2] + a[1] * b[5] + a[2] * b[8],

                a[3] * b[0] + a[4] * b[3] + a[5] * b[6],
                a[3] * b[1] + a[4] * b[4] + a[5] * b[7],
                a[3] * b[2] + a[4] * b[5] + a[5] * b[8],

                a[6] * b[0] + a[7] * b[3] + a[8] * b[6],
                a[6] * b[1] + a[7] * b[4] + a[8] * b[7],
                a[6] * b[2] + a[7] * b[5] + a[8] * b[8],

                a[9] * b[0] + a[10] * b[3] + a[11] * b[6] + b[9],
                a[9] * b[1] + a[10] * b[4] + a[11] * b[7] + b[10],
                a[9] * b[2] + a[10] * b[5] + a[11] * b[8] + b[11],
            ],
        }
    }

    /// Closed-form affine inverse. The linear block is inverted through its
    /// adjugate; the translation row becomes `-t * inv(linear)`.
    ///
    /// Returns `None` when the linear block is singular (|det| < 1e-6).
    pub fn inverse(&self) -> Option<Mat43> {
        let det = self.determinant();
        if det.abs() < EPSILON_E6 {
            return None;
        }

        let m = &self.m;
        let inv_det = 1.0 / det;
        let mut out = [0.0f32; 12];

        out[0] = (m[4] * m[8] - m[5] * m[7]) * inv_det;
        out[1] = -(m[1] * m[8] - m[2] * m[7]) * inv_det;
        out[2] = (m[1] * m[5] - m[2] * m[4]) * inv_det;

        out[3] = -(m[3] * m[8] - m[5] * m[6]) * inv_det;
        out[4] = (m[0] * m[8] - m[2] * m[6]) * inv_det;
        out[5] = -(m[0] * m[5] - m[2] * m[3]) * inv_det;

        out[6] = (m[3] * m[7] - m[4] * m[6]) * inv_det;
        out[7] = -(m[0] * m[7] - m[1] * m[6]) * inv_det;
        out[8] = (m[0] * m[4] - m[1] * m[3]) * inv_det;

        out[9] = -(m[9] * out[0] + m[10] * out[3] + m[11] * out[6]);
        out[10] = -(m[9] * out[1] + m[10] * out[4] + m[11] * out[7]);
        out[11] = -(m[9] * out[2] + m[10] * out[5] + m[11] * out[8]);

        Some(Mat43 { m: out })
    }

    /// Pure translation by `v`
    pub fn translation(v: Vec3) -> Mat43 {
        Mat43 {
            m: [
                1.0, 0.0, 0.0,
                0.0, 1.0, 0.0,
                0.0, 0.0, 1.0,
                v.x, v.y, v.z,
            ],
        }
    }

    /// Rotation of `radians` about `axis` through the origin (Rodrigues).
    ///
    /// Returns `None` for a zero-length axis.
    pub fn try_rotation(axis: Vec3, radians: f32) -> Option<Mat43> {
        let length = axis.len();
        if length < EPSILON_E6 {
            return None;
        }

        let n = axis.scale(1.0 / length);
        let s = radians.sin();
        let c = radians.cos();
        let t = 1.0 - c;

        let (xx, yy, zz) = (n.x * n.x, n.y * n.y, n.z * n.z);
        let (xy, xz, yz) = (n.x * n.y, n.x * n.z, n.y * n.z);
        let (xs, ys, zs) = (n.x * s, n.y * s, n.z * s);

        Some(Mat43 {
            m: [
                xx * t + c,  xy * t + zs, xz * t - ys,
                xy * t - zs, yy * t + c,  yz * t + xs,
                xz * t + ys, yz * t - xs, zz * t + c,
                0.0, 0.0, 0.0,
            ],
        })
    }

    /// Like [`Mat43::try_rotation`], falling back to identity for a zero axis.
    pub fn rotation(axis: Vec3, radians: f32) -> Mat43 {
        Self::try_rotation(axis, radians).unwrap_or_else(|| {
            log::warn!("rotation axis is a zero vector, using identity");
            Mat43::IDENTITY
        })
    }

    /// Non-uniform scale along the cardinal axes
    pub fn scale(v: Vec3) -> Mat43 {
        Mat43 {
            m: [
                v.x, 0.0, 0.0,
                0.0, v.y, 0.0,
                0.0, 0.0, v.z,
                0.0, 0.0, 0.0,
            ],
        }
    }

    /// Transform a point (implicit w = 1)
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: v.x * m[0] + v.y * m[3] + v.z * m[6] + m[9],
            y: v.x * m[1] + v.y * m[4] + v.z * m[7] + m[10],
            z: v.x * m[2] + v.y * m[5] + v.z * m[8] + m[11],
        }
    }

    /// Transform a homogeneous vector; `w` passes through unchanged
    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4 {
            x: v.x * m[0] + v.y * m[3] + v.z * m[6] + v.w * m[9],
            y: v.x * m[1] + v.y * m[4] + v.z * m[7] + v.w * m[10],
            z: v.x * m[2] + v.y * m[5] + v.z * m[8] + v.w * m[11],
            w: v.w,
        }
    }

    /// Element-wise comparison within `eps`
    pub fn approx_eq(&self, other: &Mat43, eps: f32) -> bool {
        self.m.iter().zip(other.m.iter()).all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Mat43 {
    type Output = Mat43;
    fn mul(self, other: Mat43) -> Mat43 {
        self.multiply(&other)
    }
}

impl fmt::Display for Mat43 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.m.chunks(3) {
            writeln!(f, "| {:12.6} {:12.6} {:12.6} |", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

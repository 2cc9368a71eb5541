//! Shared triangle meshes
//!
//! A `Model` is immutable once built. Objects hold it through an `Arc` and
//! keep their own transformed copies of its vertices.

use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::error::LoadError;
use crate::rasterizer::Vec3;

/// One mesh triangle: three vertex indices plus an attribute tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshTriangle {
    pub indices: [usize; 3],
    #[serde(default)]
    pub attr: u32,
}

impl MeshTriangle {
    pub fn new(i0: usize, i1: usize, i2: usize) -> Self {
        Self {
            indices: [i0, i1, i2],
            attr: 0,
        }
    }

    pub fn with_attr(i0: usize, i1: usize, i2: usize, attr: u32) -> Self {
        Self {
            indices: [i0, i1, i2],
            attr,
        }
    }
}

/// Immutable mesh with a bounding radius about its local origin
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    radius: f32,
    vertices: Vec<Vec3>,
    triangles: Vec<MeshTriangle>,
}

impl Model {
    /// Build a model, checking every triangle index against the vertex list
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, triangles: Vec<MeshTriangle>) -> Result<Self, LoadError> {
        let name = name.into();
        for (t, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(LoadError::IndexOutOfRange {
                    name,
                    triangle: t,
                    index,
                    count: vertices.len(),
                });
            }
        }

        // farthest vertex from the local origin
        let radius = vertices
            .iter()
            .map(|v| v.len_squared())
            .fold(0.0f32, f32::max)
            .sqrt();

        Ok(Self { name, radius, vertices, triangles })
    }

    pub fn into_shared(self) -> Arc<Model> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[MeshTriangle] {
        &self.triangles
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Cube spanning -half..half on every axis, 12 counter-clockwise
    /// outward-facing triangles
    pub fn cube(half: f32) -> Self {
        let h = half;
        let vertices = vec![
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
        ];
        let faces: [[usize; 3]; 12] = [
            // front
            [0, 1, 2], [0, 2, 3],
            // back
            [5, 4, 7], [5, 7, 6],
            // right
            [1, 5, 6], [1, 6, 2],
            // left
            [4, 0, 3], [4, 3, 7],
            // top
            [3, 2, 6], [3, 6, 7],
            // bottom
            [4, 5, 1], [4, 1, 0],
        ];
        let triangles = faces
            .iter()
            .map(|f| MeshTriangle::new(f[0], f[1], f[2]))
            .collect();

        Self {
            name: "cube".to_string(),
            radius: (3.0 * h * h).sqrt(),
            vertices,
            triangles,
        }
    }

    /// Square-based pyramid with its apex on +Y
    pub fn pyramid(half: f32, height: f32) -> Self {
        let h = half;
        let vertices = vec![
            Vec3::new(-h, 0.0, h),
            Vec3::new(h, 0.0, h),
            Vec3::new(h, 0.0, -h),
            Vec3::new(-h, 0.0, -h),
            Vec3::new(0.0, height, 0.0),
        ];
        let triangles = vec![
            MeshTriangle::new(0, 1, 4),
            MeshTriangle::new(1, 2, 4),
            MeshTriangle::new(2, 3, 4),
            MeshTriangle::new(3, 0, 4),
            MeshTriangle::new(0, 3, 2),
            MeshTriangle::new(0, 2, 1),
        ];
        let radius = (2.0 * h * h).sqrt().max(height);
        Self {
            name: "pyramid".to_string(),
            radius,
            vertices,
            triangles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_radius() {
        let m = Model::new(
            "tri",
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 4.0), Vec3::new(-2.0, 0.0, 0.0)],
            vec![MeshTriangle::new(0, 1, 2)],
        )
        .unwrap();
        assert!((m.radius() - 5.0).abs() < 0.001);
        assert_eq!(m.num_triangles(), 1);
        assert_eq!(m.name(), "tri");
    }

    #[test]
    fn test_model_rejects_bad_index() {
        let err = Model::new("bad", vec![Vec3::ZERO; 3], vec![MeshTriangle::new(0, 1, 3)]).unwrap_err();
        assert!(matches!(err, LoadError::IndexOutOfRange { index: 3, count: 3, .. }));
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Model::cube(1.0);
        assert_eq!(cube.num_vertices(), 8);
        assert_eq!(cube.num_triangles(), 12);
        assert!((cube.radius() - 3.0f32.sqrt()).abs() < 0.001);
        let v = cube.vertices();
        for tri in cube.triangles() {
            let [a, b, c] = tri.indices;
            let n = Vec3::plane_normal(v[a], v[b], v[c]);
            let center = (v[a] + v[b] + v[c]).scale(1.0 / 3.0);
            assert!(n.dot(center) > 0.0);
        }
    }

    #[test]
    fn test_pyramid_faces_point_outward() {
        let p = Model::pyramid(1.0, 2.0);
        let v = p.vertices();
        let inside = Vec3::new(0.0, 0.5, 0.0);
        for tri in p.triangles() {
            let [a, b, c] = tri.indices;
            let n = Vec3::plane_normal(v[a], v[b], v[c]);
            assert!(n.dot(v[a] - inside) > 0.0);
        }
    }
}

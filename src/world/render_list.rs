//! Per-frame render list of self-contained triangles
//!
//! Triangles own copies of their vertices so the list can be transformed
//! in place without touching source meshes. The list records which space
//! its vertices are in, so each pass runs at most once per frame.

use serde::{Serialize, Deserialize};

use crate::error::RasterError;
use crate::rasterizer::{deg_to_rad, round_to_int, Point2i, RasterMode, RenderContext, Vec3};

/// Coordinate space of the vertices currently held by a render list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Space {
    Local,
    Camera,
    Projection,
    Screen,
}

/// Triangle with its own vertex copies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndieTriangle {
    pub vertices: [Vec3; 3],
    pub attr: u32,
}

impl IndieTriangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            vertices: [a, b, c],
            attr: 0,
        }
    }

    pub fn with_attr(a: Vec3, b: Vec3, c: Vec3, attr: u32) -> Self {
        Self {
            vertices: [a, b, c],
            attr,
        }
    }

    /// Rounded screen positions, `None` if any coordinate is not finite
    fn screen_points(&self) -> Option<[Point2i; 3]> {
        if !self.vertices.iter().all(|v| v.is_finite()) {
            return None;
        }
        let p = |v: Vec3| Point2i::new(round_to_int(v.x), round_to_int(v.y));
        Some([p(self.vertices[0]), p(self.vertices[1]), p(self.vertices[2])])
    }
}

/// Counts from one `RenderList::draw` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub drawn: usize,
    pub skipped: usize,
}

/// Fixed-capacity triangle list, reset every frame
#[derive(Debug, Clone)]
pub struct RenderList {
    triangles: Vec<IndieTriangle>,
    capacity: usize,
    space: Space,
    dropped: usize,
}

impl RenderList {
    pub const DEFAULT_CAPACITY: usize = 32768;

    /// Empty list holding vertices in `space`
    pub fn new(capacity: usize, space: Space) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
            space,
            dropped: 0,
        }
    }

    /// Empty the list and set the space of the triangles that will be pushed
    pub fn reset(&mut self, space: Space) {
        self.triangles.clear();
        self.space = space;
        self.dropped = 0;
    }

    /// Append a triangle. A full list drops it, counts the drop and
    /// returns `RenderListFull`.
    pub fn push(&mut self, tri: IndieTriangle) -> Result<(), RasterError> {
        if self.triangles.len() >= self.capacity {
            if self.dropped == 0 {
                log::warn!("render list full at {} triangles, dropping the rest of this frame", self.capacity);
            }
            self.dropped += 1;
            return Err(RasterError::RenderListFull { capacity: self.capacity });
        }
        self.triangles.push(tri);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Triangles rejected since the last reset because the list was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn triangles(&self) -> &[IndieTriangle] {
        &self.triangles
    }

    fn expect_space(&self, expected: Space) -> Result<(), RasterError> {
        if self.space != expected {
            return Err(RasterError::WrongSpace { expected, found: self.space });
        }
        Ok(())
    }

    fn for_each_vertex(&mut self, mut f: impl FnMut(&mut Vec3)) {
        for tri in &mut self.triangles {
            for v in &mut tri.vertices {
                f(v);
            }
        }
    }

    /// Local to camera space through the current model-view matrix.
    /// Lists that are already in camera space are left alone.
    pub fn to_camera(&mut self, ctx: &RenderContext) -> Result<(), RasterError> {
        if self.space == Space::Camera {
            log::debug!("render list already in camera space, skipping local-to-camera pass");
            return Ok(());
        }
        self.expect_space(Space::Local)?;

        let model_view = *ctx.model_view();
        self.for_each_vertex(|v| *v = model_view.transform_point(*v));
        self.space = Space::Camera;
        Ok(())
    }

    /// Perspective divide. The camera looks down -Z; a vertex with z = 0
    /// produces non-finite coordinates that `draw` later skips.
    pub fn to_projection(&mut self, ctx: &RenderContext) -> Result<(), RasterError> {
        self.expect_space(Space::Camera)?;

        let inv_tan = 1.0 / deg_to_rad(ctx.fovy() * 0.5).tan();
        let aspect = ctx.aspect();
        self.for_each_vertex(|v| {
            v.x = -v.x * inv_tan / v.z;
            v.y = -v.y * inv_tan * aspect / v.z;
        });
        self.space = Space::Projection;
        Ok(())
    }

    /// Projection to pixel coordinates with Y growing downward
    pub fn to_screen(&mut self, ctx: &RenderContext) -> Result<(), RasterError> {
        self.expect_space(Space::Projection)?;

        let alpha = (ctx.width() as f32 - 1.0) * 0.5;
        let beta = (ctx.height() as f32 - 1.0) * 0.5;
        self.for_each_vertex(|v| {
            v.x = v.x * alpha + alpha;
            v.y = beta - v.y * beta;
        });
        self.space = Space::Screen;
        Ok(())
    }

    /// Run every remaining pass up to screen space
    pub fn to_screen_from_any(&mut self, ctx: &RenderContext) -> Result<(), RasterError> {
        if self.space == Space::Local {
            self.to_camera(ctx)?;
        }
        if self.space == Space::Camera {
            self.to_projection(ctx)?;
        }
        if self.space == Space::Projection {
            self.to_screen(ctx)?;
        }
        Ok(())
    }

    /// Rasterize every triangle in painter's order. Nothing is clipped, so
    /// a triangle with a vertex off screen is skipped and counted.
    pub fn draw(&self, ctx: &mut RenderContext, mode: RasterMode) -> Result<DrawStats, RasterError> {
        self.expect_space(Space::Screen)?;

        let mut stats = DrawStats::default();
        for tri in &self.triangles {
            let Some(points) = tri.screen_points() else {
                stats.skipped += 1;
                continue;
            };
            match ctx.draw_triangle(mode, points) {
                Ok(()) => stats.drawn += 1,
                Err(RasterError::OutOfBounds { .. }) => stats.skipped += 1,
                Err(e) => return Err(e),
            }
        }
        if stats.skipped > 0 {
            log::warn!("skipped {} of {} triangles outside the screen", stats.skipped, self.triangles.len());
        }
        Ok(stats)
    }
}

impl Default for RenderList {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Space::Camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{Color, MatrixMode};

    fn tri() -> IndieTriangle {
        IndieTriangle::new(Vec3::ZERO, Vec3::UNIT_X, Vec3::UNIT_Y)
    }

    #[test]
    fn test_count_and_reset() {
        let mut rl = RenderList::new(100, Space::Local);
        for _ in 0..37 {
            rl.push(tri()).unwrap();
        }
        assert_eq!(rl.len(), 37);
        rl.reset(Space::Camera);
        assert_eq!(rl.len(), 0);
        assert!(rl.is_empty());
        assert_eq!(rl.space(), Space::Camera);
    }

    #[test]
    fn test_overflow_is_counted() {
        let mut rl = RenderList::new(4, Space::Local);
        for _ in 0..4 {
            rl.push(tri()).unwrap();
        }
        assert_eq!(rl.push(tri()), Err(RasterError::RenderListFull { capacity: 4 }));
        assert_eq!(rl.push(tri()), Err(RasterError::RenderListFull { capacity: 4 }));
        assert_eq!(rl.len(), 4);
        assert_eq!(rl.dropped(), 2);
        rl.reset(Space::Local);
        assert_eq!(rl.dropped(), 0);
    }

    #[test]
    fn test_default_capacity_overflow() {
        let mut rl = RenderList::default();
        for _ in 0..RenderList::DEFAULT_CAPACITY {
            rl.push(tri()).unwrap();
        }
        assert!(rl.push(tri()).is_err());
        assert_eq!(rl.len(), 32768);
    }

    #[test]
    fn test_passes_run_in_order() {
        let mut ctx = RenderContext::with_size(64, 64, 32).unwrap();
        let mut rl = RenderList::new(8, Space::Camera);
        rl.push(tri()).unwrap();

        assert!(matches!(rl.to_screen(&ctx), Err(RasterError::WrongSpace { .. })));
        assert!(matches!(rl.draw(&mut ctx, RasterMode::Wire), Err(RasterError::WrongSpace { .. })));

        // camera-space lists skip the local pass
        let before = rl.triangles()[0];
        rl.to_camera(&ctx).unwrap();
        assert_eq!(rl.triangles()[0], before);

        rl.to_projection(&ctx).unwrap();
        assert_eq!(rl.space(), Space::Projection);
        assert!(rl.to_projection(&ctx).is_err());
        assert!(rl.to_camera(&ctx).is_err());
    }

    #[test]
    fn test_local_pass_uses_model_view() {
        let mut ctx = RenderContext::with_size(64, 64, 32).unwrap();
        ctx.set_matrix_mode(MatrixMode::ModelView);
        ctx.set_translation(Vec3::new(0.0, 0.0, -5.0));
        let mut rl = RenderList::new(8, Space::Local);
        rl.push(tri()).unwrap();
        rl.to_camera(&ctx).unwrap();
        assert_eq!(rl.triangles()[0].vertices[1], Vec3::new(1.0, 0.0, -5.0));
        assert_eq!(rl.space(), Space::Camera);
    }

    #[test]
    fn test_projection_and_screen_formulas() {
        let mut ctx = RenderContext::with_size(101, 51, 32).unwrap();
        ctx.set_viewport(101, 51).unwrap();
        let mut rl = RenderList::new(8, Space::Camera);
        rl.push(IndieTriangle::new(
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::new(2.0, 0.0, -4.0),
            Vec3::new(0.0, -1.0, -2.0),
        ))
        .unwrap();

        // fovy 90, aspect 1 from the default frustum
        rl.to_projection(&ctx).unwrap();
        let v = rl.triangles()[0].vertices;
        assert!((v[1].x - 0.5).abs() < 0.001);
        assert!((v[2].y + 0.5).abs() < 0.001);

        rl.to_screen(&ctx).unwrap();
        let v = rl.triangles()[0].vertices;
        assert!((v[0].x - 50.0).abs() < 0.001);
        assert!((v[0].y - 25.0).abs() < 0.001);
        assert!((v[1].x - 75.0).abs() < 0.001);
        assert!((v[2].y - 37.5).abs() < 0.001);
    }

    #[test]
    fn test_draw_skips_offscreen_and_nonfinite() {
        let mut ctx = RenderContext::with_size(32, 32, 32).unwrap();
        ctx.set_draw_color(Color::RED);
        let mut rl = RenderList::new(8, Space::Projection);
        // on screen
        rl.push(IndieTriangle::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, -0.5, 0.0)))
            .unwrap();
        // off screen
        rl.push(IndieTriangle::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0)))
            .unwrap();
        // z = 0 divide
        rl.push(IndieTriangle::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO, Vec3::UNIT_Y)).unwrap();
        rl.to_screen(&ctx).unwrap();

        let stats = rl.draw(&mut ctx, RasterMode::Fill).unwrap();
        assert_eq!(stats, DrawStats { drawn: 1, skipped: 2 });
        // center of the screen is inside the first triangle
        assert_eq!(ctx.pixel(15, 16), Some(Color::RED));
    }
}

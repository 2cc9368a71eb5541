//! Placed instances of shared models
//!
//! An `Object` pairs an `Arc<Model>` with a position, an orientation in
//! degrees and a scale. It owns the scratch buffer its vertices are
//! transformed into, so any number of objects may share one model.

use std::sync::Arc;

use crate::error::RasterError;
use crate::rasterizer::{deg_to_rad, is_zero, Capability, Mat43, RenderContext, Vec3};
use super::model::Model;
use super::render_list::{IndieTriangle, RenderList, Space};

/// Per-frame state of one mesh triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangleState {
    #[default]
    Active,
    Clipped,
    Backface,
}

/// Yaw, then pitch, then roll: `R = Rz * Rx * Ry`, skipping axes whose
/// angle is effectively zero
fn rotation_yxz(degrees: Vec3) -> Mat43 {
    let mut rotation = Mat43::IDENTITY;
    for (angle, axis) in [(degrees.y, Vec3::UNIT_Y), (degrees.x, Vec3::UNIT_X), (degrees.z, Vec3::UNIT_Z)] {
        if !is_zero(angle) {
            rotation = Mat43::rotation(axis, deg_to_rad(angle)) * rotation;
        }
    }
    rotation
}

/// Result of one `Object::draw` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectDraw {
    pub culled: bool,
    pub backfaces: usize,
    pub inserted: usize,
}

/// Model instance in the world
#[derive(Debug, Clone)]
pub struct Object {
    name: String,
    model: Arc<Model>,

    position: Vec3,
    orientation: Vec3,
    base_scale: Vec3,

    translation: Vec3,
    rotation: Mat43,
    scale: Vec3,
    radius: f32,

    culled: bool,
    working: Vec<Vec3>,
    states: Vec<TriangleState>,
}

impl Object {
    /// Place `model` at `position`, rotated by `orientation` degrees
    /// (applied yaw, pitch, roll) and scaled per axis
    pub fn new(model: Arc<Model>, position: Vec3, orientation: Vec3, scale: Vec3) -> Self {
        let working = model.vertices().to_vec();
        let states = vec![TriangleState::Active; model.num_triangles()];
        Self {
            name: model.name().to_string(),
            radius: model.radius() * scale.max_element(),
            model,
            position,
            orientation,
            base_scale: scale,
            translation: position,
            rotation: rotation_yxz(orientation),
            scale,
            culled: false,
            working,
            states,
        }
    }

    /// Unrotated, unit-scale instance
    pub fn at(model: Arc<Model>, position: Vec3) -> Self {
        Self::new(model, position, Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Move to `position + delta`. Calls do not accumulate.
    pub fn translate(&mut self, delta: Vec3) {
        self.translation = self.position + delta;
    }

    /// Rebuild the rotation from `orientation + delta` degrees. Calls do
    /// not accumulate, and a zero delta keeps the current rotation.
    pub fn rotate(&mut self, delta: Vec3) {
        if delta.is_zero() {
            return;
        }
        self.rotation = rotation_yxz(self.orientation + delta);
    }

    /// Rebuild the rotation from the placement orientation alone
    pub fn reset_rotation(&mut self) {
        self.rotation = rotation_yxz(self.orientation);
    }

    /// Multiply the working scale per axis and grow the bounding radius
    /// to match
    pub fn scale(&mut self, factors: Vec3) {
        self.scale = self.scale.scale_each(factors);
        self.radius = self.model.radius() * self.scale.max_element();
    }

    /// Set the working scale back to the scale given at creation
    pub fn reset_scale(&mut self) {
        self.scale = self.base_scale;
        self.radius = self.model.radius() * self.scale.max_element();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current world position, base position plus the last translate
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    pub fn rotation(&self) -> &Mat43 {
        &self.rotation
    }

    pub fn current_scale(&self) -> Vec3 {
        self.scale
    }

    /// World-space bounding radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_culled(&self) -> bool {
        self.culled
    }

    /// Camera-space vertices from the last draw
    pub fn working_vertices(&self) -> &[Vec3] {
        &self.working
    }

    pub fn triangle_states(&self) -> &[TriangleState] {
        &self.states
    }

    fn reset_state(&mut self) {
        self.culled = false;
        self.states.fill(TriangleState::Active);
    }

    fn cull(&mut self, ctx: &RenderContext) {
        let center = ctx.model_view().transform_point(self.translation);
        if !ctx.is_visible(center, self.radius) {
            self.culled = true;
        }
    }

    /// Scale, rotate and translate each vertex, then apply the model-view
    fn transform_to_camera(&mut self, ctx: &RenderContext) {
        let model_view = ctx.model_view();
        for (out, v) in self.working.iter_mut().zip(self.model.vertices()) {
            let world = self.rotation.transform_point(v.scale_each(self.scale)) + self.translation;
            *out = model_view.transform_point(world);
        }
    }

    /// Mark triangles facing away from the camera at the origin
    fn cull_backfaces(&mut self) -> usize {
        let mut count = 0;
        for (tri, state) in self.model.triangles().iter().zip(self.states.iter_mut()) {
            if *state != TriangleState::Active {
                continue;
            }
            let [a, b, c] = tri.indices.map(|i| self.working[i]);
            let normal = Vec3::plane_normal(a, b, c);
            if normal.dot(-a) <= 0.0 {
                *state = TriangleState::Backface;
                count += 1;
            }
        }
        count
    }

    fn insert(&self, list: &mut RenderList) -> usize {
        let mut inserted = 0;
        for (tri, state) in self.model.triangles().iter().zip(&self.states) {
            if *state != TriangleState::Active {
                continue;
            }
            let [a, b, c] = tri.indices.map(|i| self.working[i]);
            // a full list counts every rejected triangle in `dropped`
            if list.push(IndieTriangle::with_attr(a, b, c, tri.attr)).is_ok() {
                inserted += 1;
            }
        }
        inserted
    }

    /// Cull, transform to camera space and append the surviving triangles
    /// to `list`.
    ///
    /// The list must be in camera space. Object culling and back-face
    /// culling follow the context's capability flags. Triangles past the
    /// list capacity are dropped and show up in `RenderList::dropped`.
    pub fn draw(&mut self, ctx: &RenderContext, list: &mut RenderList) -> Result<ObjectDraw, RasterError> {
        if list.space() != Space::Camera {
            return Err(RasterError::WrongSpace { expected: Space::Camera, found: list.space() });
        }

        self.reset_state();

        if ctx.is_enabled(Capability::ObjectCulling) {
            self.cull(ctx);
            if self.culled {
                log::trace!("object '{}' culled", self.name);
                return Ok(ObjectDraw { culled: true, ..Default::default() });
            }
        }

        self.transform_to_camera(ctx);

        let backfaces = if ctx.is_enabled(Capability::FaceCulling) {
            self.cull_backfaces()
        } else {
            0
        };

        let inserted = self.insert(list);
        Ok(ObjectDraw { culled: false, backfaces, inserted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::MatrixMode;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 0.001
    }

    fn camera_ctx() -> RenderContext {
        let mut ctx = RenderContext::with_size(640, 480, 32).unwrap();
        ctx.set_matrix_mode(MatrixMode::ModelView);
        ctx.load_identity();
        ctx.set_look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UP).unwrap();
        ctx
    }

    #[test]
    fn test_radius_uses_largest_scale() {
        let cube = Model::cube(1.0).into_shared();
        let obj = Object::new(cube, Vec3::ZERO, Vec3::ZERO, Vec3::new(1.0, 3.0, 2.0));
        assert!((obj.radius() - 3.0 * 3.0f32.sqrt()).abs() < 0.001);
    }

    #[test]
    fn test_rotation_order() {
        let cube = Model::cube(1.0).into_shared();
        let obj = Object::new(cube, Vec3::ZERO, Vec3::new(30.0, 45.0, 60.0), Vec3::new(1.0, 1.0, 1.0));
        let ry = Mat43::rotation(Vec3::UNIT_Y, deg_to_rad(45.0));
        let rx = Mat43::rotation(Vec3::UNIT_X, deg_to_rad(30.0));
        let rz = Mat43::rotation(Vec3::UNIT_Z, deg_to_rad(60.0));
        assert!(obj.rotation().approx_eq(&(rz * rx * ry), 1e-5));
    }

    #[test]
    fn test_translate_and_rotate_do_not_accumulate() {
        let cube = Model::cube(1.0).into_shared();
        let mut obj = Object::new(cube, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        obj.translate(Vec3::new(0.0, 2.0, 0.0));
        obj.translate(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(obj.translation(), Vec3::new(1.0, 2.0, 0.0));

        obj.rotate(Vec3::new(0.0, 80.0, 0.0));
        obj.rotate(Vec3::new(0.0, 80.0, 0.0));
        let p = obj.rotation().transform_point(Vec3::UNIT_X);
        assert!(close(p, Vec3::new(0.0, 0.0, -1.0)));

        let before = *obj.rotation();
        obj.rotate(Vec3::ZERO);
        assert_eq!(*obj.rotation(), before);
    }

    #[test]
    fn test_reset_rotation_returns_to_orientation() {
        let cube = Model::cube(1.0).into_shared();
        let mut obj = Object::new(cube, Vec3::ZERO, Vec3::new(0.0, 90.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let placed = *obj.rotation();
        obj.rotate(Vec3::new(0.0, 5.0, 0.0));
        assert!(!obj.rotation().approx_eq(&placed, 1e-5));
        obj.reset_rotation();
        assert!(obj.rotation().approx_eq(&placed, 1e-6));
    }

    #[test]
    fn test_scale_accumulates() {
        let cube = Model::cube(1.0).into_shared();
        let mut obj = Object::at(cube, Vec3::ZERO);
        obj.scale(Vec3::new(2.0, 1.0, 1.0));
        obj.scale(Vec3::new(2.0, 1.0, 1.0));
        assert_eq!(obj.current_scale(), Vec3::new(4.0, 1.0, 1.0));
        assert!((obj.radius() - 4.0 * 3.0f32.sqrt()).abs() < 0.001);
        obj.reset_scale();
        assert_eq!(obj.current_scale(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_draw_cube_with_face_culling() {
        let mut ctx = camera_ctx();
        ctx.enable(Capability::FaceCulling);
        let mut obj = Object::at(Model::cube(1.0).into_shared(), Vec3::ZERO);
        let mut list = RenderList::default();

        let result = obj.draw(&ctx, &mut list).unwrap();
        assert_eq!(result, ObjectDraw { culled: false, backfaces: 10, inserted: 2 });
        assert_eq!(list.len(), 2);
        // only the front face (z = 1, camera z = -9) survives
        for tri in list.triangles() {
            for v in tri.vertices {
                assert!((v.z + 9.0).abs() < 0.001);
            }
        }
    }

    #[test]
    fn test_draw_without_culling_inserts_everything() {
        let ctx = camera_ctx();
        let mut obj = Object::at(Model::cube(1.0).into_shared(), Vec3::ZERO);
        let mut list = RenderList::default();
        let result = obj.draw(&ctx, &mut list).unwrap();
        assert_eq!(result.inserted, 12);
        assert!(close(obj.working_vertices()[0], Vec3::new(-1.0, -1.0, -9.0)));
    }

    #[test]
    fn test_object_culling() {
        let mut ctx = camera_ctx();
        ctx.enable(Capability::ObjectCulling);
        let model = Model::cube(1.0).into_shared();
        let mut list = RenderList::default();

        let mut visible = Object::at(model.clone(), Vec3::ZERO);
        assert!(!visible.draw(&ctx, &mut list).unwrap().culled);

        let mut behind = Object::at(model.clone(), Vec3::new(0.0, 0.0, 20.0));
        let result = behind.draw(&ctx, &mut list).unwrap();
        assert!(result.culled);
        assert!(behind.is_culled());
        assert_eq!(list.len(), 12);

        // moving it back into view un-culls it on the next draw
        behind.translate(Vec3::new(0.0, 0.0, -20.0));
        assert!(!behind.draw(&ctx, &mut list).unwrap().culled);
    }

    #[test]
    fn test_objects_sharing_a_model_keep_their_own_vertices() {
        let ctx = camera_ctx();
        let model = Model::cube(1.0).into_shared();
        let mut a = Object::at(model.clone(), Vec3::new(-3.0, 0.0, 0.0));
        let mut b = Object::at(model.clone(), Vec3::new(3.0, 0.0, 0.0));
        let mut list = RenderList::default();
        a.draw(&ctx, &mut list).unwrap();
        b.draw(&ctx, &mut list).unwrap();
        assert!(a.working_vertices()[0].x < 0.0);
        assert!(b.working_vertices()[0].x > 0.0);
        assert!(list.triangles()[0].vertices[0].x < 0.0);
        assert!(list.triangles()[12].vertices[0].x > 0.0);
    }

    #[test]
    fn test_full_list_counts_every_dropped_triangle() {
        let ctx = camera_ctx();
        let mut obj = Object::at(Model::cube(1.0).into_shared(), Vec3::ZERO);
        let mut list = RenderList::new(4, Space::Camera);
        let result = obj.draw(&ctx, &mut list).unwrap();
        assert_eq!(result.inserted, 4);
        assert_eq!(list.len(), 4);
        assert_eq!(list.dropped(), 8);
    }

    #[test]
    fn test_draw_needs_camera_space_list() {
        let ctx = camera_ctx();
        let mut obj = Object::at(Model::cube(1.0).into_shared(), Vec3::ZERO);
        let mut list = RenderList::new(16, Space::Local);
        assert!(obj.draw(&ctx, &mut list).is_err());
    }
}

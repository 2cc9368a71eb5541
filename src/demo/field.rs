//! Drive a tank across a field of markers and towers
//!
//! The marker grid is generated here; towers and the player tank come
//! from `scenes/field.ron`. Every marker shares one model. The player is
//! drawn in camera space on its own pushed model-view matrix so it stays
//! in front of the camera while the world moves.

use crate::error::{LoadError, RasterError};
use crate::rasterizer::{deg_to_rad, is_zero, Capability, Color, MatrixMode, RenderContext, Vec3};
use crate::world::{load_scene, Object, RenderList, Scene, Space};
use super::{finish_frame, Demo, DemoOptions, FrameInput, FrameStats};

const MARKERS_PER_SIDE: usize = 21;
const GRID_SIZE: f32 = 500.0;
const FIELD_RADIUS: f32 = (MARKERS_PER_SIDE - 1) as f32 * GRID_SIZE * 0.5;
const MARKER_SCALE: f32 = 5.0;
const PLAYER_SPEED: f32 = 300.0;
const VIEW_TURN_SPEED: f32 = 50.0;
const LEAN_SPEED: f32 = 30.0;
const LEAN_RECOVER: f32 = 10.0;
const MAX_LEAN: f32 = 15.0;

pub struct FieldDemo {
    options: DemoOptions,
    list: RenderList,
    scene: Option<Scene>,
    markers: Vec<Object>,
    player: Option<Object>,
    cam: Vec3,
    view_angle: f32,
    lean: f32,
}

impl FieldDemo {
    pub fn new(options: &DemoOptions) -> Self {
        Self {
            options: options.clone(),
            list: RenderList::new(options.render_list_capacity, Space::Camera),
            scene: None,
            markers: Vec::new(),
            player: None,
            cam: Vec3::ZERO,
            view_angle: 0.0,
            lean: 0.0,
        }
    }

    /// Camera position
    pub fn camera_position(&self) -> Vec3 {
        self.cam
    }

    fn steer(&mut self, dt: f32, input: &FrameInput) {
        let speed = if input.boost { PLAYER_SPEED * 4.0 } else { PLAYER_SPEED };
        let heading = deg_to_rad(self.view_angle);
        let step = Vec3::new(heading.sin(), 0.0, heading.cos()).scale(speed * dt);
        if input.forward {
            self.cam = self.cam - step;
        }
        if input.backward {
            self.cam = self.cam + step;
        }

        if input.turn_left {
            self.view_angle += VIEW_TURN_SPEED * dt;
            self.lean = (self.lean + LEAN_SPEED * dt).min(MAX_LEAN);
        }
        if input.turn_right {
            self.view_angle -= VIEW_TURN_SPEED * dt;
            self.lean = (self.lean - LEAN_SPEED * dt).max(-MAX_LEAN);
        }

        // level out only when no turn key is held
        if !input.turn_left && !input.turn_right {
            if self.lean > 0.0 {
                self.lean = (self.lean - LEAN_RECOVER * dt).max(0.0);
            } else if self.lean < 0.0 {
                self.lean = (self.lean + LEAN_RECOVER * dt).min(0.0);
            }
        }
    }

    /// Current lean of the player tank in degrees
    pub fn lean(&self) -> f32 {
        self.lean
    }
}

impl Demo for FieldDemo {
    fn name(&self) -> &'static str {
        "field"
    }

    fn init(&mut self, ctx: &mut RenderContext) -> Result<(), LoadError> {
        let mut scene = load_scene(self.options.assets.join("scenes/field.ron"))?;
        scene.apply(ctx)?;

        let marker = scene
            .model("marker")
            .cloned()
            .ok_or_else(|| LoadError::UnknownModel("marker".to_string()))?;
        let lift = marker.radius();
        self.markers = (0..MARKERS_PER_SIDE * MARKERS_PER_SIDE)
            .map(|i| {
                let (row, col) = (i / MARKERS_PER_SIDE, i % MARKERS_PER_SIDE);
                let pos = Vec3::new(
                    GRID_SIZE * col as f32 - FIELD_RADIUS,
                    lift,
                    GRID_SIZE * row as f32 - FIELD_RADIUS,
                );
                let scale = Vec3::new(MARKER_SCALE, MARKER_SCALE, MARKER_SCALE);
                Object::new(marker.clone(), pos, Vec3::ZERO, scale)
            })
            .collect();

        let player_index = scene
            .objects
            .iter()
            .position(|o| o.name() == "player")
            .ok_or_else(|| LoadError::UnknownModel("player".to_string()))?;
        self.player = Some(scene.objects.remove(player_index));

        self.cam = scene.camera.eye;
        self.view_angle = 0.0;
        self.lean = 0.0;

        ctx.set_clear_color(Color::BLACK);
        ctx.set_draw_color(Color::GREEN);
        ctx.enable(Capability::ObjectCulling);

        log::info!("field: {} markers, {} towers", self.markers.len(), scene.objects.len());
        self.scene = Some(scene);
        Ok(())
    }

    fn update(&mut self, ctx: &mut RenderContext, dt: f32, input: &FrameInput) -> Result<FrameStats, RasterError> {
        self.steer(dt, input);

        ctx.clear();
        self.list.reset(Space::Camera);
        ctx.set_matrix_mode(MatrixMode::ModelView);
        ctx.load_identity();

        let mut stats = FrameStats::default();

        // player rides at a fixed spot below the eye
        if let Some(player) = self.player.as_mut() {
            ctx.push_matrix()?;
            ctx.set_translation(Vec3::new(0.0, -self.cam.y, 0.0));
            if is_zero(self.lean) {
                player.reset_rotation();
            } else {
                player.rotate(Vec3::new(0.0, self.lean, 0.0));
            }
            let d = player.draw(ctx, &mut self.list)?;
            ctx.pop_matrix()?;
            stats.objects += 1;
            stats.culled += d.culled as usize;
        }

        // world to camera: translate by -eye, then turn
        ctx.set_rotation(Vec3::UNIT_Y, -self.view_angle);
        ctx.set_translation(-self.cam);

        for marker in &mut self.markers {
            let d = marker.draw(ctx, &mut self.list)?;
            stats.objects += 1;
            stats.culled += d.culled as usize;
        }
        if let Some(scene) = self.scene.as_mut() {
            let s = scene.draw(ctx, &mut self.list)?;
            stats.objects += s.objects;
            stats.culled += s.culled;
        }

        finish_frame(ctx, &mut self.list, input.raster_mode, stats)
    }

    fn teardown(&mut self) {
        self.markers.clear();
        self.player = None;
        self.scene = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn demo() -> (FieldDemo, RenderContext) {
        let options = DemoOptions {
            assets: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            ..Default::default()
        };
        let mut ctx = RenderContext::with_size(320, 240, 32).unwrap();
        let mut demo = FieldDemo::new(&options);
        demo.init(&mut ctx).unwrap();
        (demo, ctx)
    }

    #[test]
    fn test_field_culls_most_markers() {
        let (mut demo, mut ctx) = demo();
        let stats = demo.update(&mut ctx, 0.0, &FrameInput::default()).unwrap();
        assert_eq!(stats.objects, 21 * 21 + 20 + 1);
        assert!(stats.culled > stats.objects / 2);
        assert!(stats.drawn > 0);
    }

    #[test]
    fn test_driving_forward_moves_down_negative_z() {
        let (mut demo, mut ctx) = demo();
        let input = FrameInput { forward: true, ..Default::default() };
        demo.update(&mut ctx, 0.5, &input).unwrap();
        let cam = demo.camera_position();
        assert!((cam.z + 150.0).abs() < 0.01);
        assert!(cam.x.abs() < 0.01);
        assert!((cam.y - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_lean_builds_while_turning_and_levels_out() {
        let (mut demo, mut ctx) = demo();
        let left = FrameInput { turn_left: true, ..Default::default() };
        demo.update(&mut ctx, 0.1, &left).unwrap();
        assert!((demo.lean() - LEAN_SPEED * 0.1).abs() < 1e-4);
        demo.update(&mut ctx, 0.1, &left).unwrap();
        assert!((demo.lean() - LEAN_SPEED * 0.2).abs() < 1e-4);

        let idle = FrameInput::default();
        demo.update(&mut ctx, 1.0, &idle).unwrap();
        assert_eq!(demo.lean(), 0.0);

        // a level tank is back at its placement orientation
        let player = demo.player.as_ref().unwrap();
        let placed = Object::new(player.model().clone(), Vec3::ZERO, player.orientation(), Vec3::new(1.0, 1.0, 1.0));
        assert!(player.rotation().approx_eq(placed.rotation(), 1e-6));
    }

    #[test]
    fn test_model_view_stack_is_balanced() {
        let (mut demo, mut ctx) = demo();
        demo.update(&mut ctx, 0.1, &FrameInput::default()).unwrap();
        assert_eq!(ctx.stack(MatrixMode::ModelView).position(), 0);
    }
}

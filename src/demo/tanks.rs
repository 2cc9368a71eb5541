//! Two tanks from a RON scene turning in opposite directions

use crate::error::{LoadError, RasterError};
use crate::rasterizer::{Color, RenderContext, Vec3};
use crate::world::{load_scene, RenderList, Scene, Space};
use super::{finish_frame, Demo, DemoOptions, FrameInput, FrameStats};

const TURN_SPEED: f32 = 50.0;

pub struct TanksDemo {
    options: DemoOptions,
    list: RenderList,
    scene: Option<Scene>,
    angle: f32,
}

impl TanksDemo {
    pub fn new(options: &DemoOptions) -> Self {
        Self {
            options: options.clone(),
            list: RenderList::new(options.render_list_capacity, Space::Camera),
            scene: None,
            angle: 0.0,
        }
    }
}

impl Demo for TanksDemo {
    fn name(&self) -> &'static str {
        "tanks"
    }

    fn init(&mut self, ctx: &mut RenderContext) -> Result<(), LoadError> {
        let scene = load_scene(self.options.assets.join("scenes/tanks.ron"))?;
        scene.apply(ctx)?;
        ctx.set_clear_color(Color::BLACK);
        ctx.set_draw_color(Color::GREEN);
        self.scene = Some(scene);
        Ok(())
    }

    fn update(&mut self, ctx: &mut RenderContext, dt: f32, input: &FrameInput) -> Result<FrameStats, RasterError> {
        self.angle += TURN_SPEED * dt;

        ctx.clear();
        self.list.reset(Space::Camera);

        let mut stats = FrameStats::default();
        if let Some(scene) = self.scene.as_mut() {
            scene.camera.apply(ctx)?;
            // the two tanks turn in opposite directions
            for (i, tank) in scene.objects.iter_mut().enumerate() {
                let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
                tank.rotate(Vec3::new(0.0, sign * self.angle, 0.0));
            }
            let s = scene.draw(ctx, &mut self.list)?;
            stats.objects = s.objects;
            stats.culled = s.culled;
        }

        finish_frame(ctx, &mut self.list, input.raster_mode, stats)
    }

    fn teardown(&mut self) {
        self.scene = None;
    }
}

//! Single triangle spinning about Y, pushed as raw local-space geometry
//! through all three render list passes

use crate::error::{LoadError, RasterError};
use crate::rasterizer::{Color, MatrixMode, RenderContext, Vec3};
use crate::world::{IndieTriangle, Projection, RenderList, Space};
use super::{finish_frame, Demo, DemoOptions, FrameInput, FrameStats};

const SPIN_SPEED: f32 = 90.0;

pub struct SpinDemo {
    list: RenderList,
    angle: f32,
}

impl SpinDemo {
    pub fn new(options: &DemoOptions) -> Self {
        Self {
            list: RenderList::new(options.render_list_capacity, Space::Local),
            angle: 0.0,
        }
    }
}

impl Demo for SpinDemo {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn init(&mut self, ctx: &mut RenderContext) -> Result<(), LoadError> {
        Projection::default().apply(ctx)?;
        ctx.set_clear_color(Color::BLACK);
        ctx.set_draw_color(Color::new(255, 200, 0));
        Ok(())
    }

    fn update(&mut self, ctx: &mut RenderContext, dt: f32, input: &FrameInput) -> Result<FrameStats, RasterError> {
        self.angle = (self.angle + SPIN_SPEED * dt) % 360.0;

        ctx.clear();
        self.list.reset(Space::Local);
        // a full list only drops triangles
        let _ = self.list.push(IndieTriangle::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        ));

        // rotate about the local origin, then push away from the camera
        ctx.set_matrix_mode(MatrixMode::ModelView);
        ctx.load_identity();
        ctx.set_translation(Vec3::new(0.0, 0.0, -4.0));
        ctx.set_rotation(Vec3::UNIT_Y, self.angle);

        finish_frame(ctx, &mut self.list, input.raster_mode, FrameStats::default())
    }
}

//! Look-at camera circling a tumbling cube, with object and back-face
//! culling enabled

use crate::error::{LoadError, RasterError};
use crate::rasterizer::{deg_to_rad, Capability, Color, RenderContext, Vec3};
use crate::world::{Camera, Model, Object, Projection, RenderList, Space};
use super::{finish_frame, Demo, DemoOptions, FrameInput, FrameStats};

const ORBIT_RADIUS: f32 = 10.0;
const ORBIT_HEIGHT: f32 = 3.0;
const ORBIT_SPEED: f32 = 30.0;
const TUMBLE_SPEED: f32 = 45.0;

pub struct OrbitDemo {
    list: RenderList,
    cube: Option<Object>,
    orbit: f32,
    tumble: f32,
}

impl OrbitDemo {
    pub fn new(options: &DemoOptions) -> Self {
        Self {
            list: RenderList::new(options.render_list_capacity, Space::Camera),
            cube: None,
            orbit: 0.0,
            tumble: 0.0,
        }
    }

    fn camera(&self) -> Camera {
        let a = deg_to_rad(self.orbit);
        Camera {
            eye: Vec3::new(ORBIT_RADIUS * a.sin(), ORBIT_HEIGHT, ORBIT_RADIUS * a.cos()),
            target: Vec3::ZERO,
            up: Vec3::UP,
        }
    }
}

impl Demo for OrbitDemo {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn init(&mut self, ctx: &mut RenderContext) -> Result<(), LoadError> {
        Projection::default().apply(ctx)?;
        ctx.set_clear_color(Color::new(0, 0, 40));
        ctx.set_draw_color(Color::WHITE);
        ctx.enable(Capability::ObjectCulling);
        ctx.enable(Capability::FaceCulling);

        self.cube = Some(Object::at(Model::cube(1.5).into_shared(), Vec3::ZERO));
        Ok(())
    }

    fn update(&mut self, ctx: &mut RenderContext, dt: f32, input: &FrameInput) -> Result<FrameStats, RasterError> {
        let turn = match (input.turn_left, input.turn_right) {
            (true, false) => -2.0,
            (false, true) => 2.0,
            _ => 1.0,
        };
        self.orbit = (self.orbit + ORBIT_SPEED * turn * dt) % 360.0;
        self.tumble = (self.tumble + TUMBLE_SPEED * dt) % 360.0;

        ctx.clear();
        self.list.reset(Space::Camera);
        self.camera().apply(ctx)?;

        let mut stats = FrameStats::default();
        if let Some(cube) = self.cube.as_mut() {
            cube.rotate(Vec3::new(self.tumble, 0.0, self.tumble * 0.5));
            let d = cube.draw(ctx, &mut self.list)?;
            stats.objects = 1;
            stats.culled = d.culled as usize;
        }

        finish_frame(ctx, &mut self.list, input.raster_mode, stats)
    }

    fn teardown(&mut self) {
        self.cube = None;
    }
}

//! Demo scenes
//!
//! Each demo implements [`Demo`]: `init` once, `update` every frame with
//! the frame time and polled input, `teardown` on exit. The host owns the
//! window (or the headless loop) and the rendering context.

mod spin;
mod orbit;
mod tanks;
mod field;

use std::path::PathBuf;

pub use spin::SpinDemo;
pub use orbit::OrbitDemo;
pub use tanks::TanksDemo;
pub use field::FieldDemo;

use crate::error::{LoadError, RasterError};
use crate::rasterizer::{RasterMode, RenderContext};
use crate::world::RenderList;

/// Input state for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub boost: bool,
    pub raster_mode: RasterMode,
}

/// What a frame put on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub objects: usize,
    pub culled: usize,
    pub triangles: usize,
    pub drawn: usize,
    pub skipped: usize,
    pub dropped: usize,
}

/// Shared settings handed to every demo
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub assets: PathBuf,
    pub render_list_capacity: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            render_list_capacity: RenderList::DEFAULT_CAPACITY,
        }
    }
}

pub trait Demo {
    fn name(&self) -> &'static str;

    /// Load assets and set up projection, viewport and colors
    fn init(&mut self, ctx: &mut RenderContext) -> Result<(), LoadError>;

    /// Advance by `dt` seconds and render one frame
    fn update(&mut self, ctx: &mut RenderContext, dt: f32, input: &FrameInput) -> Result<FrameStats, RasterError>;

    fn teardown(&mut self) {}
}

/// Names accepted by [`create`]
pub const DEMO_NAMES: [&str; 4] = ["triangle", "cube", "tanks", "field"];

/// Build a demo by name
pub fn create(name: &str, options: &DemoOptions) -> Option<Box<dyn Demo>> {
    let demo: Box<dyn Demo> = match name {
        "triangle" => Box::new(SpinDemo::new(options)),
        "cube" => Box::new(OrbitDemo::new(options)),
        "tanks" => Box::new(TanksDemo::new(options)),
        "field" => Box::new(FieldDemo::new(options)),
        _ => return None,
    };
    Some(demo)
}

/// Run the remaining render list passes and rasterize
pub(crate) fn finish_frame(
    ctx: &mut RenderContext,
    list: &mut RenderList,
    mode: RasterMode,
    mut stats: FrameStats,
) -> Result<FrameStats, RasterError> {
    list.to_screen_from_any(ctx)?;
    let drawn = list.draw(ctx, mode)?;
    stats.triangles = list.len();
    stats.drawn = drawn.drawn;
    stats.skipped = drawn.skipped;
    stats.dropped = list.dropped();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn options() -> DemoOptions {
        DemoOptions {
            assets: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_demo() {
        assert!(create("nope", &options()).is_none());
    }

    #[test]
    fn test_every_demo_renders_frames() {
        for name in DEMO_NAMES {
            let mut ctx = RenderContext::with_size(320, 240, 32).unwrap();
            let mut demo = create(name, &options()).unwrap();
            assert_eq!(demo.name(), name);
            demo.init(&mut ctx).unwrap();

            let input = FrameInput { forward: true, turn_left: true, ..Default::default() };
            let mut drawn = 0;
            for _ in 0..5 {
                let stats = demo.update(&mut ctx, 1.0 / 30.0, &input).unwrap();
                assert_eq!(stats.dropped, 0);
                drawn += stats.drawn;
            }
            assert!(drawn > 0, "demo '{}' drew nothing", name);
            demo.teardown();
        }
    }
}

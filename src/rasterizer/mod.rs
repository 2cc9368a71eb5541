//! Fixed-function software rasterizer
//!
//! Features:
//! - 4x3 affine matrices with row-vector convention
//! - Model-view / projection / texture / viewport matrix stacks
//! - Bounding-sphere frustum culling
//! - Bresenham-style lines, flat-top/flat-bottom triangle fill and
//!   general scan-line polygon fill
//! - BGRA 32 bpp pixel buffer with a pre-filled clear buffer

mod math;
mod types;
mod plane;
mod context;
mod transform;
mod raster;

pub use math::*;
pub use types::*;
pub use plane::*;
pub use context::*;
pub use transform::*;

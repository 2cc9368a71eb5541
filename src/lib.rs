//! Fixed-function 3D software rasterizer
//!
//! Frame cycle:
//!
//! 1. `RenderContext::clear`
//! 2. load the camera into the model-view stack and draw objects into a
//!    camera-space `RenderList`
//! 3. run the projection and screen passes on the list
//! 4. `RenderList::draw` scan-converts the triangles into the BGRA buffer
//! 5. hand `RenderContext::buffer` (or `to_rgba8`) to a display surface

pub mod config;
pub mod demo;
pub mod error;
pub mod rasterizer;
pub mod world;

pub use config::EngineConfig;
pub use error::{LoadError, RasterError};

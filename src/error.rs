//! Error types for the pipeline and asset loading

use std::path::PathBuf;

use crate::rasterizer::MatrixMode;
use crate::world::Space;

/// Failures raised by the rendering context, transforms, rasterizer and render list
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RasterError {
    #[error("unsupported bit depth {0} (only 32 bpp is supported)")]
    UnsupportedBitDepth(u32),

    #[error("invalid buffer size {width}x{height}")]
    InvalidSize { width: usize, height: usize },

    #[error("{0:?} matrix stack overflow")]
    StackOverflow(MatrixMode),

    #[error("{0:?} matrix stack underflow")]
    StackUnderflow(MatrixMode),

    #[error("invalid frustum: fovy={fovy} aspect={aspect} near={near} far={far}")]
    InvalidFrustum { fovy: f32, aspect: f32, near: f32, far: f32 },

    #[error("invalid viewport {width}x{height} for a {buffer_width}x{buffer_height} buffer")]
    InvalidViewport {
        width: usize,
        height: usize,
        buffer_width: usize,
        buffer_height: usize,
    },

    #[error("color channel out of range: ({r}, {g}, {b}, {a})")]
    InvalidColor { r: i32, g: i32, b: i32, a: i32 },

    #[error("look-at up vector is parallel to the view direction")]
    ParallelLookAt,

    #[error("point ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds { x: i32, y: i32, width: usize, height: usize },

    #[error("polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("render list is full ({capacity} triangles)")]
    RenderListFull { capacity: usize },

    #[error("render list is in {found:?} space, expected {expected:?}")]
    WrongSpace { expected: Space, found: Space },
}

/// Failures raised while loading configuration, meshes and scenes
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON serialize error: {0}")]
    RonSerialize(#[from] ron::Error),

    #[error("PLG line {line}: {message}")]
    Plg { line: usize, message: String },

    #[error("mesh '{name}': triangle {triangle} references vertex {index} of {count}")]
    IndexOutOfRange {
        name: String,
        triangle: usize,
        index: usize,
        count: usize,
    },

    #[error("mesh '{name}': expected {expected} {what}, found {found}")]
    Missing {
        name: String,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io { path: path.into(), source }
    }
}

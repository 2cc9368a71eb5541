//! Core types for the rasterizer

use serde::{Serialize, Deserialize};

use crate::error::RasterError;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from unchecked integer channels, rejecting anything
    /// outside 0..=255
    pub fn try_from_rgba(r: i32, g: i32, b: i32, a: i32) -> Result<Self, RasterError> {
        let ok = |c: i32| (0..=255).contains(&c);
        if ok(r) && ok(g) && ok(b) && ok(a) {
            Ok(Self::with_alpha(r as u8, g as u8, b as u8, a as u8))
        } else {
            Err(RasterError::InvalidColor { r, g, b, a })
        }
    }

    /// Pixel buffer byte order
    pub fn to_bgra(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    pub fn from_bgra(bytes: [u8; 4]) -> Self {
        Self::with_alpha(bytes[2], bytes[1], bytes[0], bytes[3])
    }

    /// Convert to [u8; 4] in RGBA order (display surfaces, PNG)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Integer screen-space point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point2i {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Selects which matrix stack receives push/pop/load/combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixMode {
    ModelView,
    Projection,
    Texture,
    Viewport,
}

impl MatrixMode {
    pub(crate) fn index(self) -> usize {
        match self {
            MatrixMode::ModelView => 0,
            MatrixMode::Projection => 1,
            MatrixMode::Texture => 2,
            MatrixMode::Viewport => 3,
        }
    }
}

/// Toggleable pipeline features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Bounding-sphere rejection of whole objects
    ObjectCulling,
    /// Back-face rejection of individual triangles
    FaceCulling,
}

/// How triangles are scan-converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RasterMode {
    #[default]
    Wire,
    Fill,
}

//! Engine configuration
//!
//! Stored as RON. Every field has a default, so a config file only needs
//! the values it changes:
//!
//! ```ron
//! (
//!     width: 320,
//!     height: 240,
//!     clear_color: (r: 0, g: 0, b: 64),
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::LoadError;
use crate::rasterizer::Color;

/// Maximum depth of each matrix stack lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackDepths {
    pub model_view: usize,
    pub projection: usize,
    pub texture: usize,
    pub viewport: usize,
}

impl Default for StackDepths {
    fn default() -> Self {
        Self {
            model_view: 32,
            projection: 4,
            texture: 4,
            viewport: 4,
        }
    }
}

/// Pixel buffer, stack and render list sizing plus startup colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub bits_per_pixel: u32,
    pub stack_depths: StackDepths,
    pub render_list_capacity: usize,
    pub clear_color: Color,
    pub draw_color: Color,
    /// Window pixels per buffer pixel in the viewer
    pub window_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            bits_per_pixel: 32,
            stack_depths: StackDepths::default(),
            render_list_capacity: 32768,
            clear_color: Color::BLACK,
            draw_color: Color::WHITE,
            window_scale: 1.0,
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let config = load_config_from_str(&contents)?;
    log::info!("loaded config {} ({}x{})", path.display(), config.width, config.height);
    Ok(config)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<EngineConfig, LoadError> {
    Ok(ron::from_str(s)?)
}

/// Save a config as pretty RON
pub fn save_config<P: AsRef<Path>>(config: &EngineConfig, path: P) -> Result<(), LoadError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(config, pretty)?;
    let path = path.as_ref();
    fs::write(path, contents).map_err(|e| LoadError::io(path, e))?;
    Ok(())
}

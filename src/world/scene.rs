//! Scene description loaded from RON
//!
//! A scene names its models (PLG files or built-in shapes), places
//! objects that reference those models, and sets up the camera and
//! projection. Objects placed from the same model share one `Arc<Model>`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::error::{LoadError, RasterError};
use crate::rasterizer::{MatrixMode, RenderContext, Vec3};
use super::model::Model;
use super::object::Object;
use super::plg::load_plg;
use super::render_list::RenderList;

/// Where a model's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelSource {
    /// PLG file, relative to the scene file
    Plg(String),
    Cube(f32),
    Pyramid { half: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub source: ModelSource,
}

fn unit_scale() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

/// One object placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    /// Degrees about X, Y and Z, applied yaw, pitch, roll
    #[serde(default)]
    pub orientation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

/// Look-at camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
}

fn default_up() -> Vec3 {
    Vec3::UP
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
        }
    }
}

impl Camera {
    /// Replace the model-view top with this camera's world-to-camera matrix
    pub fn apply(&self, ctx: &mut RenderContext) -> Result<(), RasterError> {
        ctx.set_matrix_mode(MatrixMode::ModelView);
        ctx.load_identity();
        ctx.set_look_at(self.eye, self.target, self.up)
    }
}

/// Perspective parameters. `aspect` defaults to the screen's width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    pub fovy: f32,
    pub aspect: Option<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fovy: 90.0,
            aspect: None,
            near: -2.0,
            far: -100.0,
        }
    }
}

impl Projection {
    /// Reset the projection and viewport lanes and load this projection
    /// for the full buffer
    pub fn apply(&self, ctx: &mut RenderContext) -> Result<(), RasterError> {
        let (w, h) = (ctx.buffer_width(), ctx.buffer_height());
        let aspect = self.aspect.unwrap_or(w as f32 / h as f32);

        ctx.set_matrix_mode(MatrixMode::Projection);
        ctx.load_identity();
        ctx.set_projection(self.fovy, aspect, self.near, self.far)?;

        ctx.set_matrix_mode(MatrixMode::Viewport);
        ctx.load_identity();
        ctx.set_viewport(w, h)?;

        ctx.set_matrix_mode(MatrixMode::ModelView);
        Ok(())
    }
}

/// Serialized scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDesc {
    pub models: Vec<ModelEntry>,
    pub objects: Vec<Placement>,
    pub camera: Camera,
    pub projection: Projection,
}

/// Totals from drawing every object in a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub objects: usize,
    pub culled: usize,
    pub backfaces: usize,
    pub triangles: usize,
}

/// Loaded scene
pub struct Scene {
    pub camera: Camera,
    pub projection: Projection,
    pub objects: Vec<Object>,
    models: HashMap<String, Arc<Model>>,
}

impl Scene {
    /// Resolve models and place objects. PLG paths are relative to
    /// `base_dir`.
    pub fn from_desc(desc: SceneDesc, base_dir: &Path) -> Result<Self, LoadError> {
        let mut models = HashMap::new();
        for entry in &desc.models {
            let model = match &entry.source {
                ModelSource::Plg(file) => load_plg(base_dir.join(file))?,
                ModelSource::Cube(half) => Model::cube(*half),
                ModelSource::Pyramid { half, height } => Model::pyramid(*half, *height),
            };
            models.insert(entry.name.clone(), model.into_shared());
        }

        let mut objects = Vec::with_capacity(desc.objects.len());
        for placement in &desc.objects {
            let model = models
                .get(&placement.model)
                .ok_or_else(|| LoadError::UnknownModel(placement.model.clone()))?;
            let mut obj = Object::new(model.clone(), placement.position, placement.orientation, placement.scale);
            if let Some(name) = &placement.name {
                obj = obj.with_name(name.clone());
            }
            objects.push(obj);
        }

        log::info!("scene loaded: {} models, {} objects", models.len(), objects.len());
        Ok(Self {
            camera: desc.camera,
            projection: desc.projection,
            objects,
            models,
        })
    }

    pub fn model(&self, name: &str) -> Option<&Arc<Model>> {
        self.models.get(name)
    }

    /// Load the camera and projection into the context
    pub fn apply(&self, ctx: &mut RenderContext) -> Result<(), RasterError> {
        self.projection.apply(ctx)?;
        self.camera.apply(ctx)
    }

    /// Draw every object into a camera-space render list
    pub fn draw(&mut self, ctx: &RenderContext, list: &mut RenderList) -> Result<SceneStats, RasterError> {
        let mut stats = SceneStats::default();
        for obj in &mut self.objects {
            let d = obj.draw(ctx, list)?;
            stats.objects += 1;
            stats.culled += d.culled as usize;
            stats.backfaces += d.backfaces;
            stats.triangles += d.inserted;
        }
        Ok(stats)
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
    load_scene_from_str(&contents, &base_dir)
}

/// Load a scene from a RON string
pub fn load_scene_from_str(s: &str, base_dir: &Path) -> Result<Scene, LoadError> {
    let desc: SceneDesc = ron::from_str(s)?;
    Scene::from_desc(desc, base_dir)
}

/// Save a scene description as pretty RON
pub fn save_scene<P: AsRef<Path>>(desc: &SceneDesc, path: P) -> Result<(), LoadError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(desc, config)?;
    let path = path.as_ref();
    fs::write(path, contents).map_err(|e| LoadError::io(path, e))?;
    Ok(())
}

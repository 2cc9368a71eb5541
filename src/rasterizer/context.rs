//! Rendering context: pixel buffer, matrix stacks and pipeline state
//!
//! A context owns a BGRA pixel buffer plus a pre-filled clear buffer so
//! that clearing a frame is a single copy. Four matrix stack lanes
//! (model-view, projection, texture, viewport) are addressed through the
//! current matrix mode, the way a fixed-function GPU driver exposes them.

use std::path::Path;

use super::math::Mat43;
use super::plane::Frustum;
use super::types::{Capability, Color, MatrixMode};
use super::math::Vec3;
use crate::config::{EngineConfig, StackDepths};
use crate::error::{LoadError, RasterError};

/// Fixed-depth stack of matrices. Slot `pos` is the current top.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    mode: MatrixMode,
    slots: Vec<Mat43>,
    pos: usize,
}

impl MatrixStack {
    pub fn new(mode: MatrixMode, depth: usize) -> Self {
        Self {
            mode,
            slots: vec![Mat43::IDENTITY; depth.max(1)],
            pos: 0,
        }
    }

    pub fn top(&self) -> &Mat43 {
        &self.slots[self.pos]
    }

    pub fn top_mut(&mut self) -> &mut Mat43 {
        &mut self.slots[self.pos]
    }

    /// Duplicate the top one slot deeper
    pub fn push(&mut self) -> Result<(), RasterError> {
        if self.pos + 1 >= self.slots.len() {
            return Err(RasterError::StackOverflow(self.mode));
        }
        self.slots[self.pos + 1] = self.slots[self.pos];
        self.pos += 1;
        Ok(())
    }

    /// Retreat the pointer; the slot above keeps its stale matrix
    pub fn pop(&mut self) -> Result<(), RasterError> {
        if self.pos == 0 {
            return Err(RasterError::StackUnderflow(self.mode));
        }
        self.pos -= 1;
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn max_depth(&self) -> usize {
        self.slots.len()
    }

    pub fn mode(&self) -> MatrixMode {
        self.mode
    }
}

/// Software rendering context
pub struct RenderContext {
    width: usize,
    height: usize,
    buffer_width: usize,
    buffer_height: usize,
    bits_per_pixel: u32,
    pitch: usize,
    buffer: Vec<u8>,
    clear_buffer: Vec<u8>,

    stacks: [MatrixStack; 4],
    mode: MatrixMode,

    frustum: Frustum,
    draw_color: Color,
    clear_color: Color,
    object_culling: bool,
    face_culling: bool,
}

impl RenderContext {
    /// Create a context with default stack depths. Only 32 bpp is supported.
    pub fn with_size(width: usize, height: usize, bits_per_pixel: u32) -> Result<Self, RasterError> {
        Self::build(width, height, bits_per_pixel, StackDepths::default())
    }

    /// Create a context sized and colored from an engine config
    pub fn new(config: &EngineConfig) -> Result<Self, RasterError> {
        let mut ctx = Self::build(config.width, config.height, config.bits_per_pixel, config.stack_depths)?;
        ctx.set_clear_color(config.clear_color);
        ctx.set_draw_color(config.draw_color);
        Ok(ctx)
    }

    fn build(width: usize, height: usize, bits_per_pixel: u32, depths: StackDepths) -> Result<Self, RasterError> {
        if bits_per_pixel != 32 {
            return Err(RasterError::UnsupportedBitDepth(bits_per_pixel));
        }
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidSize { width, height });
        }

        let pitch = (width * bits_per_pixel as usize + 31) / 32 * 4;
        let size = pitch * height;

        let mut ctx = Self {
            width,
            height,
            buffer_width: width,
            buffer_height: height,
            bits_per_pixel,
            pitch,
            buffer: vec![0; size],
            clear_buffer: vec![0; size],
            stacks: [
                MatrixStack::new(MatrixMode::ModelView, depths.model_view),
                MatrixStack::new(MatrixMode::Projection, depths.projection),
                MatrixStack::new(MatrixMode::Texture, depths.texture),
                MatrixStack::new(MatrixMode::Viewport, depths.viewport),
            ],
            mode: MatrixMode::ModelView,
            frustum: Frustum::default(),
            draw_color: Color::WHITE,
            clear_color: Color::BLACK,
            object_culling: false,
            face_culling: false,
        };
        ctx.set_clear_color(Color::BLACK);
        log::debug!("created {}x{} render context, pitch {}", width, height, pitch);
        Ok(ctx)
    }

    // ---- Matrix stacks ----

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    pub fn matrix_mode(&self) -> MatrixMode {
        self.mode
    }

    pub fn stack(&self, mode: MatrixMode) -> &MatrixStack {
        &self.stacks[mode.index()]
    }

    fn current_stack_mut(&mut self) -> &mut MatrixStack {
        &mut self.stacks[self.mode.index()]
    }

    pub fn push_matrix(&mut self) -> Result<(), RasterError> {
        self.current_stack_mut().push()
    }

    pub fn pop_matrix(&mut self) -> Result<(), RasterError> {
        self.current_stack_mut().pop()
    }

    pub fn load_identity(&mut self) {
        *self.current_stack_mut().top_mut() = Mat43::IDENTITY;
    }

    /// Replace the top of the current lane
    pub fn load_matrix(&mut self, m: Mat43) {
        *self.current_stack_mut().top_mut() = m;
    }

    /// `top = m * top`
    pub fn combine_matrix(&mut self, m: &Mat43) {
        let top = self.current_stack_mut().top_mut();
        *top = m.multiply(top);
    }

    /// Top of the current lane
    pub fn current_matrix(&self) -> &Mat43 {
        self.stack(self.mode).top()
    }

    /// Stack position of the current lane
    pub fn stack_position(&self) -> usize {
        self.stack(self.mode).position()
    }

    pub fn model_view(&self) -> &Mat43 {
        self.stack(MatrixMode::ModelView).top()
    }

    pub fn projection(&self) -> &Mat43 {
        self.stack(MatrixMode::Projection).top()
    }

    pub fn viewport(&self) -> &Mat43 {
        self.stack(MatrixMode::Viewport).top()
    }

    // ---- Frustum ----

    pub fn set_frustum(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) -> Result<(), RasterError> {
        self.frustum = Frustum::new(fovy, aspect, near, far)?;
        Ok(())
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn fovy(&self) -> f32 {
        self.frustum.fovy()
    }

    pub fn aspect(&self) -> f32 {
        self.frustum.aspect()
    }

    /// Bounding-sphere test against the current frustum
    pub fn is_visible(&self, center: Vec3, radius: f32) -> bool {
        self.frustum.is_visible(center, radius)
    }

    // ---- Capabilities ----

    pub fn enable(&mut self, cap: Capability) {
        *self.cap_mut(cap) = true;
    }

    pub fn disable(&mut self, cap: Capability) {
        *self.cap_mut(cap) = false;
    }

    pub fn is_enabled(&self, cap: Capability) -> bool {
        match cap {
            Capability::ObjectCulling => self.object_culling,
            Capability::FaceCulling => self.face_culling,
        }
    }

    fn cap_mut(&mut self, cap: Capability) -> &mut bool {
        match cap {
            Capability::ObjectCulling => &mut self.object_culling,
            Capability::FaceCulling => &mut self.face_culling,
        }
    }

    // ---- Colors and buffers ----

    /// Set the clear color and repaint the clear buffer
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
        let bytes = color.to_bgra();
        let row_bytes = self.buffer_width * 4;
        for row in self.clear_buffer.chunks_exact_mut(self.pitch) {
            for px in row[..row_bytes].chunks_exact_mut(4) {
                px.copy_from_slice(&bytes);
            }
        }
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    pub fn draw_color(&self) -> Color {
        self.draw_color
    }

    /// Copy the clear buffer over the draw buffer
    pub fn clear(&mut self) {
        self.buffer.copy_from_slice(&self.clear_buffer);
    }

    /// Set the screen dimensions used by the rasterizer and screen pass.
    /// Cannot exceed the allocated buffer.
    pub(crate) fn set_screen_size(&mut self, width: usize, height: usize) -> Result<(), RasterError> {
        if width == 0 || height == 0 || width > self.buffer_width || height > self.buffer_height {
            return Err(RasterError::InvalidViewport {
                width,
                height,
                buffer_width: self.buffer_width,
                buffer_height: self.buffer_height,
            });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Screen width (viewport)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Screen height (viewport)
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn buffer_width(&self) -> usize {
        self.buffer_width
    }

    pub fn buffer_height(&self) -> usize {
        self.buffer_height
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Row stride in bytes, padded to 4-byte alignment
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Buffer size in bytes
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Raw BGRA pixel buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Read back one pixel, `None` outside the buffer
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.buffer_width || y >= self.buffer_height {
            return None;
        }
        let idx = y * self.pitch + x * 4;
        let px = &self.buffer[idx..idx + 4];
        Some(Color::from_bgra([px[0], px[1], px[2], px[3]]))
    }

    /// Tightly packed RGBA copy of the buffer for display surfaces
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buffer_width * self.buffer_height * 4);
        for row in self.buffer.chunks_exact(self.pitch) {
            for px in row[..self.buffer_width * 4].chunks_exact(4) {
                out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        out
    }

    /// Write the buffer to a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.to_rgba8(),
            self.buffer_width as u32,
            self.buffer_height as u32,
            image::ColorType::Rgba8,
        )?;
        log::info!("saved snapshot {}", path.display());
        Ok(())
    }
}

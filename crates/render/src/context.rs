use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glassroom_common::{
    AttribLocation, BufferId, BufferTarget, DrawMode, PixelFormat, ProgramId, TextureFilter,
    TextureId, UniformLocation, WrapMode,
};
use serde::{Deserialize, Serialize};

/// Errors reported by a graphics context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("failed to create {0}: {1}")]
    Create(&'static str, String),
    #[error("shader compile error: {0}")]
    Compile(String),
    #[error("program link error: {0}")]
    Link(String),
}

/// Decoded 8-bit image ready for upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Rows in bottom-to-top order, as GL expects when the source is top-down.
    pub fn flipped_rows(&self, format: PixelFormat) -> Vec<u8> {
        let row = self.width as usize * format.channels();
        if row == 0 {
            return self.pixels.clone();
        }
        self.pixels
            .chunks(row)
            .rev()
            .flat_map(|r| r.iter().copied())
            .collect()
    }
}

/// A sampler parameter on the currently bound texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameter {
    WrapS(WrapMode),
    WrapT(WrapMode),
    MagFilter(TextureFilter),
    MinFilter(TextureFilter),
}

/// The command surface the renderer core drives.
///
/// Mirrors the stateful WebGL / GLES model: a texture operation acts on the
/// texture bound to the active unit, a uniform upload acts on the program in
/// use. Implementations accept commands from one thread only.
pub trait GraphicsContext {
    fn create_texture(&mut self) -> Result<TextureId, ContextError>;
    fn active_texture(&mut self, unit: u32);
    fn bind_texture(&mut self, texture: TextureId);
    fn tex_image_2d(&mut self, format: PixelFormat, image: &TextureImage, flip_y: bool);
    fn tex_parameter(&mut self, parameter: TextureParameter);
    fn generate_mipmap(&mut self);

    fn uniform_1f(&mut self, location: UniformLocation, value: f32);
    fn uniform_1i(&mut self, location: UniformLocation, value: i32);
    fn uniform_2f(&mut self, location: UniformLocation, value: Vec2);
    fn uniform_3f(&mut self, location: UniformLocation, value: Vec3);
    fn uniform_4f(&mut self, location: UniformLocation, value: Vec4);
    fn uniform_3fv(&mut self, location: UniformLocation, values: &[Vec3]);
    fn uniform_1iv(&mut self, location: UniformLocation, values: &[i32]);
    /// Column-major, never transposed.
    fn uniform_matrix_3f(&mut self, location: UniformLocation, value: &Mat3);
    /// Column-major, never transposed.
    fn uniform_matrix_4f(&mut self, location: UniformLocation, value: &Mat4);

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ContextError>;
    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribLocation>;
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn use_program(&mut self, program: ProgramId);

    fn create_buffer(&mut self) -> Result<BufferId, ContextError>;
    fn buffer_data(&mut self, target: BufferTarget, buffer: BufferId, data: &[u8]);
    /// Binds `buffer` as tightly packed `f32` data feeding `location`.
    fn vertex_attrib(&mut self, location: AttribLocation, buffer: BufferId, components: u32);
    fn bind_index_buffer(&mut self, buffer: BufferId);
    /// Indexed draw with `u32` indices from the bound index buffer.
    fn draw_elements(&mut self, mode: DrawMode, count: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_reverses_rows() {
        let image = TextureImage::new(1, 2, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(image.flipped_rows(PixelFormat::Rgb), vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn flip_of_empty_image_is_empty() {
        let image = TextureImage::new(0, 0, Vec::new());
        assert!(image.flipped_rows(PixelFormat::Rgba).is_empty());
    }
}

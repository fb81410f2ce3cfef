use crate::convert;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glassroom_common::{
    AttribLocation, BufferId, BufferTarget, DrawMode, PixelFormat, ProgramId, TextureId,
    UniformLocation,
};
use glassroom_render::{ContextError, GraphicsContext, TextureImage, TextureParameter};
use glow::HasContext;
use std::collections::BTreeMap;

/// Native objects addressed by 1-based ids; 0 stays the null id.
#[derive(Debug)]
struct Table<T> {
    items: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Copy> Table<T> {
    fn insert(&mut self, item: T) -> u32 {
        self.items.push(item);
        self.items.len() as u32
    }

    fn get(&self, id: u32) -> Option<T> {
        id.checked_sub(1)
            .and_then(|index| self.items.get(index as usize))
            .copied()
    }
}

/// Graphics context that forwards every call to OpenGL through glow.
pub struct GlowContext {
    gl: glow::Context,
    textures: Table<glow::Texture>,
    programs: Table<glow::Program>,
    buffers: Table<glow::Buffer>,
    uniforms: Vec<glow::UniformLocation>,
    uniform_ids: BTreeMap<(ProgramId, String), UniformLocation>,
}

impl std::fmt::Debug for GlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowContext")
            .field("textures", &self.textures.items.len())
            .field("programs", &self.programs.items.len())
            .field("buffers", &self.buffers.items.len())
            .field("uniforms", &self.uniforms.len())
            .finish()
    }
}

impl GlowContext {
    /// Wrap a live context. Depth testing is enabled for the room scene.
    pub fn new(gl: glow::Context) -> Self {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }
        Self {
            gl,
            textures: Table::default(),
            programs: Table::default(),
            buffers: Table::default(),
            uniforms: Vec::new(),
            uniform_ids: BTreeMap::new(),
        }
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Clear color and depth before a frame.
    pub fn clear(&mut self, color: Vec4) {
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub fn viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) }
    }

    fn uniform(&self, location: UniformLocation) -> Option<&glow::UniformLocation> {
        let found = self.uniforms.get(location.0 as usize);
        if found.is_none() {
            tracing::warn!("unknown uniform location {}", location.0);
        }
        found
    }

    fn compile_stage(&self, stage: u32, source: &str) -> Result<glow::Shader, ContextError> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage)
                .map_err(|e| ContextError::Create("shader", e))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(ContextError::Compile(log));
            }
            Ok(shader)
        }
    }
}

impl GraphicsContext for GlowContext {
    fn create_texture(&mut self) -> Result<TextureId, ContextError> {
        let texture = unsafe { self.gl.create_texture() }
            .map_err(|e| ContextError::Create("texture", e))?;
        Ok(TextureId(self.textures.insert(texture)))
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&mut self, texture: TextureId) {
        let Some(native) = self.textures.get(texture.0) else {
            tracing::warn!("unknown texture {}", texture.0);
            return;
        };
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, Some(native)) }
    }

    fn tex_image_2d(&mut self, format: PixelFormat, image: &TextureImage, flip_y: bool) {
        let pixels = if flip_y {
            image.flipped_rows(format)
        } else {
            image.pixels.clone()
        };
        let gl_format = convert::pixel_format(format);
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                gl_format as i32,
                image.width as i32,
                image.height as i32,
                0,
                gl_format,
                glow::UNSIGNED_BYTE,
                Some(&pixels),
            );
        }
    }

    fn tex_parameter(&mut self, parameter: TextureParameter) {
        let (name, value) = match parameter {
            TextureParameter::WrapS(wrap) => (glow::TEXTURE_WRAP_S, convert::wrap_mode(wrap)),
            TextureParameter::WrapT(wrap) => (glow::TEXTURE_WRAP_T, convert::wrap_mode(wrap)),
            TextureParameter::MagFilter(f) => (glow::TEXTURE_MAG_FILTER, convert::filter(f)),
            TextureParameter::MinFilter(f) => (glow::TEXTURE_MIN_FILTER, convert::filter(f)),
        };
        unsafe { self.gl.tex_parameter_i32(glow::TEXTURE_2D, name, value) }
    }

    fn generate_mipmap(&mut self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_1_f32(loc, value) }
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_1_i32(loc, value) }
    }

    fn uniform_2f(&mut self, location: UniformLocation, value: Vec2) {
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_2_f32(loc, value.x, value.y) }
    }

    fn uniform_3f(&mut self, location: UniformLocation, value: Vec3) {
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_3_f32(loc, value.x, value.y, value.z) }
    }

    fn uniform_4f(&mut self, location: UniformLocation, value: Vec4) {
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_4_f32(loc, value.x, value.y, value.z, value.w) }
    }

    fn uniform_3fv(&mut self, location: UniformLocation, values: &[Vec3]) {
        let flat: Vec<f32> = values.iter().flat_map(|v| v.to_array()).collect();
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_3_f32_slice(loc, &flat) }
    }

    fn uniform_1iv(&mut self, location: UniformLocation, values: &[i32]) {
        let loc = self.uniform(location);
        unsafe { self.gl.uniform_1_i32_slice(loc, values) }
    }

    fn uniform_matrix_3f(&mut self, location: UniformLocation, value: &Mat3) {
        let loc = self.uniform(location);
        unsafe {
            self.gl
                .uniform_matrix_3_f32_slice(loc, false, &value.to_cols_array())
        }
    }

    fn uniform_matrix_4f(&mut self, location: UniformLocation, value: &Mat4) {
        let loc = self.uniform(location);
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(loc, false, &value.to_cols_array())
        }
    }

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ContextError> {
        let vs = self.compile_stage(glow::VERTEX_SHADER, vertex)?;
        let fs = match self.compile_stage(glow::FRAGMENT_SHADER, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { self.gl.delete_shader(vs) };
                return Err(e);
            }
        };
        unsafe {
            let program = self
                .gl
                .create_program()
                .map_err(|e| ContextError::Create("program", e))?;
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            self.gl.delete_shader(vs);
            self.gl.delete_shader(fs);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(ContextError::Link(log));
            }
            Ok(ProgramId(self.programs.insert(program)))
        }
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        let native = self.programs.get(program.0)?;
        unsafe { self.gl.get_attrib_location(native, name) }.map(AttribLocation)
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let key = (program, name.to_string());
        if let Some(&id) = self.uniform_ids.get(&key) {
            return Some(id);
        }
        let native = self.programs.get(program.0)?;
        let location = unsafe { self.gl.get_uniform_location(native, name) }?;
        let id = UniformLocation(self.uniforms.len() as u32);
        self.uniforms.push(location);
        self.uniform_ids.insert(key, id);
        Some(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        let native = self.programs.get(program.0);
        if native.is_none() {
            tracing::warn!("unknown program {}", program.0);
        }
        unsafe { self.gl.use_program(native) }
    }

    fn create_buffer(&mut self) -> Result<BufferId, ContextError> {
        let buffer =
            unsafe { self.gl.create_buffer() }.map_err(|e| ContextError::Create("buffer", e))?;
        Ok(BufferId(self.buffers.insert(buffer)))
    }

    fn buffer_data(&mut self, target: BufferTarget, buffer: BufferId, data: &[u8]) {
        let Some(native) = self.buffers.get(buffer.0) else {
            tracing::warn!("unknown buffer {}", buffer.0);
            return;
        };
        let target = convert::buffer_target(target);
        unsafe {
            self.gl.bind_buffer(target, Some(native));
            self.gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
        }
    }

    fn vertex_attrib(&mut self, location: AttribLocation, buffer: BufferId, components: u32) {
        let Some(native) = self.buffers.get(buffer.0) else {
            tracing::warn!("unknown buffer {}", buffer.0);
            return;
        };
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(native));
            self.gl.vertex_attrib_pointer_f32(
                location.0,
                components as i32,
                glow::FLOAT,
                false,
                0,
                0,
            );
            self.gl.enable_vertex_attrib_array(location.0);
        }
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        let Some(native) = self.buffers.get(buffer.0) else {
            tracing::warn!("unknown buffer {}", buffer.0);
            return;
        };
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(native)) }
    }

    fn draw_elements(&mut self, mode: DrawMode, count: u32) {
        unsafe {
            self.gl
                .draw_elements(convert::draw_mode(mode), count as i32, glow::UNSIGNED_INT, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_are_one_based() {
        let mut table = Table::default();
        assert_eq!(table.insert(7_u8), 1);
        assert_eq!(table.insert(9_u8), 2);
        assert_eq!(table.get(1), Some(7));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(3), None);
    }
}

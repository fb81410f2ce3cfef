//! Headless graphics context that records every command.
//!
//! Used by tests and by the CLI to run the full startup and frame loop
//! without a GPU. Program compilation is simulated: a program needs a
//! `main` in both stages, and a name resolves to a location only when it
//! is mentioned in the program's sources.

use crate::context::{ContextError, GraphicsContext, TextureImage, TextureParameter};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glassroom_common::{
    AttribLocation, BufferId, BufferTarget, DrawMode, PixelFormat, ProgramId, TextureId,
    UniformLocation,
};
use std::collections::BTreeMap;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTexture(TextureId),
    ActiveTexture(u32),
    BindTexture(TextureId),
    TexImage2d {
        format: PixelFormat,
        width: u32,
        height: u32,
        flip_y: bool,
    },
    TexParameter(TextureParameter),
    GenerateMipmap,
    Uniform1f(UniformLocation, f32),
    Uniform1i(UniformLocation, i32),
    Uniform2f(UniformLocation, Vec2),
    Uniform3f(UniformLocation, Vec3),
    Uniform4f(UniformLocation, Vec4),
    Uniform3fv(UniformLocation, Vec<Vec3>),
    Uniform1iv(UniformLocation, Vec<i32>),
    UniformMatrix3f(UniformLocation, Mat3),
    UniformMatrix4f(UniformLocation, Mat4),
    CompileProgram(ProgramId),
    UseProgram(ProgramId),
    CreateBuffer(BufferId),
    BufferData {
        target: BufferTarget,
        buffer: BufferId,
        bytes: usize,
    },
    VertexAttrib {
        location: AttribLocation,
        buffer: BufferId,
        components: u32,
    },
    BindIndexBuffer(BufferId),
    DrawElements(DrawMode, u32),
}

impl Command {
    pub fn is_uniform_upload(&self) -> bool {
        matches!(
            self,
            Self::Uniform1f(..)
                | Self::Uniform1i(..)
                | Self::Uniform2f(..)
                | Self::Uniform3f(..)
                | Self::Uniform4f(..)
                | Self::Uniform3fv(..)
                | Self::Uniform1iv(..)
                | Self::UniformMatrix3f(..)
                | Self::UniformMatrix4f(..)
        )
    }

    pub fn is_texture_op(&self) -> bool {
        matches!(
            self,
            Self::CreateTexture(_)
                | Self::ActiveTexture(_)
                | Self::BindTexture(_)
                | Self::TexImage2d { .. }
                | Self::TexParameter(_)
                | Self::GenerateMipmap
        )
    }
}

#[derive(Debug, Default)]
struct RecordedProgram {
    sources: String,
    attributes: BTreeMap<String, AttribLocation>,
    uniforms: BTreeMap<String, UniformLocation>,
}

/// Command-recording context.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    programs: BTreeMap<ProgramId, RecordedProgram>,
    next_texture: u32,
    next_buffer: u32,
    next_program: u32,
    texture_limit: Option<u32>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose texture creation fails after `limit` textures.
    pub fn with_texture_limit(limit: u32) -> Self {
        Self {
            texture_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Change or lift (`None`) the texture creation limit.
    pub fn set_texture_limit(&mut self, limit: Option<u32>) {
        self.texture_limit = limit;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain and return the recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn uploads(&self) -> usize {
        self.count(|c| matches!(c, Command::TexImage2d { .. }))
    }

    pub fn draw_calls(&self) -> usize {
        self.count(|c| matches!(c, Command::DrawElements(..)))
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

impl GraphicsContext for RecordingContext {
    fn create_texture(&mut self) -> Result<TextureId, ContextError> {
        if self.texture_limit.is_some_and(|limit| self.next_texture >= limit) {
            return Err(ContextError::Create("texture", "texture limit reached".into()));
        }
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.commands.push(Command::CreateTexture(id));
        Ok(id)
    }

    fn active_texture(&mut self, unit: u32) {
        self.commands.push(Command::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.commands.push(Command::BindTexture(texture));
    }

    fn tex_image_2d(&mut self, format: PixelFormat, image: &TextureImage, flip_y: bool) {
        self.commands.push(Command::TexImage2d {
            format,
            width: image.width,
            height: image.height,
            flip_y,
        });
    }

    fn tex_parameter(&mut self, parameter: TextureParameter) {
        self.commands.push(Command::TexParameter(parameter));
    }

    fn generate_mipmap(&mut self) {
        self.commands.push(Command::GenerateMipmap);
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        self.commands.push(Command::Uniform1f(location, value));
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.commands.push(Command::Uniform1i(location, value));
    }

    fn uniform_2f(&mut self, location: UniformLocation, value: Vec2) {
        self.commands.push(Command::Uniform2f(location, value));
    }

    fn uniform_3f(&mut self, location: UniformLocation, value: Vec3) {
        self.commands.push(Command::Uniform3f(location, value));
    }

    fn uniform_4f(&mut self, location: UniformLocation, value: Vec4) {
        self.commands.push(Command::Uniform4f(location, value));
    }

    fn uniform_3fv(&mut self, location: UniformLocation, values: &[Vec3]) {
        self.commands.push(Command::Uniform3fv(location, values.to_vec()));
    }

    fn uniform_1iv(&mut self, location: UniformLocation, values: &[i32]) {
        self.commands.push(Command::Uniform1iv(location, values.to_vec()));
    }

    fn uniform_matrix_3f(&mut self, location: UniformLocation, value: &Mat3) {
        self.commands.push(Command::UniformMatrix3f(location, *value));
    }

    fn uniform_matrix_4f(&mut self, location: UniformLocation, value: &Mat4) {
        self.commands.push(Command::UniformMatrix4f(location, *value));
    }

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, ContextError> {
        if !vertex.contains("void main") {
            return Err(ContextError::Compile("vertex stage has no main".into()));
        }
        if !fragment.contains("void main") {
            return Err(ContextError::Compile("fragment stage has no main".into()));
        }
        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(
            id,
            RecordedProgram {
                sources: format!("{vertex}\n{fragment}"),
                ..RecordedProgram::default()
            },
        );
        self.commands.push(Command::CompileProgram(id));
        Ok(id)
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<AttribLocation> {
        let program = self.programs.get_mut(&program)?;
        if !mentions(&program.sources, name) {
            return None;
        }
        let next = AttribLocation(program.attributes.len() as u32);
        Some(*program.attributes.entry(name.to_string()).or_insert(next))
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let program = self.programs.get_mut(&program)?;
        if !mentions(&program.sources, name) {
            return None;
        }
        let next = UniformLocation(program.uniforms.len() as u32);
        Some(*program.uniforms.entry(name.to_string()).or_insert(next))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.commands.push(Command::UseProgram(program));
    }

    fn create_buffer(&mut self) -> Result<BufferId, ContextError> {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.commands.push(Command::CreateBuffer(id));
        Ok(id)
    }

    fn buffer_data(&mut self, target: BufferTarget, buffer: BufferId, data: &[u8]) {
        self.commands.push(Command::BufferData {
            target,
            buffer,
            bytes: data.len(),
        });
    }

    fn vertex_attrib(&mut self, location: AttribLocation, buffer: BufferId, components: u32) {
        self.commands.push(Command::VertexAttrib {
            location,
            buffer,
            components,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.commands.push(Command::BindIndexBuffer(buffer));
    }

    fn draw_elements(&mut self, mode: DrawMode, count: u32) {
        self.commands.push(Command::DrawElements(mode, count));
    }
}

/// Whether `name` occurs in `source` as a whole identifier.
fn mentions(source: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    source.match_indices(name).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "attribute vec3 a_Position;\nuniform mat4 u_PvMatrix;\nvoid main() {}";
    const FS: &str = "uniform vec3 u_LightColors[4];\nvoid main() {}";

    #[test]
    fn compile_requires_main() {
        let mut ctx = RecordingContext::new();
        assert!(ctx.compile_program("", FS).is_err());
        assert!(ctx.compile_program(VS, "precision highp float;").is_err());
        assert!(ctx.compile_program(VS, FS).is_ok());
        assert_eq!(ctx.program_count(), 1);
    }

    #[test]
    fn locations_resolve_only_for_mentioned_names() {
        let mut ctx = RecordingContext::new();
        let program = ctx.compile_program(VS, FS).unwrap();
        assert_eq!(ctx.attrib_location(program, "a_Position"), Some(AttribLocation(0)));
        assert_eq!(ctx.attrib_location(program, "a_Normal"), None);
        assert_eq!(ctx.uniform_location(program, "u_PvMatrix"), Some(UniformLocation(0)));
        assert_eq!(
            ctx.uniform_location(program, "u_LightColors"),
            Some(UniformLocation(1))
        );
        // stable on repeated lookup
        assert_eq!(ctx.uniform_location(program, "u_PvMatrix"), Some(UniformLocation(0)));
        assert_eq!(ctx.uniform_location(ProgramId(99), "u_PvMatrix"), None);
    }

    #[test]
    fn identifier_match_is_whole_word() {
        assert!(mentions("uniform float u_Intensity;", "u_Intensity"));
        assert!(!mentions("uniform float u_IntensityScale;", "u_Intensity"));
        assert!(!mentions("uniform float xu_Intensity;", "u_Intensity"));
        assert!(!mentions("anything", ""));
    }

    #[test]
    fn texture_limit_fails_creation() {
        let mut ctx = RecordingContext::with_texture_limit(1);
        assert!(ctx.create_texture().is_ok());
        assert!(matches!(
            ctx.create_texture(),
            Err(ContextError::Create("texture", _))
        ));
    }

    #[test]
    fn commands_are_classified() {
        let mut ctx = RecordingContext::new();
        let tex = ctx.create_texture().unwrap();
        ctx.bind_texture(tex);
        ctx.uniform_1f(UniformLocation(0), 1.0);
        assert_eq!(ctx.count(Command::is_texture_op), 2);
        assert_eq!(ctx.count(Command::is_uniform_upload), 1);
        assert_eq!(ctx.take_commands().len(), 3);
        assert!(ctx.commands().is_empty());
    }
}

//! GPU resource binding and update layer.
//!
//! A [`ProgramRegistry`] maps names to compiled programs. [`Material`]s
//! resolve programs from it and own the uniform and texture state of one
//! draw call; a [`RenderObject`] pairs a material with a geometry. The
//! [`Scene`] compiles programs at startup, gates drawing on readiness and
//! runs the per-frame init/update/draw loop.
//!
//! # Invariants
//! - Registration is first-write-wins; invalid programs are never stored.
//! - Texture images re-upload only when a slot was marked via `set_texture`.
//! - Texture unit index equals slot insertion order.
//! - Per-frame failures degrade to skips; startup failures are fatal.

pub mod context;
pub mod geometry;
pub mod inspector;
pub mod material;
pub mod object;
pub mod recording;
pub mod registry;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod uniform;

pub use context::{ContextError, GraphicsContext, TextureImage, TextureParameter};
pub use geometry::{BufferGeometry, Geometry, GeometryDescriptor, VertexAttribute};
pub use inspector::{ObjectInfo, SceneInspector, SceneSummary};
pub use material::{Material, MaterialDescriptor, MaterialError, ProgramRef};
pub use object::{GeometrySource, MaterialSource, ObjectDescriptor, ObjectFile, RenderObject};
pub use recording::{Command, RecordingContext};
pub use registry::{
    AttribLocations, ProgramHandle, ProgramLocations, ProgramRegistry, Registration,
    UniformLocations,
};
pub use scene::{DrawStatus, FrameUniforms, ObjectId, Scene, SceneError};
pub use shader::{FileShaderLoader, MemoryShaderLoader, ProgramSource, ShaderError, ShaderLoader};
pub use texture::{TexturePatch, TextureSlot};
pub use uniform::UniformValue;

pub fn crate_info() -> &'static str {
    "glassroom-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}

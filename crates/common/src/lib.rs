//! Shared types for the glassroom renderer.
//!
//! GPU objects are referred to through small copyable ids. Backends map
//! those ids onto their native objects; the core never sees a native handle.

pub mod gl;
pub mod ids;
pub mod types;

pub use gl::{BufferTarget, DrawMode, PixelFormat, TextureFilter, WrapMode};
pub use ids::{AttribLocation, BufferId, ProgramId, TextureId, UniformLocation};
pub use types::Transform;

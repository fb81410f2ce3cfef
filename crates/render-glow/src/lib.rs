//! OpenGL / WebGL2 backend for the glassroom renderer.
//!
//! [`GlowContext`] implements [`glassroom_render::GraphicsContext`] over a
//! `glow::Context` created by the host (window, canvas or headless surface).
//!
//! # Invariants
//! - Ids handed out by the context index its native object tables; they are
//!   never reused.
//! - Unknown ids are logged and the call is dropped.

mod context;
mod convert;

pub use context::GlowContext;

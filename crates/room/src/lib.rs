//! Room scene content for the glassroom renderer.
//!
//! Built-in programs, procedural shapes, an orbit camera, point lights with
//! their emissive markers, and [`RoomScene`] which assembles them into a
//! [`glassroom_render::Scene`].

pub mod camera;
pub mod light;
pub mod room;
pub mod shaders;
pub mod shapes;

pub use camera::OrbitCamera;
pub use light::{Light, LightVisualizer, MAX_LIGHTS, light_arrays};
pub use room::{RoomObjects, RoomScene, checker};
pub use shaders::{builtin_loader, programs};

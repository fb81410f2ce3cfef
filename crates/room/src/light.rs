use glam::{Mat4, Vec3};
use glassroom_render::{GeometryDescriptor, MaterialDescriptor, ObjectDescriptor};

use crate::shaders::EMISSIVE;
use crate::shapes;

/// How many lights the room programs accept.
pub const MAX_LIGHTS: usize = 4;

/// A point light. `color` is in 0..=255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color,
            intensity: 1.0,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Linear color scaled by intensity, as fed to the shading programs.
    pub fn radiance(&self) -> Vec3 {
        self.color / 255.0 * self.intensity
    }
}

/// `u_LightPositions` / `u_LightColors` arrays, padded with black lights.
pub fn light_arrays(lights: &[Light]) -> (Vec<Vec3>, Vec<Vec3>) {
    if lights.len() > MAX_LIGHTS {
        tracing::warn!("{} lights given, using the first {MAX_LIGHTS}", lights.len());
    }
    let mut positions = vec![Vec3::ZERO; MAX_LIGHTS];
    let mut colors = vec![Vec3::ZERO; MAX_LIGHTS];
    for (i, light) in lights.iter().take(MAX_LIGHTS).enumerate() {
        positions[i] = light.position;
        colors[i] = light.radiance();
    }
    (positions, colors)
}

/// Small emissive sphere drawn at a light's position.
///
/// `color_scale` maps the light's 0..=255 color into the emissive color and
/// has no built-in default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightVisualizer {
    pub visible: bool,
    pub color_scale: f32,
    pub intensity: f32,
    pub radius: f32,
}

impl LightVisualizer {
    pub fn new(color_scale: f32) -> Self {
        Self {
            visible: true,
            color_scale,
            intensity: 8.0,
            radius: 0.2,
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Marker object for `light`, or `None` when markers are hidden.
    pub fn marker(&self, light: &Light) -> Option<ObjectDescriptor> {
        if !self.visible {
            return None;
        }
        let sphere = shapes::sphere(self.radius, 16, 16);
        let geometry = GeometryDescriptor::default().index(sphere.index.clone());
        let geometry = match sphere.attributes.get("a_Position") {
            Some(position) => {
                geometry.attribute("a_Position", position.data.clone(), position.components)
            }
            None => geometry,
        };
        let material = MaterialDescriptor::new(EMISSIVE)
            .uniform("u_ModelMatrix", Mat4::from_translation(light.position))
            .uniform("u_PvMatrix", Mat4::IDENTITY)
            .uniform("u_EmissiveColor", light.color * self.color_scale)
            .uniform("u_Intensity", self.intensity);
        Some(ObjectDescriptor::new(geometry, material))
    }
}

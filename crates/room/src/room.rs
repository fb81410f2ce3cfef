use glam::{Mat4, Vec3};
use glassroom_common::{PixelFormat, TextureFilter, Transform, WrapMode};
use glassroom_render::{
    FrameUniforms, MaterialDescriptor, ObjectDescriptor, ObjectId, Scene, SceneError,
    TextureImage, TextureSlot, UniformValue,
};

use crate::camera::OrbitCamera;
use crate::light::{Light, LightVisualizer, light_arrays};
use crate::shaders::{GLASS, MAIN};
use crate::shapes;

/// Square RGB checkerboard of `size` pixels with `cells` squares per side.
pub fn checker(size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> TextureImage {
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    TextureImage::new(size, size, pixels)
}

/// Ids of the objects added by [`RoomScene::populate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomObjects {
    pub shell: ObjectId,
    pub sphere: ObjectId,
    pub markers: Vec<ObjectId>,
}

/// A textured room with a glass sphere in the middle, lit by point lights.
#[derive(Debug, Clone)]
pub struct RoomScene {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub sphere: Transform,
    pub sphere_radius: f32,
    pub lights: Vec<Light>,
    pub visualizer: LightVisualizer,
}

impl RoomScene {
    /// A 20 x 12 x 20 room with four warm ceiling lights.
    pub fn new(visualizer: LightVisualizer) -> Self {
        let color = Vec3::new(255.0, 236.0, 210.0);
        let lights = [(-6.0, -6.0), (6.0, -6.0), (-6.0, 6.0), (6.0, 6.0)]
            .into_iter()
            .map(|(x, z)| Light::new(Vec3::new(x, 10.0, z), color))
            .collect();
        Self {
            width: 20.0,
            height: 12.0,
            depth: 20.0,
            sphere: Transform::from_position(Vec3::new(0.0, 3.0, 0.0)),
            sphere_radius: 2.0,
            lights,
            visualizer,
        }
    }

    /// Set every light's intensity.
    pub fn with_light_intensity(mut self, intensity: f32) -> Self {
        for light in &mut self.lights {
            light.intensity = intensity;
        }
        self
    }

    fn light_uniforms(&self) -> [(String, UniformValue); 2] {
        let (positions, colors) = light_arrays(&self.lights);
        [
            ("u_LightPositions".to_string(), UniformValue::Vec3Array(positions)),
            ("u_LightColors".to_string(), UniformValue::Vec3Array(colors)),
        ]
    }

    fn shell(&self) -> ObjectDescriptor {
        let wall = checker(256, 8, [214, 206, 196], [186, 176, 164]);
        let floor = checker(256, 16, [90, 78, 66], [60, 50, 42]);
        let sampling = |image| {
            TextureSlot::new(image)
                .with_format(PixelFormat::Rgb)
                .with_wrap(WrapMode::Repeat)
                .with_filters(TextureFilter::Linear, TextureFilter::LinearMipmapLinear)
        };
        let mut material = MaterialDescriptor::new(MAIN)
            .uniform("u_PvMatrix", Mat4::IDENTITY)
            .uniform("u_ModelMatrix", Mat4::IDENTITY)
            .uniform("u_Eye", Vec3::ZERO)
            .uniform("u_Metallic", 0.1_f32)
            .uniform("u_Roughness", 0.6_f32)
            .uniform("u_Color", Vec3::ONE)
            .texture("u_WallTex", sampling(wall))
            .texture("u_FloorTex", sampling(floor));
        material.uniforms.extend(self.light_uniforms());
        ObjectDescriptor::new(
            shapes::room_shell(self.width, self.height, self.depth),
            material,
        )
    }

    fn glass_sphere(&self) -> ObjectDescriptor {
        let mut material = MaterialDescriptor::new(GLASS)
            .uniform("u_PvMatrix", Mat4::IDENTITY)
            .uniform("u_ModelMatrix", self.sphere.matrix())
            .uniform("u_NormalMatrix", self.sphere.normal_matrix())
            .uniform("u_Eye", Vec3::ZERO);
        material.uniforms.extend(self.light_uniforms());
        ObjectDescriptor::new(shapes::sphere(self.sphere_radius, 48, 32), material)
    }

    /// Add the room shell, the glass sphere and one marker per light.
    ///
    /// The scene must be ready: every object names a program.
    pub fn populate(&self, scene: &mut Scene) -> Result<RoomObjects, SceneError> {
        let shell = scene.add_descriptor(self.shell())?;
        let sphere = scene.add_descriptor(self.glass_sphere())?;
        let mut markers = Vec::new();
        for light in &self.lights {
            if let Some(marker) = self.visualizer.marker(light) {
                markers.push(scene.add_descriptor(marker)?);
            }
        }
        tracing::info!(
            "room populated with {} objects ({} light markers)",
            2 + markers.len(),
            markers.len()
        );
        Ok(RoomObjects {
            shell,
            sphere,
            markers,
        })
    }

    /// Camera pose plus the current light arrays.
    pub fn frame_uniforms(&self, camera: &OrbitCamera) -> FrameUniforms {
        let mut frame = camera.frame_uniforms();
        frame.extend(self.light_uniforms());
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{builtin_loader, programs};
    use glassroom_render::{DrawStatus, RecordingContext};

    fn ready(ctx: &mut RecordingContext) -> Scene {
        let mut scene = Scene::new();
        pollster::block_on(scene.initialize(ctx, &builtin_loader(), &programs())).unwrap();
        scene
    }

    #[test]
    fn checker_alternates() {
        let image = checker(4, 2, [255, 255, 255], [0, 0, 0]);
        assert_eq!(image.pixels.len(), 48);
        assert_eq!(&image.pixels[0..3], &[255, 255, 255]);
        assert_eq!(&image.pixels[6..9], &[0, 0, 0]);
    }

    #[test]
    fn populate_before_ready_fails() {
        let mut scene = Scene::new();
        let room = RoomScene::new(LightVisualizer::new(0.0025));
        assert!(matches!(
            room.populate(&mut scene),
            Err(SceneError::Material(_))
        ));
    }

    #[test]
    fn room_draws_every_object() {
        let mut ctx = RecordingContext::new();
        let mut scene = ready(&mut ctx);
        let room = RoomScene::new(LightVisualizer::new(0.0025));
        let objects = room.populate(&mut scene).unwrap();
        assert_eq!(objects.markers.len(), 4);

        let frame = room.frame_uniforms(&OrbitCamera::default());
        assert_eq!(scene.draw(&mut ctx, &frame), DrawStatus::Drawn(6));
        // wall and floor textures upload once
        assert_eq!(ctx.uploads(), 2);
        assert_eq!(scene.draw(&mut ctx, &frame), DrawStatus::Drawn(6));
        assert_eq!(ctx.uploads(), 2);
    }

    #[test]
    fn hidden_markers_are_not_added() {
        let mut ctx = RecordingContext::new();
        let mut scene = ready(&mut ctx);
        let mut visualizer = LightVisualizer::new(0.0025);
        visualizer.visible = false;
        let objects = RoomScene::new(visualizer).populate(&mut scene).unwrap();
        assert!(objects.markers.is_empty());
        assert_eq!(scene.object_count(), 2);
    }

    #[test]
    fn light_intensity_reaches_color_array() {
        let room = RoomScene::new(LightVisualizer::new(0.0025)).with_light_intensity(2.0);
        let frame = room.frame_uniforms(&OrbitCamera::default());
        let Some(UniformValue::Vec3Array(colors)) = frame.get("u_LightColors") else {
            panic!("missing light colors");
        };
        assert!((colors[0].x - 2.0).abs() < 1e-6);
    }
}

//! Materials: a program reference plus the uniform and texture state one
//! draw call needs.
//!
//! Uploads are explicit. Uniforms are re-sent every frame because other
//! materials may share the program; textures are re-uploaded only when a
//! slot is marked through [`Material::set_texture`].

use crate::context::GraphicsContext;
use crate::registry::{ProgramHandle, ProgramRegistry, UniformLocations};
use crate::texture::{TexturePatch, TextureSlot};
use crate::uniform::UniformValue;
use glassroom_common::DrawMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Errors from material construction.
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("program \"{0}\" not found")]
    ProgramNotFound(String),
}

/// Either an already resolved program or a name to resolve in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramRef {
    Named(String),
    #[serde(skip)]
    Handle(Rc<ProgramHandle>),
}

impl From<&str> for ProgramRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<Rc<ProgramHandle>> for ProgramRef {
    fn from(handle: Rc<ProgramHandle>) -> Self {
        Self::Handle(handle)
    }
}

/// Plain description of a material. Missing fields default to no program,
/// no uniforms, no textures and triangle topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDescriptor {
    pub program: Option<ProgramRef>,
    pub uniforms: BTreeMap<String, UniformValue>,
    /// Order fixes the texture unit of each slot.
    pub textures: Vec<(String, TextureSlot)>,
    pub draw_mode: DrawMode,
}

impl MaterialDescriptor {
    pub fn new(program: impl Into<ProgramRef>) -> Self {
        Self {
            program: Some(program.into()),
            ..Self::default()
        }
    }

    pub fn uniform(mut self, name: &str, value: impl Into<UniformValue>) -> Self {
        self.uniforms.insert(name.to_string(), value.into());
        self
    }

    pub fn texture(mut self, name: &str, slot: TextureSlot) -> Self {
        self.textures.push((name.to_string(), slot));
        self
    }

    pub fn draw_mode(mut self, mode: DrawMode) -> Self {
        self.draw_mode = mode;
        self
    }
}

/// Uniform values, texture slots and draw mode bound to one program.
#[derive(Debug, Clone)]
pub struct Material {
    program: Option<Rc<ProgramHandle>>,
    program_name: Option<String>,
    uniforms: BTreeMap<String, UniformValue>,
    textures: Vec<(String, TextureSlot)>,
    draw_mode: DrawMode,
}

impl Material {
    /// Build a material, resolving a named program against `registry`.
    ///
    /// An unknown program name is fatal: the material would be unusable.
    pub fn new(
        descriptor: MaterialDescriptor,
        registry: &ProgramRegistry,
    ) -> Result<Self, MaterialError> {
        let (program, program_name) = match descriptor.program {
            Some(ProgramRef::Named(name)) => {
                let handle = registry
                    .get(&name)
                    .ok_or_else(|| MaterialError::ProgramNotFound(name.clone()))?;
                (Some(handle), Some(name))
            }
            Some(ProgramRef::Handle(handle)) => (Some(handle), None),
            None => (None, None),
        };
        Ok(Self {
            program,
            program_name,
            uniforms: descriptor.uniforms,
            textures: descriptor.textures,
            draw_mode: descriptor.draw_mode,
        })
    }

    pub fn program(&self) -> Option<&Rc<ProgramHandle>> {
        self.program.as_ref()
    }

    /// Registry name the program was resolved from, if any.
    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn texture(&self, name: &str) -> Option<&TextureSlot> {
        self.textures
            .iter()
            .find(|(slot_name, _)| slot_name == name)
            .map(|(_, slot)| slot)
    }

    /// Texture slot names in unit order.
    pub fn texture_names(&self) -> impl Iterator<Item = &str> {
        self.textures.iter().map(|(name, _)| name.as_str())
    }

    /// Create missing texture objects, then upload every slot once.
    pub fn init(&mut self, ctx: &mut dyn GraphicsContext) {
        for (unit, (name, slot)) in self.textures.iter_mut().enumerate() {
            if slot.texture.is_none() {
                match ctx.create_texture() {
                    Ok(texture) => slot.texture = Some(texture),
                    Err(e) => {
                        tracing::warn!("texture {name}: {e}");
                        continue;
                    }
                }
            }
            slot.upload(ctx, unit as u32);
            slot.needs_update = false;
        }
    }

    /// Upload uniforms, then bind textures to their units.
    ///
    /// Uniforms without a location are skipped: the program may simply not
    /// use them.
    pub fn update(&mut self, ctx: &mut dyn GraphicsContext, locations: &UniformLocations) {
        for (name, value) in &self.uniforms {
            if let Some(&location) = locations.get(name) {
                value.upload(ctx, location);
            }
        }

        for (unit, (name, slot)) in self.textures.iter_mut().enumerate() {
            let unit = unit as u32;
            if slot.needs_update {
                slot.needs_update = false;
                if slot.texture.is_none() {
                    match ctx.create_texture() {
                        Ok(texture) => slot.texture = Some(texture),
                        Err(e) => tracing::warn!("texture {name}: {e}"),
                    }
                }
                slot.upload(ctx, unit);
            } else if let Some(texture) = slot.texture {
                ctx.active_texture(unit);
                ctx.bind_texture(texture);
            }
            if let Some(&location) = locations.get(name) {
                ctx.uniform_1i(location, unit as i32);
            }
        }
    }

    /// Replace the value of an existing uniform. Unknown names are ignored.
    ///
    /// The slot keeps its type: a value of another type is rejected, since
    /// the type decides which upload call is issued.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        let Some(slot) = self.uniforms.get_mut(name) else {
            return false;
        };
        let value = value.into();
        if std::mem::discriminant(slot) != std::mem::discriminant(&value) {
            tracing::warn!(
                "uniform {name} is {}, ignoring {} value",
                slot.type_name(),
                value.type_name()
            );
            return false;
        }
        *slot = value;
        true
    }

    /// Merge into (or append) a texture slot and mark it for re-upload.
    pub fn set_texture(&mut self, name: &str, patch: TexturePatch) {
        match self.textures.iter_mut().find(|(slot_name, _)| slot_name == name) {
            Some((_, slot)) => {
                slot.merge(patch);
                slot.needs_update = true;
            }
            None => {
                let mut slot = TextureSlot::from(patch);
                slot.needs_update = true;
                self.textures.push((name.to_string(), slot));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TextureImage;
    use crate::recording::{Command, RecordingContext};
    use glam::Vec3;
    use glassroom_common::{ProgramId, TextureId, UniformLocation};

    fn registry() -> ProgramRegistry {
        let mut registry = ProgramRegistry::new();
        registry.register(
            "Main",
            ProgramHandle::new(ProgramId(1), ["a_Position"], ["u_Color", "diffuse", "normal"]),
        );
        registry
    }

    fn image() -> TextureImage {
        TextureImage::new(1, 1, vec![10, 20, 30])
    }

    fn locations(names: &[&str]) -> UniformLocations {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), UniformLocation(i as u32)))
            .collect()
    }

    #[test]
    fn unknown_program_name_is_fatal() {
        let registry = ProgramRegistry::new();
        let err = Material::new(MaterialDescriptor::new("Main"), &registry).unwrap_err();
        assert!(matches!(err, MaterialError::ProgramNotFound(name) if name == "Main"));
    }

    #[test]
    fn named_program_resolves_to_registered_handle() {
        let registry = registry();
        let material = Material::new(MaterialDescriptor::new("Main"), &registry).unwrap();
        assert!(Rc::ptr_eq(material.program().unwrap(), &registry.get("Main").unwrap()));
        assert_eq!(material.program_name(), Some("Main"));
    }

    #[test]
    fn defaults_when_descriptor_is_empty() {
        let material = Material::new(MaterialDescriptor::default(), &registry()).unwrap();
        assert!(material.program().is_none());
        assert_eq!(material.draw_mode(), DrawMode::Triangles);
        assert_eq!(material.texture_names().count(), 0);
    }

    #[test]
    fn missing_uniform_location_is_skipped() {
        let mut ctx = RecordingContext::new();
        let mut material = Material::new(
            MaterialDescriptor::new("Main").uniform("u_Unused", 1.0_f32),
            &registry(),
        )
        .unwrap();
        material.update(&mut ctx, &locations(&["u_Color"]));
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn set_uniform_ignores_unknown_names() {
        let mut material = Material::new(
            MaterialDescriptor::new("Main").uniform("u_Color", Vec3::ONE),
            &registry(),
        )
        .unwrap();
        assert!(material.set_uniform("u_Color", Vec3::ZERO));
        assert!(!material.set_uniform("u_Other", 1.0_f32));
        assert_eq!(material.uniform("u_Color"), Some(&UniformValue::Vec3(Vec3::ZERO)));
        assert!(material.uniform("u_Other").is_none());
    }

    #[test]
    fn set_uniform_keeps_slot_type() {
        let mut ctx = RecordingContext::new();
        let mut material = Material::new(
            MaterialDescriptor::new("Main").uniform("u_Color", 1.0_f32),
            &registry(),
        )
        .unwrap();
        assert!(!material.set_uniform("u_Color", 2_i32));
        assert_eq!(material.uniform("u_Color"), Some(&UniformValue::Float(1.0)));

        assert!(material.set_uniform("u_Color", 2.0_f32));
        material.update(&mut ctx, &locations(&["u_Color"]));
        assert_eq!(ctx.commands(), &[Command::Uniform1f(UniformLocation(0), 2.0)]);
    }

    fn two_slot_material() -> Material {
        Material::new(
            MaterialDescriptor::new("Main")
                .texture("diffuse", TextureSlot::new(image()))
                .texture("normal", TextureSlot::new(image())),
            &registry(),
        )
        .unwrap()
    }

    #[test]
    fn failed_texture_creation_skips_slot() {
        let mut ctx = RecordingContext::with_texture_limit(1);
        let mut material = two_slot_material();
        material.init(&mut ctx);
        assert_eq!(ctx.count(|c| matches!(c, Command::CreateTexture(_))), 1);
        assert_eq!(ctx.uploads(), 1);
        assert!(material.texture("normal").unwrap().texture.is_none());
        assert!(!ctx.commands().contains(&Command::ActiveTexture(1)));

        ctx.take_commands();
        let locs = locations(&["diffuse", "normal"]);
        material.update(&mut ctx, &locs);
        assert_eq!(ctx.uploads(), 0);
        assert_eq!(
            ctx.commands(),
            &[
                Command::ActiveTexture(0),
                Command::BindTexture(TextureId(1)),
                Command::Uniform1i(locs["diffuse"], 0),
                Command::Uniform1i(locs["normal"], 1),
            ]
        );
    }

    #[test]
    fn set_texture_retries_failed_creation() {
        let mut ctx = RecordingContext::with_texture_limit(1);
        let mut material = two_slot_material();
        material.init(&mut ctx);
        let locs = locations(&["diffuse", "normal"]);

        // still over the limit: the flag is consumed, nothing is uploaded
        material.set_texture("normal", TexturePatch::image(image()));
        ctx.take_commands();
        material.update(&mut ctx, &locs);
        assert_eq!(ctx.uploads(), 0);
        assert!(!material.texture("normal").unwrap().needs_update);

        ctx.set_texture_limit(None);
        material.set_texture("normal", TexturePatch::image(image()));
        material.update(&mut ctx, &locs);
        assert_eq!(material.texture("normal").unwrap().texture, Some(TextureId(2)));
        assert_eq!(ctx.uploads(), 1);
        assert!(ctx.commands().contains(&Command::ActiveTexture(1)));
    }

    #[test]
    fn init_creates_textures_and_uploads_each_slot() {
        let mut ctx = RecordingContext::new();
        let mut material = Material::new(
            MaterialDescriptor::new("Main")
                .texture("diffuse", TextureSlot::new(image()))
                .texture("normal", TextureSlot::new(image())),
            &registry(),
        )
        .unwrap();
        material.init(&mut ctx);
        assert_eq!(ctx.count(|c| matches!(c, Command::CreateTexture(_))), 2);
        assert_eq!(ctx.uploads(), 2);

        // init keeps existing texture objects
        material.init(&mut ctx);
        assert_eq!(ctx.count(|c| matches!(c, Command::CreateTexture(_))), 2);
        assert_eq!(ctx.uploads(), 4);
    }

    #[test]
    fn set_texture_uploads_once_per_flag() {
        let mut ctx = RecordingContext::new();
        let mut material = Material::new(
            MaterialDescriptor::new("Main").texture("diffuse", TextureSlot::new(image())),
            &registry(),
        )
        .unwrap();
        material.init(&mut ctx);
        ctx.take_commands();
        let locs = locations(&["diffuse"]);

        material.set_texture("diffuse", TexturePatch::image(image()));
        material.set_texture("diffuse", TexturePatch::image(image()));
        assert!(material.texture("diffuse").unwrap().needs_update);

        material.update(&mut ctx, &locs);
        assert_eq!(ctx.uploads(), 1);
        assert!(!material.texture("diffuse").unwrap().needs_update);

        material.update(&mut ctx, &locs);
        assert_eq!(ctx.uploads(), 1);
    }

    #[test]
    fn set_texture_adds_new_slot() {
        let mut ctx = RecordingContext::new();
        let mut material = Material::new(MaterialDescriptor::new("Main"), &registry()).unwrap();
        material.set_texture("diffuse", TexturePatch::image(image()));
        assert!(material.texture("diffuse").unwrap().needs_update);

        material.update(&mut ctx, &locations(&["diffuse"]));
        assert_eq!(ctx.count(|c| matches!(c, Command::CreateTexture(_))), 1);
        assert_eq!(ctx.uploads(), 1);
    }

    #[test]
    fn texture_units_follow_insertion_order() {
        let mut ctx = RecordingContext::new();
        let mut material = Material::new(
            MaterialDescriptor::new("Main")
                .texture("diffuse", TextureSlot::new(image()))
                .texture("normal", TextureSlot::new(image())),
            &registry(),
        )
        .unwrap();
        material.init(&mut ctx);
        material.set_texture("normal", TexturePatch::image(image()));
        material.set_texture("diffuse", TexturePatch::image(image()));
        ctx.take_commands();

        let locs = locations(&["diffuse", "normal"]);
        material.update(&mut ctx, &locs);
        material.update(&mut ctx, &locs);

        let samplers: Vec<_> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Uniform1i(loc, unit) => Some((*loc, *unit)),
                _ => None,
            })
            .collect();
        assert_eq!(
            samplers,
            vec![
                (locs["diffuse"], 0),
                (locs["normal"], 1),
                (locs["diffuse"], 0),
                (locs["normal"], 1),
            ]
        );
        let binds: Vec<_> = ctx
            .commands()
            .windows(2)
            .filter_map(|w| match w {
                [Command::ActiveTexture(unit), Command::BindTexture(tex)] => Some((*unit, *tex)),
                _ => None,
            })
            .collect();
        assert_eq!(
            binds,
            vec![
                (0, TextureId(1)),
                (1, TextureId(2)),
                (0, TextureId(1)),
                (1, TextureId(2)),
            ]
        );
    }

    #[test]
    fn descriptor_reads_from_json() {
        let json = r#"{
            "program": "Main",
            "uniforms": { "u_Intensity": { "type": "float", "value": 2.0 } },
            "draw_mode": "lines"
        }"#;
        let descriptor: MaterialDescriptor = serde_json::from_str(json).unwrap();
        let material = Material::new(descriptor, &registry()).unwrap();
        assert_eq!(material.draw_mode(), DrawMode::Lines);
        assert_eq!(material.uniform("u_Intensity"), Some(&UniformValue::Float(2.0)));
    }
}

use crate::context::GraphicsContext;
use crate::geometry::{BufferGeometry, Geometry, GeometryDescriptor};
use crate::material::{Material, MaterialDescriptor, MaterialError};
use crate::registry::{AttribLocations, ProgramRegistry, UniformLocations};
use serde::Deserialize;

/// A material given either built or as a plain descriptor.
#[derive(Debug)]
pub enum MaterialSource {
    Built(Material),
    Descriptor(MaterialDescriptor),
}

impl MaterialSource {
    fn build(self, registry: &ProgramRegistry) -> Result<Material, MaterialError> {
        match self {
            Self::Built(material) => Ok(material),
            Self::Descriptor(descriptor) => Material::new(descriptor, registry),
        }
    }
}

impl From<Material> for MaterialSource {
    fn from(material: Material) -> Self {
        Self::Built(material)
    }
}

impl From<MaterialDescriptor> for MaterialSource {
    fn from(descriptor: MaterialDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

/// A geometry given either built or as a plain descriptor.
#[derive(Debug)]
pub enum GeometrySource {
    Built(Box<dyn Geometry>),
    Descriptor(GeometryDescriptor),
}

impl GeometrySource {
    fn build(self) -> Box<dyn Geometry> {
        match self {
            Self::Built(geometry) => geometry,
            Self::Descriptor(descriptor) => Box::new(BufferGeometry::new(descriptor)),
        }
    }
}

impl From<GeometryDescriptor> for GeometrySource {
    fn from(descriptor: GeometryDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<BufferGeometry> for GeometrySource {
    fn from(geometry: BufferGeometry) -> Self {
        Self::Built(Box::new(geometry))
    }
}

/// What a render object is made of.
#[derive(Debug)]
pub struct ObjectDescriptor {
    pub geometry: GeometrySource,
    pub material: MaterialSource,
}

impl ObjectDescriptor {
    pub fn new(geometry: impl Into<GeometrySource>, material: impl Into<MaterialSource>) -> Self {
        Self {
            geometry: geometry.into(),
            material: material.into(),
        }
    }
}

/// Serialized form of an object: both parts as plain descriptors.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectFile {
    pub geometry: GeometryDescriptor,
    pub material: MaterialDescriptor,
}

impl From<ObjectFile> for ObjectDescriptor {
    fn from(file: ObjectFile) -> Self {
        Self::new(file.geometry, file.material)
    }
}

/// One material drawn over one geometry.
#[derive(Debug)]
pub struct RenderObject {
    material: Material,
    geometry: Box<dyn Geometry>,
}

impl RenderObject {
    /// Materialize both parts. Fails only when a named program is unknown.
    pub fn new(
        descriptor: ObjectDescriptor,
        registry: &ProgramRegistry,
    ) -> Result<Self, MaterialError> {
        Ok(Self {
            material: descriptor.material.build(registry)?,
            geometry: descriptor.geometry.build(),
        })
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn geometry(&self) -> &dyn Geometry {
        self.geometry.as_ref()
    }

    /// Must run once before the first `update`.
    pub fn init(&mut self, ctx: &mut dyn GraphicsContext) {
        self.material.init(ctx);
        self.geometry.init(ctx);
    }

    /// Bind geometry then material state. Must precede the draw call.
    pub fn update(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        attributes: &AttribLocations,
        uniforms: &UniformLocations,
    ) {
        self.geometry.update(ctx, attributes);
        self.material.update(ctx, uniforms);
    }
}

use crate::context::GraphicsContext;
use crate::registry::AttribLocations;
use glassroom_common::{BufferId, BufferTarget};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-vertex attribute and index buffers feeding one draw call.
pub trait Geometry: std::fmt::Debug {
    /// Create and fill GPU buffers. Called once before the first update.
    fn init(&mut self, ctx: &mut dyn GraphicsContext);

    /// Bind buffers to the attribute locations of the program in use.
    fn update(&mut self, ctx: &mut dyn GraphicsContext, locations: &AttribLocations);

    fn index_count(&self) -> u32;
}

/// Flat `f32` data for one attribute and how many components make a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub data: Vec<f32>,
    pub components: u32,
    #[serde(skip)]
    buffer: Option<BufferId>,
}

impl VertexAttribute {
    pub fn new(data: Vec<f32>, components: u32) -> Self {
        Self {
            data,
            components,
            buffer: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.data.len() / self.components as usize
        }
    }
}

/// Plain description of an indexed geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryDescriptor {
    pub attributes: BTreeMap<String, VertexAttribute>,
    pub index: Vec<u32>,
}

impl GeometryDescriptor {
    pub fn attribute(mut self, name: &str, data: Vec<f32>, components: u32) -> Self {
        self.attributes
            .insert(name.to_string(), VertexAttribute::new(data, components));
        self
    }

    pub fn index(mut self, index: Vec<u32>) -> Self {
        self.index = index;
        self
    }
}

/// Indexed geometry backed by one buffer per attribute.
#[derive(Debug, Clone, Default)]
pub struct BufferGeometry {
    attributes: BTreeMap<String, VertexAttribute>,
    index: Vec<u32>,
    index_buffer: Option<BufferId>,
}

impl BufferGeometry {
    pub fn new(descriptor: GeometryDescriptor) -> Self {
        Self {
            attributes: descriptor.attributes,
            index: descriptor.index,
            index_buffer: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.get(name)
    }
}

impl Geometry for BufferGeometry {
    fn init(&mut self, ctx: &mut dyn GraphicsContext) {
        for (name, attribute) in &mut self.attributes {
            if attribute.buffer.is_some() {
                continue;
            }
            match ctx.create_buffer() {
                Ok(buffer) => {
                    ctx.buffer_data(
                        BufferTarget::Vertex,
                        buffer,
                        bytemuck::cast_slice(&attribute.data),
                    );
                    attribute.buffer = Some(buffer);
                }
                Err(e) => tracing::warn!("attribute {name}: {e}"),
            }
        }
        if self.index_buffer.is_none() {
            match ctx.create_buffer() {
                Ok(buffer) => {
                    ctx.buffer_data(BufferTarget::Index, buffer, bytemuck::cast_slice(&self.index));
                    self.index_buffer = Some(buffer);
                }
                Err(e) => tracing::warn!("index buffer: {e}"),
            }
        }
    }

    fn update(&mut self, ctx: &mut dyn GraphicsContext, locations: &AttribLocations) {
        for (name, attribute) in &self.attributes {
            let (Some(&location), Some(buffer)) = (locations.get(name), attribute.buffer) else {
                continue;
            };
            ctx.vertex_attrib(location, buffer, attribute.components);
        }
        if let Some(buffer) = self.index_buffer {
            ctx.bind_index_buffer(buffer);
        }
    }

    fn index_count(&self) -> u32 {
        self.index.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingContext};
    use glassroom_common::AttribLocation;

    fn triangle() -> BufferGeometry {
        BufferGeometry::new(
            GeometryDescriptor::default()
                .attribute("a_Position", vec![0.0; 9], 3)
                .attribute("a_TexCoord", vec![0.0; 6], 2)
                .index(vec![0, 1, 2]),
        )
    }

    #[test]
    fn init_uploads_every_buffer_once() {
        let mut ctx = RecordingContext::new();
        let mut geometry = triangle();
        geometry.init(&mut ctx);
        geometry.init(&mut ctx);
        assert_eq!(ctx.count(|c| matches!(c, Command::CreateBuffer(_))), 3);
        assert!(ctx.commands().contains(&Command::BufferData {
            target: BufferTarget::Index,
            buffer: BufferId(3),
            bytes: 12,
        }));
        assert_eq!(geometry.index_count(), 3);
    }

    #[test]
    fn update_binds_only_located_attributes() {
        let mut ctx = RecordingContext::new();
        let mut geometry = triangle();
        geometry.init(&mut ctx);
        ctx.take_commands();

        let locations = AttribLocations::from([("a_Position".to_string(), AttribLocation(0))]);
        geometry.update(&mut ctx, &locations);
        assert_eq!(
            ctx.commands(),
            &[
                Command::VertexAttrib {
                    location: AttribLocation(0),
                    buffer: BufferId(1),
                    components: 3,
                },
                Command::BindIndexBuffer(BufferId(3)),
            ]
        );
    }

    #[test]
    fn vertex_count_uses_components() {
        let attribute = VertexAttribute::new(vec![0.0; 12], 3);
        assert_eq!(attribute.vertex_count(), 4);
        assert_eq!(VertexAttribute::new(vec![1.0], 0).vertex_count(), 0);
    }
}

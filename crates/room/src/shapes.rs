//! Procedural meshes as geometry descriptors.

use glam::Vec3;
use glassroom_render::GeometryDescriptor;
use std::f32::consts::{PI, TAU};

/// Texture selector written to `a_TextureType`.
pub const FLOOR_TEXTURE: f32 = 0.0;
pub const WALL_TEXTURE: f32 = 1.0;

/// UV sphere centred on the origin with `a_Position`, `a_Normal` and
/// `a_TexCoord`. Segment counts below 3 are raised to 3.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryDescriptor {
    let width = width_segments.max(3);
    let height = height_segments.max(3);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    for y in 0..=height {
        let v = y as f32 / height as f32;
        let phi = v * PI;
        for x in 0..=width {
            let u = x as f32 / width as f32;
            let theta = u * TAU;
            let normal = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
            positions.extend_from_slice(&(normal * radius).to_array());
            normals.extend_from_slice(&normal.to_array());
            uvs.extend_from_slice(&[u, 1.0 - v]);
        }
    }

    // the first and last rings collapse to the poles; skip their degenerate halves
    let stride = width + 1;
    let mut index = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let a = y * stride + x;
            let b = a + stride;
            if y != 0 {
                index.extend_from_slice(&[a, b, a + 1]);
            }
            if y != height - 1 {
                index.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    GeometryDescriptor::default()
        .attribute("a_Position", positions, 3)
        .attribute("a_Normal", normals, 3)
        .attribute("a_TexCoord", uvs, 2)
        .index(index)
}

struct Face {
    corners: [Vec3; 4],
    normal: Vec3,
    uv_repeat: f32,
    texture: f32,
}

/// Inward-facing box standing on y = 0, for viewing from inside.
///
/// Carries `a_TextureType` so one program can pick the floor or wall texture.
pub fn room_shell(width: f32, height: f32, depth: f32) -> GeometryDescriptor {
    let (w, d) = (width / 2.0, depth / 2.0);
    let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
    let faces = [
        Face {
            corners: [p(-w, 0.0, -d), p(w, 0.0, -d), p(w, height, -d), p(-w, height, -d)],
            normal: Vec3::Z,
            uv_repeat: 2.0,
            texture: WALL_TEXTURE,
        },
        Face {
            corners: [p(w, 0.0, d), p(-w, 0.0, d), p(-w, height, d), p(w, height, d)],
            normal: Vec3::NEG_Z,
            uv_repeat: 2.0,
            texture: WALL_TEXTURE,
        },
        Face {
            corners: [p(-w, 0.0, d), p(-w, 0.0, -d), p(-w, height, -d), p(-w, height, d)],
            normal: Vec3::X,
            uv_repeat: 2.0,
            texture: WALL_TEXTURE,
        },
        Face {
            corners: [p(w, 0.0, -d), p(w, 0.0, d), p(w, height, d), p(w, height, -d)],
            normal: Vec3::NEG_X,
            uv_repeat: 2.0,
            texture: WALL_TEXTURE,
        },
        Face {
            corners: [p(-w, 0.0, d), p(w, 0.0, d), p(w, 0.0, -d), p(-w, 0.0, -d)],
            normal: Vec3::Y,
            uv_repeat: 4.0,
            texture: FLOOR_TEXTURE,
        },
        Face {
            corners: [p(-w, height, -d), p(w, height, -d), p(w, height, d), p(-w, height, d)],
            normal: Vec3::NEG_Y,
            uv_repeat: 2.0,
            texture: WALL_TEXTURE,
        },
    ];

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut types = Vec::new();
    let mut index = Vec::new();
    for (i, face) in faces.iter().enumerate() {
        let base = i as u32 * 4;
        let r = face.uv_repeat;
        for corner in face.corners {
            positions.extend_from_slice(&corner.to_array());
            normals.extend_from_slice(&face.normal.to_array());
            types.push(face.texture);
        }
        uvs.extend_from_slice(&[0.0, 0.0, r, 0.0, r, r, 0.0, r]);
        index.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    GeometryDescriptor::default()
        .attribute("a_Position", positions, 3)
        .attribute("a_Normal", normals, 3)
        .attribute("a_TexCoord", uvs, 2)
        .attribute("a_TextureType", types, 1)
        .index(index)
}

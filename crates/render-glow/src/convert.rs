use glassroom_common::{BufferTarget, DrawMode, PixelFormat, TextureFilter, WrapMode};

pub(crate) fn draw_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Points => glow::POINTS,
        DrawMode::Lines => glow::LINES,
        DrawMode::LineLoop => glow::LINE_LOOP,
        DrawMode::LineStrip => glow::LINE_STRIP,
        DrawMode::Triangles => glow::TRIANGLES,
        DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
        DrawMode::TriangleFan => glow::TRIANGLE_FAN,
    }
}

pub(crate) fn pixel_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
    }
}

pub(crate) fn wrap_mode(wrap: WrapMode) -> i32 {
    (match wrap {
        WrapMode::Repeat => glow::REPEAT,
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
    }) as i32
}

pub(crate) fn filter(filter: TextureFilter) -> i32 {
    (match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        TextureFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        TextureFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

pub(crate) fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mipmap_filters_map_to_mipmap_constants() {
        assert_eq!(
            filter(TextureFilter::LinearMipmapLinear),
            glow::LINEAR_MIPMAP_LINEAR as i32
        );
        assert_eq!(filter(TextureFilter::Nearest), glow::NEAREST as i32);
    }

    #[test]
    fn index_buffers_use_element_array() {
        assert_eq!(buffer_target(BufferTarget::Index), glow::ELEMENT_ARRAY_BUFFER);
        assert_eq!(draw_mode(DrawMode::Triangles), glow::TRIANGLES);
        assert_eq!(pixel_format(PixelFormat::Rgba), glow::RGBA);
        assert_eq!(wrap_mode(WrapMode::ClampToEdge), glow::CLAMP_TO_EDGE as i32);
    }
}

use crate::context::{GraphicsContext, TextureImage, TextureParameter};
use glassroom_common::{PixelFormat, TextureFilter, TextureId, WrapMode};
use serde::{Deserialize, Serialize};

/// A named image binding owned by one material.
///
/// The GPU texture is created lazily, once per slot. `needs_update` is the
/// only trigger for re-uploading the image after the first upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSlot {
    pub image: Option<TextureImage>,
    pub format: PixelFormat,
    pub wrap_s: Option<WrapMode>,
    pub wrap_t: Option<WrapMode>,
    pub mag_filter: Option<TextureFilter>,
    pub min_filter: Option<TextureFilter>,
    #[serde(skip)]
    pub texture: Option<TextureId>,
    #[serde(skip)]
    pub needs_update: bool,
}

impl TextureSlot {
    pub fn new(image: TextureImage) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_s = Some(wrap);
        self.wrap_t = Some(wrap);
        self
    }

    pub fn with_filters(mut self, mag: TextureFilter, min: TextureFilter) -> Self {
        self.mag_filter = Some(mag);
        self.min_filter = Some(min);
        self
    }

    /// Overwrite every field the patch sets.
    pub fn merge(&mut self, patch: TexturePatch) {
        if let Some(image) = patch.image {
            self.image = Some(image);
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
        if patch.wrap_s.is_some() {
            self.wrap_s = patch.wrap_s;
        }
        if patch.wrap_t.is_some() {
            self.wrap_t = patch.wrap_t;
        }
        if patch.mag_filter.is_some() {
            self.mag_filter = patch.mag_filter;
        }
        if patch.min_filter.is_some() {
            self.min_filter = patch.min_filter;
        }
    }

    /// Bind the slot's texture to `unit` and upload its image and sampler
    /// state.
    ///
    /// Wrap and filter parameters are only set when present. A fresh image
    /// gets a regenerated mip chain unless the min filter is a non-mipmap
    /// filter.
    pub fn upload(&self, ctx: &mut dyn GraphicsContext, unit: u32) {
        let Some(texture) = self.texture else {
            tracing::warn!("texture unit {unit} has no texture object, skipping upload");
            return;
        };
        ctx.active_texture(unit);
        ctx.bind_texture(texture);
        if let Some(image) = &self.image {
            ctx.tex_image_2d(self.format, image, true);
        }
        if let Some(wrap) = self.wrap_s {
            ctx.tex_parameter(TextureParameter::WrapS(wrap));
        }
        if let Some(wrap) = self.wrap_t {
            ctx.tex_parameter(TextureParameter::WrapT(wrap));
        }
        if let Some(filter) = self.mag_filter {
            ctx.tex_parameter(TextureParameter::MagFilter(filter));
        }
        if self.image.is_some() && self.min_filter.is_none_or(TextureFilter::uses_mipmaps) {
            ctx.generate_mipmap();
        }
        if let Some(filter) = self.min_filter {
            ctx.tex_parameter(TextureParameter::MinFilter(filter));
        }
    }
}

/// Partial update for a texture slot; unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePatch {
    pub image: Option<TextureImage>,
    pub format: Option<PixelFormat>,
    pub wrap_s: Option<WrapMode>,
    pub wrap_t: Option<WrapMode>,
    pub mag_filter: Option<TextureFilter>,
    pub min_filter: Option<TextureFilter>,
}

impl TexturePatch {
    pub fn image(image: TextureImage) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }
}

impl From<TexturePatch> for TextureSlot {
    fn from(patch: TexturePatch) -> Self {
        let mut slot = TextureSlot::default();
        slot.merge(patch);
        slot
    }
}

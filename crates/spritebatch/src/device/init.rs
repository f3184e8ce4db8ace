/// Blend mode of the sprite pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SpriteBlend {
    /// Texture and tint are premultiplied (`One, OneMinusSrcAlpha`).
    #[default]
    PremultipliedAlpha,
    /// Straight alpha (`SrcAlpha, OneMinusSrcAlpha`).
    Alpha,
    /// No blending; the sprite overwrites the target.
    Replace,
}

impl SpriteBlend {
    pub(crate) fn to_wgpu(self) -> wgpu::BlendState {
        match self {
            SpriteBlend::PremultipliedAlpha => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
            SpriteBlend::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            SpriteBlend::Replace => wgpu::BlendState::REPLACE,
        }
    }
}

/// Construction parameters for [`WgpuDevice`](super::WgpuDevice).
///
/// Keep this structure small; every field maps to one pipeline or sampler
/// setting.
#[derive(Debug, Clone)]
pub struct SpriteDeviceInit {
    /// Prefix for wgpu debug labels.
    pub label: &'static str,

    /// Vertices the buffer holds before the first growth.
    ///
    /// Rounded up to a power of two (at least 64).
    pub initial_vertex_capacity: u32,

    /// Texture sampling filter (magnification and minification).
    pub filter_mode: wgpu::FilterMode,

    /// Addressing for UVs outside `[0, 1]`.
    pub address_mode: wgpu::AddressMode,

    pub blend: SpriteBlend,
}

impl Default for SpriteDeviceInit {
    fn default() -> Self {
        Self {
            label: "spritebatch",
            initial_vertex_capacity: 6 * 1024,
            filter_mode: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::ClampToEdge,
            blend: SpriteBlend::PremultipliedAlpha,
        }
    }
}

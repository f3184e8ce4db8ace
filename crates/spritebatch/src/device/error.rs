use crate::scene::TextureId;

/// Failures reported by the bundled devices while replaying a frame.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceError {
    /// The texture id was never registered with the device (or was unregistered).
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// `draw_range` was issued before any texture was bound.
    #[error("draw issued with no texture bound")]
    NoTextureBound,

    /// The draw range reaches past the uploaded vertices.
    #[error("draw range {offset}+{count} exceeds {available} uploaded vertices")]
    RangeOutOfBounds { offset: u32, count: u32, available: u32 },

    /// The frame needs more vertices than the device's largest buffer can hold.
    #[error("frame needs {required} vertices, device buffers hold at most {max}")]
    VertexBufferTooLarge { required: usize, max: u32 },
}

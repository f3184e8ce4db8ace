use bytemuck::{Pod, Zeroable};

use crate::coords::Rect;
use crate::paint::Color;

/// Opaque handle to a texture resident on the graphics device.
///
/// The batch never inspects the value beyond ordering and equality; validity is
/// the device's concern.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct TextureId(pub u32);

impl TextureId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Device-visible vertex (20 bytes, tightly packed).
///
///  offset  0  position  [f32; 2]   loc 0
///  offset  8  color     [u8; 4]    loc 1 (unorm)
///  offset 12  uv        [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [u8; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    #[inline]
    pub const fn new(position: [f32; 2], color: Color, uv: [f32; 2]) -> Self {
        Self { position, color: color.to_array(), uv }
    }
}

/// One queued sprite: texture, depth key and its four corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub texture: TextureId,
    pub depth: f32,
    pub top_left: Vertex,
    pub bottom_left: Vertex,
    pub top_right: Vertex,
    pub bottom_right: Vertex,
}

impl Glyph {
    /// Expands a destination rect and a UV rect into four corners.
    ///
    /// `(x, y)` of both rects is the bottom-left corner; "top" is `y + height`.
    pub fn new(dest: Rect, uv: Rect, texture: TextureId, depth: f32, color: Color) -> Self {
        let (left, right, bottom, top) = (dest.x, dest.right(), dest.y, dest.top());
        let (u0, u1, v0, v1) = (uv.x, uv.right(), uv.y, uv.top());

        Self {
            texture,
            depth,
            top_left: Vertex::new([left, top], color, [u0, v1]),
            bottom_left: Vertex::new([left, bottom], color, [u0, v0]),
            top_right: Vertex::new([right, top], color, [u1, v1]),
            bottom_right: Vertex::new([right, bottom], color, [u1, v0]),
        }
    }

    /// Two triangles sharing the top-left/bottom-right diagonal.
    ///
    /// Every quad uses the same order so the winding never flips between sprites.
    #[inline]
    pub fn triangles(&self) -> [Vertex; 6] {
        [
            self.top_left,
            self.bottom_left,
            self.bottom_right,
            self.top_left,
            self.top_right,
            self.bottom_right,
        ]
    }
}

/// Viewport size in logical pixels.
///
/// The wgpu device maps sprite positions into NDC with this extent:
/// `(0, 0)` is the bottom-left corner and `(width, height)` the top-right.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Extent clamped to at least one pixel per axis, as uploaded to the shader.
    #[inline]
    pub(crate) fn clamped_extent(self) -> [f32; 2] {
        [self.width.max(1.0), self.height.max(1.0)]
    }
}

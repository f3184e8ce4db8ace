/// Axis-aligned rectangle given as `(x, y, width, height)`.
///
/// Used both for destination rects (logical pixels, bottom-left origin, +Y up)
/// and for UV rects (texture space). `(x, y)` is the bottom-left corner.
///
/// Negative or zero sizes are representable and are not rejected anywhere in
/// the batching pipeline; they simply produce degenerate quads.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// The full `[0, 1] x [0, 1]` texture rect.
    pub const UNIT: Rect = Rect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rect anchored at the origin.
    #[inline]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// `x + width`.
    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    /// `y + height`.
    #[inline]
    pub fn top(self) -> f32 {
        self.y + self.height
    }

    /// True for zero-area rects.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

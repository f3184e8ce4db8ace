//! Coordinate and geometry types consumed by the sprite batch.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin bottom-left
//! - +X right, +Y up
//!
//! UV rects use the same `(x, y, width, height)` shape in texture space.

mod rect;
mod viewport;

pub use rect::Rect;
pub use viewport::Viewport;

//! Sprite request stream.
//!
//! Responsibilities:
//! - turn `(dest, uv, texture, depth, color)` draw calls into value-typed glyphs
//! - store them per frame without per-call allocation
//! - provide the three stable orderings (texture, front-to-back, back-to-front)

mod glyph;
mod queue;
mod sort;

pub use glyph::{Glyph, TextureId, Vertex};
pub use queue::GlyphQueue;
pub use sort::SortPolicy;

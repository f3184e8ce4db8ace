use core::ops::Range;

use crate::scene::{Glyph, TextureId, Vertex};

/// Vertices emitted per sprite (two triangles, no index sharing).
pub const VERTICES_PER_SPRITE: u32 = 6;

/// Most sprites one frame can hold while vertex offsets still fit in `u32`.
pub const MAX_SPRITES: usize = (u32::MAX / VERTICES_PER_SPRITE) as usize;

/// Contiguous slice of the frame's vertex stream drawn with one texture.
///
/// `offset` and `vertex_count` are in vertices, not bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderBatch {
    pub offset: u32,
    pub vertex_count: u32,
    pub texture: TextureId,
}

impl RenderBatch {
    #[inline]
    pub const fn new(offset: u32, vertex_count: u32, texture: TextureId) -> Self {
        Self { offset, vertex_count, texture }
    }

    /// Vertex range covered by this batch.
    #[inline]
    pub fn range(&self) -> Range<u32> {
        self.offset..self.offset + self.vertex_count
    }

    /// Number of sprites in this batch.
    #[inline]
    pub fn sprite_count(&self) -> u32 {
        self.vertex_count / VERTICES_PER_SPRITE
    }
}

/// Expands sorted glyphs into `vertices` and groups them into `batches`.
///
/// Both outputs are cleared first. Vertex storage is reserved once for exactly
/// `6 × glyphs.len()` entries, so the pass itself never reallocates.
///
/// A new batch starts at the first glyph and at every texture change; a glyph
/// with the same texture as its predecessor extends the current batch.
///
/// # Panics
/// Panics if `glyphs` holds more than [`MAX_SPRITES`] sprites.
pub fn build_batches(glyphs: &[Glyph], vertices: &mut Vec<Vertex>, batches: &mut Vec<RenderBatch>) {
    assert!(
        glyphs.len() <= MAX_SPRITES,
        "build_batches: {} sprites exceed the {MAX_SPRITES} addressable per frame",
        glyphs.len()
    );

    vertices.clear();
    batches.clear();

    if glyphs.is_empty() {
        return;
    }

    vertices.reserve_exact(glyphs.len() * VERTICES_PER_SPRITE as usize);

    let mut offset = 0u32;
    for glyph in glyphs {
        match batches.last_mut() {
            Some(current) if current.texture == glyph.texture => {
                current.vertex_count += VERTICES_PER_SPRITE;
            }
            _ => batches.push(RenderBatch::new(offset, VERTICES_PER_SPRITE, glyph.texture)),
        }

        vertices.extend_from_slice(&glyph.triangles());
        offset += VERTICES_PER_SPRITE;
    }
}

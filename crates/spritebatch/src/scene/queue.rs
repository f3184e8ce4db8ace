use super::{Glyph, SortPolicy};

/// Per-frame sprite queue.
///
/// Glyphs are stored by value in one growable buffer that is reused across
/// frames:
/// - `push()` is O(1)
/// - `clear()` keeps capacity, so a warmed-up queue does not allocate
#[derive(Debug, Default)]
pub struct GlyphQueue {
    glyphs: Vec<Glyph>,
}

impl GlyphQueue {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { glyphs: Vec::with_capacity(capacity) }
    }

    /// Drops all queued glyphs. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.glyphs.clear();
    }

    #[inline]
    pub fn push(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyphs in current order (insertion order until `sort` is called).
    #[inline]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Stable sort by `policy`.
    #[inline]
    pub fn sort(&mut self, policy: SortPolicy) {
        policy.sort(&mut self.glyphs);
    }
}

use core::cmp::Ordering;

use super::Glyph;

/// Ordering applied to the queued glyphs when a frame ends.
///
/// All policies sort stably: glyphs with equal keys keep draw-call order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum SortPolicy {
    /// Ascending texture id. Fewest texture binds; paint order is not preserved.
    #[default]
    Texture,
    /// Ascending depth.
    FrontToBack,
    /// Descending depth (painter's algorithm for blended sprites).
    BackToFront,
}

impl SortPolicy {
    /// Comparator for this policy.
    ///
    /// Depths are compared with `f32::total_cmp`, so NaN keys still yield a
    /// total order (positive NaN sorts after every finite depth).
    #[inline]
    pub fn compare(self, a: &Glyph, b: &Glyph) -> Ordering {
        match self {
            SortPolicy::Texture => a.texture.cmp(&b.texture),
            SortPolicy::FrontToBack => a.depth.total_cmp(&b.depth),
            SortPolicy::BackToFront => b.depth.total_cmp(&a.depth),
        }
    }

    /// Stable in-place sort.
    #[inline]
    pub fn sort(self, glyphs: &mut [Glyph]) {
        glyphs.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;
    use crate::scene::TextureId;

    /// Encodes the draw-call index in `dest.x` so ordering is easy to read back.
    fn g(order: u32, texture: u32, depth: f32) -> Glyph {
        Glyph::new(
            Rect::new(order as f32, 0.0, 1.0, 1.0),
            Rect::UNIT,
            TextureId(texture),
            depth,
            Color::WHITE,
        )
    }

    fn order_of(glyphs: &[Glyph]) -> Vec<u32> {
        glyphs.iter().map(|g| g.bottom_left.position[0] as u32).collect()
    }

    // ── texture ───────────────────────────────────────────────────────────

    #[test]
    fn texture_ascending_and_stable() {
        let mut glyphs = vec![g(0, 7, 0.0), g(1, 5, 0.0), g(2, 7, 0.0), g(3, 5, 0.0), g(4, 1, 0.0)];
        SortPolicy::Texture.sort(&mut glyphs);
        assert_eq!(order_of(&glyphs), vec![4, 1, 3, 0, 2]);
    }

    #[test]
    fn texture_ignores_depth() {
        let mut glyphs = vec![g(0, 2, 9.0), g(1, 2, -9.0), g(2, 1, 0.0)];
        SortPolicy::Texture.sort(&mut glyphs);
        assert_eq!(order_of(&glyphs), vec![2, 0, 1]);
    }

    // ── depth ─────────────────────────────────────────────────────────────

    #[test]
    fn front_to_back_ascending_and_stable() {
        let mut glyphs = vec![g(0, 0, 3.0), g(1, 0, 1.0), g(2, 0, 3.0), g(3, 0, -2.0), g(4, 0, 1.0)];
        SortPolicy::FrontToBack.sort(&mut glyphs);
        assert_eq!(order_of(&glyphs), vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn back_to_front_descending_and_stable() {
        let mut glyphs = vec![g(0, 0, 3.0), g(1, 0, 1.0), g(2, 0, 3.0), g(3, 0, -2.0), g(4, 0, 1.0)];
        SortPolicy::BackToFront.sort(&mut glyphs);
        assert_eq!(order_of(&glyphs), vec![0, 2, 1, 4, 3]);
    }

    #[test]
    fn nan_depth_does_not_break_ordering() {
        let mut glyphs = vec![g(0, 0, f32::NAN), g(1, 0, 2.0), g(2, 0, 1.0)];
        SortPolicy::FrontToBack.sort(&mut glyphs);
        assert_eq!(order_of(&glyphs), vec![2, 1, 0]);
    }

    #[test]
    fn default_policy_is_texture() {
        assert_eq!(SortPolicy::default(), SortPolicy::Texture);
    }
}

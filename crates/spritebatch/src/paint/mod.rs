//! Per-sprite color tint.
//!
//! Geometry types remain in `coords`.

mod color;

pub use color::Color;

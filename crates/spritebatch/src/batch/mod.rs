//! Batch building and the per-frame sprite batch lifecycle.
//!
//! `builder` is the pure CPU pass (sorted glyphs -> vertex stream + batches);
//! `sprite_batch` drives it from `begin`/`draw`/`end`/`render` and talks to the
//! graphics device.

mod builder;
mod sprite_batch;

pub use builder::{build_batches, RenderBatch, MAX_SPRITES, VERTICES_PER_SPRITE};
pub use sprite_batch::{BatchState, FrameStats, SpriteBatch};

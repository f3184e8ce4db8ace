//! Sprite batching crate.
//!
//! Queues textured quads per frame, sorts them by texture or depth, packs them
//! into one vertex stream and replays the minimal list of `(range, texture)`
//! draws on a graphics device.
//!
//! - [`batch::SpriteBatch`]: `begin` / `draw` / `end` / `render`
//! - [`device::GraphicsDevice`]: the four device primitives the batch needs
//! - [`device::WgpuDevice`]: wgpu implementation

pub mod batch;
pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;

pub use batch::{RenderBatch, SpriteBatch};
pub use coords::Rect;
pub use paint::Color;
pub use scene::{SortPolicy, TextureId, Vertex};

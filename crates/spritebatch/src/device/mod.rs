//! Graphics device seam + implementations.
//!
//! The batch only needs four device primitives (see [`GraphicsDevice`]). This
//! module provides:
//! - [`RecordingDevice`]: in-memory device that records calls (tests, diagnostics)
//! - [`WgpuDevice`]: wgpu pipeline + vertex buffer + per-texture bind groups
//! - [`HeadlessGpu`]: surface-less wgpu bootstrap for offscreen rendering

mod error;
mod headless;
mod init;
mod recording;
mod state;
mod wgpu_device;

pub use error::DeviceError;
pub use headless::{GpuInit, HeadlessGpu, OffscreenTarget};
pub use init::{SpriteBlend, SpriteDeviceInit};
pub use recording::{DeviceCall, RecordingDevice};
pub use wgpu_device::WgpuDevice;

use crate::scene::{TextureId, Vertex};

/// Device primitives consumed by [`SpriteBatch`](crate::batch::SpriteBatch).
///
/// Calls arrive strictly in frame order from a single thread:
/// `create_vertex_buffer` once at construction, then per frame one
/// `upload_vertices` followed by `bind_texture`/`draw_range` pairs.
///
/// Implementations must not retain the vertex slice past `upload_vertices`.
pub trait GraphicsDevice {
    type Error;

    /// Allocates the device-side vertex buffer.
    fn create_vertex_buffer(&mut self) -> Result<(), Self::Error>;

    /// Replaces the vertex buffer contents, growing it if needed.
    ///
    /// Called once per frame, also with an empty slice for empty frames.
    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<(), Self::Error>;

    /// Makes `texture` current for subsequent draws.
    fn bind_texture(&mut self, texture: TextureId) -> Result<(), Self::Error>;

    /// Draws `count` vertices starting at vertex `offset` as a triangle list.
    fn draw_range(&mut self, offset: u32, count: u32) -> Result<(), Self::Error>;
}

impl<D: GraphicsDevice + ?Sized> GraphicsDevice for &mut D {
    type Error = D::Error;

    #[inline]
    fn create_vertex_buffer(&mut self) -> Result<(), Self::Error> {
        (**self).create_vertex_buffer()
    }

    #[inline]
    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<(), Self::Error> {
        (**self).upload_vertices(vertices)
    }

    #[inline]
    fn bind_texture(&mut self, texture: TextureId) -> Result<(), Self::Error> {
        (**self).bind_texture(texture)
    }

    #[inline]
    fn draw_range(&mut self, offset: u32, count: u32) -> Result<(), Self::Error> {
        (**self).draw_range(offset, count)
    }
}

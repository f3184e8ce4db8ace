use std::collections::HashSet;

use crate::scene::{TextureId, Vertex};

use super::state::BindState;
use super::{DeviceError, GraphicsDevice};

/// One primitive received by a [`RecordingDevice`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceCall {
    CreateVertexBuffer,
    Upload { vertices: u32 },
    BindTexture(TextureId),
    DrawRange { offset: u32, count: u32 },
}

/// CPU-only device that records every call.
///
/// By default any texture id is accepted. [`RecordingDevice::with_textures`]
/// restricts binding to a known set, which mirrors how a real device rejects
/// stale handles.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    vertices: Vec<Vertex>,
    known_textures: Option<HashSet<TextureId>>,
    state: BindState,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device that only accepts the given texture ids.
    pub fn with_textures(textures: impl IntoIterator<Item = TextureId>) -> Self {
        Self {
            known_textures: Some(textures.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Calls received so far, in order.
    #[inline]
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Vertices from the most recent upload.
    #[inline]
    pub fn uploaded(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of `DrawRange` calls recorded.
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::DrawRange { .. }))
            .count()
    }
}

impl GraphicsDevice for RecordingDevice {
    type Error = DeviceError;

    fn create_vertex_buffer(&mut self) -> Result<(), DeviceError> {
        self.calls.push(DeviceCall::CreateVertexBuffer);
        Ok(())
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<(), DeviceError> {
        // Orphan: the previous frame's contents are discarded wholesale.
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.state.uploaded(vertices.len() as u32);
        self.calls.push(DeviceCall::Upload { vertices: vertices.len() as u32 });
        Ok(())
    }

    fn bind_texture(&mut self, texture: TextureId) -> Result<(), DeviceError> {
        if let Some(known) = &self.known_textures {
            if !known.contains(&texture) {
                return Err(DeviceError::UnknownTexture(texture));
            }
        }
        self.state.bind(texture);
        self.calls.push(DeviceCall::BindTexture(texture));
        Ok(())
    }

    fn draw_range(&mut self, offset: u32, count: u32) -> Result<(), DeviceError> {
        self.state.check_draw(offset, count)?;
        self.calls.push(DeviceCall::DrawRange { offset, count });
        Ok(())
    }
}

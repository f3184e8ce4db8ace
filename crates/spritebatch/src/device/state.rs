use crate::scene::TextureId;

use super::DeviceError;

/// Bind/draw bookkeeping shared by the bundled devices.
#[derive(Debug, Default, Clone)]
pub(crate) struct BindState {
    bound: Option<TextureId>,
    uploaded: u32,
}

impl BindState {
    /// Records a new upload; any previous binding is forgotten.
    pub(crate) fn uploaded(&mut self, vertex_count: u32) {
        self.uploaded = vertex_count;
        self.bound = None;
    }

    pub(crate) fn bind(&mut self, texture: TextureId) {
        self.bound = Some(texture);
    }

    /// Validates a draw against the current binding and upload size.
    pub(crate) fn check_draw(&self, offset: u32, count: u32) -> Result<TextureId, DeviceError> {
        let texture = self.bound.ok_or(DeviceError::NoTextureBound)?;
        let in_bounds = offset
            .checked_add(count)
            .is_some_and(|end| end <= self.uploaded);
        if !in_bounds {
            return Err(DeviceError::RangeOutOfBounds {
                offset,
                count,
                available: self.uploaded,
            });
        }
        Ok(texture)
    }
}

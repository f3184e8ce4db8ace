//! GPU submission context.
//!
//! [`WgpuDevice`](crate::device::WgpuDevice) is created from a [`RenderCtx`]
//! and encodes its recorded draws into a [`RenderTarget`].
//!
//! Convention:
//! - CPU geometry is in logical pixels (bottom-left origin, +Y up).
//! - Vertex shader converts to NDC using a viewport uniform.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};

//! Render bridge.
//!
//! The crate performs no GPU work itself. A [`RenderContext`] implementation
//! receives mesh and texture uploads once after loading, and one
//! [`DrawCall`] per mesh node each frame.

pub mod context;
pub mod renderer;

pub use context::{DrawCall, GpuMesh, RenderContext};
pub use renderer::{GpuModel, ModelRenderer};

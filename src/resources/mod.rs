//! Drawable resources decoded from an asset. No GPU types live here.

pub mod material;
pub mod mesh;

pub use material::{Material, TextureSlot};
pub use mesh::{AttributeSlot, Mesh};

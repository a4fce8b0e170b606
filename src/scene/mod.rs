//! Scene graph: node arena, hierarchy traversal, skins and the model that
//! owns them.

pub mod hierarchy;
pub mod model;
pub mod node;
pub mod skin;
pub mod transform;

pub use model::Model;
pub use node::Node;
pub use skin::{JointPalette, MAX_JOINTS, Skin};
pub use transform::Transform;

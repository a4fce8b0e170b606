use glam::Mat4;

use crate::assets::manifest::NodeDesc;
use crate::scene::transform::Transform;

/// A scene node stored in the model's node arena.
///
/// Nodes are addressed by their glTF index (`id`), which is also their
/// position in [`Model::nodes`](crate::Model::nodes).
///
/// # Transforms
///
/// - `local_bind_transform`: rest pose relative to the parent, fixed at load.
/// - `animated_transform`: local transform for the current tick, written by
///   the animator.
/// - `world_transform`: `world(parent) × animated`, written by the hierarchy
///   pass right after the animator and read by the renderer.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: usize,
    pub name: Option<String>,
    /// Child ids, in manifest order.
    pub children: Vec<usize>,
    pub local_bind_transform: Mat4,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,

    pub(crate) animated_transform: Mat4,
    pub(crate) world_transform: Mat4,
}

impl Node {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            name: None,
            children: Vec::new(),
            local_bind_transform: Mat4::IDENTITY,
            mesh: None,
            skin: None,
            animated_transform: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
        }
    }

    /// Local transform for the current tick.
    #[inline]
    #[must_use]
    pub fn animated_transform(&self) -> &Mat4 {
        &self.animated_transform
    }

    /// Overrides the local transform for the current tick.
    #[inline]
    pub fn set_animated_transform(&mut self, transform: Mat4) {
        self.animated_transform = transform;
    }

    /// World transform computed by the last hierarchy pass.
    #[inline]
    #[must_use]
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }
}

/// Builds a node from its descriptor.
///
/// The bind transform is `T · R · S` with identity for absent parts. An
/// explicit `matrix` replaces that composition entirely rather than being
/// combined with it. Child ids are copied as-is; see
/// [`validate_hierarchy`](crate::scene::hierarchy::validate_hierarchy).
#[must_use]
pub fn build_node(index: usize, desc: &NodeDesc) -> Node {
    let local_bind_transform = match desc.matrix {
        Some(cols) => Mat4::from_cols_array(&cols),
        None => Transform::from_parts(desc.translation, desc.rotation, desc.scale).to_matrix(),
    };

    Node {
        id: index,
        name: desc.name.clone(),
        children: desc.children.clone(),
        local_bind_transform,
        mesh: desc.mesh,
        skin: desc.skin,
        animated_transform: Mat4::IDENTITY,
        world_transform: Mat4::IDENTITY,
    }
}

use glam::Mat4;

use crate::animation::clip::AnimationClip;
use crate::resources::{Material, Mesh};
use crate::scene::hierarchy;
use crate::scene::node::Node;
use crate::scene::skin::Skin;

/// Everything loaded from one asset.
///
/// Single owner of its nodes, meshes, skins, materials and animation clip;
/// lives as long as the asset is in use.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Node arena, indexed by glTF node id.
    pub nodes: Vec<Node>,
    /// Roots of the default scene, traversal order.
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub skins: Vec<Skin>,
    pub materials: Vec<Material>,
    /// First animation clip of the asset.
    pub clip: Option<AnimationClip>,
}

impl Model {
    #[inline]
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// First node with the given name.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name.as_deref() == Some(name))
    }

    /// Primary root (the first root of the default scene).
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<usize> {
        self.roots.first().copied()
    }

    #[inline]
    #[must_use]
    pub fn world_transform(&self, id: usize) -> Option<Mat4> {
        self.nodes.get(id).map(|n| n.world_transform)
    }

    /// Puts every node back in its bind pose and refreshes world transforms
    /// and joint palettes.
    pub fn reset_to_bind_pose(&mut self) {
        for node in &mut self.nodes {
            node.animated_transform = node.local_bind_transform;
        }
        self.propagate_transforms();
    }

    /// Recomputes world transforms from the current animated transforms,
    /// then every skin's joint palette.
    pub fn propagate_transforms(&mut self) {
        hierarchy::update_world_transforms(&mut self.nodes, &self.roots);
        for skin in &mut self.skins {
            skin.compute_joint_matrices(&self.nodes);
        }
    }

    /// Node ids in render traversal order.
    #[must_use]
    pub fn traversal_order(&self) -> Vec<usize> {
        hierarchy::depth_first_order(&self.nodes, &self.roots)
    }
}

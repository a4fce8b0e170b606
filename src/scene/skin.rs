use glam::Mat4;

use crate::assets::accessor::DecodedBuffer;
use crate::assets::manifest::SkinDesc;
use crate::errors::{Error, Result};
use crate::scene::node::Node;

/// Capacity of the joint uniform array consumed by the skinning shader.
pub const MAX_JOINTS: usize = 50;

/// Per-skin joint matrices for the current tick.
///
/// Entry `j` is `world(joints[j]) × inverse_bind[j]`, column-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointPalette {
    matrices: Vec<Mat4>,
}

impl JointPalette {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { matrices: vec![Mat4::IDENTITY; count] }
    }

    #[inline]
    #[must_use]
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// All matrices as one flat column-major float slice (16 per joint),
    /// in joint order, ready for a `mat4[]` uniform upload.
    #[inline]
    #[must_use]
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.matrices)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Skin {
    pub name: Option<String>,
    /// Joint node ids; index `j` here is joint `j` in the shader.
    pub joints: Vec<usize>,
    /// One per joint, same order as `joints`.
    pub inverse_bind_transforms: Vec<Mat4>,
    pub skeleton: Option<usize>,

    pub(crate) joint_matrices: JointPalette,
}

impl Skin {
    /// Joint matrices from the last tick.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &JointPalette {
        &self.joint_matrices
    }

    /// Recomputes every joint matrix from the nodes' current world transforms.
    pub fn compute_joint_matrices(&mut self, nodes: &[Node]) {
        for (j, (&joint, ibm)) in self
            .joints
            .iter()
            .zip(&self.inverse_bind_transforms)
            .enumerate()
        {
            let Some(node) = nodes.get(joint) else {
                continue;
            };
            self.joint_matrices.matrices[j] = node.world_transform * *ibm;
        }
    }
}

/// Builds a skin from its descriptor and the decoded inverse-bind accessor.
///
/// The decoded floats are sliced into consecutive 16-float column-major
/// matrices, one per joint in joint order. Without an accessor every joint
/// gets the identity.
pub fn build_skin(desc: &SkinDesc, inverse_bind: Option<&DecodedBuffer>) -> Result<Skin> {
    let joint_count = desc.joints.len();
    if joint_count > MAX_JOINTS {
        return Err(Error::malformed(format!(
            "skin has {joint_count} joints, at most {MAX_JOINTS} are supported"
        )));
    }

    let inverse_bind_transforms = match inverse_bind {
        None => vec![Mat4::IDENTITY; joint_count],
        Some(buffer) => {
            let floats = buffer.to_f32_vec();
            if floats.len() % 16 != 0 {
                return Err(Error::malformed(format!(
                    "inverse bind matrix data has {} floats, not a multiple of 16",
                    floats.len()
                )));
            }
            if floats.len() != joint_count * 16 {
                return Err(Error::malformed(format!(
                    "skin has {joint_count} joints but {} inverse bind matrices",
                    floats.len() / 16
                )));
            }
            floats
                .chunks_exact(16)
                .map(Mat4::from_cols_slice)
                .collect()
        }
    };

    Ok(Skin {
        name: desc.name.clone(),
        joints: desc.joints.clone(),
        inverse_bind_transforms,
        skeleton: desc.skeleton,
        joint_matrices: JointPalette::new(joint_count),
    })
}

use glam::{Mat4, Quat, Vec3};

/// Translation / rotation / scale triple.
///
/// Composes as `T · R · S`: scale first, then rotation, then translation
/// when applied to a column vector. Missing components are identity
/// (zero translation, identity rotation, unit scale).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    /// Builds a transform from optional glTF fields.
    #[must_use]
    pub fn from_parts(
        translation: Option<[f32; 3]>,
        rotation: Option<[f32; 4]>,
        scale: Option<[f32; 3]>,
    ) -> Self {
        Self {
            translation: translation.map_or(Vec3::ZERO, Vec3::from_array),
            rotation: rotation.map_or(Quat::IDENTITY, Quat::from_array),
            scale: scale.map_or(Vec3::ONE, Vec3::from_array),
        }
    }

    /// `translate(T) · rotate(R) · scale(S)`
    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}

use glam::{Vec3, Vec4};

use crate::assets::manifest::{Manifest, MaterialDesc, TextureInfo};
use crate::errors::Result;

/// A material slot bound to a glTF image.
///
/// `image` indexes [`LoadedAsset::images`](crate::assets::LoadedAsset::images)
/// and, after upload, the texture handles of a
/// [`GpuModel`](crate::render::GpuModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSlot {
    pub image: usize,
    pub tex_coord: u32,
}

/// Metallic-roughness material factors and texture references.
///
/// Passed through to the renderer untouched; no shading happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: Vec3,
    pub double_sided: bool,
    pub base_color_texture: Option<TextureSlot>,
    pub metallic_roughness_texture: Option<TextureSlot>,
    pub normal_texture: Option<TextureSlot>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: Vec4::ONE,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: Vec3::ZERO,
            double_sided: false,
            base_color_texture: None,
            metallic_roughness_texture: None,
            normal_texture: None,
        }
    }
}

impl Material {
    /// Builds a material, resolving texture indices to image indices.
    pub fn from_desc(desc: &MaterialDesc, manifest: &Manifest) -> Result<Self> {
        let slot = |info: Option<TextureInfo>| -> Result<Option<TextureSlot>> {
            info.map(|info| {
                Ok(TextureSlot {
                    image: manifest.texture_image(info.index)?,
                    tex_coord: info.tex_coord,
                })
            })
            .transpose()
        };

        let defaults = Self::default();
        let pbr = desc.pbr_metallic_roughness.as_ref();

        Ok(Self {
            name: desc.name.clone(),
            base_color_factor: pbr
                .and_then(|p| p.base_color_factor)
                .map_or(defaults.base_color_factor, Vec4::from_array),
            metallic_factor: pbr.and_then(|p| p.metallic_factor).unwrap_or(defaults.metallic_factor),
            roughness_factor: pbr.and_then(|p| p.roughness_factor).unwrap_or(defaults.roughness_factor),
            emissive_factor: desc.emissive_factor.map_or(defaults.emissive_factor, Vec3::from_array),
            double_sided: desc.double_sided,
            base_color_texture: slot(pbr.and_then(|p| p.base_color_texture))?,
            metallic_roughness_texture: slot(pbr.and_then(|p| p.metallic_roughness_texture))?,
            normal_texture: slot(desc.normal_texture)?,
        })
    }
}

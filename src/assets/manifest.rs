//! glTF 2.0 manifest model.
//!
//! Only the subset of the object model the loader consumes is described
//! here. Unknown properties (extensions, extras, cameras, ...) are ignored
//! by serde. Accessor `type` and `componentType` are kept raw and validated
//! by the decoder so that an unknown tag surfaces as
//! [`Error::MalformedAsset`] instead of a JSON error.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::{Error, Result};

/// Root object of a `.gltf` JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    pub asset: Option<AssetInfo>,
    pub scene: Option<usize>,
    pub scenes: Vec<SceneDesc>,
    pub nodes: Vec<NodeDesc>,
    pub meshes: Vec<MeshDesc>,
    pub materials: Vec<MaterialDesc>,
    pub textures: Vec<TextureDesc>,
    pub images: Vec<ImageDesc>,
    pub skins: Vec<SkinDesc>,
    pub animations: Vec<AnimationDesc>,
    pub accessors: Vec<AccessorDesc>,
    pub buffer_views: Vec<BufferViewDesc>,
    pub buffers: Vec<BufferDesc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetInfo {
    pub version: String,
    pub generator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDesc {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

/// A node descriptor. `matrix` wins over the TRS fields when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDesc {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeshDesc {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDesc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrimitiveDesc {
    /// Semantic name (`POSITION`, `JOINTS_0`, ...) to accessor index.
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDesc {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughnessDesc>,
    pub normal_texture: Option<TextureInfo>,
    pub emissive_factor: Option<[f32; 3]>,
    pub double_sided: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PbrMetallicRoughnessDesc {
    pub base_color_factor: Option<[f32; 4]>,
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: Option<f32>,
    pub roughness_factor: Option<f32>,
    pub metallic_roughness_texture: Option<TextureInfo>,
}

/// Reference from a material slot to a texture.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureInfo {
    pub index: usize,
    pub tex_coord: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureDesc {
    pub source: Option<usize>,
    pub sampler: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageDesc {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkinDesc {
    pub name: Option<String>,
    pub inverse_bind_matrices: Option<usize>,
    pub joints: Vec<usize>,
    pub skeleton: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationDesc {
    pub name: Option<String>,
    pub channels: Vec<ChannelDesc>,
    pub samplers: Vec<SamplerDesc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelDesc {
    pub sampler: usize,
    pub target: ChannelTargetDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelTargetDesc {
    pub node: Option<usize>,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplerDesc {
    pub input: usize,
    pub output: usize,
    /// `LINEAR` when absent.
    pub interpolation: Option<String>,
}

/// Accessor metadata. `type_tag` and `component_type` are validated on decode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessorDesc {
    pub name: Option<String>,
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: u32,
    pub normalized: bool,
    pub count: usize,
    #[serde(rename = "type")]
    pub type_tag: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BufferViewDesc {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BufferDesc {
    pub uri: Option<String>,
    pub byte_length: usize,
}

impl Manifest {
    /// Parses a manifest from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn accessor(&self, index: usize) -> Result<&AccessorDesc> {
        self.accessors
            .get(index)
            .ok_or_else(|| Error::malformed(format!("accessor index {index} out of bounds")))
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferViewDesc> {
        self.buffer_views
            .get(index)
            .ok_or_else(|| Error::malformed(format!("buffer view index {index} out of bounds")))
    }

    /// Root node ids of the default scene.
    ///
    /// Uses `scene` (or scene 0). Without any scene, every node that is not
    /// listed as somebody's child is a root, in index order.
    #[must_use]
    pub fn root_nodes(&self) -> Vec<usize> {
        if let Some(scene) = self.scenes.get(self.scene.unwrap_or(0)) {
            return scene.nodes.clone();
        }

        let mut has_parent = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                if let Some(flag) = has_parent.get_mut(child) {
                    *flag = true;
                }
            }
        }
        has_parent
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| (!p).then_some(i))
            .collect()
    }

    /// Image index behind a texture index.
    pub fn texture_image(&self, texture: usize) -> Result<usize> {
        let desc = self
            .textures
            .get(texture)
            .ok_or_else(|| Error::malformed(format!("texture index {texture} out of bounds")))?;
        let image = desc
            .source
            .ok_or_else(|| Error::malformed(format!("texture {texture} has no image source")))?;
        if image >= self.images.len() {
            return Err(Error::malformed(format!(
                "texture {texture} references missing image {image}"
            )));
        }
        Ok(image)
    }

    /// Image indices referenced by any material slot, sorted and deduplicated.
    pub fn referenced_images(&self) -> Result<Vec<usize>> {
        let mut images = Vec::new();
        for material in &self.materials {
            let pbr = material.pbr_metallic_roughness.as_ref();
            let slots = [
                pbr.and_then(|p| p.base_color_texture),
                pbr.and_then(|p| p.metallic_roughness_texture),
                material.normal_texture,
            ];
            for info in slots.into_iter().flatten() {
                images.push(self.texture_image(info.index)?);
            }
        }
        images.sort_unstable();
        images.dedup();
        Ok(images)
    }
}

//! glTF Loader
//!
//! Loading runs in two stages:
//!
//! 1. **Fetch** (async): the manifest is read first, then every buffer and
//!    every referenced image is fetched concurrently. The join fails fast:
//!    the first failed fetch aborts the whole load with
//!    [`Error::MissingData`].
//! 2. **Build** (sync): with all bytes in memory, [`build_model`] decodes
//!    accessors and assembles nodes, meshes, skins, materials and the
//!    animation clip.
//!
//! The result is plain CPU data. Uploading it to a GPU is a separate step,
//! see [`ModelRenderer::upload`](crate::render::ModelRenderer::upload).

use std::sync::OnceLock;

use futures::future::try_join_all;
use tokio::runtime::Runtime;

use crate::animation::compiler::compile_first_clip;
use crate::assets::accessor::AccessorReader;
use crate::assets::io::{self, AssetReader};
use crate::assets::manifest::{BufferDesc, Manifest};
use crate::errors::{Error, Result};
use crate::resources::material::Material;
use crate::resources::mesh::{DecodedPrimitive, assemble};
use crate::scene::hierarchy::validate_hierarchy;
use crate::scene::model::Model;
use crate::scene::node::{Node, build_node};
use crate::scene::skin::build_skin;
use crate::settings::LoadSettings;

fn asset_runtime() -> Result<&'static Runtime> {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Runtime::new()?;
    Ok(RUNTIME.get_or_init(|| runtime))
}

/// A decoded image, always RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, top to bottom.
    pub pixels: Vec<u8>,
}

/// Everything a load produces.
#[derive(Debug, Clone, Default)]
pub struct LoadedAsset {
    pub model: Model,
    /// Indexed by glTF image index. Images no material references (or all
    /// of them, with image loading disabled) are `None`.
    pub images: Vec<Option<ImageData>>,
}

impl LoadedAsset {
    #[inline]
    #[must_use]
    pub fn image(&self, index: usize) -> Option<&ImageData> {
        self.images.get(index).and_then(Option::as_ref)
    }
}

pub struct GltfLoader;

impl GltfLoader {
    /// Loads the asset whose manifest lives at `manifest_uri`.
    pub async fn load<R: AssetReader>(
        reader: &R,
        manifest_uri: &str,
        settings: &LoadSettings,
    ) -> Result<LoadedAsset> {
        log::info!("Loading glTF asset '{manifest_uri}'");

        let bytes = reader
            .read_bytes(manifest_uri)
            .await
            .map_err(|e| Error::missing(format!("failed to fetch manifest '{manifest_uri}': {e:#}")))?;
        let manifest = Manifest::from_slice(&bytes)?;

        Self::load_manifest(reader, manifest_uri, &manifest, settings).await
    }

    /// Loads an already parsed manifest. Relative URIs resolve against
    /// `base_uri`.
    pub async fn load_manifest<R: AssetReader>(
        reader: &R,
        base_uri: &str,
        manifest: &Manifest,
        settings: &LoadSettings,
    ) -> Result<LoadedAsset> {
        if manifest.accessors.is_empty() {
            return Err(Error::missing("manifest declares no accessors"));
        }

        let image_indices = if settings.load_images {
            manifest.referenced_images()?
        } else {
            Vec::new()
        };

        let buffers = try_join_all(
            manifest
                .buffers
                .iter()
                .enumerate()
                .map(|(index, desc)| fetch_buffer(reader, base_uri, index, desc)),
        );
        let encoded_images = try_join_all(
            image_indices
                .iter()
                .map(|&index| fetch_image(reader, base_uri, manifest, index)),
        );
        let (buffers, encoded_images) = futures::try_join!(buffers, encoded_images)?;

        let model = build_model(manifest, &buffers, settings)?;

        let mut images = vec![None; manifest.images.len()];
        for (&index, encoded) in image_indices.iter().zip(encoded_images) {
            images[index] = Some(decode_image(manifest, &buffers, index, encoded)?);
        }

        log::info!(
            "Loaded '{base_uri}': {} nodes, {} meshes, {} skins, {} images",
            model.nodes.len(),
            model.meshes.len(),
            model.skins.len(),
            images.iter().flatten().count()
        );

        Ok(LoadedAsset { model, images })
    }

    /// Blocking variant of [`load`](Self::load) for native callers without
    /// an executor.
    pub fn load_blocking<R: AssetReader>(
        reader: &R,
        manifest_uri: &str,
        settings: &LoadSettings,
    ) -> Result<LoadedAsset> {
        asset_runtime()?.block_on(Self::load(reader, manifest_uri, settings))
    }
}

async fn fetch_buffer<R: AssetReader>(
    reader: &R,
    base_uri: &str,
    index: usize,
    desc: &BufferDesc,
) -> Result<Vec<u8>> {
    let uri = desc
        .uri
        .as_deref()
        .ok_or_else(|| Error::missing(format!("buffer {index} has no uri (GLB binary chunks are not supported)")))?;

    let bytes = io::fetch(reader, base_uri, uri).await?;
    if bytes.len() < desc.byte_length {
        return Err(Error::malformed(format!(
            "buffer {index} holds {} bytes, {} declared",
            bytes.len(),
            desc.byte_length
        )));
    }
    Ok(bytes)
}

/// Fetches an image stored behind a URI. Images embedded in a buffer view
/// need no fetch and yield `None`.
async fn fetch_image<R: AssetReader>(
    reader: &R,
    base_uri: &str,
    manifest: &Manifest,
    index: usize,
) -> Result<Option<Vec<u8>>> {
    let Some(uri) = manifest.images.get(index).and_then(|image| image.uri.as_deref()) else {
        return Ok(None);
    };

    Ok(Some(io::fetch(reader, base_uri, uri).await?))
}

fn decode_image(
    manifest: &Manifest,
    buffers: &[Vec<u8>],
    index: usize,
    fetched: Option<Vec<u8>>,
) -> Result<ImageData> {
    let desc = manifest
        .images
        .get(index)
        .ok_or_else(|| Error::malformed(format!("image index {index} out of bounds")))?;

    let rgba = match (&fetched, desc.buffer_view) {
        (Some(bytes), _) => image::load_from_memory(bytes)?.to_rgba8(),
        (None, Some(view_index)) => {
            let view = manifest.buffer_view(view_index)?;
            let bytes = view
                .byte_offset
                .checked_add(view.byte_length)
                .and_then(|end| buffers.get(view.buffer)?.get(view.byte_offset..end))
                .ok_or_else(|| {
                    Error::malformed(format!("image {index}: buffer view {view_index} is out of range"))
                })?;
            image::load_from_memory(bytes)?.to_rgba8()
        }
        (None, None) => {
            return Err(Error::malformed(format!(
                "image {index} has neither a uri nor a buffer view"
            )));
        }
    };

    Ok(ImageData {
        name: desc.name.clone(),
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Builds a [`Model`] from a manifest and its buffers, already in memory.
///
/// Every reference between manifest objects is checked; a dangling index
/// is [`Error::MalformedAsset`]. The returned model is in its bind pose.
pub fn build_model(manifest: &Manifest, buffers: &[Vec<u8>], settings: &LoadSettings) -> Result<Model> {
    let reader = AccessorReader::new(manifest, buffers);

    let nodes: Vec<Node> = manifest
        .nodes
        .iter()
        .enumerate()
        .map(|(index, desc)| build_node(index, desc))
        .collect();
    if settings.validate_hierarchy {
        validate_hierarchy(&nodes)?;
    }

    let roots = manifest.root_nodes();
    if let Some(&bad) = roots.iter().find(|&&root| root >= nodes.len()) {
        return Err(Error::malformed(format!("scene references missing node {bad}")));
    }

    let mut meshes = Vec::with_capacity(manifest.meshes.len());
    for desc in &manifest.meshes {
        let decoded = match desc.primitives.first() {
            Some(primitive) => DecodedPrimitive::read(primitive, &reader)?,
            None => DecodedPrimitive::default(),
        };
        let mesh = assemble(desc, decoded)?;
        if let Some(material) = mesh.material
            && material >= manifest.materials.len()
        {
            return Err(Error::malformed(format!("mesh references missing material {material}")));
        }
        meshes.push(mesh);
    }

    for node in &nodes {
        if let Some(mesh) = node.mesh
            && mesh >= meshes.len()
        {
            return Err(Error::malformed(format!("node {} references missing mesh {mesh}", node.id)));
        }
        if let Some(skin) = node.skin
            && skin >= manifest.skins.len()
        {
            return Err(Error::malformed(format!("node {} references missing skin {skin}", node.id)));
        }
    }

    let mut skins = Vec::with_capacity(manifest.skins.len());
    for (index, desc) in manifest.skins.iter().enumerate() {
        let dangling = desc
            .joints
            .iter()
            .chain(desc.skeleton.iter())
            .find(|&&joint| joint >= nodes.len());
        if let Some(&joint) = dangling {
            return Err(Error::malformed(format!("skin {index} references missing node {joint}")));
        }

        let inverse_bind = desc.inverse_bind_matrices.map(|i| reader.read(i)).transpose()?;
        skins.push(build_skin(desc, inverse_bind.as_ref())?);
    }

    let materials = manifest
        .materials
        .iter()
        .map(|desc| Material::from_desc(desc, manifest))
        .collect::<Result<Vec<_>>>()?;

    let clip = compile_first_clip(&reader, settings.sort_keyframes)?;
    if let Some(clip) = &clip {
        log::debug!(
            "Animation '{}': {} animated nodes, {:.3}s",
            clip.name.as_deref().unwrap_or("<unnamed>"),
            clip.channels.len(),
            clip.duration
        );
    }

    let mut model = Model {
        nodes,
        roots,
        meshes,
        skins,
        materials,
        clip,
    };
    model.reset_to_bind_pose();
    Ok(model)
}

use crate::assets::loader::LoadedAsset;
use crate::errors::Result;
use crate::render::context::{DrawCall, GpuMesh, RenderContext};
use crate::resources::mesh::{AttributeSlot, Mesh};
use crate::scene::model::Model;

/// GPU-side counterpart of a [`LoadedAsset`].
#[derive(Debug, Clone)]
pub struct GpuModel<B, T> {
    /// Indexed like [`Model::meshes`].
    pub meshes: Vec<GpuMesh<B>>,
    /// Indexed by glTF image index.
    pub textures: Vec<Option<T>>,
}

pub struct ModelRenderer;

impl ModelRenderer {
    /// Uploads every decoded image, then every mesh's index and vertex data.
    pub fn upload<C: RenderContext>(
        asset: &LoadedAsset,
        ctx: &mut C,
    ) -> Result<GpuModel<C::Buffer, C::Texture>> {
        let textures = asset
            .images
            .iter()
            .map(|image| image.as_ref().map(|image| ctx.upload_texture(image)).transpose())
            .collect::<Result<Vec<_>>>()?;

        let meshes = asset
            .model
            .meshes
            .iter()
            .map(|mesh| Self::upload_mesh(mesh, ctx))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Uploaded {} meshes, {} textures", meshes.len(), textures.iter().flatten().count());

        Ok(GpuModel { meshes, textures })
    }

    fn upload_mesh<C: RenderContext>(mesh: &Mesh, ctx: &mut C) -> Result<GpuMesh<C::Buffer>> {
        let index_buffer = ctx.upload_index_buffer(&mesh.indices)?;

        let mut vertex_buffers: [Option<C::Buffer>; 6] = Default::default();
        for slot in AttributeSlot::ALL {
            if let Some(data) = mesh.attribute(slot) {
                vertex_buffers[slot.location() as usize] = Some(ctx.upload_vertex_buffer(slot, data)?);
            }
        }

        Ok(GpuMesh {
            index_buffer,
            vertex_buffers,
            element_count: mesh.element_count(),
        })
    }

    /// Issues one draw per mesh node, parents before children.
    ///
    /// Reads the world transforms and joint palettes of the last tick;
    /// call after [`tick`](crate::animation::tick) for the frame.
    pub fn draw<C: RenderContext>(model: &Model, gpu: &GpuModel<C::Buffer, C::Texture>, ctx: &mut C) {
        for id in model.traversal_order() {
            let node = &model.nodes[id];
            let Some(mesh) = node.mesh else {
                continue;
            };
            let Some(gpu_mesh) = gpu.meshes.get(mesh) else {
                log::warn!("node {id}: mesh {mesh} was not uploaded");
                continue;
            };

            let joint_matrices = node
                .skin
                .and_then(|skin| model.skins.get(skin))
                .map(|skin| skin.joint_matrices().as_flat());

            ctx.draw(&DrawCall {
                node: id,
                mesh,
                world_transform: *node.world_transform(),
                joint_matrices,
                material: model.meshes.get(mesh).and_then(|m| m.material),
                gpu_mesh,
                textures: &gpu.textures,
            });
        }
    }
}

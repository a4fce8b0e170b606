use glam::Mat4;

use crate::assets::accessor::DecodedBuffer;
use crate::assets::loader::ImageData;
use crate::errors::Result;
use crate::resources::mesh::AttributeSlot;

/// One draw request: a mesh at a world transform, optionally skinned.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a, B, T> {
    /// Node the mesh is attached to.
    pub node: usize,
    pub mesh: usize,
    pub world_transform: Mat4,
    /// Flat column-major joint matrices (16 floats per joint), present when
    /// the node carries a skin.
    pub joint_matrices: Option<&'a [f32]>,
    pub material: Option<usize>,
    pub gpu_mesh: &'a GpuMesh<B>,
    /// Texture handles indexed by glTF image index.
    pub textures: &'a [Option<T>],
}

/// Rendering collaborator.
///
/// Owns every GPU handle it hands out; the model never frees them.
pub trait RenderContext {
    type Buffer;
    type Texture;

    fn upload_vertex_buffer(&mut self, slot: AttributeSlot, data: &DecodedBuffer) -> Result<Self::Buffer>;

    fn upload_index_buffer(&mut self, data: &DecodedBuffer) -> Result<Self::Buffer>;

    fn upload_texture(&mut self, image: &ImageData) -> Result<Self::Texture>;

    fn draw(&mut self, call: &DrawCall<'_, Self::Buffer, Self::Texture>);
}

/// GPU handles of one mesh.
#[derive(Debug, Clone)]
pub struct GpuMesh<B> {
    pub index_buffer: B,
    /// Indexed by [`AttributeSlot::location`]; `None` for attributes the
    /// mesh does not have.
    pub vertex_buffers: [Option<B>; 6],
    pub element_count: usize,
}

impl<B> GpuMesh<B> {
    #[inline]
    #[must_use]
    pub fn vertex_buffer(&self, slot: AttributeSlot) -> Option<&B> {
        self.vertex_buffers[slot.location() as usize].as_ref()
    }
}

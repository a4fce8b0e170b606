use std::collections::BTreeMap;

use crate::assets::accessor::{AccessorReader, DecodedBuffer};
use crate::assets::manifest::{MeshDesc, PrimitiveDesc};
use crate::errors::{Error, Result};

/// Vertex attribute slots, matching the shader's attribute locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSlot {
    Position = 0,
    Normal = 1,
    Tangent = 2,
    TexCoord = 3,
    Joints = 4,
    Weights = 5,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; 6] = [
        Self::Position,
        Self::Normal,
        Self::Tangent,
        Self::TexCoord,
        Self::Joints,
        Self::Weights,
    ];

    /// glTF attribute semantic read into this slot.
    #[must_use]
    pub const fn semantic(self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Tangent => "TANGENT",
            Self::TexCoord => "TEXCOORD_0",
            Self::Joints => "JOINTS_0",
            Self::Weights => "WEIGHTS_0",
        }
    }

    #[inline]
    #[must_use]
    pub const fn location(self) -> u32 {
        self as u32
    }
}

/// Decoded accessors of one primitive, keyed by attribute semantic.
#[derive(Debug, Clone, Default)]
pub struct DecodedPrimitive {
    pub indices: Option<DecodedBuffer>,
    pub attributes: BTreeMap<String, DecodedBuffer>,
}

impl DecodedPrimitive {
    /// Decodes the index accessor and every attribute bound to a slot.
    /// Other semantics (`TEXCOORD_1`, `COLOR_0`, ...) are not decoded.
    pub fn read(primitive: &PrimitiveDesc, reader: &AccessorReader<'_>) -> Result<Self> {
        let indices = primitive.indices.map(|i| reader.read(i)).transpose()?;

        let mut attributes = BTreeMap::new();
        for slot in AttributeSlot::ALL {
            if let Some(&accessor) = primitive.attributes.get(slot.semantic()) {
                attributes.insert(slot.semantic().to_string(), reader.read(accessor)?);
            }
        }

        Ok(Self { indices, attributes })
    }
}

/// A drawable mesh record: decoded index and attribute arrays plus a
/// material reference.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Option<String>,
    pub indices: DecodedBuffer,
    pub positions: DecodedBuffer,
    pub normals: Option<DecodedBuffer>,
    pub tangents: Option<DecodedBuffer>,
    pub tex_coords: Option<DecodedBuffer>,
    pub joints: Option<DecodedBuffer>,
    pub weights: Option<DecodedBuffer>,
    pub material: Option<usize>,
}

impl Mesh {
    #[must_use]
    pub fn attribute(&self, slot: AttributeSlot) -> Option<&DecodedBuffer> {
        match slot {
            AttributeSlot::Position => Some(&self.positions),
            AttributeSlot::Normal => self.normals.as_ref(),
            AttributeSlot::Tangent => self.tangents.as_ref(),
            AttributeSlot::TexCoord => self.tex_coords.as_ref(),
            AttributeSlot::Joints => self.joints.as_ref(),
            AttributeSlot::Weights => self.weights.as_ref(),
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.count()
    }

    /// Number of indices to draw.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }
}

/// Assembles a mesh from the first primitive's decoded data.
///
/// `POSITION` and the index accessor are mandatory. Every index must
/// address an existing vertex.
pub fn assemble(desc: &MeshDesc, mut decoded: DecodedPrimitive) -> Result<Mesh> {
    let name = desc.name.as_deref().unwrap_or("<unnamed>");
    let primitive = desc
        .primitives
        .first()
        .ok_or_else(|| Error::malformed(format!("mesh '{name}' has no primitives")))?;
    if desc.primitives.len() > 1 {
        log::debug!("mesh '{name}': using the first of {} primitives", desc.primitives.len());
    }

    let positions = decoded
        .attributes
        .remove(AttributeSlot::Position.semantic())
        .ok_or_else(|| Error::malformed(format!("mesh '{name}' is missing POSITION")))?;
    let indices = decoded
        .indices
        .ok_or_else(|| Error::malformed(format!("mesh '{name}' is missing indices")))?;

    let vertex_count = positions.count();
    if let Some(&max) = indices.to_indices()?.iter().max() {
        if max as usize >= vertex_count {
            return Err(Error::malformed(format!(
                "mesh '{name}' index {max} is out of range for {vertex_count} vertices"
            )));
        }
    }

    let mut take = |slot: AttributeSlot| decoded.attributes.remove(slot.semantic());

    Ok(Mesh {
        name: desc.name.clone(),
        normals: take(AttributeSlot::Normal),
        tangents: take(AttributeSlot::Tangent),
        tex_coords: take(AttributeSlot::TexCoord),
        joints: take(AttributeSlot::Joints),
        weights: take(AttributeSlot::Weights),
        indices,
        positions,
        material: primitive.material,
    })
}

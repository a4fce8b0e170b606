//! Binary Accessor Decoder
//!
//! Turns `(buffer bytes, accessor, buffer view)` into a typed numeric view.
//! Everything here is pure: the same inputs always produce bit-identical
//! output, and no input is ever mutated.

use crate::assets::manifest::{AccessorDesc, BufferViewDesc, Manifest};
use crate::errors::{Error, Result};

/// Element shape of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(match tag {
            "SCALAR" => Self::Scalar,
            "VEC2" => Self::Vec2,
            "VEC3" => Self::Vec3,
            "VEC4" => Self::Vec4,
            "MAT2" => Self::Mat2,
            "MAT3" => Self::Mat3,
            "MAT4" => Self::Mat4,
            other => return Err(Error::malformed(format!("unknown accessor type '{other}'"))),
        })
    }

    /// Number of components per element.
    #[inline]
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }
}

/// Numeric type of a single component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// `5122`, signed 16-bit integer.
    Short,
    /// `5123`, unsigned 16-bit integer.
    UnsignedShort,
    /// `5126`, 32-bit IEEE float.
    Float,
}

impl ComponentType {
    pub const GL_SHORT: u32 = 5122;
    pub const GL_UNSIGNED_SHORT: u32 = 5123;
    pub const GL_FLOAT: u32 = 5126;

    pub fn from_gl(code: u32) -> Result<Self> {
        Ok(match code {
            Self::GL_SHORT => Self::Short,
            Self::GL_UNSIGNED_SHORT => Self::UnsignedShort,
            Self::GL_FLOAT => Self::Float,
            other => return Err(Error::malformed(format!("unsupported component type {other}"))),
        })
    }

    #[inline]
    #[must_use]
    pub const fn gl_code(self) -> u32 {
        match self {
            Self::Short => Self::GL_SHORT,
            Self::UnsignedShort => Self::GL_UNSIGNED_SHORT,
            Self::Float => Self::GL_FLOAT,
        }
    }

    /// Size of one component in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Short | Self::UnsignedShort => 2,
            Self::Float => 4,
        }
    }
}

/// Contiguous decoded components, tagged by component type.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessorData {
    F32(Vec<f32>),
    I16(Vec<i16>),
    U16(Vec<u16>),
}

/// A typed numeric view decoded from a binary buffer.
///
/// `data` always holds exactly `count × arity` components, element after
/// element, with any source stride removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBuffer {
    pub accessor_type: AccessorType,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub data: AccessorData,
}

impl DecodedBuffer {
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.accessor_type.arity()
    }

    /// Total number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            AccessorData::F32(v) => v.len(),
            AccessorData::I16(v) => v.len(),
            AccessorData::U16(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements (`len / arity`).
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.len() / self.arity()
    }

    #[must_use]
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            AccessorData::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Raw little-endian bytes of the decoded components, ready for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            AccessorData::F32(v) => bytemuck::cast_slice(v),
            AccessorData::I16(v) => bytemuck::cast_slice(v),
            AccessorData::U16(v) => bytemuck::cast_slice(v),
        }
    }

    /// Widens every component to `f32`, applying glTF normalization rules
    /// when the accessor is `normalized`.
    #[must_use]
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match &self.data {
            AccessorData::F32(v) => v.clone(),
            AccessorData::I16(v) if self.normalized => v
                .iter()
                .map(|&c| (f32::from(c) / f32::from(i16::MAX)).max(-1.0))
                .collect(),
            AccessorData::I16(v) => v.iter().map(|&c| f32::from(c)).collect(),
            AccessorData::U16(v) if self.normalized => v
                .iter()
                .map(|&c| f32::from(c) / f32::from(u16::MAX))
                .collect(),
            AccessorData::U16(v) => v.iter().map(|&c| f32::from(c)).collect(),
        }
    }

    /// Components as unsigned indices. Signed shorts are reinterpreted bit
    /// for bit, since glTF indices are never negative. Floats are rejected.
    pub fn to_indices(&self) -> Result<Vec<u32>> {
        match &self.data {
            AccessorData::I16(v) => Ok(v.iter().map(|&c| u32::from(c.cast_unsigned())).collect()),
            AccessorData::U16(v) => Ok(v.iter().map(|&c| u32::from(c)).collect()),
            AccessorData::F32(_) => Err(Error::malformed("index accessor uses float components")),
        }
    }
}

/// Upper bound for the zero-filled data of an accessor with no buffer view.
pub const MAX_ZEROED_BYTES: usize = 1 << 28;

/// Decodes one accessor.
///
/// The byte range starts at `accessor.byteOffset + bufferView.byteOffset`
/// and spans `count` elements of `arity × component size` bytes, laid out
/// at the view's `byteStride` when one is declared. The range must fit in
/// both the buffer view and `raw`.
///
/// An accessor without a buffer view decodes to zeros, up to
/// [`MAX_ZEROED_BYTES`].
pub fn decode(
    raw: &[u8],
    accessor: &AccessorDesc,
    view: Option<&BufferViewDesc>,
) -> Result<DecodedBuffer> {
    let accessor_type = AccessorType::from_tag(&accessor.type_tag)?;
    let component_type = ComponentType::from_gl(accessor.component_type)?;
    let arity = accessor_type.arity();
    let len = accessor
        .count
        .checked_mul(arity)
        .ok_or_else(|| Error::malformed("accessor element count overflows"))?;

    let Some(view) = view else {
        let within_limit = len
            .checked_mul(component_type.size())
            .is_some_and(|bytes| bytes <= MAX_ZEROED_BYTES);
        if !within_limit {
            return Err(Error::malformed(format!(
                "accessor without buffer view declares {} elements, over the {MAX_ZEROED_BYTES} byte limit",
                accessor.count
            )));
        }
        let data = match component_type {
            ComponentType::Float => AccessorData::F32(vec![0.0; len]),
            ComponentType::Short => AccessorData::I16(vec![0; len]),
            ComponentType::UnsignedShort => AccessorData::U16(vec![0; len]),
        };
        return Ok(DecodedBuffer { accessor_type, component_type, normalized: accessor.normalized, data });
    };

    let component_size = component_type.size();
    let element_size = arity * component_size;
    let stride = view.byte_stride.unwrap_or(element_size);
    if stride < element_size {
        return Err(Error::malformed(format!(
            "byte stride {stride} is smaller than element size {element_size}"
        )));
    }

    let start = view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| Error::malformed("accessor offset overflows"))?;

    if accessor.count > 0 {
        // Bytes touched from the accessor's first element to the end of its last.
        let span = (accessor.count - 1)
            .checked_mul(stride)
            .and_then(|s| s.checked_add(element_size))
            .ok_or_else(|| Error::malformed("accessor byte span overflows"))?;

        let view_end = accessor.byte_offset.saturating_add(span);
        if view_end > view.byte_length {
            return Err(Error::malformed(format!(
                "accessor range {}..{view_end} exceeds buffer view length {}",
                accessor.byte_offset, view.byte_length
            )));
        }

        let end = start.saturating_add(span);
        if end > raw.len() {
            return Err(Error::malformed(format!(
                "accessor range {start}..{end} exceeds buffer length {}",
                raw.len()
            )));
        }
    }

    let data = match component_type {
        ComponentType::Float => AccessorData::F32(read_components(
            raw, start, stride, accessor.count, arity, f32::from_le_bytes,
        )),
        ComponentType::Short => AccessorData::I16(read_components(
            raw, start, stride, accessor.count, arity, i16::from_le_bytes,
        )),
        ComponentType::UnsignedShort => AccessorData::U16(read_components(
            raw, start, stride, accessor.count, arity, u16::from_le_bytes,
        )),
    };

    Ok(DecodedBuffer { accessor_type, component_type, normalized: accessor.normalized, data })
}

/// Reads `count` elements of `arity` components. The range has been
/// validated by the caller.
fn read_components<T, const N: usize>(
    raw: &[u8],
    start: usize,
    stride: usize,
    count: usize,
    arity: usize,
    convert: fn([u8; N]) -> T,
) -> Vec<T> {
    let mut out = Vec::with_capacity(count * arity);
    for element in 0..count {
        let base = start + element * stride;
        for component in 0..arity {
            let offset = base + component * N;
            let mut bytes = [0u8; N];
            bytes.copy_from_slice(&raw[offset..offset + N]);
            out.push(convert(bytes));
        }
    }
    out
}

/// Resolves accessor indices against a manifest and its fetched buffers.
#[derive(Debug, Clone, Copy)]
pub struct AccessorReader<'a> {
    manifest: &'a Manifest,
    buffers: &'a [Vec<u8>],
}

impl<'a> AccessorReader<'a> {
    #[must_use]
    pub fn new(manifest: &'a Manifest, buffers: &'a [Vec<u8>]) -> Self {
        Self { manifest, buffers }
    }

    #[must_use]
    pub fn manifest(&self) -> &'a Manifest {
        self.manifest
    }

    /// Decodes the accessor at `index`.
    pub fn read(&self, index: usize) -> Result<DecodedBuffer> {
        let accessor = self.manifest.accessor(index)?;
        let Some(view_index) = accessor.buffer_view else {
            return decode(&[], accessor, None);
        };
        let view = self.manifest.buffer_view(view_index)?;
        let raw = self.buffers.get(view.buffer).ok_or_else(|| {
            Error::malformed(format!("buffer view {view_index} references missing buffer {}", view.buffer))
        })?;
        decode(raw, accessor, Some(view)).map_err(|err| match err {
            Error::MalformedAsset(msg) => Error::malformed(format!("accessor {index}: {msg}")),
            other => other,
        })
    }
}

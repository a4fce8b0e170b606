//! Shared test fixtures: builds small glTF manifests with a binary buffer in
//! memory.

#![allow(dead_code)]

use glam::{Mat4, Quat, Vec3};
use serde_json::{Value, json};

use gltf_rig::MemoryAssetReader;
use gltf_rig::assets::Manifest;

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn mat_approx(a: Mat4, b: Mat4) -> bool {
    a.abs_diff_eq(b, 1e-4)
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Accumulates accessor data into one binary buffer with one buffer view per
/// accessor.
#[derive(Default)]
pub struct BufferBuilder {
    pub bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_raw(&mut self, bytes: &[u8], component_type: u32, count: usize, type_tag: &str, normalized: bool) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);

        self.views.push(json!({ "buffer": 0, "byteOffset": offset, "byteLength": bytes.len() }));
        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "count": count,
            "type": type_tag,
            "normalized": normalized,
        }));
        self.accessors.len() - 1
    }

    pub fn push_f32(&mut self, data: &[f32], type_tag: &str) -> usize {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_raw(&bytes, 5126, data.len() / arity(type_tag), type_tag, false)
    }

    pub fn push_u16(&mut self, data: &[u16], type_tag: &str) -> usize {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_raw(&bytes, 5123, data.len() / arity(type_tag), type_tag, false)
    }

    pub fn push_i16_normalized(&mut self, data: &[i16], type_tag: &str) -> usize {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_raw(&bytes, 5122, data.len() / arity(type_tag), type_tag, true)
    }

    pub fn push_mat4s(&mut self, matrices: &[Mat4]) -> usize {
        let floats: Vec<f32> = matrices.iter().flat_map(Mat4::to_cols_array).collect();
        self.push_f32(&floats, "MAT4")
    }

    /// Merges the accumulated accessors, buffer views and a single buffer at
    /// `bin_uri` into `doc`.
    pub fn finish(self, mut doc: Value, bin_uri: &str) -> (Vec<u8>, Vec<u8>) {
        doc["accessors"] = Value::Array(self.accessors);
        doc["bufferViews"] = Value::Array(self.views);
        doc["buffers"] = json!([{ "uri": bin_uri, "byteLength": self.bin.len() }]);
        (serde_json::to_vec(&doc).unwrap(), self.bin)
    }
}

fn arity(type_tag: &str) -> usize {
    match type_tag {
        "SCALAR" => 1,
        "VEC2" => 2,
        "VEC3" => 3,
        "VEC4" | "MAT2" => 4,
        "MAT3" => 9,
        "MAT4" => 16,
        other => panic!("unknown type tag {other}"),
    }
}

/// A skinned three-node chain.
///
/// - node 0 `root`: carries mesh 0 and skin 0, child 1
/// - node 1 `upper`: translation (0, 1, 0), child 2
/// - node 2 `lower`: translation (0, 1, 0)
///
/// Skin 0 binds joints [1, 2] with inverse bind matrices that cancel the bind
/// pose, so every joint matrix is the identity until animated.
///
/// The single clip `bend` rotates `upper` from identity to 90° about Z over
/// one second, and moves `lower` from (0, 1, 0) to (0, 3, 0) over two.
pub struct SkinnedChain {
    pub manifest: Vec<u8>,
    pub bin: Vec<u8>,
}

pub const MANIFEST_URI: &str = "models/rig.gltf";
pub const BIN_URI: &str = "models/rig.bin";

impl SkinnedChain {
    pub fn new() -> Self {
        Self::with_doc(|_| {})
    }

    /// Builds the chain, letting `edit` change the JSON before serialization.
    pub fn with_doc(edit: impl FnOnce(&mut Value)) -> Self {
        let mut b = BufferBuilder::new();

        let positions = b.push_f32(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0], "VEC3");
        let indices = b.push_u16(&[0, 1, 2], "SCALAR");
        let joints = b.push_u16(&[0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0], "VEC4");
        let weights = b.push_f32(
            &[1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            "VEC4",
        );
        let ibm = b.push_mat4s(&[
            Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)),
        ]);

        let rot_times = b.push_f32(&[0.0, 1.0], "SCALAR");
        let quarter = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let rot_values = b.push_f32(&[0.0, 0.0, 0.0, 1.0, quarter.x, quarter.y, quarter.z, quarter.w], "VEC4");
        let move_times = b.push_f32(&[0.0, 2.0], "SCALAR");
        let move_values = b.push_f32(&[0.0, 1.0, 0.0, 0.0, 3.0, 0.0], "VEC3");

        let mut doc = json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [ { "nodes": [0] } ],
            "nodes": [
                { "name": "root", "mesh": 0, "skin": 0, "children": [1] },
                { "name": "upper", "translation": [0.0, 1.0, 0.0], "children": [2] },
                { "name": "lower", "translation": [0.0, 1.0, 0.0] }
            ],
            "meshes": [ {
                "name": "ribbon",
                "primitives": [ {
                    "attributes": { "POSITION": positions, "JOINTS_0": joints, "WEIGHTS_0": weights },
                    "indices": indices,
                    "material": 0
                } ]
            } ],
            "materials": [ {
                "name": "skin",
                "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.5, 0.25, 1.0], "metallicFactor": 0.0 }
            } ],
            "skins": [ { "name": "chain", "joints": [1, 2], "inverseBindMatrices": ibm } ],
            "animations": [ {
                "name": "bend",
                "channels": [
                    { "sampler": 0, "target": { "node": 1, "path": "rotation" } },
                    { "sampler": 1, "target": { "node": 2, "path": "translation" } }
                ],
                "samplers": [
                    { "input": rot_times, "output": rot_values },
                    { "input": move_times, "output": move_values }
                ]
            } ]
        });
        edit(&mut doc);

        let (manifest, bin) = b.finish(doc, "rig.bin");
        Self { manifest, bin }
    }

    pub fn parsed(&self) -> Manifest {
        Manifest::from_slice(&self.manifest).unwrap()
    }

    pub fn reader(&self) -> MemoryAssetReader {
        MemoryAssetReader::new()
            .with(MANIFEST_URI, self.manifest.clone())
            .with(BIN_URI, self.bin.clone())
    }
}

//! Asset Loading Tests
//!
//! Tests for:
//! - Accessor decoding against manifest descriptors
//! - Async loading through an in-memory reader (buffers, data URIs, images)
//! - Fail-fast fetch errors and manifest-level validation
//! - Blocking load from the filesystem

mod common;

use base64::Engine;
use glam::{Mat4, Vec3};
use serde_json::json;

use gltf_rig::assets::accessor::{AccessorData, AccessorType, ComponentType};
use gltf_rig::assets::{AccessorReader, GltfLoader, MemoryAssetReader, build_model};
use gltf_rig::{Error, FileAssetReader, LoadSettings};

use common::{BIN_URI, BufferBuilder, MANIFEST_URI, SkinnedChain, init_logger, mat_approx};

// ============================================================================
// Accessor decoding
// ============================================================================

#[test]
fn vec3_accessor_decodes_element_layout() {
    let mut b = BufferBuilder::new();
    let accessor = b.push_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], "VEC3");
    let (manifest, bin) = b.finish(json!({}), "a.bin");
    let manifest = gltf_rig::assets::Manifest::from_slice(&manifest).unwrap();
    let buffers = vec![bin];

    let decoded = AccessorReader::new(&manifest, &buffers).read(accessor).unwrap();
    assert_eq!(decoded.accessor_type, AccessorType::Vec3);
    assert_eq!(decoded.component_type, ComponentType::Float);
    assert_eq!(decoded.arity(), 3);
    assert_eq!(decoded.count(), 2);
    assert_eq!(decoded.data, AccessorData::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
}

#[test]
fn accessor_index_out_of_bounds_is_malformed() {
    let fixture = SkinnedChain::new();
    let manifest = fixture.parsed();
    let buffers = vec![fixture.bin.clone()];

    let err = AccessorReader::new(&manifest, &buffers).read(999).unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)));
}

// ============================================================================
// Async loading
// ============================================================================

#[tokio::test]
async fn loads_skinned_chain_from_memory() {
    init_logger();
    let fixture = SkinnedChain::new();
    let asset = GltfLoader::load(&fixture.reader(), MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap();

    let model = &asset.model;
    assert_eq!(model.nodes.len(), 3);
    assert_eq!(model.roots, vec![0]);
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.skins.len(), 1);
    assert_eq!(model.materials.len(), 1);
    assert!(asset.images.is_empty());

    let clip = model.clip.as_ref().unwrap();
    assert_eq!(clip.name.as_deref(), Some("bend"));
    assert_eq!(clip.duration, 2.0);

    // Loaded in bind pose: world transforms follow the translations and the
    // inverse bind matrices cancel them.
    assert!(mat_approx(
        model.world_transform(2).unwrap(),
        Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0))
    ));
    for m in model.skins[0].joint_matrices().matrices() {
        assert!(mat_approx(*m, Mat4::IDENTITY));
    }
}

#[tokio::test]
async fn failing_buffer_fetch_is_missing_data() {
    let fixture = SkinnedChain::new();
    let reader = MemoryAssetReader::new().with(MANIFEST_URI, fixture.manifest.clone());

    let err = GltfLoader::load(&reader, MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingData(_)), "got {err:?}");
}

#[tokio::test]
async fn failing_manifest_fetch_is_missing_data() {
    let err = GltfLoader::load(&MemoryAssetReader::new(), MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingData(_)));
}

#[tokio::test]
async fn manifest_without_accessors_is_missing_data() {
    let reader = MemoryAssetReader::new().with(
        "empty.gltf",
        br#"{ "asset": { "version": "2.0" }, "nodes": [ {} ] }"#.to_vec(),
    );

    let err = GltfLoader::load(&reader, "empty.gltf", &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingData(_)));
}

#[tokio::test]
async fn invalid_json_is_a_json_error() {
    let reader = MemoryAssetReader::new().with("bad.gltf", b"{ nodes: ".to_vec());

    let err = GltfLoader::load(&reader, "bad.gltf", &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn truncated_buffer_is_malformed() {
    let fixture = SkinnedChain::new();
    let reader = MemoryAssetReader::new()
        .with(MANIFEST_URI, fixture.manifest.clone())
        .with(BIN_URI, fixture.bin[..fixture.bin.len() / 2].to_vec());

    let err = GltfLoader::load(&reader, MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)));
}

#[tokio::test]
async fn buffer_can_be_embedded_as_data_uri() {
    let fixture = SkinnedChain::new();
    let mut doc: serde_json::Value = serde_json::from_slice(&fixture.manifest).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(&fixture.bin);
    doc["buffers"][0]["uri"] = json!(format!("data:application/octet-stream;base64,{encoded}"));

    let reader = MemoryAssetReader::new().with("embedded.gltf", serde_json::to_vec(&doc).unwrap());
    let asset = GltfLoader::load(&reader, "embedded.gltf", &LoadSettings::default())
        .await
        .unwrap();
    assert_eq!(asset.model.meshes[0].vertex_count(), 3);
}

#[tokio::test]
async fn corrupt_data_uri_is_a_base64_error() {
    let fixture = SkinnedChain::new();
    let mut doc: serde_json::Value = serde_json::from_slice(&fixture.manifest).unwrap();
    doc["buffers"][0]["uri"] = json!("data:application/octet-stream;base64,@@not-base64@@");

    let reader = MemoryAssetReader::new().with("embedded.gltf", serde_json::to_vec(&doc).unwrap());
    let err = GltfLoader::load(&reader, "embedded.gltf", &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Base64(_)));
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 0, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[tokio::test]
async fn referenced_images_are_decoded_to_rgba() {
    let fixture = SkinnedChain::with_doc(|doc| {
        doc["images"] = json!([{ "uri": "unused.png" }, { "uri": "albedo.png" }]);
        doc["textures"] = json!([{ "source": 1 }]);
        doc["materials"][0]["pbrMetallicRoughness"]["baseColorTexture"] = json!({ "index": 0 });
    });
    let reader = fixture.reader().with("models/albedo.png", tiny_png());

    let asset = GltfLoader::load(&reader, MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap();

    assert_eq!(asset.images.len(), 2);
    assert!(asset.image(0).is_none());
    let image = asset.image(1).unwrap();
    assert_eq!((image.width, image.height), (2, 1));
    assert_eq!(image.pixels, vec![255, 0, 0, 255, 255, 0, 0, 255]);

    let texture = asset.model.materials[0].base_color_texture.unwrap();
    assert_eq!(texture.image, 1);
}

#[tokio::test]
async fn missing_image_fails_the_whole_load() {
    let fixture = SkinnedChain::with_doc(|doc| {
        doc["images"] = json!([{ "uri": "albedo.png" }]);
        doc["textures"] = json!([{ "source": 0 }]);
        doc["materials"][0]["pbrMetallicRoughness"]["baseColorTexture"] = json!({ "index": 0 });
    });

    let err = GltfLoader::load(&fixture.reader(), MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingData(_)));
}

#[tokio::test]
async fn image_loading_can_be_disabled() {
    let fixture = SkinnedChain::with_doc(|doc| {
        doc["images"] = json!([{ "uri": "albedo.png" }]);
        doc["textures"] = json!([{ "source": 0 }]);
        doc["materials"][0]["pbrMetallicRoughness"]["baseColorTexture"] = json!({ "index": 0 });
    });
    let settings = LoadSettings { load_images: false, ..Default::default() };

    let asset = GltfLoader::load(&fixture.reader(), MANIFEST_URI, &settings).await.unwrap();
    assert_eq!(asset.images.len(), 1);
    assert!(asset.image(0).is_none());
}

#[tokio::test]
async fn image_view_past_address_space_is_malformed() {
    let fixture = SkinnedChain::new();
    let mut doc: serde_json::Value = serde_json::from_slice(&fixture.manifest).unwrap();
    let views = doc["bufferViews"].as_array_mut().unwrap();
    views.push(json!({ "buffer": 0, "byteOffset": usize::MAX, "byteLength": 8 }));
    let view = views.len() - 1;
    doc["images"] = json!([{ "bufferView": view, "mimeType": "image/png" }]);
    doc["textures"] = json!([{ "source": 0 }]);
    doc["materials"][0]["pbrMetallicRoughness"]["baseColorTexture"] = json!({ "index": 0 });

    let reader = fixture.reader().with(MANIFEST_URI, serde_json::to_vec(&doc).unwrap());
    let err = GltfLoader::load(&reader, MANIFEST_URI, &LoadSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)), "got {err:?}");
}

// ============================================================================
// Model build validation
// ============================================================================

#[test]
fn dangling_mesh_reference_is_malformed() {
    let fixture = SkinnedChain::with_doc(|doc| doc["nodes"][2]["mesh"] = json!(4));
    let err = build_model(&fixture.parsed(), &[fixture.bin.clone()], &LoadSettings::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)));
}

#[test]
fn oversized_viewless_inverse_bind_accessor_is_malformed() {
    let fixture = SkinnedChain::new();
    let mut doc: serde_json::Value = serde_json::from_slice(&fixture.manifest).unwrap();
    let accessors = doc["accessors"].as_array_mut().unwrap();
    accessors.push(json!({ "componentType": 5126, "count": usize::MAX / 4, "type": "SCALAR" }));
    let index = accessors.len() - 1;
    doc["skins"][0]["inverseBindMatrices"] = json!(index);

    let manifest = gltf_rig::assets::Manifest::from_slice(&serde_json::to_vec(&doc).unwrap()).unwrap();
    let err = build_model(&manifest, &[fixture.bin.clone()], &LoadSettings::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)), "got {err:?}");
}

#[test]
fn dangling_skin_joint_is_malformed() {
    let fixture = SkinnedChain::with_doc(|doc| doc["skins"][0]["joints"] = json!([1, 7]));
    let err = build_model(&fixture.parsed(), &[fixture.bin.clone()], &LoadSettings::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)));
}

#[test]
fn cyclic_hierarchy_is_rejected_when_validating() {
    let fixture = SkinnedChain::with_doc(|doc| doc["nodes"][2]["children"] = json!([1]));
    let err = build_model(&fixture.parsed(), &[fixture.bin.clone()], &LoadSettings::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)));
}

#[test]
fn animating_a_missing_node_is_malformed() {
    let fixture = SkinnedChain::with_doc(|doc| doc["animations"][0]["channels"][0]["target"]["node"] = json!(9));
    let err = build_model(&fixture.parsed(), &[fixture.bin.clone()], &LoadSettings::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedAsset(_)));
}

#[test]
fn only_first_clip_is_loaded() {
    let fixture = SkinnedChain::with_doc(|doc| {
        let mut second = doc["animations"][0].clone();
        second["name"] = json!("second");
        doc["animations"].as_array_mut().unwrap().push(second);
    });
    let model = build_model(&fixture.parsed(), &[fixture.bin.clone()], &LoadSettings::default()).unwrap();
    assert_eq!(model.clip.unwrap().name.as_deref(), Some("bend"));
}

// ============================================================================
// Blocking load from disk
// ============================================================================

#[test]
fn load_blocking_reads_from_filesystem() {
    let fixture = SkinnedChain::new();
    let dir = std::env::temp_dir().join(format!("gltf-rig-test-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("models")).unwrap();
    std::fs::write(dir.join(MANIFEST_URI), &fixture.manifest).unwrap();
    std::fs::write(dir.join(BIN_URI), &fixture.bin).unwrap();

    let reader = FileAssetReader::new(&dir);
    let asset = GltfLoader::load_blocking(&reader, MANIFEST_URI, &LoadSettings::default());
    std::fs::remove_dir_all(&dir).ok();

    let asset = asset.unwrap();
    assert_eq!(asset.model.find_node("lower").map(|n| n.id), Some(2));
}

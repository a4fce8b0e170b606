//! Asset loading: the glTF manifest model, binary accessor decoding, byte
//! sources and the loader that ties them together.

pub mod accessor;
pub mod io;
pub mod loader;
pub mod manifest;

pub use accessor::{AccessorData, AccessorReader, AccessorType, ComponentType, DecodedBuffer, decode};
pub use io::{AssetReader, FileAssetReader, MemoryAssetReader};
pub use loader::{GltfLoader, ImageData, LoadedAsset, build_model};
pub use manifest::Manifest;

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Loads skinned glTF 2.0 assets and drives them with keyframe animation.
//!
//! ```rust,ignore
//! use gltf_rig::{Animator, FileAssetReader, GltfLoader, LoadSettings, ModelRenderer};
//!
//! let reader = FileAssetReader::new("assets/fox");
//! let mut asset = GltfLoader::load_blocking(&reader, "fox.gltf", &LoadSettings::default())?;
//! let gpu = ModelRenderer::upload(&asset, &mut ctx)?;
//!
//! let mut animator = Animator::new();
//! loop {
//!     animator.advance(&mut asset.model, dt);
//!     ModelRenderer::draw(&asset.model, &gpu, &mut ctx);
//! }
//! ```

pub mod animation;
pub mod assets;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;
pub mod settings;

pub use animation::{AnimationClip, Animator, LoopMode, tick, tick_with_mode};
pub use assets::{AssetReader, FileAssetReader, GltfLoader, LoadedAsset, MemoryAssetReader, build_model};
pub use errors::{Error, Result};
pub use render::{ModelRenderer, RenderContext};
pub use resources::{Material, Mesh};
pub use scene::{Model, Node, Skin};
pub use settings::{AnimatorSettings, LoadSettings, RigSettings};

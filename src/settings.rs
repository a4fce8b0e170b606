//! Loader & Playback Settings
//!
//! Runtime knobs for asset loading and animation playback. Every field has a
//! default, so a partial JSON document (or none at all) is a valid
//! configuration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gltf_rig::settings::{LoadSettings, RigSettings};
//!
//! // Defaults: validate the hierarchy, sort keyframes, decode images.
//! let load = LoadSettings::default();
//!
//! // Skip image decoding for a headless tool
//! let load = LoadSettings {
//!     load_images: false,
//!     ..Default::default()
//! };
//!
//! // From a config file
//! let settings = RigSettings::from_json_str(r#"{ "animator": { "loop_mode": "ping_pong" } }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::animation::animator::LoopMode;
use crate::errors::Result;

// ---------------------------------------------------------------------------
// LoadSettings
// ---------------------------------------------------------------------------

/// Controls how strictly an asset is checked and which optional parts are
/// decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Reject node graphs where a node has two parents or a cycle exists.
    pub validate_hierarchy: bool,

    /// Stably sort every keyframe track by time after compilation.
    ///
    /// When disabled, out-of-order sampler input is only reported with a
    /// warning and sampling behaviour is unspecified.
    pub sort_keyframes: bool,

    /// Fetch and decode the images referenced by materials.
    pub load_images: bool,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            validate_hierarchy: true,
            sort_keyframes: true,
            load_images: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AnimatorSettings
// ---------------------------------------------------------------------------

/// Initial playback state of an [`Animator`](crate::animation::Animator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorSettings {
    pub loop_mode: LoopMode,
    /// Multiplier applied to every `dt`.
    pub time_scale: f32,
    /// Start advancing immediately. When `false` the animator begins paused.
    pub autoplay: bool,
    /// Playback time in seconds at creation.
    pub start_time: f32,
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            loop_mode: LoopMode::Loop,
            time_scale: 1.0,
            autoplay: true,
            start_time: 0.0,
        }
    }
}

/// Both settings groups, as read from one configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigSettings {
    pub load: LoadSettings,
    pub animator: AnimatorSettings,
}

impl RigSettings {
    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let settings = RigSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, RigSettings::default());
        assert!(settings.load.validate_hierarchy);
        assert!(settings.load.sort_keyframes);
        assert_eq!(settings.animator.loop_mode, LoopMode::Loop);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let settings = RigSettings::from_json_str(
            r#"{ "load": { "load_images": false }, "animator": { "loop_mode": "ping_pong", "time_scale": 0.5 } }"#,
        )
        .unwrap();

        assert!(!settings.load.load_images);
        assert!(settings.load.sort_keyframes);
        assert_eq!(settings.animator.loop_mode, LoopMode::PingPong);
        assert_eq!(settings.animator.time_scale, 0.5);
        assert!(settings.animator.autoplay);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(RigSettings::from_json_str("{ load: }").is_err());
    }
}

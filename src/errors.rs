//! Error Types
//!
//! This module defines the error type returned by every fallible loading
//! operation in the crate.
//!
//! # Overview
//!
//! Loading an asset either produces a complete [`Model`](crate::Model) or a
//! single terminal [`Error`]. There is no partial or degraded load path:
//! the first decode, compile or fetch failure aborts the whole asset.
//!
//! Per-frame animation never fails; out-of-range times are clamped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gltf_rig::errors::{Error, Result};
//!
//! fn load() -> Result<()> {
//!     Err(Error::MalformedAsset("accessor 3 overruns its buffer view".into()))
//! }
//! ```

use thiserror::Error;

/// The error type for asset loading.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Asset Content Errors
    // ========================================================================
    /// The manifest or binary data is structurally invalid.
    ///
    /// Raised for byte-range overruns, unknown accessor types or component
    /// types, missing mandatory mesh attributes, skin joint/matrix count
    /// mismatches, dangling indices and cyclic node hierarchies.
    #[error("Malformed asset: {0}")]
    MalformedAsset(String),

    /// Data required to build the model is absent.
    ///
    /// Raised when the manifest has no accessors or when fetching the
    /// manifest, a binary buffer or an image failed.
    #[error("Missing data: {0}")]
    MissingData(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error (embedded `data:` URIs).
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// I/O error, e.g. while starting the blocking loader's runtime.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// The rendering collaborator rejected an upload.
    #[error("Render context error: {0}")]
    RenderContext(String),
}

impl Error {
    #[inline]
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedAsset(msg.into())
    }

    #[inline]
    pub(crate) fn missing(msg: impl Into<String>) -> Self {
        Error::MissingData(msg.into())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

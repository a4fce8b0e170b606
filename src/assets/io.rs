//! Asset byte sources.
//!
//! The loader never touches the filesystem directly; it asks an
//! [`AssetReader`] for the bytes behind a URI. Embedded `data:` URIs are
//! decoded in place and never reach the reader.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;
use rustc_hash::FxHashMap;

use crate::errors::{Error, Result};

/// Asynchronous byte source for manifests, buffers and images.
pub trait AssetReader: Send + Sync {
    /// Reads every byte behind `uri`.
    fn read_bytes(&self, uri: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// Reads assets from a directory on the local filesystem.
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// `path` may be a directory or a file inside it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        let data = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(data)
    }
}

/// In-memory asset store keyed by URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(uri.into(), bytes.into());
    }

    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, bytes);
        self
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.files.contains_key(uri)
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no asset registered at '{uri}'"))
    }
}

/// Resolves `uri` against the directory of the manifest at `base`.
///
/// Absolute paths and URIs with a scheme are returned unchanged.
#[must_use]
pub fn resolve_uri(base: &str, uri: &str) -> String {
    if uri.starts_with('/') || uri.contains("://") || uri.starts_with("data:") {
        return uri.to_string();
    }
    match base.rfind('/') {
        Some(slash) => format!("{}{uri}", &base[..=slash]),
        None => uri.to_string(),
    }
}

/// Decodes a base64 `data:` URI. Returns `None` for any other URI.
pub fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    Some(match rest.split_once(',') {
        Some((header, payload)) if header.ends_with(";base64") => {
            base64::engine::general_purpose::STANDARD.decode(payload).map_err(Error::from)
        }
        Some(_) => Err(Error::malformed("only base64 data URIs are supported")),
        None => Err(Error::malformed("data URI has no payload")),
    })
}

/// Fetches `uri` relative to `base`, decoding embedded data URIs directly.
///
/// A reader failure is [`Error::MissingData`].
pub async fn fetch<R: AssetReader>(reader: &R, base: &str, uri: &str) -> Result<Vec<u8>> {
    if let Some(decoded) = decode_data_uri(uri) {
        return decoded;
    }
    let resolved = resolve_uri(base, uri);
    reader
        .read_bytes(&resolved)
        .await
        .map_err(|e| Error::missing(format!("failed to fetch '{resolved}': {e:#}")))
}

//! Types for the catalog module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved file manifest for one update/language/edition combination.
///
/// Immutable once a build session has been started from it. The file map is
/// ordered so that everything rendered from it (downloader input list, logs)
/// is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateManifest {
    /// Human-readable update name; sanitized downstream into the artifact
    /// base name.
    #[serde(rename = "updateName")]
    pub update_name: String,

    /// Files to fetch, keyed by output filename.
    #[serde(default)]
    pub files: BTreeMap<String, FileSource>,
}

/// Source location and integrity data for a single manifest file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// Download URL. The catalog reports files without a usable source as an
    /// absent URL or the literal string `"null"`; both are skipped when the
    /// downloader input list is rendered.
    #[serde(default)]
    pub url: Option<String>,

    /// SHA-1 content hash, handed to the downloader for verification.
    pub sha1: String,

    /// Size in bytes, when the catalog reports one.
    #[serde(default)]
    pub size: Option<u64>,
}

impl UpdateManifest {
    /// Number of entries with a usable source URL.
    pub fn downloadable_count(&self) -> usize {
        self.files.values().filter(|f| f.has_source_url()).count()
    }
}

impl FileSource {
    /// Whether this entry carries a usable source URL.
    pub fn has_source_url(&self) -> bool {
        match self.url.as_deref() {
            Some(url) => !url.is_empty() && url != "null",
            None => false,
        }
    }
}

//! Build session types.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Reduces an update name to a filesystem-safe artifact base name.
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
pub fn sanitize_artifact_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// One end-to-end build session.
///
/// Owns its working directory for its whole lifetime; the directory name
/// combines the sanitized artifact name with a millisecond timestamp so two
/// sessions never share scratch space.
#[derive(Debug, Clone)]
pub struct PipelineSession {
    /// Unique session identifier.
    pub id: String,
    /// Update name as reported by the catalog.
    pub update_name: String,
    /// Sanitized artifact base name (no extension).
    pub artifact_name: String,
    /// Exclusively owned scratch directory.
    pub work_dir: PathBuf,
}

impl PipelineSession {
    /// Creates a session for an update name under the given scratch root.
    pub fn new(update_name: &str, scratch_root: &Path) -> Self {
        let artifact_name = sanitize_artifact_name(update_name);
        let work_dir = scratch_root.join(format!(
            "{}_{}",
            artifact_name,
            Utc::now().timestamp_millis()
        ));

        Self {
            id: Uuid::new_v4().to_string(),
            update_name: update_name.to_string(),
            artifact_name,
            work_dir,
        }
    }
}

/// The published result of a successful session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// Session that produced the image.
    pub session_id: String,
    /// Published filename.
    pub filename: String,
    /// Published path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(
            sanitize_artifact_name("Feature-Update_26100.1"),
            "Feature-Update_26100.1"
        );
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_artifact_name("Windows 11 (26100.1) amd64"),
            "Windows_11__26100.1__amd64"
        );
        assert_eq!(sanitize_artifact_name("a/b\\c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_empty_name() {
        assert_eq!(sanitize_artifact_name(""), "image");
    }

    #[test]
    fn test_sessions_do_not_share_work_dirs() {
        let root = Path::new("/tmp/scratch");
        let a = PipelineSession::new("Same Update", root);
        let b = PipelineSession::new("Same Update", root);

        assert!(a.work_dir.starts_with(root));
        assert_ne!(a.id, b.id);
        // Work dir embeds the artifact name; the timestamp keeps concurrent
        // sessions for the same update apart (ids always differ).
        assert!(a
            .work_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Same_Update_"));
    }
}

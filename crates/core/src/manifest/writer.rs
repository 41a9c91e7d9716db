//! Input list rendering and writing.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::UpdateManifest;

/// Name of the input list file inside the session working directory.
pub const INPUT_LIST_FILENAME: &str = "download_list.txt";

/// Renders the downloader input list for a manifest.
///
/// Entry format, one block per file:
///
/// ```text
/// <url>
///   out=<filename>
///   checksum=sha-1=<hash>
/// ```
///
/// Blocks are separated by a blank line. Entries whose URL is absent, empty,
/// or the literal string `"null"` are excluded.
pub fn render_input_list(manifest: &UpdateManifest) -> String {
    let mut blocks = Vec::with_capacity(manifest.files.len());

    for (name, source) in &manifest.files {
        if !source.has_source_url() {
            debug!("skipping manifest entry '{}' (no source url)", name);
            continue;
        }
        let url = source.url.as_deref().unwrap_or_default();
        blocks.push(format!(
            "{}\n  out={}\n  checksum=sha-1={}",
            url, name, source.sha1
        ));
    }

    blocks.join("\n\n")
}

/// Writes the rendered input list into the working directory and returns its
/// path.
pub async fn write_input_file(
    manifest: &UpdateManifest,
    work_dir: &Path,
) -> std::io::Result<PathBuf> {
    let path = work_dir.join(INPUT_LIST_FILENAME);
    tokio::fs::write(&path, render_input_list(manifest)).await?;
    debug!(
        "wrote input list with {} entries to {}",
        manifest.downloadable_count(),
        path.display()
    );
    Ok(path)
}

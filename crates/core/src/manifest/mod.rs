//! Downloader input list generation.
//!
//! Turns a resolved [`UpdateManifest`](crate::catalog::UpdateManifest) into
//! the input-list format the external downloader consumes: one block per
//! file (URL, output name, checksum directive), blocks separated by a blank
//! line. Manifest entries without a usable source URL are skipped silently.

mod writer;

pub use writer::{render_input_list, write_input_file, INPUT_LIST_FILENAME};

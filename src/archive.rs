//! Repository archiving
//!
//! Serializes a directory tree into a gzip-compressed tar stream with entry
//! names relative to the tree root, so extraction reproduces the original
//! layout with no leading path prefix.

use std::fs::File;
use std::io;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("could not walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Compress the contents of `src` into a `.tar.gz` file at `dst`.
///
/// Every entry except the root itself is recorded under its path relative
/// to `src`, preserving filesystem mode and type. An empty source directory
/// yields a valid, empty archive.
pub fn compress_directory(src: &Path, dst: &Path) -> Result<(), ArchiveError> {
    let out = File::create(dst)?;
    let encoder = GzEncoder::new(out, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        // WalkDir yields paths rooted at src, so the prefix always strips.
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        if entry.file_type().is_dir() {
            builder.append_dir(relative, entry.path())?;
        } else if entry.file_type().is_file() {
            builder.append_path_with_name(entry.path(), relative)?;
        }
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}

use crate::config::ArchiveOptions;
use crate::epub::Archive;
use crate::epub::zip_utils;
use crate::error::Result;
use std::path::Path;

/// Read and parse an EPUB file into an in-memory archive.
pub fn read_epub(path: &Path, options: ArchiveOptions) -> Result<Archive> {
    let zip = zip_utils::open_epub(path)?;
    tracing::debug!(path = %path.display(), entries = zip.len(), "opening archive");
    Archive::open(zip.into_inner(), options)
}

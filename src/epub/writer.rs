use crate::epub::Archive;
use crate::error::Result;
use std::path::Path;

/// Write an archive to an EPUB file with atomic rename.
pub fn write_epub(archive: &Archive, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("epub.tmp");
    let file = std::fs::File::create(&tmp_path)?;
    if let Err(e) = archive.write_to(file) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    // Atomic rename
    std::fs::rename(&tmp_path, path)?;
    tracing::debug!(path = %path.display(), "wrote archive");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArchiveOptions;
    use crate::epub::reader::read_epub;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        let archive = Archive::with_skeleton(ArchiveOptions::default()).unwrap();
        write_epub(&archive, &path).unwrap();

        assert!(!dir.path().join("book.epub.tmp").exists());
        let reread = read_epub(&path, ArchiveOptions::default()).unwrap();
        assert_eq!(reread.paths(), archive.paths());
    }

    #[test]
    fn overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        std::fs::write(&path, b"not a zip").unwrap();
        let archive = Archive::with_skeleton(ArchiveOptions::default()).unwrap();
        write_epub(&archive, &path).unwrap();
        assert!(read_epub(&path, ArchiveOptions::default()).is_ok());
    }
}

use crate::epub::EPUB_MIMETYPE;
use crate::error::{EpubError, Result};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub fn open_epub(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    let archive = ZipArchive::new(file)?;
    Ok(archive)
}

/// Check the `mimetype` entry. An archive without one is accepted with a
/// warning; one whose first entry is something else or whose content is
/// wrong is rejected.
pub fn validate_mimetype<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<()> {
    if archive.index_for_name("mimetype").is_none() {
        tracing::warn!("archive has no mimetype entry");
        return Ok(());
    }

    let mut mimetype = archive.by_index(0)?;
    if mimetype.name() != "mimetype" {
        return Err(EpubError::InvalidEpub(
            "first entry must be 'mimetype'".into(),
        ));
    }

    let mut content = String::new();
    mimetype.read_to_string(&mut content)?;

    if content.trim() != EPUB_MIMETYPE {
        return Err(EpubError::InvalidEpub(format!(
            "invalid mimetype: {content}"
        )));
    }

    Ok(())
}

pub fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name).map_err(|_| {
        EpubError::InvalidEpub(format!("missing entry: {name}"))
    })?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn read_entry_string<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let bytes = read_entry(archive, name)?;
    String::from_utf8(bytes).map_err(|e| {
        EpubError::InvalidEpub(format!("invalid UTF-8 in {name}: {e}"))
    })
}

pub fn has_entry<R: Read + Seek>(archive: &ZipArchive<R>, name: &str) -> bool {
    archive.index_for_name(name).is_some()
}

/// File entries in central-directory order. Directory entries are skipped.
pub fn list_entries<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    (0..archive.len())
        .filter_map(|i| archive.name_for_index(i).map(|s| s.to_string()))
        .filter(|name| !name.ends_with('/'))
        .collect()
}

/// Start an EPUB zip: the `mimetype` entry goes first and uncompressed.
pub fn start_epub<W: Write + Seek>(writer: W) -> Result<ZipWriter<W>> {
    let mut zip = ZipWriter::new(writer);
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    zip.start_file("mimetype", stored)?;
    zip.write_all(EPUB_MIMETYPE.as_bytes())?;
    Ok(zip)
}

pub fn write_entry<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, data: &[u8]) -> Result<()> {
    let deflate = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file(name, deflate)?;
    zip.write_all(data)?;
    Ok(())
}

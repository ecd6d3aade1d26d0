use crate::epub::asset::ImageAsset;
use crate::epub::section::Section;
use crate::epub::{Archive, Document, MEDIA_TYPE_XHTML, path};
use crate::error::{EpubError, Result};
use std::path::Path;

/// Media type for a file on disk, by extension.
pub fn infer_media_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("ncx") => "application/x-dtbncx+xml",
        Some("xhtml") | Some("html") | Some("htm") => MEDIA_TYPE_XHTML,
        _ => "application/octet-stream",
    }
}

/// A manifest id derived from `file_name` that the package does not use
/// yet.
fn unique_manifest_id(archive: &Archive, file_name: &str) -> Result<String> {
    let package = archive.require_package()?;
    let mut base = slug::slugify(file_name);
    if base.is_empty() || !base.starts_with(|c: char| c.is_ascii_alphabetic()) {
        base = format!("item-{base}");
    }
    if !package.has_manifest_id(&base) {
        return Ok(base);
    }
    let mut n = 2;
    loop {
        let id = format!("{base}-{n}");
        if !package.has_manifest_id(&id) {
            return Ok(id);
        }
        n += 1;
    }
}

/// Store `doc` at `doc_path` and list it in the manifest. Returns the new
/// manifest id.
fn register(archive: &mut Archive, doc_path: &str, doc: Document) -> Result<String> {
    let id = unique_manifest_id(archive, path::file_name(doc_path))?;
    let media_type = doc.media_type().to_string();
    let package = archive.require_package_mut()?;
    let href = path::relativize(doc_path, package.path());
    package.append_to_manifest(&id, &href, &media_type);
    archive.insert(doc_path, doc);
    tracing::debug!(path = doc_path, %id, "registered document");
    Ok(id)
}

/// Add a section to the store and the manifest, and optionally to the end
/// of the spine.
pub fn add_section(archive: &mut Archive, section: Section, in_spine: bool) -> Result<String> {
    let section_path = section.path().to_string();
    let linear = section.linear();
    let id = register(archive, &section_path, Document::Section(section))?;
    if in_spine {
        archive.require_package_mut()?.append_to_spine(&id, linear);
    }
    Ok(id)
}

/// Add an image. The media type comes from the detected format.
pub fn add_image(archive: &mut Archive, image_path: &str, data: Vec<u8>) -> Result<String> {
    let image_path = path::normalize(image_path);
    let image = ImageAsset::from_bytes(image_path.as_str(), data);
    if image.format().is_none() {
        tracing::warn!(path = %image_path, "image format not recognised");
    }
    register(archive, &image_path, Document::Image(image))
}

/// Copy a file from disk next to the package document.
pub fn add_file_from_disk(
    archive: &mut Archive,
    file: &Path,
    media_type_override: Option<&str>,
) -> Result<String> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| EpubError::InvalidEpub(format!("invalid asset path: {}", file.display())))?;

    let media_type = media_type_override.unwrap_or_else(|| infer_media_type(file));
    let data = std::fs::read(file)?;

    let package_path = archive.require_package()?.path().to_string();
    let doc_path = path::with_file_name(&package_path, &file_name);
    let doc = Document::from_bytes(&doc_path, media_type, data)?;
    let is_section = doc.as_section().is_some();
    let id = register(archive, &doc_path, doc)?;
    if is_section {
        archive.require_package_mut()?.append_to_spine(&id, None);
    }
    Ok(id)
}

/// Remove a document together with its manifest items and spine entries.
/// `target` is a store path or a manifest id.
pub fn remove_asset(archive: &mut Archive, target: &str) -> Result<String> {
    let doc_path = if archive.contains(target) {
        target.to_string()
    } else {
        let package = archive.require_package()?;
        package
            .manifest_item_by_id(target)
            .map(|item| package.resolve_href(&item.href))
            .filter(|p| archive.contains(p))
            .ok_or_else(|| EpubError::DocumentNotFound(target.to_string()))?
    };

    let still_referenced = archive.sections().any(|s| {
        s.path() != doc_path
            && s
                .resolved_references()
                .iter()
                .any(|(_, resolved)| resolved.targets(&doc_path))
    });
    if still_referenced {
        tracing::warn!(path = %doc_path, "removed asset is still referenced in content");
    }

    if let Some(package) = archive.package_mut() {
        for item in package.manifest_items_by_path(&doc_path) {
            package.remove_manifest_item(&item.id);
            package.remove_from_spine(&item.id);
        }
    }
    archive.remove(&doc_path);
    Ok(doc_path)
}

use crate::epub::{Archive, path};
use crate::error::Result;
use crate::manipulate::rename::rename_file_name;

/// Append the detected format's extension to every image whose file name
/// has none. Images in an unknown format, or whose new name is already
/// taken, are left alone.
pub fn add_missing_extensions(archive: &mut Archive) -> Result<Vec<(String, String)>> {
    let pending: Vec<(String, Option<&'static str>)> = archive
        .images()
        .filter(|image| image.extension().is_empty())
        .map(|image| (image.path().to_string(), image.guess_extension()))
        .collect();

    let mut renamed = Vec::new();
    for (old_path, ext) in pending {
        let Some(ext) = ext else {
            tracing::warn!(path = %old_path, "cannot detect image format, leaving name as is");
            continue;
        };
        let new_name = format!("{}.{ext}", path::file_name(&old_path));
        let new_path = path::with_file_name(&old_path, &new_name);
        if archive.contains(&new_path) {
            tracing::warn!(path = %old_path, target = %new_path, "extension target already exists");
            continue;
        }
        rename_file_name(archive, &old_path, &new_name)?;
        renamed.push((old_path, new_path));
    }
    Ok(renamed)
}

use crate::epub::{Archive, path};
use crate::error::Result;
use crate::manipulate::rename::rename;
use std::collections::HashSet;

/// Give every image a file name no other image shares, ignoring case.
///
/// Images are visited in store order. The first holder of a name keeps
/// it; later ones become `{prefix}{n}` with their original extension.
/// Returns the `(old, new)` path of each rename.
pub fn unify_image_names(archive: &mut Archive) -> Result<Vec<(String, String)>> {
    let prefix = archive.options().image_name_prefix.clone();

    let mut seen: HashSet<String> = HashSet::new();
    let mut queued = Vec::new();
    for image in archive.images() {
        if !seen.insert(image.file_name().to_lowercase()) {
            queued.push(image.path().to_string());
        }
    }
    if queued.is_empty() {
        return Ok(Vec::new());
    }

    let lower_prefix = prefix.to_lowercase();
    let mut counter = archive
        .images()
        .filter_map(|image| {
            let stem = path::file_stem(image.path()).to_lowercase();
            stem.strip_prefix(lower_prefix.as_str())?.parse::<u64>().ok()
        })
        .filter(|n| *n < u64::MAX)
        .max()
        .unwrap_or(0);

    let mut renamed = Vec::new();
    for old_path in queued {
        let ext = path::extension(&old_path);
        let new_path = loop {
            counter = counter.checked_add(1).unwrap_or(1);
            let name = if ext.is_empty() {
                format!("{prefix}{counter}")
            } else {
                format!("{prefix}{counter}.{ext}")
            };
            let candidate = path::with_file_name(&old_path, &name);
            if !seen.contains(&name.to_lowercase()) && !archive.contains(&candidate) {
                seen.insert(name.to_lowercase());
                break candidate;
            }
        };
        rename(archive, &old_path, &new_path)?;
        renamed.push((old_path, new_path));
    }

    tracing::info!(count = renamed.len(), "unified image names");
    Ok(renamed)
}

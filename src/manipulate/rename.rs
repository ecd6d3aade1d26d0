use crate::epub::{Archive, path};
use crate::error::{EpubError, Result};

/// Move the document at `old_path` to `new_path` and update everything
/// that addresses it: section links and image sources, manifest hrefs,
/// navPoint srcs and the container rootfile.
///
/// If another document already lives at `new_path` it is replaced. The
/// moved document keeps its slot in the archive's file order.
pub fn rename(archive: &mut Archive, old_path: &str, new_path: &str) -> Result<()> {
    let new_path = path::normalize(new_path);
    if !archive.contains(old_path) {
        return Err(EpubError::DocumentNotFound(old_path.to_string()));
    }
    if old_path == new_path {
        return Ok(());
    }
    if new_path.is_empty() {
        return Err(EpubError::InvalidEpub(format!(
            "cannot rename {old_path} to an empty path"
        )));
    }

    let mut rewritten = 0;

    for doc in archive.store_mut().iter_mut() {
        let base = doc.path().to_string();
        let Some(section) = doc.as_section_mut() else {
            continue;
        };
        let new_base = moved(&base, old_path, &new_path).to_string();
        let count = section.rewrite_references(|r| {
            retarget(&r.value, &base, &new_base, old_path, &new_path)
        });
        if count > 0 {
            tracing::debug!(section = %base, count, "rewrote section references");
        }
        rewritten += count;
    }

    let follow_ids = archive.options().manifest_id_follows_filename;
    if let Some(package) = archive.package_mut() {
        let base = package.path().to_string();
        let new_base = moved(&base, old_path, &new_path).to_string();
        let renamed_ids: Vec<String> = package
            .manifest_items_by_path(old_path)
            .into_iter()
            .map(|item| item.id)
            .collect();

        rewritten += package.rewrite_manifest_hrefs(|href| {
            retarget(href, &base, &new_base, old_path, &new_path)
        });

        if follow_ids {
            let new_id = path::file_name(&new_path);
            for id in &renamed_ids {
                if id == new_id {
                    continue;
                }
                if package.has_manifest_id(new_id) {
                    tracing::warn!(%id, new_id, "manifest id already taken, keeping the old id");
                    continue;
                }
                package.rename_manifest_id(id, new_id);
                tracing::debug!(%id, new_id, "manifest id follows file name");
            }
        }
    }

    if let Some(nav) = archive.navigation_mut() {
        let base = nav.path().to_string();
        let new_base = moved(&base, old_path, &new_path).to_string();
        rewritten += nav.rewrite_srcs(|src| retarget(src, &base, &new_base, old_path, &new_path));
    }

    if let Some(container) = archive.container_mut() {
        rewritten += container.retarget_root_file(old_path, &new_path);
    }

    archive.store_mut().rekey(old_path, &new_path);
    archive.retarget_singletons(old_path, &new_path);

    tracing::info!(from = old_path, to = %new_path, references = rewritten, "renamed document");
    Ok(())
}

/// Rename within the same directory: only the last path segment changes.
pub fn rename_file_name(archive: &mut Archive, old_path: &str, new_name: &str) -> Result<()> {
    let new_path = path::with_file_name(old_path, new_name);
    rename(archive, old_path, &new_path)
}

fn moved<'a>(doc_path: &'a str, old: &str, new: &'a str) -> &'a str {
    if doc_path == old { new } else { doc_path }
}

/// The value `reference`, written in the document at `base`, must take
/// once `old` has moved to `new` and the referring document itself sits at
/// `new_base`. `None` when the current value still resolves correctly.
fn retarget(reference: &str, base: &str, new_base: &str, old: &str, new: &str) -> Option<String> {
    if reference.is_empty() || path::is_external(reference) {
        return None;
    }
    let resolved = path::resolve(reference, base);
    let target = if resolved.path == old {
        new
    } else {
        resolved.path.as_str()
    };
    if path::resolve(reference, new_base).path == target {
        return None;
    }
    Some(path::relativize_with_fragment(
        target,
        new_base,
        resolved.fragment.as_deref(),
    ))
}

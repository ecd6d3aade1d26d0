use crate::epub::{Archive, path};
use serde::Serialize;

/// A reference that does not land on a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenReference {
    /// Document holding the reference.
    pub from: String,
    pub reference: String,
    /// Archive path the reference resolved to.
    pub target: String,
}

/// Every section reference, manifest href, spine idref and navPoint src
/// that points at nothing. External and fragment-only references are not
/// checked.
pub fn check_references(archive: &Archive) -> Vec<BrokenReference> {
    let mut broken = Vec::new();
    let mut check = |from: &str, reference: &str| {
        if reference.is_empty() || path::is_external(reference) || path::is_fragment_only(reference) {
            return;
        }
        let target = path::resolve(reference, from).path;
        if !archive.contains(&target) {
            broken.push(BrokenReference {
                from: from.to_string(),
                reference: reference.to_string(),
                target,
            });
        }
    };

    for section in archive.sections() {
        for reference in section.references() {
            check(section.path(), &reference.value);
        }
    }

    if let Some(package) = archive.package() {
        for item in package.manifest_items() {
            check(package.path(), &item.href);
        }
    }

    if let Some(nav) = archive.navigation() {
        for src in nav.srcs() {
            check(nav.path(), &src);
        }
    }

    if let Some(package) = archive.package() {
        for item in package.spine_items() {
            if !package.has_manifest_id(&item.idref) {
                broken.push(BrokenReference {
                    from: package.path().to_string(),
                    reference: item.idref,
                    target: String::new(),
                });
            }
        }
    }

    broken
}

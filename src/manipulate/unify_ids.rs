use crate::epub::{Archive, path};
use crate::error::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One id rewritten by [`unify_ids`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRewrite {
    pub section: String,
    pub old_id: String,
    pub new_id: String,
}

/// An id value carried by elements in more than one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub id: String,
    pub sections: Vec<String>,
}

/// Sections holding each id value. Ids are listed in order of first
/// appearance and holders in store order; a section appears once per id
/// even when the id repeats inside it.
fn id_occurrences(archive: &Archive) -> Vec<(String, Vec<String>)> {
    let mut occurrences: Vec<(String, Vec<String>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for section in archive.sections() {
        for id in section.element_ids() {
            let slot = *slots.entry(id.to_string()).or_insert_with(|| {
                occurrences.push((id.to_string(), Vec::new()));
                occurrences.len() - 1
            });
            let holders = &mut occurrences[slot].1;
            if !holders.iter().any(|p| p == section.path()) {
                holders.push(section.path().to_string());
            }
        }
    }
    occurrences
}

/// Ids shared by more than one section.
pub fn duplicate_ids(archive: &Archive) -> Vec<DuplicateId> {
    id_occurrences(archive)
        .into_iter()
        .filter(|(_, sections)| sections.len() > 1)
        .map(|(id, sections)| DuplicateId { id, sections })
        .collect()
}

/// Highest `n` among ids of the form `{prefix}{n}`. A suffix that cannot
/// be incremented is left out.
fn max_suffix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
        .filter(|n| *n < u64::MAX)
        .max()
        .unwrap_or(0)
}

/// Make every id value occur in at most one section.
///
/// The first section holding an id keeps it. Every later holder gets a
/// fresh `{prefix}{n}` id, and every anchor or navPoint that addressed the
/// old id in that particular section is pointed at the new one.
pub fn unify_ids(archive: &mut Archive) -> Result<Vec<IdRewrite>> {
    let prefix = archive.options().id_prefix.clone();
    let occurrences = id_occurrences(archive);
    let mut counter = max_suffix(occurrences.iter().map(|(id, _)| id.as_str()), &prefix);
    let mut taken: HashSet<String> = occurrences.iter().map(|(id, _)| id.clone()).collect();

    let mut rewrites = Vec::new();
    for (id, sections) in &occurrences {
        for section_path in sections.iter().skip(1) {
            let new_id = loop {
                counter = counter.checked_add(1).unwrap_or(1);
                let candidate = format!("{prefix}{counter}");
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
            archive.section_mut(section_path)?.rewrite_id(id, &new_id);
            let links = redirect_fragment_links(archive, section_path, id, &new_id);
            tracing::debug!(section = %section_path, old_id = %id, %new_id, links, "rewrote duplicate id");
            rewrites.push(IdRewrite {
                section: section_path.clone(),
                old_id: id.clone(),
                new_id,
            });
        }
    }

    if !rewrites.is_empty() {
        tracing::info!(count = rewrites.len(), "unified duplicate ids");
    }
    Ok(rewrites)
}

/// Point references to `target#old_id` at `target#new_id`, across every
/// section and the NCX.
fn redirect_fragment_links(archive: &mut Archive, target: &str, old_id: &str, new_id: &str) -> usize {
    let hits = |reference: &str, base: &str| -> Option<String> {
        if reference.is_empty() || path::is_external(reference) {
            return None;
        }
        let resolved = path::resolve(reference, base);
        (resolved.targets(target) && resolved.fragment.as_deref() == Some(old_id))
            .then(|| path::replace_fragment(reference, new_id))
    };

    let mut count = 0;
    for doc in archive.store_mut().iter_mut() {
        if let Some(section) = doc.as_section_mut() {
            let base = section.path().to_string();
            count += section.rewrite_references(|r| hits(&r.value, &base));
        }
    }
    if let Some(nav) = archive.navigation_mut() {
        let base = nav.path().to_string();
        count += nav.rewrite_srcs(|src| hits(src, &base));
    }
    count
}

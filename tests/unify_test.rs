mod common;

use epublink::epub::section::Section;
use epublink::epub::{Document, path};
use epublink::manipulate::{
    add_missing_extensions, duplicate_ids, unify_ids, unify_image_names,
};
use epublink::{Archive, ArchiveOptions};
use std::collections::{HashMap, HashSet};

const A: &str = "OEBPS/Text/ChapterA.xhtml";
const B: &str = "OEBPS/Text/ChapterB.xhtml";
const C: &str = "OEBPS/Text/ChapterC.xhtml";

/// For every anchor with a fragment: (section, index) -> (target path, id).
fn fragment_targets(archive: &Archive) -> HashMap<(String, usize), (String, String)> {
    let mut out = HashMap::new();
    for section in archive.sections() {
        for (i, (_, resolved)) in section.resolved_references().into_iter().enumerate() {
            if let Some(fragment) = resolved.fragment {
                out.insert((section.path().to_string(), i), (resolved.path, fragment));
            }
        }
    }
    out
}

#[test]
fn test_duplicate_ids_lists_shared_values() {
    let archive = common::sample_archive();
    let duplicates = duplicate_ids(&archive);
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].id, "note-1");
    assert_eq!(duplicates[0].sections, [A, B]);
}

#[test]
fn test_unify_ids_scenario() {
    let mut archive = common::sample_archive();
    let rewrites = unify_ids(&mut archive).unwrap();

    assert_eq!(rewrites.len(), 1);
    assert_eq!(rewrites[0].section, B);
    assert_eq!(rewrites[0].old_id, "note-1");
    assert_eq!(rewrites[0].new_id, "u-note-1");

    assert!(archive.section(A).unwrap().has_id("note-1"));
    assert!(!archive.section(B).unwrap().has_id("note-1"));
    assert!(archive.section(B).unwrap().has_id("u-note-1"));

    let links = common::reference_values(&archive, C, "a");
    assert_eq!(
        links,
        [
            "ChapterA.xhtml#note-1",
            "ChapterB.xhtml#u-note-1",
            "https://example.com/notes#note-1"
        ]
    );
    // B's own fragment-only link follows its element.
    assert_eq!(common::reference_values(&archive, B, "a"), ["#u-note-1"]);

    let srcs = archive.navigation().unwrap().srcs();
    assert!(srcs.contains(&"Text/ChapterB.xhtml#u-note-1".to_string()));
}

#[test]
fn test_unify_ids_leaves_each_id_in_one_section() {
    let mut archive = common::sample_archive();
    unify_ids(&mut archive).unwrap();

    let mut holders: HashMap<String, HashSet<String>> = HashMap::new();
    for section in archive.sections() {
        for id in section.element_ids() {
            holders
                .entry(id.to_string())
                .or_default()
                .insert(section.path().to_string());
        }
    }
    assert!(holders.values().all(|sections| sections.len() <= 1));
    assert!(duplicate_ids(&archive).is_empty());
}

#[test]
fn test_unify_ids_preserves_link_targets() {
    let mut archive = common::sample_archive();
    let before = fragment_targets(&archive);
    let rewrites = unify_ids(&mut archive).unwrap();
    let after = fragment_targets(&archive);

    assert_eq!(before.len(), after.len());
    for (key, (target, old_id)) in &before {
        let (new_target, new_id) = &after[key];
        assert_eq!(new_target, target, "link {key:?} changed document");
        let expected = rewrites
            .iter()
            .find(|r| &r.section == target && &r.old_id == old_id)
            .map_or(old_id.as_str(), |r| r.new_id.as_str());
        assert_eq!(new_id, expected, "link {key:?}");
    }
}

#[test]
fn test_unify_ids_is_idempotent() {
    let mut archive = common::sample_archive();
    assert!(!unify_ids(&mut archive).unwrap().is_empty());
    let snapshot = archive.to_bytes().unwrap();
    assert!(unify_ids(&mut archive).unwrap().is_empty());
    assert_eq!(archive.to_bytes().unwrap(), snapshot);
}

#[test]
fn test_unify_ids_counter_starts_above_existing() {
    let mut entries = common::sample_entries();
    entries[6].1 = common::xhtml(
        "Chapter C",
        r#"<p id="u-note-7">old</p><p id="note-1">again</p><a href="ChapterB.xhtml#note-1">B</a>"#,
    )
    .into_bytes();
    let mut archive =
        Archive::from_bytes(&common::build_epub(&entries), ArchiveOptions::default()).unwrap();

    let rewrites = unify_ids(&mut archive).unwrap();
    let minted: Vec<(&str, &str)> = rewrites
        .iter()
        .map(|r| (r.section.as_str(), r.new_id.as_str()))
        .collect();
    assert_eq!(minted, [(B, "u-note-8"), (C, "u-note-9")]);
    assert_eq!(
        common::reference_values(&archive, C, "a"),
        ["ChapterB.xhtml#u-note-8"]
    );
}

#[test]
fn test_unify_ids_uses_store_order_for_first_occurrence() {
    let mut archive = Archive::with_skeleton(ArchiveOptions::default()).unwrap();
    for (path, body) in [
        ("OEBPS/z.xhtml", r#"<p id="dup">z</p>"#),
        ("OEBPS/a.xhtml", r#"<p id="dup">a</p><a href="z.xhtml#dup">z</a>"#),
    ] {
        let mut section = Section::create_default(path).unwrap();
        section.set_body_xhtml(body).unwrap();
        archive.insert(path, Document::Section(section));
    }

    let rewrites = unify_ids(&mut archive).unwrap();
    assert_eq!(rewrites[0].section, "OEBPS/a.xhtml");
    // The link targets z, which kept its id.
    assert_eq!(
        common::reference_values(&archive, "OEBPS/a.xhtml", "a"),
        ["z.xhtml#dup"]
    );
}

#[test]
fn test_unify_ids_custom_prefix() {
    let mut archive = common::sample_archive();
    archive.options_mut().id_prefix = "fn".to_string();
    let rewrites = unify_ids(&mut archive).unwrap();
    assert_eq!(rewrites[0].new_id, "fn1");
}

#[test]
fn test_unify_image_names_scenario() {
    let mut archive = common::sample_archive();
    let renamed = unify_image_names(&mut archive).unwrap();
    assert_eq!(
        renamed,
        [(
            "OEBPS/Images/cover.png".to_string(),
            "OEBPS/Images/image_1.png".to_string()
        )]
    );
    assert_eq!(
        common::reference_values(&archive, B, "img"),
        ["../Images/image_1.png"]
    );
    assert_eq!(
        common::reference_values(&archive, A, "img"),
        ["../Images/Cover.PNG"]
    );
    let package = archive.package().unwrap();
    let item = package.manifest_item_by_id("cover-lower").unwrap();
    assert_eq!(item.href, "Images/image_1.png");
}

#[test]
fn test_unify_image_names_is_idempotent() {
    let mut archive = common::sample_archive();
    assert_eq!(unify_image_names(&mut archive).unwrap().len(), 1);
    assert!(unify_image_names(&mut archive).unwrap().is_empty());
}

#[test]
fn test_unify_image_names_skips_used_suffixes() {
    let mut archive = common::sample_archive();
    archive.insert(
        "OEBPS/Images/image_5.png",
        Document::Image(epublink::epub::asset::ImageAsset::from_bytes(
            "OEBPS/Images/image_5.png",
            common::png_bytes(1, 1),
        )),
    );
    let renamed = unify_image_names(&mut archive).unwrap();
    assert_eq!(renamed[0].1, "OEBPS/Images/image_6.png");
}

#[test]
fn test_unify_image_names_across_directories() {
    let mut entries = common::sample_entries();
    entries[8].0 = "OEBPS/Art/cover.png";
    let opf = common::SAMPLE_OPF.replace("Images/cover.png", "Art/cover.png");
    entries[1].1 = opf.into_bytes();
    entries[5].1 = common::xhtml("Chapter B", r#"<img src="../Art/cover.png"/>"#).into_bytes();
    let mut archive =
        Archive::from_bytes(&common::build_epub(&entries), ArchiveOptions::default()).unwrap();

    let renamed = unify_image_names(&mut archive).unwrap();
    assert_eq!(renamed[0].1, "OEBPS/Art/image_1.png");
    assert_eq!(
        common::reference_values(&archive, B, "img"),
        ["../Art/image_1.png"]
    );
}

#[test]
fn test_add_missing_extensions() {
    let mut entries = common::sample_entries();
    entries.push(("OEBPS/Images/figure", common::gif_bytes()));
    entries.push(("OEBPS/Images/mystery", b"not an image".to_vec()));
    let opf = common::SAMPLE_OPF.replace(
        "  </manifest>",
        r#"    <item id="figure" href="Images/figure" media-type="image/gif"/>
    <item id="mystery" href="Images/mystery" media-type="image/png"/>
  </manifest>"#,
    );
    entries[1].1 = opf.into_bytes();
    entries[6].1 = common::xhtml("Chapter C", r#"<img src="../Images/figure"/>"#).into_bytes();
    let mut archive =
        Archive::from_bytes(&common::build_epub(&entries), ArchiveOptions::default()).unwrap();

    let renamed = add_missing_extensions(&mut archive).unwrap();
    assert_eq!(
        renamed,
        [(
            "OEBPS/Images/figure".to_string(),
            "OEBPS/Images/figure.gif".to_string()
        )]
    );
    assert_eq!(
        common::reference_values(&archive, C, "img"),
        ["../Images/figure.gif"]
    );
    assert!(archive.contains("OEBPS/Images/mystery"));
    assert_eq!(path::extension("OEBPS/Images/figure.gif"), "gif");
    assert!(add_missing_extensions(&mut archive).unwrap().is_empty());
}

#[test]
fn test_unify_ids_with_saturated_suffix() {
    let mut entries = common::sample_entries();
    entries[6].1 = common::xhtml(
        "Chapter C",
        r#"<p id="u-note-18446744073709551615">far</p><a href="ChapterB.xhtml#note-1">B</a>"#,
    )
    .into_bytes();
    let mut archive =
        Archive::from_bytes(&common::build_epub(&entries), ArchiveOptions::default()).unwrap();

    let rewrites = unify_ids(&mut archive).unwrap();
    assert_eq!(rewrites.len(), 1);
    assert_eq!(rewrites[0].new_id, "u-note-1");
    assert!(archive.section(C).unwrap().has_id("u-note-18446744073709551615"));
    assert!(duplicate_ids(&archive).is_empty());
}

fn insert_png(archive: &mut Archive, path: &str) {
    archive.insert(
        path,
        Document::Image(epublink::epub::asset::ImageAsset::from_bytes(
            path,
            common::png_bytes(1, 1),
        )),
    );
}

#[test]
fn test_unify_image_names_with_saturated_suffix() {
    let mut archive = common::sample_archive();
    insert_png(&mut archive, "OEBPS/Images/image_18446744073709551615.png");
    let renamed = unify_image_names(&mut archive).unwrap();
    assert_eq!(renamed.len(), 1);
    assert_eq!(renamed[0].1, "OEBPS/Images/image_1.png");
}

#[test]
fn test_unify_image_names_counts_suffixes_ignoring_case() {
    let mut archive = common::sample_archive();
    insert_png(&mut archive, "OEBPS/Images/Image_5.png");
    let renamed = unify_image_names(&mut archive).unwrap();
    assert_eq!(renamed[0].1, "OEBPS/Images/image_6.png");
}

mod common;

use epublink::epub::navigation::flatten;
use epublink::manipulate::check_references;
use epublink::{Archive, ArchiveOptions, EpubError};

fn without(name: &str) -> Vec<(&'static str, Vec<u8>)> {
    common::sample_entries()
        .into_iter()
        .filter(|(entry, _)| *entry != name)
        .collect()
}

#[test]
fn test_missing_manifest_file_fails_fast() {
    let bytes = common::build_epub(&without("OEBPS/Text/ChapterB.xhtml"));
    let err = Archive::from_bytes(&bytes, ArchiveOptions::default()).unwrap_err();
    match err {
        EpubError::DanglingReference { from, reference } => {
            assert_eq!(from, "OEBPS/content.opf");
            assert_eq!(reference, "Text/ChapterB.xhtml");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_manifest_file_dropped_when_tolerant() {
    let bytes = common::build_epub(&without("OEBPS/Text/ChapterB.xhtml"));
    let archive = Archive::from_bytes(&bytes, ArchiveOptions::tolerant()).unwrap();

    assert!(!archive.contains("OEBPS/Text/ChapterB.xhtml"));
    let package = archive.package().unwrap();
    assert!(!package.has_manifest_id("chapter-b"));
    let spine: Vec<String> = package.spine_items().into_iter().map(|s| s.idref).collect();
    assert_eq!(spine, ["chapter-a", "chapter-c"]);

    let nav = archive.navigation().unwrap();
    let points = nav.nav_points();
    let ids: Vec<&str> = flatten(&points).into_iter().map(|p| p.id.as_str()).collect();
    assert!(!ids.contains(&"np-b"));
    assert!(!ids.contains(&"np-b-note"));
    assert!(ids.contains(&"np-a") && ids.contains(&"np-c"));

    assert!(check_references(&archive)
        .iter()
        .all(|b| !b.from.ends_with(".opf") && !b.from.ends_with(".ncx")));
}

#[test]
fn test_dangling_navigation_src_fails_fast() {
    let mut entries = common::sample_entries();
    entries[2].1 = common::SAMPLE_NCX
        .replace("Text/ChapterC.xhtml", "Text/Gone.xhtml")
        .into_bytes();
    let bytes = common::build_epub(&entries);

    let err = Archive::from_bytes(&bytes, ArchiveOptions::default()).unwrap_err();
    assert!(
        matches!(&err, EpubError::DanglingReference { reference, .. } if reference == "Text/Gone.xhtml"),
        "{err}"
    );

    let archive = Archive::from_bytes(&bytes, ArchiveOptions::tolerant()).unwrap();
    let srcs = archive.navigation().unwrap().srcs();
    assert!(!srcs.iter().any(|s| s.contains("Gone")));
    assert_eq!(srcs.len(), 3);
}

#[test]
fn test_missing_container_is_reported() {
    let bytes = common::build_epub(&without("META-INF/container.xml"));
    let err = Archive::from_bytes(&bytes, ArchiveOptions::tolerant()).unwrap_err();
    assert!(matches!(err, EpubError::MissingRequiredDocument("container")));
}

#[test]
fn test_missing_package_is_reported() {
    let bytes = common::build_epub(&without("OEBPS/content.opf"));
    let err = Archive::from_bytes(&bytes, ArchiveOptions::tolerant()).unwrap_err();
    assert!(matches!(err, EpubError::MissingRequiredDocument("package")));
}

#[test]
fn test_wrong_mimetype_is_rejected() {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(
        "mimetype",
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored),
    )
    .unwrap();
    zip.write_all(b"application/zip").unwrap();
    for (name, data) in common::sample_entries() {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&data).unwrap();
    }
    let bytes = zip.finish().unwrap().into_inner();

    let err = Archive::from_bytes(&bytes, ArchiveOptions::default()).unwrap_err();
    assert!(matches!(err, EpubError::InvalidEpub(_)), "{err}");
}

#[test]
fn test_not_a_zip() {
    let err = Archive::from_bytes(b"plain text", ArchiveOptions::default()).unwrap_err();
    assert!(matches!(err, EpubError::Zip(_)));
}

#[test]
fn test_check_references_clean_sample() {
    let archive = common::sample_archive();
    assert!(check_references(&archive).is_empty());
}

#[test]
fn test_check_references_reports_broken_links() {
    let mut entries = common::sample_entries();
    entries[4].1 = common::xhtml(
        "Chapter A",
        r##"<p><img src="../Images/missing.jpg"/><a href="#local">here</a><a href="http://example.com/x.html">web</a></p>"##,
    )
    .into_bytes();
    let archive =
        Archive::from_bytes(&common::build_epub(&entries), ArchiveOptions::default()).unwrap();

    let broken = check_references(&archive);
    assert_eq!(broken.len(), 1, "{broken:?}");
    assert_eq!(broken[0].from, "OEBPS/Text/ChapterA.xhtml");
    assert_eq!(broken[0].reference, "../Images/missing.jpg");
    assert_eq!(broken[0].target, "OEBPS/Images/missing.jpg");
}

#[test]
fn test_check_references_reports_unknown_spine_idref() {
    let mut entries = common::sample_entries();
    entries[1].1 = common::SAMPLE_OPF
        .replace(
            r#"<itemref idref="chapter-b"/>"#,
            r#"<itemref idref="chapter-b"/><itemref idref="ghost"/>"#,
        )
        .into_bytes();
    let archive =
        Archive::from_bytes(&common::build_epub(&entries), ArchiveOptions::default()).unwrap();

    let broken = check_references(&archive);
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].reference, "ghost");
    assert!(broken[0].target.is_empty());
}

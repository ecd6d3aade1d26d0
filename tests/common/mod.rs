#![allow(dead_code)]

use epublink::{Archive, ArchiveOptions};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const SAMPLE_OPF: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>Sample Book</dc:title>
    <dc:creator opf:role="aut">Ann Author</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="BookId">urn:uuid:12345678-1234-1234-1234-123456789abc</dc:identifier>
    <meta name="cover" content="cover-upper"/>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="css" href="Styles/style.css" media-type="text/css"/>
    <item id="chapter-a" href="Text/ChapterA.xhtml" media-type="application/xhtml+xml"/>
    <item id="chapter-b" href="Text/ChapterB.xhtml" media-type="application/xhtml+xml"/>
    <item id="chapter-c" href="Text/ChapterC.xhtml" media-type="application/xhtml+xml"/>
    <item id="cover-upper" href="Images/Cover.PNG" media-type="image/png"/>
    <item id="cover-lower" href="Images/cover.png" media-type="image/png"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="chapter-a"/>
    <itemref idref="chapter-b"/>
    <itemref idref="chapter-c" linear="no"/>
  </spine>
</package>"#;

pub const SAMPLE_NCX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head/>
  <docTitle><text>Sample Book</text></docTitle>
  <navMap>
    <navPoint id="np-a" playOrder="1">
      <navLabel><text>Chapter A</text></navLabel>
      <content src="Text/ChapterA.xhtml"/>
    </navPoint>
    <navPoint id="np-b" playOrder="2">
      <navLabel><text>Chapter B</text></navLabel>
      <content src="Text/ChapterB.xhtml"/>
      <navPoint id="np-b-note" playOrder="3">
        <navLabel><text>Note in B</text></navLabel>
        <content src="Text/ChapterB.xhtml#note-1"/>
      </navPoint>
    </navPoint>
    <navPoint id="np-c" playOrder="4">
      <navLabel><text>Chapter C</text></navLabel>
      <content src="Text/ChapterC.xhtml"/>
    </navPoint>
  </navMap>
</ncx>"#;

/// A complete XHTML document around `body`.
pub fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="../Styles/style.css"/>
</head>
<body>
{body}
</body>
</html>"#
    )
}

pub fn chapter_a() -> String {
    xhtml(
        "Chapter A",
        r#"<h1>Chapter A</h1>
<p>See note <a id="note-1" href="ChapterC.xhtml#back-a">1</a>.</p>
<p><img src="../Images/Cover.PNG" alt="cover"/></p>"#,
    )
}

pub fn chapter_b() -> String {
    xhtml(
        "Chapter B",
        r##"<h1 id="title-b">Chapter B</h1>
<p>Jump to <a id="note-1" href="#note-1">the note</a>.</p>
<p><img src="../Images/cover.png" alt="small cover"/></p>"##,
    )
}

pub fn chapter_c() -> String {
    xhtml(
        "Chapter C",
        r#"<p id="back-a">Back to <a href="ChapterA.xhtml#note-1">A</a> and <a href="ChapterB.xhtml#note-1">B</a>.</p>
<p><a href="https://example.com/notes#note-1">elsewhere</a></p>"#,
    )
}

/// Bytes of a solid PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Bytes of a solid GIF.
pub fn gif_bytes() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbaImage::new(2, 2)
        .write_to(&mut out, image::ImageFormat::Gif)
        .expect("encode gif");
    out.into_inner()
}

/// Zip `entries` into an EPUB: stored `mimetype` first, the rest deflated,
/// in the order given.
pub fn build_epub(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    zip.start_file("mimetype", stored).expect("start mimetype");
    zip.write_all(b"application/epub+zip").expect("write mimetype");
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(data).expect("write entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

/// Entries of the sample book, so tests can drop or replace some.
pub fn sample_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("META-INF/container.xml", CONTAINER_XML.as_bytes().to_vec()),
        ("OEBPS/content.opf", SAMPLE_OPF.as_bytes().to_vec()),
        ("OEBPS/toc.ncx", SAMPLE_NCX.as_bytes().to_vec()),
        ("OEBPS/Styles/style.css", b"body { margin: 0 }".to_vec()),
        ("OEBPS/Text/ChapterA.xhtml", chapter_a().into_bytes()),
        ("OEBPS/Text/ChapterB.xhtml", chapter_b().into_bytes()),
        ("OEBPS/Text/ChapterC.xhtml", chapter_c().into_bytes()),
        ("OEBPS/Images/Cover.PNG", png_bytes(4, 6)),
        ("OEBPS/Images/cover.png", png_bytes(2, 3)),
    ]
}

/// Three chapters sharing `note-1`, two images whose names differ only in
/// case, an NCX and a stylesheet.
pub fn sample_epub() -> Vec<u8> {
    build_epub(&sample_entries())
}

pub fn sample_archive() -> Archive {
    Archive::from_bytes(&sample_epub(), ArchiveOptions::default()).expect("open sample epub")
}

/// Write `bytes` to a file in a fresh temp directory. The TempDir must be
/// kept alive.
pub fn write_temp(bytes: &[u8], name: &str) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::TempDir::new().expect("create temp dir");
    let path = tmp.path().join(name);
    std::fs::write(&path, bytes).expect("write epub");
    (tmp, path)
}

/// `src`/`href` values of `element` in the section at `path`.
pub fn reference_values(archive: &Archive, path: &str, element: &str) -> Vec<String> {
    archive
        .section(path)
        .expect("section")
        .references()
        .into_iter()
        .filter(|r| r.element == element)
        .map(|r| r.value)
        .collect()
}

/// Check the structural rules every written EPUB must follow.
pub fn assert_valid_epub(bytes: &[u8]) {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let first = zip.by_index(0).expect("first entry");
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), zip::CompressionMethod::Stored);
    drop(first);
    assert!(zip.by_name("META-INF/container.xml").is_ok());
}

use crate::epub::path;
use crate::epub::xml::{Element, Style, XmlDocument};
use crate::epub::{EpubMetadata, EpubVersion, ManifestItem, Series, SpineItem};
use crate::error::{EpubError, Result};

const SKELETON: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf" xmlns:calibre="http://calibre.kovidgoyal.net/2009/metadata" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:dcterms="http://purl.org/dc/terms/"/>
  <manifest/>
  <spine toc="ncx"/>
</package>"#;

/// The package document: metadata, manifest and spine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDocument {
    path: String,
    dom: XmlDocument,
}

impl PackageDocument {
    /// Package element with empty metadata, manifest and spine.
    pub fn create_default(path: impl Into<String>) -> Result<Self> {
        Self::parse(path, SKELETON)
    }

    pub fn parse(path: impl Into<String>, xml: &str) -> Result<Self> {
        let path = path.into();
        let dom = XmlDocument::parse(xml.trim_start_matches('\u{feff}').trim(), &path)?;
        if !dom.root.is("package") {
            return Err(EpubError::InvalidEpub(format!(
                "{path}: root element is <{}>, expected <package>",
                dom.root.name
            )));
        }
        Ok(Self { path, dom })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn version(&self) -> EpubVersion {
        EpubVersion::from_package_version(self.dom.root.attr("version").unwrap_or_default())
    }

    /// Id of the `dc:identifier` named by `package@unique-identifier`.
    pub fn unique_identifier(&self) -> Option<&str> {
        self.dom.root.attr("unique-identifier")
    }

    pub fn set_unique_identifier(&mut self, id: &str) {
        self.dom.root.set_attr("unique-identifier", id);
    }

    fn section(&self, local: &str) -> Option<&Element> {
        self.dom.root.child(local)
    }

    fn section_mut(&mut self, local: &str) -> &mut Element {
        self.dom.root.child_or_insert(local, || Element::new(local))
    }

    // -- manifest --

    pub fn manifest_items(&self) -> Vec<ManifestItem> {
        self.section("manifest")
            .into_iter()
            .flat_map(|m| m.children_named("item"))
            .filter_map(manifest_item_from)
            .collect()
    }

    pub fn manifest_item_by_id(&self, id: &str) -> Option<ManifestItem> {
        self.manifest_items().into_iter().find(|item| item.id == id)
    }

    pub fn has_manifest_id(&self, id: &str) -> bool {
        self.manifest_item_by_id(id).is_some()
    }

    /// Archive path a manifest href addresses.
    pub fn resolve_href(&self, href: &str) -> String {
        path::resolve(href, &self.path).path
    }

    /// Manifest items whose href resolves to `target`.
    pub fn manifest_items_by_path(&self, target: &str) -> Vec<ManifestItem> {
        self.manifest_items()
            .into_iter()
            .filter(|item| self.resolve_href(&item.href) == target)
            .collect()
    }

    /// Register an item. `href` is written as given, so it must already be
    /// relative to this document and percent-encoded.
    pub fn append_to_manifest(&mut self, id: &str, href: &str, media_type: &str) {
        self.section_mut("manifest").push(
            Element::new("item")
                .with_attr("id", id)
                .with_attr("href", href)
                .with_attr("media-type", media_type),
        );
    }

    pub fn remove_manifest_item(&mut self, id: &str) -> bool {
        let manifest = self.section_mut("manifest");
        let before = manifest.children.len();
        manifest.retain_descendants(&mut |el| !(el.is("item") && el.id() == Some(id)));
        manifest.children.len() != before
    }

    pub fn set_manifest_href(&mut self, id: &str, href: &str) -> bool {
        let mut found = false;
        self.section_mut("manifest").walk_mut(&mut |el| {
            if el.is("item") && el.id() == Some(id) {
                el.set_attr("href", href);
                found = true;
            }
        });
        found
    }

    /// Offer every manifest href to `rewrite`; a returned value replaces it.
    pub fn rewrite_manifest_hrefs<F>(&mut self, mut rewrite: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut count = 0;
        self.section_mut("manifest").walk_mut(&mut |el| {
            if !el.is("item") {
                return;
            }
            if let Some(href) = el.attr("href")
                && let Some(new_href) = rewrite(href)
                && new_href != href
            {
                el.set_attr("href", new_href);
                count += 1;
            }
        });
        count
    }

    /// Change a manifest id and every place keyed by it: spine itemrefs,
    /// `spine@toc` and the `cover` meta.
    pub fn rename_manifest_id(&mut self, old_id: &str, new_id: &str) -> bool {
        if old_id == new_id || !self.has_manifest_id(old_id) {
            return false;
        }
        self.dom.root.walk_mut(&mut |el| {
            let attr = match el.local_name() {
                "item" if el.id() == Some(old_id) => "id",
                "itemref" if el.attr("idref") == Some(old_id) => "idref",
                "spine" if el.attr("toc") == Some(old_id) => "toc",
                "meta" if el.attr("name") == Some("cover") && el.attr("content") == Some(old_id) => {
                    "content"
                }
                _ => return,
            };
            el.set_attr(attr, new_id);
        });
        true
    }

    // -- spine --

    pub fn spine_items(&self) -> Vec<SpineItem> {
        self.section("spine")
            .into_iter()
            .flat_map(|s| s.children_named("itemref"))
            .filter_map(|el| {
                Some(SpineItem {
                    idref: el.attr("idref")?.to_string(),
                    linear: el.attr("linear").map(|v| v.trim() != "no"),
                })
            })
            .collect()
    }

    pub fn append_to_spine(&mut self, idref: &str, linear: Option<bool>) {
        let mut itemref = Element::new("itemref").with_attr("idref", idref);
        if let Some(linear) = linear {
            itemref.set_attr("linear", if linear { "yes" } else { "no" });
        }
        self.section_mut("spine").push(itemref);
    }

    pub fn remove_from_spine(&mut self, idref: &str) -> usize {
        let spine = self.section_mut("spine");
        let before = spine.children.len();
        spine.retain_descendants(&mut |el| !(el.is("itemref") && el.attr("idref") == Some(idref)));
        before - spine.children.len()
    }

    /// Manifest id of the NCX named by `spine@toc`.
    pub fn spine_toc(&self) -> Option<&str> {
        self.section("spine")?.attr("toc")
    }

    // -- metadata --

    fn metadata_elements(&self) -> impl Iterator<Item = &Element> {
        self.section("metadata")
            .into_iter()
            .flat_map(|m| m.descendants())
    }

    /// Dublin Core elements named `name` (`title`, `creator`, ...).
    pub fn dublin_core_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.metadata_elements().filter(move |el| el.is(name))
    }

    /// Trimmed values of every Dublin Core element named `name`.
    pub fn dublin_core(&self, name: &str) -> Vec<String> {
        self.dublin_core_elements(name)
            .map(|el| el.text().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Append `<dc:{name}>` with the given attributes.
    pub fn append_dublin_core(&mut self, name: &str, value: &str, attributes: &[(&str, &str)]) {
        let mut el = Element::new(format!("dc:{name}")).with_text(value);
        for (key, val) in attributes {
            el.set_attr(*key, *val);
        }
        self.section_mut("metadata").push(el);
    }

    /// `content` of the first `<meta name="...">`.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.metadata_elements()
            .find(|el| el.is("meta") && el.attr("name") == Some(name))
            .and_then(|el| el.attr("content"))
            .map(|c| c.to_string())
    }

    /// `content` of every `<meta name="...">`, in document order.
    pub fn meta_contents(&self, name: &str) -> Vec<String> {
        self.metadata_elements()
            .filter(|el| el.is("meta") && el.attr("name") == Some(name))
            .filter_map(|el| el.attr("content"))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn append_meta(&mut self, name: &str, content: &str) {
        self.section_mut("metadata").push(
            Element::new("meta")
                .with_attr("name", name)
                .with_attr("content", content),
        );
    }

    /// Update the first `<meta name>` or append one.
    pub fn set_meta(&mut self, name: &str, content: &str) {
        let mut found = false;
        self.section_mut("metadata").walk_mut(&mut |el| {
            if !found && el.is("meta") && el.attr("name") == Some(name) {
                el.set_attr("content", content);
                found = true;
            }
        });
        if !found {
            self.append_meta(name, content);
        }
    }

    /// Snapshot of the descriptive metadata.
    pub fn description(&self) -> EpubMetadata {
        let title = self
            .dublin_core("title")
            .into_iter()
            .next()
            .or_else(|| self.non_empty_meta("calibre:title_sort"))
            .or_else(|| self.non_empty_meta("FB2.publish-info.book-name"))
            .map(|t| t.trim().to_string());

        let creators: Vec<&Element> = self.dublin_core_elements("creator").collect();
        let mut authors: Vec<String> = creators
            .iter()
            .filter(|el| el.attr("opf:role") == Some("aut"))
            .map(|el| el.text().trim().to_string())
            .collect();
        if authors.is_empty() {
            authors = creators
                .iter()
                .filter(|el| el.attr("opf:role").is_none_or(|r| r != "trl"))
                .map(|el| el.text().trim().to_string())
                .collect();
        }

        let mut translators: Vec<String> = Vec::new();
        let named = self
            .dublin_core_elements("contributor")
            .chain(creators.iter().copied())
            .filter(|el| el.attr("opf:role") == Some("trl"))
            .map(|el| el.text().trim().to_string());
        let from_meta = ["FB2.book-info.translator", "FB2.title-info.translator"]
            .into_iter()
            .flat_map(|name| self.meta_contents(name))
            .map(|t| t.trim().to_string());
        for translator in named.chain(from_meta) {
            if !translator.is_empty() && !translators.contains(&translator) {
                translators.push(translator);
            }
        }

        let isbn = self.dublin_core_elements("identifier").find_map(|el| {
            let text = el.text();
            let by_scheme = el
                .attr("opf:scheme")
                .is_some_and(|s| s.eq_ignore_ascii_case("isbn"));
            if by_scheme {
                return Some(text.trim().to_string());
            }
            (el.id() == Some("pub-identifier"))
                .then(|| isbn_from(&text))
                .flatten()
        });

        let cover_id = self.meta_content("cover");
        let cover_path = cover_id
            .as_deref()
            .and_then(|id| self.manifest_item_by_id(id))
            .map(|item| self.resolve_href(&item.href));

        EpubMetadata {
            title,
            authors,
            translators,
            language: self
                .dublin_core("language")
                .into_iter()
                .next()
                .map(|l| l.to_lowercase()),
            publisher: self.dublin_core("publisher").into_iter().next(),
            description: self.dublin_core("description").into_iter().next(),
            subjects: self.dublin_core("subject"),
            identifiers: self.dublin_core("identifier"),
            isbn,
            rights: self.dublin_core("rights").into_iter().next(),
            rights_holder: self.dublin_core("rightsholder").into_iter().next(),
            publish_city: self
                .non_empty_meta("FB2.publish-info.city")
                .map(|c| c.trim().to_string()),
            publish_year: self.publish_year(),
            created_year: self
                .dublin_core("created")
                .into_iter()
                .next()
                .and_then(|d| leading_year(&d)),
            cover_id,
            cover_path,
            series: self.series(),
            version: self.version(),
        }
    }

    fn non_empty_meta(&self, name: &str) -> Option<String> {
        self.meta_content(name).filter(|c| !c.trim().is_empty())
    }

    /// Year of publication. The FB2 publish-info year wins, then the last
    /// `original-publication` date, then the last date carrying any other
    /// event except `modification`.
    fn publish_year(&self) -> Option<i32> {
        self.non_empty_meta("FB2.publish-info.year")
            .or_else(|| self.last_date(|event| event == "original-publication"))
            .or_else(|| self.last_date(|event| event != "modification"))
            .and_then(|year| leading_year(&year))
    }

    /// Last non-empty `dc:date` whose `opf:event` satisfies `accept`.
    fn last_date(&self, accept: impl Fn(&str) -> bool) -> Option<String> {
        self.dublin_core_elements("date")
            .filter(|el| el.attr("opf:event").is_some_and(&accept))
            .map(|el| el.text().trim().to_string())
            .filter(|d| !d.is_empty())
            .last()
    }

    /// Calibre series metas, each paired with the `series_index` that
    /// follows it before the next series, then FB2 sequences.
    fn series(&self) -> Vec<Series> {
        let mut series: Vec<Series> = Vec::new();
        for el in self.metadata_elements().filter(|el| el.is("meta")) {
            match (el.attr("name"), el.attr("content")) {
                (Some("calibre:series"), Some(name)) => series.push(Series {
                    name: name.trim().to_string(),
                    number: None,
                }),
                (Some("calibre:series_index"), Some(number)) => {
                    let number = number.trim();
                    if let Some(last) = series.last_mut()
                        && !number.is_empty()
                    {
                        last.number = Some(number.to_string());
                    }
                }
                _ => {}
            }
        }
        for content in self.meta_contents("FB2.book-info.sequence") {
            series.extend(fb2_sequence(&content));
        }
        series
    }

    pub fn to_xml(&self) -> String {
        self.dom.to_xml(Style::Pretty)
    }
}

fn manifest_item_from(el: &Element) -> Option<ManifestItem> {
    Some(ManifestItem {
        id: el.id()?.to_string(),
        href: el.attr("href")?.to_string(),
        media_type: el.attr("media-type").unwrap_or_default().to_string(),
        properties: el.attr("properties").map(|p| p.to_string()),
    })
}

/// Leading year of a date such as `2010-04-07` or `1988`.
fn leading_year(date: &str) -> Option<i32> {
    let digits: String = date
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// `Name; number=5` as written by FB2 converters.
fn fb2_sequence(content: &str) -> Option<Series> {
    let lower = content.to_ascii_lowercase();
    let marker = lower.rfind("number=")?;
    let digits: String = content[marker + "number=".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let number: u64 = digits.parse().ok()?;
    let (name, _) = content[..marker].rsplit_once(';')?;
    let name = name.trim();
    (!name.is_empty()).then(|| Series {
        name: name.to_string(),
        number: Some(number.to_string()),
    })
}

/// Digits and dashes following an `isbn:` marker.
fn isbn_from(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = lower.find("isbn:")? + "isbn:".len();
    let isbn: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    Some(isbn)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package version="2.0" unique-identifier="BookId" xmlns="http://www.idpf.org/2007/opf">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf" xmlns:calibre="http://calibre.kovidgoyal.net/2009/metadata">
    <dc:title> Test Book </dc:title>
    <dc:creator opf:role="aut">Author One</dc:creator>
    <dc:creator opf:role="trl">Translator One</dc:creator>
    <dc:contributor opf:role="trl">Translator Two</dc:contributor>
    <dc:language>RU</dc:language>
    <dc:identifier id="BookId">urn:uuid:0000</dc:identifier>
    <dc:identifier id="pub-identifier">isbn:978-5-699-12014-7</dc:identifier>
    <dc:subject>fiction</dc:subject>
    <dc:subject>classic</dc:subject>
    <meta name="cover" content="cover.jpg"/>
    <meta name="calibre:series" content="Saga"/>
    <meta name="calibre:series_index" content="2"/>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="Section0001.xhtml" href="Text/Section0001.xhtml" media-type="application/xhtml+xml"/>
    <item id="Section0002.xhtml" href="Text/Section0002.xhtml" media-type="application/xhtml+xml"/>
    <item id="cover.jpg" href="Images/cover%20art.jpg" media-type="image/jpeg"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="Section0001.xhtml"/>
    <itemref idref="Section0002.xhtml" linear="no"/>
  </spine>
</package>"#;

    fn package() -> PackageDocument {
        PackageDocument::parse("OEBPS/content.opf", OPF).unwrap()
    }

    #[test]
    fn manifest_and_spine() {
        let opf = package();
        let items = opf.manifest_items();
        assert_eq!(items.len(), 4);
        assert_eq!(items[1].href, "Text/Section0001.xhtml");
        assert_eq!(items[3].media_type, "image/jpeg");

        let spine = opf.spine_items();
        assert_eq!(spine.len(), 2);
        assert_eq!(spine[0].linear, None);
        assert_eq!(spine[1].linear, Some(false));
        assert_eq!(opf.spine_toc(), Some("ncx"));
        assert_eq!(opf.version(), EpubVersion::V2);
    }

    #[test]
    fn hrefs_resolve_against_package_path() {
        let opf = package();
        assert_eq!(opf.resolve_href("Images/cover%20art.jpg"), "OEBPS/Images/cover art.jpg");
        let items = opf.manifest_items_by_path("OEBPS/Images/cover art.jpg");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "cover.jpg");
    }

    #[test]
    fn description_fields() {
        let meta = package().description();
        assert_eq!(meta.title.as_deref(), Some("Test Book"));
        assert_eq!(meta.authors, ["Author One"]);
        assert_eq!(meta.translators, ["Translator Two", "Translator One"]);
        assert_eq!(meta.language.as_deref(), Some("ru"));
        assert_eq!(meta.isbn.as_deref(), Some("978-5-699-12014-7"));
        assert_eq!(meta.subjects, ["fiction", "classic"]);
        assert_eq!(meta.cover_id.as_deref(), Some("cover.jpg"));
        assert_eq!(meta.cover_path.as_deref(), Some("OEBPS/Images/cover art.jpg"));
        assert_eq!(
            meta.series,
            [Series {
                name: "Saga".into(),
                number: Some("2".into())
            }]
        );
    }

    #[test]
    fn authors_fall_back_to_all_creators() {
        let mut opf = PackageDocument::create_default("OEBPS/content.opf").unwrap();
        opf.append_dublin_core("creator", "Plain Author", &[]);
        assert_eq!(opf.description().authors, ["Plain Author"]);
    }

    #[test]
    fn title_falls_back_to_title_sort() {
        let mut opf = PackageDocument::create_default("OEBPS/content.opf").unwrap();
        opf.append_meta("calibre:title_sort", "Sorted Title");
        assert_eq!(opf.description().title.as_deref(), Some("Sorted Title"));
    }

    #[test]
    fn default_package_shape() {
        let mut opf = PackageDocument::create_default("OEBPS/content.opf").unwrap();
        opf.append_to_manifest("ncx", "toc.ncx", "application/x-dtbncx+xml");
        opf.append_to_spine("s1", Some(false));
        insta::assert_snapshot!(opf.to_xml(), @r#"
        <?xml version="1.0" encoding="utf-8"?>
        <package xmlns="http://www.idpf.org/2007/opf" version="2.0">
          <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf" xmlns:calibre="http://calibre.kovidgoyal.net/2009/metadata" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:dcterms="http://purl.org/dc/terms/"/>
          <manifest>
            <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
          </manifest>
          <spine toc="ncx">
            <itemref idref="s1" linear="no"/>
          </spine>
        </package>
        "#);
    }

    #[test]
    fn rename_manifest_id_follows_references() {
        let mut opf = package();
        assert!(opf.rename_manifest_id("cover.jpg", "cover-image"));
        assert!(opf.rename_manifest_id("Section0002.xhtml", "chapter-2"));
        assert_eq!(opf.meta_content("cover").as_deref(), Some("cover-image"));
        assert_eq!(opf.spine_items()[1].idref, "chapter-2");
        assert!(!opf.rename_manifest_id("missing", "x"));
    }

    #[test]
    fn remove_item_and_spine_ref() {
        let mut opf = package();
        assert!(opf.remove_manifest_item("Section0002.xhtml"));
        assert_eq!(opf.remove_from_spine("Section0002.xhtml"), 1);
        assert_eq!(opf.manifest_items().len(), 3);
        assert_eq!(opf.spine_items().len(), 1);
        assert!(!opf.remove_manifest_item("Section0002.xhtml"));
    }

    #[test]
    fn rewrite_hrefs() {
        let mut opf = package();
        let changed = opf.rewrite_manifest_hrefs(|href| {
            (href == "Images/cover%20art.jpg").then(|| "Images/image_1.jpg".to_string())
        });
        assert_eq!(changed, 1);
        assert_eq!(opf.manifest_item_by_id("cover.jpg").unwrap().href, "Images/image_1.jpg");
        assert!(opf.set_manifest_href("ncx", "nav/toc.ncx"));
        assert!(!opf.set_manifest_href("nope", "x"));
    }

    #[test]
    fn set_meta_updates_in_place() {
        let mut opf = package();
        opf.set_meta("cover", "other");
        opf.set_meta("generator", "epublink");
        assert_eq!(opf.meta_content("cover").as_deref(), Some("other"));
        assert_eq!(opf.meta_content("generator").as_deref(), Some("epublink"));
    }

    #[test]
    fn rejects_non_package_root() {
        assert!(PackageDocument::parse("content.opf", "<container/>").is_err());
    }

    fn metadata_only(metadata: &str) -> PackageDocument {
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<package version="2.0" unique-identifier="bookid" xmlns="http://www.idpf.org/2007/opf" xmlns:opf="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <metadata>
{metadata}
  </metadata>
</package>"#
        );
        PackageDocument::parse("OEBPS/content.opf", &xml).unwrap()
    }

    #[test]
    fn fb2_publish_info() {
        let meta = metadata_only(
            r#"<dc:creator>Ivan Writer</dc:creator>
    <dc:publisher>State Press</dc:publisher>
    <meta content="Short Stories" name="FB2.publish-info.book-name"/>
    <meta content="Moscow" name="FB2.publish-info.city"/>
    <meta content="1988" name="FB2.publish-info.year"/>
    <dc:date>1990</dc:date>"#,
        )
        .description();
        assert_eq!(meta.title.as_deref(), Some("Short Stories"));
        assert_eq!(meta.publish_city.as_deref(), Some("Moscow"));
        assert_eq!(meta.publish_year, Some(1988));
        assert_eq!(meta.created_year, None);
        assert_eq!(meta.rights_holder, None);
    }

    #[test]
    fn publish_year_from_dates() {
        let original = metadata_only(
            r#"<dc:date opf:event="original-publication">2010-04-07</dc:date>"#,
        );
        assert_eq!(original.description().publish_year, Some(2010));

        let events = metadata_only(
            r#"<dc:date opf:event="original-publication">1788</dc:date>
    <dc:date opf:event="modification">2018-04-08</dc:date>"#,
        );
        assert_eq!(events.description().publish_year, Some(1788));

        let other = metadata_only(
            r#"<dc:date opf:event="publication">2003</dc:date>
    <dc:date opf:event="modification">2018-04-08</dc:date>"#,
        );
        assert_eq!(other.description().publish_year, Some(2003));

        // Dates without an event and modification dates do not count.
        let none = metadata_only(
            r#"<dc:date>0101-01-01T00:00:00+00:00</dc:date>
    <dc:date opf:event="modification">2018-04-06</dc:date>"#,
        );
        assert_eq!(none.description().publish_year, None);
    }

    #[test]
    fn rights_holder_and_created() {
        let meta = metadata_only(
            r#"<dc:rights>Copyright 2017</dc:rights>
    <dc:rightsholder>rightsholder</dc:rightsholder>
    <dc:created>2001</dc:created>"#,
        )
        .description();
        assert_eq!(meta.rights.as_deref(), Some("Copyright 2017"));
        assert_eq!(meta.rights_holder.as_deref(), Some("rightsholder"));
        assert_eq!(meta.created_year, Some(2001));
    }

    #[test]
    fn translators_include_fb2_metas_once() {
        let meta = metadata_only(
            r#"<meta content="Translator1" name="FB2.book-info.translator"/>
    <meta content="Translator2" name="FB2.book-info.translator"/>
    <meta content="Translator1" name="FB2.title-info.translator"/>
    <dc:contributor opf:role="trl">Translator0</dc:contributor>
    <dc:contributor opf:role="adp">Adapter</dc:contributor>"#,
        )
        .description();
        assert_eq!(meta.translators, ["Translator0", "Translator1", "Translator2"]);
    }

    fn series(name: &str, number: Option<&str>) -> Series {
        Series {
            name: name.to_string(),
            number: number.map(str::to_string),
        }
    }

    #[test]
    fn several_calibre_series() {
        let meta = metadata_only(
            r#"<meta name="cover" content="cover.jpg"/>
    <meta content="First Cycle" name="calibre:series"/>
    <meta content="2" name="calibre:series_index"/>
    <meta content="Second Cycle" name="calibre:series"/>
    <meta content="3" name="calibre:series_index"/>"#,
        )
        .description();
        assert_eq!(
            meta.series,
            [series("First Cycle", Some("2")), series("Second Cycle", Some("3"))]
        );
    }

    #[test]
    fn series_index_belongs_to_preceding_series() {
        let meta = metadata_only(
            r#"<meta content="First Cycle" name="calibre:series"/>
    <meta content="Second Cycle" name="calibre:series"/>
    <meta content="3" name="calibre:series_index"/>"#,
        )
        .description();
        assert_eq!(
            meta.series,
            [series("First Cycle", None), series("Second Cycle", Some("3"))]
        );
    }

    #[test]
    fn fb2_sequence_meta() {
        let meta = metadata_only(
            r#"<meta content="Sea Breeze; number=5" name="FB2.book-info.sequence"/>
    <meta content="no number here" name="FB2.book-info.sequence"/>"#,
        )
        .description();
        assert_eq!(meta.series, [series("Sea Breeze", Some("5"))]);
    }

    #[test]
    fn sparse_metadata_leaves_fields_empty() {
        let meta = metadata_only(
            r#"<dc:title>Dead Souls</dc:title>
    <dc:language>RU</dc:language>
    <dc:language>en</dc:language>
    <meta name="calibre:title_sort" content="Souls, Dead"/>"#,
        )
        .description();
        assert_eq!(meta.title.as_deref(), Some("Dead Souls"));
        assert_eq!(meta.language.as_deref(), Some("ru"));
        assert!(meta.translators.is_empty());
        assert!(meta.series.is_empty());
        assert_eq!(meta.publish_city, None);
        assert_eq!(meta.publish_year, None);
    }
}

use crate::epub::asset::ImageAsset;
use crate::epub::container::ContainerDocument;
use crate::epub::navigation::NavigationDocument;
use crate::epub::opf::PackageDocument;
use crate::epub::path;
use crate::epub::section::Section;
use crate::epub::{
    MEDIA_TYPE_CONTAINER, MEDIA_TYPE_CSS, MEDIA_TYPE_NCX, MEDIA_TYPE_OPF, MEDIA_TYPE_XHTML,
};
use crate::error::{EpubError, Result};
use serde::Serialize;

/// The closed set of document kinds held by an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Container,
    Package,
    Navigation,
    Section,
    Image,
    StyleSheet,
    Generic,
}

impl DocumentKind {
    /// Classify a manifest entry by its declared media type.
    pub fn from_media_type(media_type: &str) -> Self {
        let media_type = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match media_type.as_str() {
            MEDIA_TYPE_XHTML => DocumentKind::Section,
            MEDIA_TYPE_NCX => DocumentKind::Navigation,
            MEDIA_TYPE_OPF => DocumentKind::Package,
            MEDIA_TYPE_CSS => DocumentKind::StyleSheet,
            mt if mt.starts_with("image/") => DocumentKind::Image,
            _ => DocumentKind::Generic,
        }
    }

    /// Kinds of which an archive holds at most one.
    pub fn is_singleton(self) -> bool {
        matches!(
            self,
            DocumentKind::Container | DocumentKind::Package | DocumentKind::Navigation
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Container => "container",
            DocumentKind::Package => "package",
            DocumentKind::Navigation => "navigation",
            DocumentKind::Section => "section",
            DocumentKind::Image => "image",
            DocumentKind::StyleSheet => "stylesheet",
            DocumentKind::Generic => "file",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bytes stored as-is: stylesheets, fonts and anything unrecognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    path: String,
    media_type: String,
    data: Vec<u8>,
}

impl RawFile {
    pub fn new(path: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
            data,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Content decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// A document owned by the archive's store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Container(ContainerDocument),
    Package(PackageDocument),
    Navigation(NavigationDocument),
    Section(Section),
    Image(ImageAsset),
    StyleSheet(RawFile),
    Generic(RawFile),
}

impl Document {
    /// Parse `data` into the document kind its media type calls for.
    pub fn from_bytes(path: &str, media_type: &str, data: Vec<u8>) -> Result<Self> {
        let doc = match DocumentKind::from_media_type(media_type) {
            DocumentKind::Section => Document::Section(Section::parse(path, &utf8(path, data)?)?),
            DocumentKind::Navigation => {
                Document::Navigation(NavigationDocument::parse(path, &utf8(path, data)?)?)
            }
            DocumentKind::Package => {
                Document::Package(PackageDocument::parse(path, &utf8(path, data)?)?)
            }
            DocumentKind::Container => {
                Document::Container(ContainerDocument::parse(path, &utf8(path, data)?)?)
            }
            DocumentKind::Image => Document::Image(ImageAsset::new(path, media_type, data)),
            DocumentKind::StyleSheet => Document::StyleSheet(RawFile::new(path, media_type, data)),
            DocumentKind::Generic => Document::Generic(RawFile::new(path, media_type, data)),
        };
        Ok(doc)
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Container(_) => DocumentKind::Container,
            Document::Package(_) => DocumentKind::Package,
            Document::Navigation(_) => DocumentKind::Navigation,
            Document::Section(_) => DocumentKind::Section,
            Document::Image(_) => DocumentKind::Image,
            Document::StyleSheet(_) => DocumentKind::StyleSheet,
            Document::Generic(_) => DocumentKind::Generic,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Document::Container(d) => d.path(),
            Document::Package(d) => d.path(),
            Document::Navigation(d) => d.path(),
            Document::Section(d) => d.path(),
            Document::Image(d) => d.path(),
            Document::StyleSheet(d) | Document::Generic(d) => d.path(),
        }
    }

    pub(crate) fn set_path(&mut self, path: &str) {
        match self {
            Document::Container(d) => d.set_path(path),
            Document::Package(d) => d.set_path(path),
            Document::Navigation(d) => d.set_path(path),
            Document::Section(d) => d.set_path(path),
            Document::Image(d) => d.set_path(path),
            Document::StyleSheet(d) | Document::Generic(d) => d.set_path(path),
        }
    }

    pub fn media_type(&self) -> &str {
        match self {
            Document::Container(_) => MEDIA_TYPE_CONTAINER,
            Document::Package(_) => MEDIA_TYPE_OPF,
            Document::Navigation(_) => MEDIA_TYPE_NCX,
            Document::Section(_) => MEDIA_TYPE_XHTML,
            Document::Image(d) => d.media_type(),
            Document::StyleSheet(d) | Document::Generic(d) => d.media_type(),
        }
    }

    pub fn file_name(&self) -> &str {
        path::file_name(self.path())
    }

    pub fn stem(&self) -> &str {
        path::file_stem(self.path())
    }

    pub fn extension(&self) -> &str {
        path::extension(self.path())
    }

    /// Directory part of the path, without a trailing slash.
    pub fn directory(&self) -> &str {
        path::directory(self.path())
    }

    /// Serialized content as written into the archive.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Document::Container(d) => d.to_xml().into_bytes(),
            Document::Package(d) => d.to_xml().into_bytes(),
            Document::Navigation(d) => d.to_xml().into_bytes(),
            Document::Section(d) => d.to_xml().into_bytes(),
            Document::Image(d) => d.data().to_vec(),
            Document::StyleSheet(d) | Document::Generic(d) => d.data().to_vec(),
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Document::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut Section> {
        match self {
            Document::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageAsset> {
        match self {
            Document::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageDocument> {
        match self {
            Document::Package(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_package_mut(&mut self) -> Option<&mut PackageDocument> {
        match self {
            Document::Package(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_navigation(&self) -> Option<&NavigationDocument> {
        match self {
            Document::Navigation(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_navigation_mut(&mut self) -> Option<&mut NavigationDocument> {
        match self {
            Document::Navigation(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerDocument> {
        match self {
            Document::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut ContainerDocument> {
        match self {
            Document::Container(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Section> for Document {
    fn from(section: Section) -> Self {
        Document::Section(section)
    }
}

impl From<ImageAsset> for Document {
    fn from(image: ImageAsset) -> Self {
        Document::Image(image)
    }
}

fn utf8(path: &str, data: Vec<u8>) -> Result<String> {
    String::from_utf8(data)
        .map_err(|e| EpubError::InvalidEpub(format!("invalid UTF-8 in {path}: {e}")))
}

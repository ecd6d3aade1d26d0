pub mod archive;
pub mod asset;
pub mod container;
pub mod document;
pub mod navigation;
pub mod opf;
pub mod path;
pub mod reader;
pub mod section;
pub mod store;
pub mod writer;
pub mod xml;
pub mod zip_utils;

pub use archive::Archive;
pub use document::{Document, DocumentKind, RawFile};
pub use store::DocumentStore;

use serde::{Deserialize, Serialize};

pub const EPUB_MIMETYPE: &str = "application/epub+zip";
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

pub const MEDIA_TYPE_XHTML: &str = "application/xhtml+xml";
pub const MEDIA_TYPE_NCX: &str = "application/x-dtbncx+xml";
pub const MEDIA_TYPE_OPF: &str = "application/oebps-package+xml";
pub const MEDIA_TYPE_CSS: &str = "text/css";
pub const MEDIA_TYPE_CONTAINER: &str = "application/xml";

/// Descriptive metadata gathered from the package document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EpubMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub translators: Vec<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub subjects: Vec<String>,
    pub identifiers: Vec<String>,
    pub isbn: Option<String>,
    pub rights: Option<String>,
    pub rights_holder: Option<String>,
    pub publish_city: Option<String>,
    pub publish_year: Option<i32>,
    pub created_year: Option<i32>,
    pub cover_id: Option<String>,
    pub cover_path: Option<String>,
    pub series: Vec<Series>,
    pub version: EpubVersion,
}

/// A series the book belongs to, with its position when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub number: Option<String>,
}

/// An item in the package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

/// A spine itemref. `linear` is `None` when the attribute is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpineItem {
    pub idref: String,
    pub linear: Option<bool>,
}

impl SpineItem {
    pub fn is_linear(&self) -> bool {
        self.linear.unwrap_or(true)
    }
}

/// A navigation point in the NCX tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavPoint {
    pub id: String,
    pub label: String,
    pub src: String,
    pub play_order: Option<String>,
    pub children: Vec<NavPoint>,
}

/// A rootfile entry of `META-INF/container.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// EPUB version
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpubVersion {
    #[default]
    V2,
    V3,
}

impl EpubVersion {
    pub fn from_package_version(version: &str) -> Self {
        if version.trim().starts_with('3') {
            EpubVersion::V3
        } else {
            EpubVersion::V2
        }
    }
}

impl std::fmt::Display for EpubVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpubVersion::V2 => write!(f, "2.0"),
            EpubVersion::V3 => write!(f, "3.0"),
        }
    }
}

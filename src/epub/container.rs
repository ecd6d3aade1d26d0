use crate::epub::xml::{Element, Style, XmlDocument};
use crate::epub::{MEDIA_TYPE_OPF, RootFile};
use crate::error::{EpubError, Result};

const SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles/>
</container>"#;

/// `META-INF/container.xml`: points at the package document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDocument {
    path: String,
    dom: XmlDocument,
}

impl ContainerDocument {
    /// Container element with an empty rootfiles list.
    pub fn create_default(path: impl Into<String>) -> Result<Self> {
        Self::parse(path, SKELETON)
    }

    pub fn parse(path: impl Into<String>, xml: &str) -> Result<Self> {
        let path = path.into();
        let dom = XmlDocument::parse(xml.trim(), &path)?;
        if !dom.root.is("container") {
            return Err(EpubError::InvalidEpub(format!(
                "{path}: root element is <{}>, expected <container>",
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

    /// Rootfile entries in document order.
    pub fn root_files(&self) -> Vec<RootFile> {
        self.dom
            .root
            .child("rootfiles")
            .into_iter()
            .flat_map(|rootfiles| rootfiles.children_named("rootfile"))
            .filter_map(|el| {
                Some(RootFile {
                    full_path: el.attr("full-path")?.to_string(),
                    media_type: el.attr("media-type").unwrap_or(MEDIA_TYPE_OPF).to_string(),
                })
            })
            .collect()
    }

    /// Path of the package document: the first rootfile.
    pub fn package_path(&self) -> Option<String> {
        self.root_files().into_iter().next().map(|r| r.full_path)
    }

    pub fn append_root_file(&mut self, full_path: &str, media_type: &str) {
        let rootfiles = self
            .dom
            .root
            .child_or_insert("rootfiles", || Element::new("rootfiles"));
        rootfiles.push(
            Element::new("rootfile")
                .with_attr("full-path", full_path)
                .with_attr("media-type", media_type),
        );
    }

    /// Point every rootfile addressing `old_path` at `new_path`.
    pub fn retarget_root_file(&mut self, old_path: &str, new_path: &str) -> usize {
        let mut count = 0;
        self.dom.root.walk_mut(&mut |el| {
            if el.is("rootfile") && el.attr("full-path") == Some(old_path) {
                el.set_attr("full-path", new_path);
                count += 1;
            }
        });
        count
    }

    pub fn to_xml(&self) -> String {
        self.dom.to_xml(Style::Pretty)
    }
}

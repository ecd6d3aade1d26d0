use crate::config::ArchiveOptions;
use crate::epub::asset::ImageAsset;
use crate::epub::container::ContainerDocument;
use crate::epub::document::{Document, DocumentKind, RawFile};
use crate::epub::navigation::NavigationDocument;
use crate::epub::opf::PackageDocument;
use crate::epub::section::Section;
use crate::epub::store::DocumentStore;
use crate::epub::{CONTAINER_PATH, MEDIA_TYPE_CONTAINER, MEDIA_TYPE_NCX, MEDIA_TYPE_OPF, path, zip_utils};
use crate::error::{EpubError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::io::{Cursor, Read, Seek, Write};
use zip::ZipArchive;

/// An EPUB package held in memory.
///
/// The store owns every document. The container, package and navigation
/// documents live in the store as well; the archive only remembers their
/// paths.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    store: DocumentStore,
    container_path: Option<String>,
    package_path: Option<String>,
    navigation_path: Option<String>,
    options: ArchiveOptions,
}

impl Archive {
    /// An empty archive with no documents.
    pub fn new(options: ArchiveOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// An archive with a container, an empty package and an empty NCX.
    pub fn with_skeleton(options: ArchiveOptions) -> Result<Self> {
        let mut archive = Self::new(options);
        archive.create_package()?;
        archive.create_navigation()?;
        Ok(archive)
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ArchiveOptions {
        &mut self.options
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    // -- singletons --

    pub fn create_container(&mut self) -> Result<&mut ContainerDocument> {
        let container = ContainerDocument::create_default(CONTAINER_PATH)?;
        self.store.put(CONTAINER_PATH, Document::Container(container));
        self.container_path = Some(CONTAINER_PATH.to_string());
        self.container_mut()
            .ok_or(EpubError::MissingRequiredDocument("container"))
    }

    /// Create the package document and point the container at it.
    pub fn create_package(&mut self) -> Result<&mut PackageDocument> {
        if self.container().is_none() {
            self.create_container()?;
        }
        let package_path = self.options.package_path();
        let package = PackageDocument::create_default(package_path.as_str())?;
        self.store.put(&package_path, Document::Package(package));
        self.package_path = Some(package_path.clone());

        if let Some(container) = self.container_mut() {
            container.append_root_file(&package_path, MEDIA_TYPE_OPF);
        }
        self.package_mut()
            .ok_or(EpubError::MissingRequiredDocument("package"))
    }

    /// Create the NCX and register it in the manifest as `ncx`.
    pub fn create_navigation(&mut self) -> Result<&mut NavigationDocument> {
        let nav_path = self.options.navigation_path();
        let package = self
            .package_mut()
            .ok_or(EpubError::MissingRequiredDocument("package"))?;
        let href = path::relativize(&nav_path, package.path());
        package.append_to_manifest("ncx", &href, MEDIA_TYPE_NCX);

        let navigation = NavigationDocument::create_default(nav_path.as_str())?;
        self.store.put(&nav_path, Document::Navigation(navigation));
        self.navigation_path = Some(nav_path);
        self.navigation_mut()
            .ok_or(EpubError::MissingRequiredDocument("navigation"))
    }

    pub fn container_path(&self) -> Option<&str> {
        self.container_path.as_deref()
    }

    pub fn package_path(&self) -> Option<&str> {
        self.package_path.as_deref()
    }

    pub fn navigation_path(&self) -> Option<&str> {
        self.navigation_path.as_deref()
    }

    pub fn container(&self) -> Option<&ContainerDocument> {
        self.store.get(self.container_path.as_deref()?)?.as_container()
    }

    pub fn container_mut(&mut self) -> Option<&mut ContainerDocument> {
        self.store
            .get_mut(self.container_path.as_deref()?)?
            .as_container_mut()
    }

    pub fn package(&self) -> Option<&PackageDocument> {
        self.store.get(self.package_path.as_deref()?)?.as_package()
    }

    pub fn package_mut(&mut self) -> Option<&mut PackageDocument> {
        self.store
            .get_mut(self.package_path.as_deref()?)?
            .as_package_mut()
    }

    pub fn navigation(&self) -> Option<&NavigationDocument> {
        self.store.get(self.navigation_path.as_deref()?)?.as_navigation()
    }

    pub fn navigation_mut(&mut self) -> Option<&mut NavigationDocument> {
        self.store
            .get_mut(self.navigation_path.as_deref()?)?
            .as_navigation_mut()
    }

    /// The package, or `MissingRequiredDocument` when there is none.
    pub fn require_package(&self) -> Result<&PackageDocument> {
        self.package()
            .ok_or(EpubError::MissingRequiredDocument("package"))
    }

    pub fn require_package_mut(&mut self) -> Result<&mut PackageDocument> {
        self.package_mut()
            .ok_or(EpubError::MissingRequiredDocument("package"))
    }

    /// Keep the singleton pointers in step with a path change.
    pub(crate) fn retarget_singletons(&mut self, old: &str, new: &str) {
        for slot in [
            &mut self.container_path,
            &mut self.package_path,
            &mut self.navigation_path,
        ] {
            if slot.as_deref() == Some(old) {
                *slot = Some(new.to_string());
            }
        }
    }

    // -- loading --

    /// Read an archive from any seekable ZIP source.
    pub fn open<R: Read + Seek>(reader: R, options: ArchiveOptions) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        zip_utils::validate_mimetype(&mut zip)?;

        let mut archive = Self::new(options);

        if !zip_utils::has_entry(&zip, CONTAINER_PATH) {
            return Err(EpubError::MissingRequiredDocument("container"));
        }
        let container_xml = zip_utils::read_entry_string(&mut zip, CONTAINER_PATH)?;
        let container = ContainerDocument::parse(CONTAINER_PATH, &container_xml)?;
        let package_path = container
            .package_path()
            .map(|p| path::normalize(&p))
            .ok_or(EpubError::MissingRequiredDocument("package"))?;
        archive.store.put(CONTAINER_PATH, Document::Container(container));
        archive.container_path = Some(CONTAINER_PATH.to_string());

        if !zip_utils::has_entry(&zip, &package_path) {
            return Err(EpubError::MissingRequiredDocument("package"));
        }
        let package_xml = zip_utils::read_entry_string(&mut zip, &package_path)?;
        let package = PackageDocument::parse(package_path.as_str(), &package_xml)?;
        tracing::debug!(path = %package_path, "loaded package document");

        let manifest = package.manifest_items();
        let spine = package.spine_items();
        let toc_id = package.spine_toc().map(str::to_string);
        archive.store.put(&package_path, Document::Package(package));
        archive.package_path = Some(package_path.clone());

        let mut missing_ids = Vec::new();
        for item in &manifest {
            let item_path = path::resolve(&item.href, &package_path).path;
            if item_path == package_path || archive.store.contains(&item_path) {
                continue;
            }
            if !zip_utils::has_entry(&zip, &item_path) {
                if archive.options.tolerate_missing_files {
                    tracing::warn!(id = %item.id, href = %item.href, "dropping manifest item with no file");
                    missing_ids.push(item.id.clone());
                    continue;
                }
                return Err(EpubError::DanglingReference {
                    from: package_path.clone(),
                    reference: item.href.clone(),
                });
            }

            let data = zip_utils::read_entry(&mut zip, &item_path)?;
            let mut doc = Document::from_bytes(&item_path, &item.media_type, data)?;
            if let Some(section) = doc.as_section_mut() {
                let linear = spine.iter().find(|s| s.idref == item.id).and_then(|s| s.linear);
                section.set_linear(linear);
            }
            if doc.kind() == DocumentKind::Navigation
                && (archive.navigation_path.is_none() || toc_id.as_deref() == Some(item.id.as_str()))
            {
                archive.navigation_path = Some(item_path.clone());
            }
            tracing::debug!(path = %item_path, kind = %doc.kind(), "loaded document");
            archive.store.put(&item_path, doc);
        }

        if !missing_ids.is_empty() {
            let package = archive.require_package_mut()?;
            for id in &missing_ids {
                package.remove_manifest_item(id);
                package.remove_from_spine(id);
            }
        }

        archive.check_navigation_targets()?;

        for name in zip_utils::list_entries(&zip) {
            if name.starts_with("META-INF/") && !archive.store.contains(&name) {
                let data = zip_utils::read_entry(&mut zip, &name)?;
                tracing::debug!(path = %name, "keeping container metadata entry");
                archive.store.put(
                    &name,
                    Document::Generic(RawFile::new(name.as_str(), MEDIA_TYPE_CONTAINER, data)),
                );
            }
        }

        Ok(archive)
    }

    /// Dangling navPoint srcs fail the load, or are dropped in tolerant mode.
    fn check_navigation_targets(&mut self) -> Result<()> {
        let Some(nav_path) = self.navigation_path.clone() else {
            return Ok(());
        };
        let present: HashSet<String> = self.store.paths().map(str::to_string).collect();
        let tolerate = self.options.tolerate_missing_files;
        let Some(nav) = self.navigation_mut() else {
            return Ok(());
        };

        let dangling = nav
            .srcs()
            .into_iter()
            .find(|src| !path::is_external(src) && !present.contains(&nav.resolve_src(src)));
        let Some(first) = dangling else {
            return Ok(());
        };
        if !tolerate {
            return Err(EpubError::DanglingReference {
                from: nav_path,
                reference: first,
            });
        }

        let base = nav.path().to_string();
        let removed = nav.retain_nav_points(|src| {
            path::is_external(src) || present.contains(&path::resolve(src, &base).path)
        });
        for src in removed {
            tracing::warn!(%src, "dropping navPoint with no target");
        }
        Ok(())
    }

    // -- writing --

    /// Write the archive as a ZIP: `mimetype` first and stored, then every
    /// document in store order.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = zip_utils::start_epub(writer)?;
        for (entry_path, doc) in self.store.iter() {
            tracing::debug!(path = entry_path, "writing entry");
            zip_utils::write_entry(&mut zip, entry_path, &doc.to_bytes())?;
        }
        Ok(zip.finish()?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    pub fn from_bytes(bytes: &[u8], options: ArchiveOptions) -> Result<Self> {
        Self::open(Cursor::new(bytes), options)
    }

    // -- queries --

    pub fn document(&self, path: &str) -> Option<&Document> {
        self.store.get(path)
    }

    pub fn document_mut(&mut self, path: &str) -> Option<&mut Document> {
        self.store.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.store.contains(path)
    }

    pub fn paths(&self) -> Vec<String> {
        self.store.paths().map(str::to_string).collect()
    }

    /// Store paths matching `pattern`.
    pub fn find_paths(&self, pattern: &Regex) -> Vec<String> {
        self.store
            .paths()
            .filter(|p| pattern.is_match(p))
            .map(str::to_string)
            .collect()
    }

    /// Sections in store order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.store
            .all_of_kind(DocumentKind::Section)
            .filter_map(Document::as_section)
    }

    pub fn section(&self, path: &str) -> Result<&Section> {
        let doc = self
            .store
            .get(path)
            .ok_or_else(|| EpubError::DocumentNotFound(path.to_string()))?;
        doc.as_section().ok_or_else(|| EpubError::WrongKind {
            path: path.to_string(),
            expected: "section",
        })
    }

    pub fn section_mut(&mut self, path: &str) -> Result<&mut Section> {
        let doc = self
            .store
            .get_mut(path)
            .ok_or_else(|| EpubError::DocumentNotFound(path.to_string()))?;
        doc.as_section_mut().ok_or_else(|| EpubError::WrongKind {
            path: path.to_string(),
            expected: "section",
        })
    }

    /// Sections in reading order. Spine entries without a stored section
    /// are skipped.
    pub fn sections_in_spine_order(&self) -> Vec<&Section> {
        let Some(package) = self.package() else {
            return Vec::new();
        };
        package
            .spine_items()
            .iter()
            .filter_map(|item| package.manifest_item_by_id(&item.idref))
            .filter_map(|item| self.store.get(&package.resolve_href(&item.href)))
            .filter_map(Document::as_section)
            .collect()
    }

    /// Images in store order.
    pub fn images(&self) -> impl Iterator<Item = &ImageAsset> {
        self.store
            .all_of_kind(DocumentKind::Image)
            .filter_map(Document::as_image)
    }

    /// Put a document into the store. The manifest is not touched.
    pub fn insert(&mut self, path: &str, doc: Document) -> Option<Document> {
        self.store.put(path, doc)
    }

    /// Remove a document from the store only. Manifest, spine and links
    /// are left alone; see `manipulate::asset_manage::remove_asset`.
    pub fn remove(&mut self, path: &str) -> Option<Document> {
        let removed = self.store.remove(path)?;
        for slot in [
            &mut self.container_path,
            &mut self.package_path,
            &mut self.navigation_path,
        ] {
            if slot.as_deref() == Some(path) {
                *slot = None;
            }
        }
        Some(removed)
    }
}

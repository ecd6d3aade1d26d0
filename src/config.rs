use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs that change how an archive is loaded and how the integrity
/// operations name things.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    /// Drop manifest items and navPoints whose target file is absent
    /// instead of failing the load.
    pub tolerate_missing_files: bool,
    /// Rename a manifest item's id along with its file.
    pub manifest_id_follows_filename: bool,
    /// Prefix for ids minted by the identifier unifier.
    pub id_prefix: String,
    /// Prefix for file names minted by the name unifier.
    pub image_name_prefix: String,
    /// Directory holding the default package and navigation documents.
    pub content_dir: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            tolerate_missing_files: false,
            manifest_id_follows_filename: false,
            id_prefix: "u-note-".to_string(),
            image_name_prefix: "image_".to_string(),
            content_dir: "OEBPS".to_string(),
        }
    }
}

impl ArchiveOptions {
    pub fn tolerant() -> Self {
        Self {
            tolerate_missing_files: true,
            ..Self::default()
        }
    }

    pub fn package_path(&self) -> String {
        self.in_content_dir("content.opf")
    }

    pub fn navigation_path(&self) -> String {
        self.in_content_dir("toc.ncx")
    }

    fn in_content_dir(&self, name: &str) -> String {
        match self.content_dir.trim_matches('/') {
            "" => name.to_string(),
            dir => format!("{dir}/{name}"),
        }
    }
}

/// Load options from a TOML file. Missing keys keep their defaults.
pub fn load_options(path: &Path) -> Result<ArchiveOptions> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

//! Referentially consistent editing of EPUB packages.
//!
//! An [`Archive`] holds every document of an EPUB in memory, keyed by its
//! path inside the ZIP. The operations in [`manipulate`] rename files and
//! rewrite element ids while keeping the manifest, the NCX and every
//! inline link pointing at the right place.

pub mod config;
pub mod epub;
pub mod error;
pub mod manipulate;
pub mod util;

pub use config::ArchiveOptions;
pub use epub::{Archive, Document, DocumentKind};
pub use error::{EpubError, Result};

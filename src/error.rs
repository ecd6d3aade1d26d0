use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpubError {
    #[error("invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("missing required document: {0}")]
    MissingRequiredDocument(&'static str),

    #[error("dangling reference in {from}: {reference}")]
    DanglingReference { from: String, reference: String },

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("{path} is not a {expected} document")]
    WrongKind { path: String, expected: &'static str },

    #[error("malformed XML in {path}: {detail}")]
    Malformed { path: String, detail: String },

    #[error("XML error in {path} at byte {position}: {source}")]
    Xml {
        path: String,
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EpubError>;

use crate::epub::path;
use crate::error::Result;
use ::image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// A binary image stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    path: String,
    media_type: String,
    data: Vec<u8>,
}

impl ImageAsset {
    pub fn new(path: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Build an asset whose media type is taken from the detected format.
    pub fn from_bytes(path: impl Into<String>, data: Vec<u8>) -> Self {
        let media_type = ::image::guess_format(&data)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        Self::new(path, media_type, data)
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

    pub fn file_name(&self) -> &str {
        path::file_name(&self.path)
    }

    pub fn extension(&self) -> &str {
        path::extension(&self.path)
    }

    /// Format sniffed from the leading bytes.
    pub fn format(&self) -> Option<ImageFormat> {
        ::image::guess_format(&self.data).ok()
    }

    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(self.data.as_slice())).with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }

    pub fn width(&self) -> Result<u32> {
        Ok(self.dimensions()?.0)
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.dimensions()?.1)
    }

    /// Canonical MIME type of the detected format.
    pub fn mime_type(&self) -> Option<&'static str> {
        self.format().map(|f| f.to_mime_type())
    }

    /// Lowercase extension naming the detected format.
    pub fn guess_extension(&self) -> Option<&'static str> {
        self.format().map(extension_for)
    }

    /// True when the bytes decode far enough to yield dimensions.
    pub fn is_valid(&self) -> bool {
        self.dimensions().is_ok()
    }
}

fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        other => other.extensions_str().first().copied().unwrap_or("bin"),
    }
}

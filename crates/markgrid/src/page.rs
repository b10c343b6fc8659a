//! Page inputs and per-page error kinds.
//!
//! Rasterization (PDF → page images at a fixed DPI) belongs to an upstream
//! collaborator; the scanner accepts already-rasterized pages. When a
//! rasterizer hands over pages through transient files, wrapping them in
//! [`RasterizedPage::from_temp_file`] guarantees the file is removed on
//! every exit path, including after a processing panic, so long-running
//! batches never accumulate disk.

use std::path::{Path, PathBuf};

use image::GrayImage;
use tempfile::TempPath;

/// Per-page failure kinds surfaced to batch callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The page buffer or file could not be decoded into an image.
    UnreadableImage(String),
    /// An upstream rasterization step failed for this page.
    PageConversion(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::UnreadableImage(reason) => write!(f, "unreadable image: {reason}"),
            ScanError::PageConversion(reason) => write!(f, "page conversion failed: {reason}"),
        }
    }
}

impl std::error::Error for ScanError {}

/// One rasterized page, optionally backed by a temporary file.
///
/// The backing file (if any) is deleted when the page is dropped.
pub struct RasterizedPage {
    image: GrayImage,
    _backing: Option<TempPath>,
}

impl RasterizedPage {
    /// Wrap an already-decoded grayscale page.
    pub fn from_image(image: GrayImage) -> Self {
        Self {
            image,
            _backing: None,
        }
    }

    /// Decode a page image from a persistent file.
    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let img = image::open(path)
            .map_err(|e| ScanError::UnreadableImage(format!("{}: {e}", path.display())))?;
        Ok(Self::from_image(img.to_luma8()))
    }

    /// Decode a page image from a transient file owned by this page.
    ///
    /// The file is removed when the returned page is dropped, and also
    /// when decoding fails, so a rasterizer's scratch output never
    /// outlives the attempt to read it.
    pub fn from_temp_file(path: PathBuf) -> Result<Self, ScanError> {
        let temp = TempPath::from_path(path);
        let img = image::open(&temp)
            .map_err(|e| ScanError::UnreadableImage(format!("{}: {e}", temp.display())))?;
        Ok(Self {
            image: img.to_luma8(),
            _backing: Some(temp),
        })
    }

    /// The decoded page image.
    pub fn image(&self) -> &GrayImage {
        &self.image
    }
}

impl std::fmt::Debug for RasterizedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.image.dimensions();
        f.debug_struct("RasterizedPage")
            .field("width", &w)
            .field("height", &h)
            .field("temp_backed", &self._backing.is_some())
            .finish()
    }
}

/// Decode a sequence of page files into batch inputs, one entry per path.
///
/// Decode failures become `Err` entries rather than aborting the iterator,
/// so sibling pages still flow through the scanner.
pub fn pages_from_paths<I, P>(paths: I) -> impl Iterator<Item = Result<RasterizedPage, ScanError>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|p| RasterizedPage::from_path(p.as_ref()))
}

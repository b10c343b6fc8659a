//! High-level scanning API.
//!
//! [`SheetScanner`] is the primary entry point for reading answer sheets.
//! It wraps a [`ScanConfig`] and provides convenience methods for the
//! common scenarios (single image, file path, multi-page batch).

use std::path::Path;
use std::sync::Arc;

use image::GrayImage;

use crate::config::ScanConfig;
use crate::page::{RasterizedPage, ScanError};
use crate::pipeline::{self, PageEntry, SheetResult};
use crate::recognize::DigitRecognizer;
use crate::sheet_layout::SheetLayout;

/// Primary scanning interface.
///
/// Encapsulates sheet layout and pipeline configuration.
/// Create once, scan many pages.
///
/// # Examples
///
/// ```
/// use markgrid::{SheetLayout, SheetScanner};
/// use image::GrayImage;
///
/// let scanner = SheetScanner::new(SheetLayout::with_questions(20));
/// let page = GrayImage::new(640, 480);
/// let result = scanner.scan(&page);
/// println!("identifier: {}", result.identifier);
/// ```
pub struct SheetScanner {
    config: ScanConfig,
    recognizer: Option<Arc<dyn DigitRecognizer>>,
}

impl SheetScanner {
    /// Create a scanner for a sheet layout with default tuning.
    pub fn new(layout: SheetLayout) -> Self {
        Self::with_config(ScanConfig::from_layout(layout))
    }

    /// Create with full config control.
    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            config,
            recognizer: None,
        }
    }

    /// Load a sheet layout JSON and create a scanner in one step.
    pub fn from_layout_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(SheetLayout::from_json_file(path)?))
    }

    /// Install a digit-recognition capability.
    ///
    /// The recognizer is loaded once and shared read-only across every
    /// page this scanner processes; it is consulted only when
    /// [`crate::IdentifierSource::DigitBoxes`] is selected.
    pub fn with_digit_recognizer(mut self, recognizer: Arc<dyn DigitRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Access the current configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut ScanConfig {
        &mut self.config
    }

    /// Scan a single grayscale page (page index 0).
    pub fn scan(&self, image: &GrayImage) -> SheetResult {
        self.scan_page(image, 0)
    }

    /// Scan one page of a larger document.
    pub fn scan_page(&self, image: &GrayImage, page_index: usize) -> SheetResult {
        pipeline::scan_page(image, &self.config, self.recognizer.as_deref(), page_index)
    }

    /// Decode an image file and scan it.
    pub fn scan_path(&self, path: &Path) -> Result<SheetResult, ScanError> {
        let page = RasterizedPage::from_path(path)?;
        Ok(self.scan(page.image()))
    }

    /// Scan a sequence of rasterized pages, one batch entry per page.
    ///
    /// Upstream failures arrive as `Err` items and stay isolated to their
    /// own entry; the batch always has exactly one entry per input.
    pub fn scan_batch<I>(&self, pages: I) -> Vec<PageEntry>
    where
        I: IntoIterator<Item = Result<RasterizedPage, ScanError>>,
    {
        pipeline::scan_batch(pages, &self.config, self.recognizer.as_deref())
    }
}

//! Pipeline entry points: single page and sequential batch.

use image::GrayImage;

use super::read_region::read_region;
use super::result::{PageEntry, PageFailure, SheetResult};
use crate::config::{IdentifierSource, ScanConfig};
use crate::page::{RasterizedPage, ScanError};
use crate::recognize::{read_digits, DigitRecognizer};
use crate::region::locate::locate_regions;
use crate::sheet_layout::RegionKind;

/// Scan one page image into a structured result.
///
/// Never fails: when the reference frames cannot be located the result is
/// fully unknown, with diagnostics attached.
pub(crate) fn scan_page(
    gray: &GrayImage,
    config: &ScanConfig,
    recognizer: Option<&dyn DigitRecognizer>,
    page_index: usize,
) -> SheetResult {
    let (regions, stats) = locate_regions(gray, &config.locate);
    let Some(regions) = regions else {
        let mut result = SheetResult::empty(&config.layout, page_index);
        result.locate = Some(stats);
        return result;
    };

    let identifier = match (config.identifier_source, recognizer) {
        (IdentifierSource::DigitBoxes, Some(rec)) => read_digits(
            gray,
            rec,
            config.layout.identifier.rows,
            &config.digit_boxes,
            &config.locate,
        ),
        (IdentifierSource::DigitBoxes, None) => {
            tracing::warn!(
                "digit-box identification selected without a recognizer; using bubbles"
            );
            read_region(gray, &regions.identifier, RegionKind::Identifier, config)
        }
        (IdentifierSource::Bubbles, _) => {
            read_region(gray, &regions.identifier, RegionKind::Identifier, config)
        }
    };
    let group = read_region(gray, &regions.group, RegionKind::Group, config);
    let answers = read_region(gray, &regions.answers, RegionKind::AnswerBlock, config);

    tracing::info!(
        page_index,
        n_answers = answers.iter().filter(|v| v.is_some()).count(),
        "page scanned"
    );

    SheetResult::assemble(
        &config.layout,
        page_index,
        &identifier,
        &group,
        &answers,
        Some(stats),
    )
}

/// Scan a sequence of pages, producing exactly one entry per input page.
///
/// Upstream failures (rasterization, decoding) arrive as `Err` items and
/// are isolated to their own batch entry; sibling pages are unaffected.
pub(crate) fn scan_batch<I>(
    pages: I,
    config: &ScanConfig,
    recognizer: Option<&dyn DigitRecognizer>,
) -> Vec<PageEntry>
where
    I: IntoIterator<Item = Result<RasterizedPage, ScanError>>,
{
    pages
        .into_iter()
        .enumerate()
        .map(|(page_index, page)| match page {
            Ok(page) => PageEntry::Sheet(scan_page(page.image(), config, recognizer, page_index)),
            Err(err) => {
                tracing::warn!(page_index, error = %err, "page failed before recognition");
                PageEntry::Failed(PageFailure {
                    error: err.to_string(),
                    page_index,
                })
            }
        })
        .collect()
}

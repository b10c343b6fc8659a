//! Alternate identification path: handwritten digit boxes.
//!
//! Some sheets carry the student identifier as handwritten digits in
//! printed boxes at the top of the page instead of (or in addition to)
//! bubbles. The geometric half lives here: finding the boxes, ordering
//! them the way a person reads them, and preparing normalized patches.
//! Recognition itself is a capability injected through [`DigitRecognizer`];
//! the crate neither trains nor bundles a model.

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};

use crate::config::{DigitBoxConfig, LocateConfig};
use crate::preprocess::{binarize_local_mean, blur_gray};
use crate::region::RegionBox;

/// One recognized digit with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DigitPrediction {
    pub digit: u8,
    pub confidence: f32,
}

/// Digit-recognition capability.
///
/// Implementations wrap whatever model the caller has; the scanner only
/// asks for this one operation. The recognizer is installed once per
/// scanner and shared read-only across all pages of a batch, so
/// implementations must be `Send + Sync` and must not mutate per call.
pub trait DigitRecognizer: Send + Sync {
    /// Recognize the digit in a normalized patch, or `None` when the patch
    /// is unreadable.
    fn identify_digit(&self, patch: &GrayImage) -> Option<DigitPrediction>;
}

/// A detected digit box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DigitBox {
    pub bbox: RegionBox,
    pub center: [f32; 2],
    pub area: f64,
}

/// Find candidate digit boxes in the top fraction of the page.
pub(crate) fn detect_digit_boxes(
    gray: &GrayImage,
    config: &DigitBoxConfig,
    locate: &LocateConfig,
) -> Vec<DigitBox> {
    let (w, h) = gray.dimensions();
    let top_h = ((h as f32 * config.top_fraction).round() as u32).clamp(1, h);
    let top = image::imageops::crop_imm(gray, 0, 0, w, top_h).to_image();

    let blurred = blur_gray(&top, locate.blur_sigma);
    let bin = binarize_local_mean(&blurred, locate.block_radius, locate.offset);

    let mut boxes = Vec::new();
    for contour in &find_contours::<i32>(&bin) {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        if contour.points.len() < 4 {
            continue;
        }
        let perimeter = arc_length(&contour.points, true);
        let approx =
            approximate_polygon_dp(&contour.points, locate.approx_eps_frac * perimeter, true);
        if !(4..=8).contains(&approx.len()) {
            continue;
        }

        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for p in &contour.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let bw = (max_x - min_x).max(1) as u32;
        let bh = (max_y - min_y).max(1) as u32;
        let area = bw as f64 * bh as f64;
        let aspect = bw as f32 / bh as f32;

        if area < config.min_area
            || bw < config.min_side
            || bh < config.min_side
            || aspect < config.aspect_min
            || aspect > config.aspect_max
        {
            continue;
        }

        boxes.push(DigitBox {
            bbox: RegionBox {
                x: min_x.max(0) as u32,
                y: min_y.max(0) as u32,
                w: bw,
                h: bh,
            },
            center: [
                min_x as f32 + bw as f32 / 2.0,
                min_y as f32 + bh as f32 / 2.0,
            ],
            area,
        });
    }

    tracing::debug!(n_boxes = boxes.len(), "digit boxes detected");
    reading_order(boxes, config.line_tolerance_y)
}

/// Sort boxes into reading order: grouped into horizontal lines by a
/// y-tolerance against the line's running mean, lines top to bottom, and
/// left to right within a line.
pub(crate) fn reading_order(boxes: Vec<DigitBox>, tolerance_y: f32) -> Vec<DigitBox> {
    let mut lines: Vec<Vec<DigitBox>> = Vec::new();
    for b in boxes {
        let mut placed = false;
        for line in lines.iter_mut() {
            let avg_y = line.iter().map(|s| s.center[1]).sum::<f32>() / line.len() as f32;
            if (b.center[1] - avg_y).abs() < tolerance_y {
                line.push(b);
                placed = true;
                break;
            }
        }
        if !placed {
            lines.push(vec![b]);
        }
    }

    lines.sort_by(|a, b| {
        let ay = a.iter().map(|s| s.center[1]).sum::<f32>() / a.len() as f32;
        let by = b.iter().map(|s| s.center[1]).sum::<f32>() / b.len() as f32;
        ay.partial_cmp(&by).unwrap()
    });
    for line in lines.iter_mut() {
        line.sort_by(|a, b| a.center[0].partial_cmp(&b.center[0]).unwrap());
    }

    lines.into_iter().flatten().collect()
}

/// Crop a box (with margin) and normalize it into a white square canvas,
/// preserving aspect ratio: the geometry recognizer implementations are
/// trained against.
pub(crate) fn prepare_patch(
    gray: &GrayImage,
    bbox: &RegionBox,
    target: u32,
    margin: u32,
) -> GrayImage {
    let (w, h) = gray.dimensions();
    let x1 = bbox.x.saturating_sub(margin);
    let y1 = bbox.y.saturating_sub(margin);
    let x2 = (bbox.x + bbox.w + margin).min(w);
    let y2 = (bbox.y + bbox.h + margin).min(h);
    let cw = x2.saturating_sub(x1).max(1);
    let ch = y2.saturating_sub(y1).max(1);

    let crop = image::imageops::crop_imm(gray, x1, y1, cw, ch).to_image();

    let ratio = (target as f32 / cw as f32).min(target as f32 / ch as f32);
    let new_w = ((cw as f32 * ratio).round() as u32).clamp(1, target);
    let new_h = ((ch as f32 * ratio).round() as u32).clamp(1, target);
    let resized = image::imageops::resize(&crop, new_w, new_h, FilterType::Triangle);

    let mut canvas = GrayImage::from_pixel(target, target, Luma([255u8]));
    let off_x = (target - new_w) / 2;
    let off_y = (target - new_h) / 2;
    image::imageops::replace(&mut canvas, &resized, off_x as i64, off_y as i64);
    canvas
}

/// Read up to `expected` identifier digits through the injected recognizer.
///
/// Boxes beyond `expected` are ignored; missing boxes and low-confidence
/// predictions become unknown slots. The result always has length
/// `expected`.
pub(crate) fn read_digits(
    gray: &GrayImage,
    recognizer: &dyn DigitRecognizer,
    expected: usize,
    config: &DigitBoxConfig,
    locate: &LocateConfig,
) -> Vec<Option<usize>> {
    let boxes = detect_digit_boxes(gray, config, locate);
    let mut digits: Vec<Option<usize>> = boxes
        .iter()
        .take(expected)
        .map(|b| {
            let patch = prepare_patch(gray, &b.bbox, config.patch_size, config.patch_margin);
            recognizer
                .identify_digit(&patch)
                .filter(|p| p.confidence >= config.min_confidence && p.digit < 10)
                .map(|p| p.digit as usize)
        })
        .collect();
    digits.resize(expected, None);

    tracing::debug!(
        n_boxes = boxes.len(),
        n_known = digits.iter().filter(|d| d.is_some()).count(),
        "identifier read from digit boxes"
    );
    digits
}

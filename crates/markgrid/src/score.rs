//! Fill-confidence scoring of candidate bubbles.
//!
//! Each candidate is judged from local pixel statistics only: the crop is
//! contrast-normalized, split into dark/light with an automatic
//! inter-class-variance threshold, and measured inside a circular mask
//! kept at 70% of the radius so the printed ring itself is not counted as
//! ink. The score rewards both the proportion of dark pixels and their
//! darkness, since either alone is fooled by partial or light marks.

use image::GrayImage;

use crate::config::ScoreConfig;
use crate::grid::Slot;
use crate::mark::Circle;

/// A scored grid slot, ephemeral within one row's decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub circle: Circle,
    /// Weighted fill score; higher means more filled-in.
    pub score: f32,
    /// Fraction of masked pixels below the dark/light split.
    pub dark_ratio: f32,
    /// Mean masked intensity of the contrast-normalized crop.
    pub mean_intensity: f32,
    /// True when the slot was synthesized rather than detected.
    pub synthesized: bool,
}

/// Score a single candidate. Pure function of the cropped neighborhood.
pub fn score_mark(gray: &GrayImage, circle: &Circle, config: &ScoreConfig) -> (f32, f32, f32) {
    let (w, h) = gray.dimensions();
    let cx = circle.center[0].round() as i64;
    let cy = circle.center[1].round() as i64;
    let r = circle.radius.round().max(1.0) as i64;

    let x1 = (cx - r).clamp(0, w as i64);
    let x2 = (cx + r).clamp(0, w as i64);
    let y1 = (cy - r).clamp(0, h as i64);
    let y2 = (cy + r).clamp(0, h as i64);
    if x2 <= x1 || y2 <= y1 {
        return (0.0, 0.0, 255.0);
    }

    let crop = image::imageops::crop_imm(
        gray,
        x1 as u32,
        y1 as u32,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
    )
    .to_image();
    let normalized = imageproc::contrast::equalize_histogram(&crop);

    let (cw, ch) = normalized.dimensions();
    let mask_cx = cw as f32 / 2.0;
    let mask_cy = ch as f32 / 2.0;
    let mask_r = (config.mask_radius_frac * circle.radius).max(1.0);
    let mask_r_sq = mask_r * mask_r;

    let split = imageproc::contrast::otsu_level(&normalized);

    let mut mask_area = 0u32;
    let mut dark = 0u32;
    let mut intensity_sum = 0u64;
    for y in 0..ch {
        for x in 0..cw {
            let dx = x as f32 + 0.5 - mask_cx;
            let dy = y as f32 + 0.5 - mask_cy;
            if dx * dx + dy * dy > mask_r_sq {
                continue;
            }
            let v = normalized.get_pixel(x, y)[0];
            mask_area += 1;
            intensity_sum += v as u64;
            if v <= split {
                dark += 1;
            }
        }
    }

    if mask_area == 0 {
        return (0.0, 0.0, 255.0);
    }

    let dark_ratio = dark as f32 / mask_area as f32;
    let mean_intensity = intensity_sum as f32 / mask_area as f32;
    let score =
        dark_ratio * config.dark_weight + (255.0 - mean_intensity) * config.intensity_weight;
    (score, dark_ratio, mean_intensity)
}

/// Score every slot of one row.
pub(crate) fn score_row(
    gray: &GrayImage,
    slots: &[Slot],
    config: &ScoreConfig,
) -> Vec<ScoredCandidate> {
    slots
        .iter()
        .map(|slot| {
            let (score, dark_ratio, mean_intensity) = score_mark(gray, &slot.circle, config);
            ScoredCandidate {
                circle: slot.circle,
                score,
                dark_ratio,
                mean_intensity,
                synthesized: slot.synthesized,
            }
        })
        .collect()
}

//! Reading one region: detection → grid recovery → scoring → decision.

use image::GrayImage;

use crate::config::{DetectStrategy, ScanConfig};
use crate::decide::decide_row;
use crate::grid::{group_rows, map_columns, ColumnSpan, Slot};
use crate::mark::{detect_circles, fixed_offset, mean_radius, merge_overlapping};
use crate::region::RegionBox;
use crate::score::score_row;
use crate::sheet_layout::{GridSpec, RegionKind};

/// Decode one region into per-row column values.
///
/// The returned vector always has `grid.rows` entries regardless of
/// detection completeness; rows that could not be anchored decode as
/// `None`.
pub(crate) fn read_region(
    gray: &GrayImage,
    region: &RegionBox,
    kind: RegionKind,
    config: &ScanConfig,
) -> Vec<Option<usize>> {
    let grid = config.layout.grid(kind);
    match config.strategy {
        DetectStrategy::CircleGrid => read_circle_grid(gray, region, kind, grid, config),
        DetectStrategy::FixedOffset => read_fixed_offset(gray, region, grid, config),
    }
}

fn read_circle_grid(
    gray: &GrayImage,
    region: &RegionBox,
    kind: RegionKind,
    grid: &GridSpec,
    config: &ScanConfig,
) -> Vec<Option<usize>> {
    let detected = detect_circles(gray, region, config.circles_for(kind));
    if detected.is_empty() {
        tracing::debug!(?kind, "no circle candidates in region");
        return vec![None; grid.rows];
    }

    let raw_mean_r = mean_radius(&detected).unwrap_or(config.fallback_radius);
    let n_detected = detected.len();
    let merged = merge_overlapping(detected, config.merge_dist_factor * raw_mean_r);
    tracing::debug!(
        ?kind,
        n_detected,
        n_merged = merged.len(),
        mean_radius = raw_mean_r,
        "region candidates after dedup"
    );

    let mean_r = mean_radius(&merged).unwrap_or(config.fallback_radius);
    let rows = group_rows(&merged, grid.rows, config.row_gap_factor * mean_r);
    let span = match ColumnSpan::of(&merged) {
        Some(span) => span,
        None => return vec![None; grid.rows],
    };

    rows.iter()
        .map(|row| {
            let slots = map_columns(row, &span, grid.cols, mean_r);
            let scored = score_row(gray, &slots, &config.score);
            decide_row(&scored, &config.decision)
        })
        .collect()
}

fn read_fixed_offset(
    gray: &GrayImage,
    region: &RegionBox,
    grid: &GridSpec,
    config: &ScanConfig,
) -> Vec<Option<usize>> {
    (0..grid.rows)
        .map(|row| {
            let slots: Vec<Slot> = fixed_offset::row_slots(region, grid, row, &config.fixed_offset)
                .into_iter()
                .map(|circle| Slot {
                    circle,
                    synthesized: true,
                })
                .collect();
            let scored = score_row(gray, &slots, &config.score);
            decide_row(&scored, &config.decision)
        })
        .collect()
}

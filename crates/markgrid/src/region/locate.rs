//! Locating the three rectangular reference frames on a page.
//!
//! The printed sheet carries a rectangular frame around each answer region.
//! After locally-normalized binarization, the frames appear as external
//! contours that simplify to quadrilaterals; role assignment is purely
//! spatial (bottom frame = answers, remaining two left-to-right =
//! identifier, group), so no anchor marks or templates are required.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use crate::config::LocateConfig;
use crate::preprocess::{binarize_local_mean, blur_gray};

/// Axis-aligned bounding box of a located region, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegionBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl RegionBox {
    /// Bounding box of a point set, clamped to the image.
    fn of_points(points: &[Point<i32>], width: u32, height: u32) -> Self {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let x = min_x.clamp(0, width.saturating_sub(1) as i32) as u32;
        let y = min_y.clamp(0, height.saturating_sub(1) as i32) as u32;
        let right = max_x.clamp(0, width as i32) as u32;
        let bottom = max_y.clamp(0, height as i32) as u32;
        Self {
            x,
            y,
            w: right.saturating_sub(x).max(1),
            h: bottom.saturating_sub(y).max(1),
        }
    }

    /// Center of the box.
    pub fn center(&self) -> [f32; 2] {
        [
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        ]
    }
}

/// The three located reference frames of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetRegions {
    pub identifier: RegionBox,
    pub group: RegionBox,
    pub answers: RegionBox,
    /// True when only one top frame was found and it serves both the
    /// identifier and group roles (degraded fallback).
    pub shared_identity_block: bool,
}

/// Diagnostics from the location pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateStats {
    /// Number of quadrilateral frames that survived filtering.
    pub n_quadrilaterals: usize,
    /// True when identifier and group share one frame.
    pub shared_identity_block: bool,
}

/// Signed shoelace area of a closed contour.
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (acc as f64 / 2.0).abs()
}

/// Find candidate quadrilateral frames in a binarized page.
fn find_quads(bin: &GrayImage, config: &LocateConfig) -> Vec<RegionBox> {
    let (w, h) = bin.dimensions();
    let contours = find_contours::<i32>(bin);
    let mut quads = Vec::new();
    for contour in &contours {
        // External contours only: top-level outer borders, as a frame's own
        // outline is while the bubbles it encloses are not.
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        if contour.points.len() < 4 {
            continue;
        }
        let perimeter = arc_length(&contour.points, true);
        let approx =
            approximate_polygon_dp(&contour.points, config.approx_eps_frac * perimeter, true);
        if approx.len() != 4 {
            continue;
        }
        if contour_area(&contour.points) < config.min_quad_area {
            continue;
        }
        quads.push(RegionBox::of_points(&contour.points, w, h));
    }
    quads
}

/// Assign frames to roles by position: the lowest frame is the answer
/// block; of the rest, the leftmost is the identifier and the next the
/// group. With a single remaining frame, it serves both roles.
fn assign_roles(mut quads: Vec<RegionBox>) -> Option<SheetRegions> {
    if quads.len() < 3 {
        return None;
    }
    quads.sort_by_key(|q| q.y);
    let answers = quads.pop().expect("len >= 3");
    quads.sort_by_key(|q| q.x);

    let (identifier, group, shared) = if quads.len() >= 2 {
        (quads[0], quads[1], false)
    } else {
        (quads[0], quads[0], true)
    };

    Some(SheetRegions {
        identifier,
        group,
        answers,
        shared_identity_block: shared,
    })
}

/// Locate the three reference frames.
///
/// Returns `None` when fewer than three quadrilaterals are found; the
/// caller degrades to an all-unknown page rather than erroring.
pub(crate) fn locate_regions(
    gray: &GrayImage,
    config: &LocateConfig,
) -> (Option<SheetRegions>, LocateStats) {
    let blurred = blur_gray(gray, config.blur_sigma);
    let bin = binarize_local_mean(&blurred, config.block_radius, config.offset);
    let quads = find_quads(&bin, config);
    let n_quadrilaterals = quads.len();

    let regions = assign_roles(quads);
    match &regions {
        None => {
            tracing::warn!(
                n_quadrilaterals,
                "fewer than 3 reference frames found; page degrades to unknown"
            );
        }
        Some(r) if r.shared_identity_block => {
            tracing::warn!("single top frame assigned to both identifier and group");
        }
        Some(r) => {
            tracing::debug!(
                n_quadrilaterals,
                identifier = ?r.identifier,
                group = ?r.group,
                answers = ?r.answers,
                "reference frames located"
            );
        }
    }

    let stats = LocateStats {
        n_quadrilaterals,
        shared_identity_block: regions.map(|r| r.shared_identity_block).unwrap_or(false),
    };
    (regions, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_rect_outline;
    use image::Luma;

    fn page_with_frames(frames: &[RegionBox]) -> GrayImage {
        let mut img = GrayImage::from_pixel(400, 500, Luma([225u8]));
        for f in frames {
            draw_rect_outline(&mut img, f.x, f.y, f.w, f.h, 3, 25);
        }
        img
    }

    #[test]
    fn three_frames_are_assigned_by_position() {
        let identifier = RegionBox { x: 30, y: 40, w: 120, h: 90 };
        let group = RegionBox { x: 230, y: 50, w: 120, h: 70 };
        let answers = RegionBox { x: 40, y: 250, w: 300, h: 200 };
        let img = page_with_frames(&[answers, identifier, group]);

        let (regions, stats) = locate_regions(&img, &LocateConfig::default());
        let regions = regions.expect("three frames should be found");
        assert_eq!(stats.n_quadrilaterals, 3);
        assert!(!regions.shared_identity_block);

        // Located boxes trace the outside of the stroke, so compare centers.
        let close = |a: [f32; 2], b: [f32; 2]| {
            (a[0] - b[0]).abs() < 6.0 && (a[1] - b[1]).abs() < 6.0
        };
        assert!(close(regions.answers.center(), answers.center()));
        assert!(close(regions.identifier.center(), identifier.center()));
        assert!(close(regions.group.center(), group.center()));
    }

    #[test]
    fn two_frames_is_a_soft_failure() {
        let img = page_with_frames(&[
            RegionBox { x: 30, y: 40, w: 120, h: 90 },
            RegionBox { x: 40, y: 250, w: 300, h: 200 },
        ]);
        let (regions, stats) = locate_regions(&img, &LocateConfig::default());
        assert!(regions.is_none());
        assert_eq!(stats.n_quadrilaterals, 2);
    }

    #[test]
    fn blank_page_yields_no_regions() {
        let img = GrayImage::from_pixel(200, 200, Luma([230u8]));
        let (regions, stats) = locate_regions(&img, &LocateConfig::default());
        assert!(regions.is_none());
        assert_eq!(stats.n_quadrilaterals, 0);
    }

    #[test]
    fn assign_roles_orders_by_position() {
        let assigned = assign_roles(vec![
            RegionBox { x: 230, y: 48, w: 120, h: 70 },
            RegionBox { x: 40, y: 250, w: 300, h: 200 },
            RegionBox { x: 30, y: 40, w: 120, h: 90 },
        ])
        .expect("three quads");
        assert_eq!(assigned.answers.y, 250);
        assert_eq!(assigned.identifier.x, 30);
        assert_eq!(assigned.group.x, 230);
        assert!(!assigned.shared_identity_block);
    }

    #[test]
    fn extra_quads_still_assign_the_lowest_to_answers() {
        // Four frames: one spurious detection between the top row and the
        // answer block. Lowest stays answers, leftmost two tops win.
        let assigned = assign_roles(vec![
            RegionBox { x: 30, y: 40, w: 120, h: 90 },
            RegionBox { x: 230, y: 50, w: 120, h: 70 },
            RegionBox { x: 150, y: 180, w: 60, h: 40 },
            RegionBox { x: 40, y: 250, w: 300, h: 200 },
        ])
        .expect("four quads");
        assert_eq!(assigned.answers.y, 250);
        assert_eq!(assigned.identifier.x, 30);
        assert_eq!(assigned.group.x, 150);
    }

    #[test]
    fn small_noise_contours_are_rejected_by_area() {
        let mut img = page_with_frames(&[
            RegionBox { x: 30, y: 40, w: 120, h: 90 },
            RegionBox { x: 230, y: 50, w: 120, h: 70 },
            RegionBox { x: 40, y: 250, w: 300, h: 200 },
        ]);
        // A 4-px speck simplifies to a quad but sits far below the area floor.
        for dx in 0..2 {
            for dy in 0..2 {
                img.put_pixel(200 + dx, 200 + dy, Luma([20u8]));
            }
        }
        let (regions, stats) = locate_regions(&img, &LocateConfig::default());
        assert!(regions.is_some());
        assert_eq!(stats.n_quadrilaterals, 3);
    }
}

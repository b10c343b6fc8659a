//! Gradient-voting radial symmetry for candidate bubble detection.
//!
//! For each pixel with a strong gradient, votes are cast along the gradient
//! direction at distances in [r_min, r_max]. Both printed bubble outlines
//! and filled-in discs produce peaks in the accumulator at their centers
//! because gradient vectors from the rim converge radially. Each peak's
//! radius is then recovered from the radial gradient profile: the radius at
//! which the mean rim gradient is strongest.

use image::GrayImage;

use crate::config::CircleParams;
use crate::preprocess::blur_gray;
use crate::region::RegionBox;

use super::Circle;

/// Angular samples used when scanning the radial gradient profile.
const RADIUS_SCAN_RAYS: usize = 32;
/// Radial step of the profile scan (pixels).
const RADIUS_SCAN_STEP: f32 = 0.5;

/// Deposit a weighted vote into the accumulator using bilinear interpolation.
#[inline]
fn bilinear_add_in_bounds(accum: &mut [f32], stride: usize, x: f32, y: f32, weight: f32) {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let base = y0 * stride + x0;
    accum[base] += weight * (1.0 - fx) * (1.0 - fy);
    accum[base + 1] += weight * fx * (1.0 - fy);
    accum[base + stride] += weight * (1.0 - fx) * fy;
    accum[base + stride + 1] += weight * fx * fy;
}

/// Mean gradient magnitude along a circle of radius `r` around `(cx, cy)`.
fn rim_response(mag: &[f32], stride: usize, h: usize, cx: f32, cy: f32, r: f32) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for k in 0..RADIUS_SCAN_RAYS {
        let theta = k as f32 / RADIUS_SCAN_RAYS as f32 * 2.0 * std::f32::consts::PI;
        let x = cx + r * theta.cos();
        let y = cy + r * theta.sin();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let xi = x.round() as usize;
        let yi = y.round() as usize;
        if xi >= stride || yi >= h {
            continue;
        }
        sum += mag[yi * stride + xi];
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// Pick the radius whose rim response is strongest.
fn estimate_radius(
    mag: &[f32],
    stride: usize,
    h: usize,
    cx: f32,
    cy: f32,
    params: &CircleParams,
) -> f32 {
    let mut best_r = params.r_min;
    let mut best_response = f32::NEG_INFINITY;
    let mut r = params.r_min;
    while r <= params.r_max {
        let response = rim_response(mag, stride, h, cx, cy, r);
        if response > best_response {
            best_response = response;
            best_r = r;
        }
        r += RADIUS_SCAN_STEP;
    }
    best_r
}

/// Detect candidate bubbles inside a region crop.
///
/// Centers are returned in page coordinates. Candidates are sorted by
/// accumulator score (strongest first); detection frequently emits several
/// near-identical matches per printed bubble, which
/// [`super::merge_overlapping`] collapses afterwards.
pub fn detect_circles(gray: &GrayImage, region: &RegionBox, params: &CircleParams) -> Vec<Circle> {
    let crop = image::imageops::crop_imm(gray, region.x, region.y, region.w, region.h).to_image();
    let crop = blur_gray(&crop, params.blur_sigma);

    let (w, h) = crop.dimensions();
    if w < 4 || h < 4 || params.r_max < params.r_min {
        return Vec::new();
    }

    let gx = imageproc::gradients::horizontal_scharr(&crop);
    let gy = imageproc::gradients::vertical_scharr(&crop);
    let gx_raw = gx.as_raw();
    let gy_raw = gy.as_raw();

    let stride = w as usize;
    let h_usize = h as usize;
    let n = stride * h_usize;

    // Gradient magnitude, reused for voting threshold and radius recovery.
    let mut mag = vec![0.0f32; n];
    let mut max_mag = 0.0f32;
    for i in 0..n {
        let gxv = gx_raw[i] as f32;
        let gyv = gy_raw[i] as f32;
        let m = (gxv * gxv + gyv * gyv).sqrt();
        mag[i] = m;
        if m > max_mag {
            max_mag = m;
        }
    }
    if max_mag < 1e-6 {
        return Vec::new();
    }
    let threshold = params.grad_threshold * max_mag;

    let radii: Vec<f32> = {
        let mut radii = Vec::new();
        let mut r = params.r_min;
        while r <= params.r_max {
            radii.push(r);
            r += 1.0;
        }
        radii
    };
    if radii.is_empty() {
        return Vec::new();
    }

    // Vote accumulation along both gradient polarities: a filled mark votes
    // outward at its rim, a printed outline votes both ways.
    let mut accum = vec![0.0f32; n];
    let x_limit = (w - 1) as f32;
    let y_limit = (h - 1) as f32;
    for y in 0..h_usize {
        let y_base = y * stride;
        let yf = y as f32;
        for x in 0..stride {
            let idx = y_base + x;
            let m = mag[idx];
            if m < threshold {
                continue;
            }
            let inv_mag = 1.0 / m;
            let dx = gx_raw[idx] as f32 * inv_mag;
            let dy = gy_raw[idx] as f32 * inv_mag;
            let xf = x as f32;

            for &r in &radii {
                let vx_pos = xf + dx * r;
                let vy_pos = yf + dy * r;
                if vx_pos >= 0.0 && vx_pos < x_limit && vy_pos >= 0.0 && vy_pos < y_limit {
                    bilinear_add_in_bounds(&mut accum, stride, vx_pos, vy_pos, m);
                }

                let vx_neg = xf - dx * r;
                let vy_neg = yf - dy * r;
                if vx_neg >= 0.0 && vx_neg < x_limit && vy_neg >= 0.0 && vy_neg < y_limit {
                    bilinear_add_in_bounds(&mut accum, stride, vx_neg, vy_neg, m);
                }
            }
        }
    }

    // Smooth the accumulator so jittery rims still form one peak.
    let accum_img = image::ImageBuffer::<image::Luma<f32>, Vec<f32>>::from_raw(w, h, accum)
        .expect("accumulator dimensions match");
    let smoothed = imageproc::filter::gaussian_blur_f32(&accum_img, params.accum_sigma);
    let smoothed_data = smoothed.as_raw();

    let max_val = smoothed_data.iter().cloned().fold(0.0f32, f32::max);
    if max_val < 1e-6 {
        return Vec::new();
    }
    let vote_threshold = params.min_vote_frac * max_val;

    // Non-maximum suppression at the configured bubble separation.
    let nms_r = params.min_separation.ceil().max(1.0) as i32;
    let nms_r_sq = params.min_separation * params.min_separation;
    let mut nms_offsets = Vec::new();
    for dy in -nms_r..=nms_r {
        for dx in -nms_r..=nms_r {
            if dx == 0 && dy == 0 {
                continue;
            }
            if (dx * dx + dy * dy) as f32 > nms_r_sq {
                continue;
            }
            nms_offsets.push((dx, dy));
        }
    }

    let mut peaks: Vec<(f32, f32, f32)> = Vec::new();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let idx = y as usize * stride + x as usize;
            let val = smoothed_data[idx];
            if val < vote_threshold {
                continue;
            }
            let mut is_max = true;
            for &(dx, dy) in &nms_offsets {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                let nidx = ny as usize * stride + nx as usize;
                if smoothed_data[nidx] > val || (smoothed_data[nidx] == val && nidx < idx) {
                    is_max = false;
                    break;
                }
            }
            if is_max {
                peaks.push((x as f32, y as f32, val));
            }
        }
    }

    peaks.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());
    if let Some(cap) = params.max_candidates {
        peaks.truncate(cap.min(peaks.len()));
    }

    peaks
        .into_iter()
        .map(|(cx, cy, _)| {
            let radius = estimate_radius(&mag, stride, h_usize, cx, cy, params);
            Circle {
                center: [cx + region.x as f32, cy + region.y as f32],
                radius,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{draw_ring, fill_disc};
    use image::{GrayImage, Luma};

    fn whole_image_region(img: &GrayImage) -> RegionBox {
        let (w, h) = img.dimensions();
        RegionBox { x: 0, y: 0, w, h }
    }

    fn test_params() -> CircleParams {
        CircleParams {
            r_min: 5.0,
            r_max: 15.0,
            min_separation: 8.0,
            grad_threshold: 0.03,
            min_vote_frac: 0.2,
            accum_sigma: 1.5,
            blur_sigma: 0.0,
            max_candidates: None,
        }
    }

    #[test]
    fn filled_disc_center_and_radius_are_recovered() {
        let mut img = GrayImage::from_pixel(80, 80, Luma([210u8]));
        fill_disc(&mut img, 40.0, 40.0, 10.0, 30);

        let circles = detect_circles(&img, &whole_image_region(&img), &test_params());
        assert!(!circles.is_empty(), "should find at least one candidate");

        let best = &circles[0];
        let err = ((best.center[0] - 40.0).powi(2) + (best.center[1] - 40.0).powi(2)).sqrt();
        assert!(
            err < 3.0,
            "best candidate ({}, {}) should be within 3 px of (40, 40), error = {}",
            best.center[0],
            best.center[1],
            err
        );
        assert!(
            (best.radius - 10.0).abs() < 3.0,
            "radius {} should be near 10",
            best.radius
        );
    }

    #[test]
    fn printed_outline_is_detected_like_a_filled_mark() {
        let mut img = GrayImage::from_pixel(80, 80, Luma([210u8]));
        draw_ring(&mut img, 40.0, 40.0, 10.0, 2.0, 40);

        let circles = detect_circles(&img, &whole_image_region(&img), &test_params());
        assert!(!circles.is_empty());
        let best = &circles[0];
        let err = ((best.center[0] - 40.0).powi(2) + (best.center[1] - 40.0).powi(2)).sqrt();
        assert!(err < 3.0, "outline center error {} too large", err);
    }

    #[test]
    fn centers_are_mapped_back_to_page_coordinates() {
        let mut img = GrayImage::from_pixel(160, 120, Luma([210u8]));
        fill_disc(&mut img, 100.0, 70.0, 9.0, 30);

        let region = RegionBox { x: 60, y: 30, w: 80, h: 80 };
        let circles = detect_circles(&img, &region, &test_params());
        assert!(!circles.is_empty());
        let best = &circles[0];
        let err = ((best.center[0] - 100.0).powi(2) + (best.center[1] - 70.0).powi(2)).sqrt();
        assert!(err < 3.0, "page-space center error {} too large", err);
    }

    #[test]
    fn blank_crop_yields_no_candidates() {
        let img = GrayImage::from_pixel(60, 60, Luma([200u8]));
        let circles = detect_circles(&img, &whole_image_region(&img), &test_params());
        assert!(circles.is_empty());
    }
}

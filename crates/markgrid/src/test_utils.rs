//! Shared test utilities for image-based unit tests.
//!
//! Consolidated here so each test module draws synthetic sheets the same
//! way: dark ink on bright paper, filled marks as discs, blank bubbles as
//! printed outlines.

use image::{GrayImage, Luma};

use crate::region::RegionBox;

/// Paint a filled disc.
pub(crate) fn fill_disc(img: &mut GrayImage, cx: f32, cy: f32, radius: f32, value: u8) {
    let (w, h) = img.dimensions();
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
}

/// Paint an annular outline (a printed, unfilled bubble).
pub(crate) fn draw_ring(
    img: &mut GrayImage,
    cx: f32,
    cy: f32,
    radius: f32,
    half_width: f32,
    value: u8,
) {
    let (w, h) = img.dimensions();
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if (d - radius).abs() <= half_width {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
}

/// Paint a rectangular frame outline with the given stroke width.
pub(crate) fn draw_rect_outline(
    img: &mut GrayImage,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    stroke: u32,
    value: u8,
) {
    let (iw, ih) = img.dimensions();
    let x2 = (x + w).min(iw);
    let y2 = (y + h).min(ih);
    for yy in y..y2 {
        for xx in x..x2 {
            let on_band = xx < x + stroke
                || xx >= x2.saturating_sub(stroke)
                || yy < y + stroke
                || yy >= y2.saturating_sub(stroke);
            if on_band {
                img.put_pixel(xx, yy, Luma([value]));
            }
        }
    }
}

/// Paint a full answer region: frame outline plus a rows × cols bubble
/// grid laid out uniformly inside the frame minus the margins. `filled`
/// decides which (row, col) slots carry a pencil mark.
pub(crate) fn draw_bubble_region(
    img: &mut GrayImage,
    region: RegionBox,
    rows: usize,
    cols: usize,
    margin_x: f32,
    margin_y: f32,
    radius: f32,
    filled: impl Fn(usize, usize) -> bool,
) {
    draw_rect_outline(img, region.x, region.y, region.w, region.h, 3, 25);

    let spacing_x = if cols > 1 {
        (region.w as f32 - 2.0 * margin_x) / (cols - 1) as f32
    } else {
        0.0
    };
    let spacing_y = if rows > 1 {
        (region.h as f32 - 2.0 * margin_y) / (rows - 1) as f32
    } else {
        0.0
    };

    for row in 0..rows {
        for col in 0..cols {
            let cx = region.x as f32 + margin_x + col as f32 * spacing_x;
            let cy = region.y as f32 + margin_y + row as f32 * spacing_y;
            if filled(row, col) {
                fill_disc(img, cx, cy, radius, 30);
            } else {
                draw_ring(img, cx, cy, radius, 1.5, 60);
            }
        }
    }
}

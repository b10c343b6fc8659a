//! Page preprocessing: Gaussian smoothing and locally-normalized binarization.

use image::{GrayImage, Luma};

/// Gaussian-blur a `GrayImage` via `imageproc`, staying in f32 internally
/// to avoid quantization banding at small sigmas.
pub(crate) fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return img.clone();
    }
    let (w, h) = img.dimensions();
    let mut f = image::ImageBuffer::<Luma<f32>, Vec<f32>>::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.put_pixel(x, y, Luma([img.get_pixel(x, y)[0] as f32 / 255.0]));
        }
    }
    let blurred = imageproc::filter::gaussian_blur_f32(&f, sigma);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
            out.put_pixel(x, y, Luma([(v * 255.0).round() as u8]));
        }
    }
    out
}

/// Inverse binarization against a local mean.
///
/// A pixel becomes foreground (255) when it is darker than the mean of its
/// `(2·block_radius+1)²` neighborhood by more than `offset`. Ink survives
/// uneven illumination because the reference level follows the paper.
pub(crate) fn binarize_local_mean(img: &GrayImage, block_radius: u32, offset: u8) -> GrayImage {
    let means = imageproc::filter::box_filter(img, block_radius, block_radius);
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = img.get_pixel(x, y)[0];
            let m = means.get_pixel(x, y)[0];
            let fg = p < m.saturating_sub(offset);
            out.put_pixel(x, y, Luma([if fg { 255 } else { 0 }]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_page_has_no_foreground() {
        let img = GrayImage::from_pixel(64, 64, Luma([200u8]));
        let bin = binarize_local_mean(&img, 9, 3);
        assert!(bin.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn dark_stroke_on_bright_paper_becomes_foreground() {
        let mut img = GrayImage::from_pixel(64, 64, Luma([220u8]));
        for x in 10..54 {
            for y in 30..33 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        let bin = binarize_local_mean(&img, 9, 3);
        assert_eq!(bin.get_pixel(32, 31)[0], 255, "stroke must be foreground");
        assert_eq!(bin.get_pixel(5, 5)[0], 0, "paper must stay background");
    }

    #[test]
    fn binarization_tolerates_illumination_gradient() {
        // Paper brightness ramps 120 -> 240 across the page; a stroke of the
        // same relative darkness must be foreground on both ends.
        let mut img = GrayImage::new(128, 32);
        for y in 0..32 {
            for x in 0..128 {
                let paper = 120 + (x as u32 * 120 / 127) as u8;
                img.put_pixel(x, y, Luma([paper]));
            }
        }
        for x in 0..128 {
            for y in 14..17 {
                let paper = 120 + (x as u32 * 120 / 127) as u8;
                img.put_pixel(x, y, Luma([paper / 4]));
            }
        }
        let bin = binarize_local_mean(&img, 9, 3);
        assert_eq!(bin.get_pixel(10, 15)[0], 255);
        assert_eq!(bin.get_pixel(118, 15)[0], 255);
        assert_eq!(bin.get_pixel(10, 3)[0], 0);
        assert_eq!(bin.get_pixel(118, 29)[0], 0);
    }

    #[test]
    fn blur_preserves_dimensions_and_range() {
        let img = GrayImage::from_pixel(20, 10, Luma([128u8]));
        let out = blur_gray(&img, 1.5);
        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.pixels().all(|p| p[0] == 128));
    }
}

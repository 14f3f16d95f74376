use image::{DynamicImage, GrayImage, Luma};

use crate::config::{ThresholdConfig, ThresholdPolarity};
use crate::error::{RecognitionError, Result};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Grayscale then adaptive-mean binarization. Every output pixel is 0 or 255.
pub fn preprocess(img: &DynamicImage, config: &ThresholdConfig) -> Result<GrayImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(RecognitionError::InvalidImage {
            width: img.width(),
            height: img.height(),
        });
    }
    let gray = to_grayscale(img);
    Ok(adaptive_threshold(&gray, config))
}

/// Adaptive mean thresholding with replicated borders.
///
/// The local mean over a `block_size` square is rounded to the nearest
/// integer; a pixel is foreground in `Binary` polarity when it is strictly
/// greater than `mean - c`.
pub fn adaptive_threshold(gray: &GrayImage, config: &ThresholdConfig) -> GrayImage {
    let (width, height) = gray.dimensions();
    let radius = config.block_radius() as i64;
    let side = 2 * radius + 1;
    let count = (side * side) as u64;

    // Integral image over the border-replicated input, with one leading
    // row/column of zeros.
    let padded_w = width as i64 + 2 * radius;
    let padded_h = height as i64 + 2 * radius;
    let stride = (padded_w + 1) as usize;
    let mut integral = vec![0u64; stride * (padded_h + 1) as usize];
    for py in 0..padded_h {
        let sy = (py - radius).clamp(0, height as i64 - 1) as u32;
        let mut row_sum = 0u64;
        for px in 0..padded_w {
            let sx = (px - radius).clamp(0, width as i64 - 1) as u32;
            row_sum += gray.get_pixel(sx, sy)[0] as u64;
            let idx = (py as usize + 1) * stride + px as usize + 1;
            integral[idx] = integral[idx - stride] + row_sum;
        }
    }

    let mut binary = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            // Window in padded coordinates is [x, x + side) x [y, y + side).
            let (x0, y0) = (x as usize, y as usize);
            let (x1, y1) = (x0 + side as usize, y0 + side as usize);
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let mean = ((sum + count / 2) / count) as i32;
            let value = gray.get_pixel(x, y)[0] as i32;
            let above = value > mean - config.c;
            let foreground = match config.polarity {
                ThresholdPolarity::Binary => above,
                ThresholdPolarity::BinaryInverse => !above,
            };
            binary.put_pixel(x, y, Luma([if foreground { 255 } else { 0 }]));
        }
    }
    binary
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_zero_area_image_is_rejected() {
        let img = DynamicImage::new_rgb8(0, 10);
        let err = preprocess(&img, &ThresholdConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RecognitionError::InvalidImage {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn test_uniform_image_is_all_foreground() {
        let gray = GrayImage::from_pixel(20, 20, Luma([128u8]));
        let binary = adaptive_threshold(&gray, &ThresholdConfig::default());
        assert!(binary.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_thin_dark_line_becomes_background() {
        let mut img = RgbImage::from_pixel(30, 30, Rgb([255, 255, 255]));
        for y in 0..30 {
            for x in 14..17 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let binary = preprocess(&DynamicImage::ImageRgb8(img), &ThresholdConfig::default()).unwrap();
        assert_eq!(binary.get_pixel(15, 15)[0], 0);
        assert_eq!(binary.get_pixel(13, 15)[0], 255);
        assert_eq!(binary.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_inverse_polarity_flips_output() {
        let mut gray = GrayImage::from_pixel(30, 30, Luma([255u8]));
        gray.put_pixel(15, 15, Luma([0u8]));
        let config = ThresholdConfig {
            polarity: ThresholdPolarity::BinaryInverse,
            ..ThresholdConfig::default()
        };
        let binary = adaptive_threshold(&gray, &config);
        assert_eq!(binary.get_pixel(15, 15)[0], 255);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_output_is_strictly_binary() {
        let gray = GrayImage::from_fn(40, 40, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let binary = adaptive_threshold(&gray, &ThresholdConfig::default());
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}

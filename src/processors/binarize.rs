//! # Stage Definition: Binarization
//!
//! This stage is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: Single `image::RgbImage` (the page, or a table sub-image).
//! - **Outputs**: Inverted binary `image::GrayImage` where ink (rulings and
//!   glyphs) is foreground (255) and paper is background (0).
//! - **Logging**: Traces the chosen threshold and whether histogram
//!   equalization ran.
//! - **Invariants**:
//!     - Every output pixel is exactly 0 or 255.
//!     - Output dimensions equal input dimensions.
//!     - The threshold is chosen per image (Otsu), never a fixed constant.

use image::{GrayImage, RgbImage, imageops};
use imageproc::contrast::{ThresholdType, equalize_histogram, otsu_level, threshold};

/// Converts a page image into an inverted binary ink mask.
///
/// Low-contrast scans are equalized before thresholding so Otsu has a
/// bimodal histogram to split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binarizer {
    /// Grayscale standard deviation below which histogram equalization
    /// runs before thresholding.
    pub equalize_below_std: f32,
}

impl Default for Binarizer {
    fn default() -> Self {
        Self {
            equalize_below_std: 30.0,
        }
    }
}

impl Binarizer {
    /// Creates a binarizer with the default contrast policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the inverted binary mask for `image`.
    pub fn binarize(&self, image: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(image);
        let spread = grayscale_std(&gray);

        let gray = if spread < self.equalize_below_std {
            tracing::debug!(
                target: "grid",
                std = spread,
                "low contrast input, equalizing histogram before threshold"
            );
            equalize_histogram(&gray)
        } else {
            gray
        };

        let level = otsu_level(&gray);
        tracing::debug!(target: "grid", otsu_level = level, "binarizing page");

        // Ink is darker than paper; inverted thresholding makes it foreground.
        threshold(&gray, level, ThresholdType::BinaryInverted)
    }
}

/// Standard deviation of the grayscale intensities.
fn grayscale_std(gray: &GrayImage) -> f32 {
    let n = f64::from(gray.width()) * f64::from(gray.height());
    if n == 0.0 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for pixel in gray.pixels() {
        let v = f64::from(pixel.0[0]);
        sum += v;
        sum_sq += v * v;
    }
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0).sqrt() as f32
}

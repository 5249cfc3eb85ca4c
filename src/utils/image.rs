//! Image loading utilities.

use crate::core::{OcrResult, TableOcrError};
use image::RgbImage;
use std::path::Path;

/// Loads an image from a file path and converts it to RGB.
///
/// Any format supported by the `image` crate is accepted; paletted and
/// grayscale sources are expanded to 8-bit RGB.
///
/// # Arguments
///
/// * `path` - The path to the image file
///
/// # Returns
///
/// A Result containing the loaded RGB image or a [`TableOcrError::ImageLoad`]
/// if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> OcrResult<RgbImage> {
    let img = image::open(path).map_err(TableOcrError::ImageLoad)?;
    Ok(img.to_rgb8())
}

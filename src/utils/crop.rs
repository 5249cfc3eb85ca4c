//! Axis-aligned image cropping for cell and region extraction.

use crate::processors::BoundingBox;
use image::{RgbImage, imageops};

/// Crops an axis-aligned rectangular region out of an image.
///
/// The region is clamped to the image boundaries before slicing, so bounds
/// that extend past an edge yield the visible portion rather than an error.
///
/// # Arguments
///
/// * `image` - The source image
/// * `bounds` - The rectangle to crop, in source pixel coordinates
///
/// # Returns
///
/// * `Some(RgbImage)` - The cropped region
/// * `None` - If the clamped region is empty (zero width or height)
pub fn crop_region(image: &RgbImage, bounds: &BoundingBox) -> Option<RgbImage> {
    let x1 = (bounds.x.max(0.0) as u32).min(image.width());
    let y1 = (bounds.y.max(0.0) as u32).min(image.height());
    let x2 = (bounds.right().max(0.0) as u32).min(image.width());
    let y2 = (bounds.bottom().max(0.0) as u32).min(image.height());

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    // Immutable zero-copy view, then materialize into an owned buffer.
    Some(imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        let mut img = ImageBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                img.put_pixel(x, y, Rgb([r, g, 128]));
            }
        }
        img
    }

    #[test]
    fn test_crop_region_interior() {
        let img = gradient_image(100, 100);
        let bounds = BoundingBox::new(10.0, 20.0, 40.0, 30.0);

        let cropped = crop_region(&img, &bounds).unwrap();
        assert_eq!(cropped.dimensions(), (40, 30));
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(10, 20));
        assert_eq!(cropped.get_pixel(39, 29), img.get_pixel(49, 49));
    }

    #[test]
    fn test_crop_region_clamps_to_image_edges() {
        let img = gradient_image(100, 100);
        let bounds = BoundingBox::new(80.0, 90.0, 50.0, 50.0);

        let cropped = crop_region(&img, &bounds).unwrap();
        assert_eq!(cropped.dimensions(), (20, 10));
    }

    #[test]
    fn test_crop_region_negative_origin_clamped() {
        let img = gradient_image(100, 100);
        let bounds = BoundingBox::new(-10.0, -5.0, 30.0, 25.0);

        let cropped = crop_region(&img, &bounds).unwrap();
        // Origin clamps to (0, 0); the span past the origin survives.
        assert_eq!(cropped.dimensions(), (20, 20));
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(0, 0));
    }

    #[test]
    fn test_crop_region_empty_bounds() {
        let img = gradient_image(100, 100);
        let bounds = BoundingBox::new(50.0, 50.0, 0.0, 10.0);

        assert!(crop_region(&img, &bounds).is_none());
    }

    #[test]
    fn test_crop_region_fully_outside_image() {
        let img = gradient_image(100, 100);
        let bounds = BoundingBox::new(200.0, 200.0, 40.0, 40.0);

        assert!(crop_region(&img, &bounds).is_none());
    }
}

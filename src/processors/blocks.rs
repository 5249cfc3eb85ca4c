//! # Stage Definition: Word Block Detection (contour strategy)
//!
//! This stage is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: Inverted binary ink mask ([`crate::processors::Binarizer`]
//!   output) and a [`ContourTuning`].
//! - **Outputs**: One [`BoundingBox`] per connected text block of the
//!   dilated mask, unordered. Row and column order is assigned later by
//!   row clustering.
//! - **Logging**: Traces contour and block counts.
//! - **Invariants**:
//!     - Every returned box has width ≥ 1 and height ≥ 1 pixels.
//!     - Hole borders (contours inside another block) never produce boxes.
//!     - With `min_box_area == 0` no box is filtered.

use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};

use crate::core::config::ContourTuning;
use crate::processors::geometry::BoundingBox;
use crate::processors::morphology::dilate_rect;

/// Merges glyphs into word blocks by dilating the ink mask.
///
/// Two rounds: a wide flat kernel closes the gaps between characters in a
/// line, then a square kernel fuses the resulting word strips into solid
/// blocks.
pub fn merge_words(mask: &GrayImage, tuning: &ContourTuning) -> GrayImage {
    let words = dilate_rect(
        mask,
        tuning.word_kernel_width,
        tuning.word_kernel_height,
        tuning.word_dilate_iterations,
    );
    dilate_rect(
        &words,
        tuning.block_kernel_size,
        tuning.block_kernel_size,
        tuning.block_dilate_iterations,
    )
}

/// Extracts one bounding box per connected block of the merged mask.
///
/// Boxes smaller than `min_box_area` square pixels are dropped; zero
/// disables the filter.
pub fn find_word_blocks(merged: &GrayImage, min_box_area: u32) -> Vec<BoundingBox> {
    let contours = find_contours::<i32>(merged);
    let total = contours.len();

    let mut blocks = Vec::new();
    for contour in &contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let Some(bbox) = contour_bounding_box(contour) else {
            continue;
        };
        if min_box_area > 0 && bbox.area() < min_box_area as f32 {
            continue;
        }
        blocks.push(bbox);
    }

    tracing::debug!(
        target: "grid",
        contours = total,
        blocks = blocks.len(),
        "converted contours to word blocks"
    );
    blocks
}

/// Axis-aligned bounds of a traced contour, inclusive of its pixels.
fn contour_bounding_box(contour: &Contour<i32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.x, first.y);
    for point in &contour.points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    // A one-pixel contour still spans one pixel.
    BoundingBox::from_extents(
        min_x as f32,
        min_y as f32,
        (max_x + 1) as f32,
        (max_y + 1) as f32,
    )
}

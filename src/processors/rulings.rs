//! # Stage Definition: Ruling Line Detection (ruling-line strategy)
//!
//! This stage is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: Inverted binary ink mask and a [`RulingTuning`].
//! - **Outputs**: Axis-aligned horizontal and vertical [`LineSegment`]s,
//!   one per physical ruling, sorted top-to-bottom / left-to-right.
//! - **Logging**: Traces the derived kernel length, raw segment counts per
//!   axis and merged ruling counts.
//! - **Invariants**:
//!     - Every emitted segment is axis-aligned at an in-image coordinate.
//!     - Merged spans cover the union of their evidence extended by three
//!       kernel lengths per side, so border rulings cross perpendiculars.
//!     - Within one axis, emitted perpendicular coordinates are strictly
//!       ascending and pairwise further apart than the merge band.
//!
//! Rulings are isolated by morphological opening with a long thin kernel
//! sized relative to the image width: glyph strokes are shorter than the
//! kernel and vanish, table rulings survive. A Hough transform over the
//! isolated mask yields near-axis polar lines; each is snapped onto its
//! axis, its span recovered from mask evidence, and collinear detections
//! merged into one ruling per band.

use image::GrayImage;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};

use crate::core::config::RulingTuning;
use crate::processors::geometry::LineSegment;
use crate::processors::morphology::open_rect;

/// Polar peaks closer than this (in `(r, θ°)` space) collapse into the
/// strongest one. A single thick or slightly skewed ruling votes into a
/// small neighborhood of bins; this keeps one peak per ruling while
/// leaving distinct rulings (further apart than any plausible row height)
/// untouched.
const SUPPRESSION_RADIUS: u32 = 8;

/// How far (in degrees) a polar angle may deviate from its axis and still
/// be snapped onto it.
const AXIS_SNAP_DEGREES: u32 = 2;

/// Which ruling direction a mask or segment set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulingAxis {
    Horizontal,
    Vertical,
}

impl RulingAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulingAxis::Horizontal => "horizontal",
            RulingAxis::Vertical => "vertical",
        }
    }
}

/// Kernel length for ruling isolation, derived from the image width.
///
/// Both axes share the width-derived length; it also sizes the merge band
/// and the span extension downstream.
pub fn ruling_kernel_length(image_width: u32, divisor: u32) -> u32 {
    (image_width / divisor.max(1)).max(1)
}

/// Keeps only horizontal strokes at least `kernel_len` pixels long.
pub fn isolate_horizontal_rulings(mask: &GrayImage, kernel_len: u32, iterations: u32) -> GrayImage {
    open_rect(mask, kernel_len, 1, iterations)
}

/// Keeps only vertical strokes at least `kernel_len` pixels long.
pub fn isolate_vertical_rulings(mask: &GrayImage, kernel_len: u32, iterations: u32) -> GrayImage {
    open_rect(mask, 1, kernel_len, iterations)
}

/// Detects axis-aligned segments in an isolated ruling mask.
///
/// The Hough vote threshold scales with the image extent along the axis
/// (`extent / min_span_divisor`), so a detection must span a meaningful
/// fraction of the table. Each surviving polar peak is snapped onto the
/// axis and its span recovered from the mask itself; peaks without mask
/// evidence at their snapped coordinate are dropped as phantoms.
pub fn detect_segments(
    isolated: &GrayImage,
    axis: RulingAxis,
    min_span_divisor: u32,
) -> Vec<LineSegment> {
    let (width, height) = isolated.dimensions();
    let extent = match axis {
        RulingAxis::Horizontal => width,
        RulingAxis::Vertical => height,
    };
    let options = LineDetectionOptions {
        vote_threshold: (extent / min_span_divisor.max(1)).max(1),
        suppression_radius: SUPPRESSION_RADIUS,
    };
    let polar = detect_lines(isolated, options);

    let mut segments = Vec::new();
    for line in &polar {
        match axis {
            RulingAxis::Horizontal => {
                let Some(y) = snap_horizontal(line, width) else {
                    continue;
                };
                if y < 0 || y >= height as i32 {
                    continue;
                }
                if let Some((x1, x2)) = horizontal_span(isolated, y) {
                    segments.push(LineSegment::horizontal(x1, x2, y));
                }
            }
            RulingAxis::Vertical => {
                let Some(x) = snap_vertical(line, height) else {
                    continue;
                };
                if x < 0 || x >= width as i32 {
                    continue;
                }
                if let Some((y1, y2)) = vertical_span(isolated, x) {
                    segments.push(LineSegment::vertical(x, y1, y2));
                }
            }
        }
    }

    tracing::debug!(
        target: "grid",
        axis = axis.as_str(),
        polar_peaks = polar.len(),
        segments = segments.len(),
        "detected ruling segments"
    );
    segments
}

/// Merges collinear detections into one ruling per perpendicular band.
///
/// Repeatedly takes the segment with the smallest perpendicular coordinate
/// as seed, absorbs every segment within `band` pixels of it, and emits a
/// single segment at the seed coordinate spanning the union of the
/// absorbed spans extended by `extension` on both ends. Output is sorted
/// by perpendicular coordinate by construction.
pub fn merge_collinear_segments(
    segments: Vec<LineSegment>,
    axis: RulingAxis,
    band: i32,
    extension: i32,
) -> Vec<LineSegment> {
    let triples: Vec<(i32, i32, i32)> = segments
        .iter()
        .map(|s| match axis {
            RulingAxis::Horizontal => (s.y1, s.x1, s.x2),
            RulingAxis::Vertical => (s.x1, s.y1, s.y2),
        })
        .collect();

    let merged = merge_axis_triples(triples, band, extension);
    merged
        .into_iter()
        .map(|(perp, lo, hi)| match axis {
            RulingAxis::Horizontal => LineSegment::horizontal(lo, hi, perp),
            RulingAxis::Vertical => LineSegment::vertical(perp, lo, hi),
        })
        .collect()
}

/// Band-merge over `(perpendicular, span start, span end)` triples.
fn merge_axis_triples(
    mut remaining: Vec<(i32, i32, i32)>,
    band: i32,
    extension: i32,
) -> Vec<(i32, i32, i32)> {
    let mut merged = Vec::new();
    while let Some(seed) = remaining.iter().map(|&(p, _, _)| p).min() {
        let (absorbed, rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|&(p, _, _)| (p - seed).abs() <= band);
        remaining = rest;

        let mut lo = i32::MAX;
        let mut hi = i32::MIN;
        for &(_, start, end) in &absorbed {
            lo = lo.min(start);
            hi = hi.max(end);
        }
        merged.push((seed, lo - extension, hi + extension));
    }
    merged
}

/// Snaps a near-horizontal polar line (θ around 90°) to its y coordinate,
/// evaluated at the horizontal center of the image.
fn snap_horizontal(line: &PolarLine, image_width: u32) -> Option<i32> {
    let theta = line.angle_in_degrees;
    if theta.abs_diff(90) > AXIS_SNAP_DEGREES {
        return None;
    }
    let rad = (theta as f32).to_radians();
    let x_center = image_width as f32 / 2.0;
    let y = (line.r - x_center * rad.cos()) / rad.sin();
    Some(y.round() as i32)
}

/// Snaps a near-vertical polar line (θ around 0° or 180°) to its x
/// coordinate, evaluated at the vertical center of the image.
fn snap_vertical(line: &PolarLine, image_height: u32) -> Option<i32> {
    let theta = line.angle_in_degrees;
    if theta > AXIS_SNAP_DEGREES && theta < 180 - AXIS_SNAP_DEGREES {
        return None;
    }
    let rad = (theta as f32).to_radians();
    let y_center = image_height as f32 / 2.0;
    let x = (line.r - y_center * rad.sin()) / rad.cos();
    Some(x.round() as i32)
}

/// Foreground x-extent in a one-pixel band around row `y`.
///
/// `None` when the band holds no foreground or row `y` itself is blank,
/// which marks the polar peak as a phantom.
fn horizontal_span(mask: &GrayImage, y: i32) -> Option<(i32, i32)> {
    let (width, height) = mask.dimensions();
    let y0 = (y - 1).max(0);
    let y1 = (y + 1).min(height as i32 - 1);

    let mut span: Option<(i32, i32)> = None;
    let mut center_hit = false;
    for yy in y0..=y1 {
        for x in 0..width as i32 {
            if mask.get_pixel(x as u32, yy as u32).0[0] > 0 {
                span = Some(match span {
                    None => (x, x),
                    Some((lo, hi)) => (lo.min(x), hi.max(x)),
                });
                center_hit |= yy == y;
            }
        }
    }
    if center_hit { span } else { None }
}

/// Foreground y-extent in a one-pixel band around column `x`, mirroring
/// [`horizontal_span`].
fn vertical_span(mask: &GrayImage, x: i32) -> Option<(i32, i32)> {
    let (width, height) = mask.dimensions();
    let x0 = (x - 1).max(0);
    let x1 = (x + 1).min(width as i32 - 1);

    let mut span: Option<(i32, i32)> = None;
    let mut center_hit = false;
    for xx in x0..=x1 {
        for y in 0..height as i32 {
            if mask.get_pixel(xx as u32, y as u32).0[0] > 0 {
                span = Some(match span {
                    None => (y, y),
                    Some((lo, hi)) => (lo.min(y), hi.max(y)),
                });
                center_hit |= xx == x;
            }
        }
    }
    if center_hit { span } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn draw_horizontal(mask: &mut GrayImage, y: u32, x1: u32, x2: u32) {
        for x in x1..=x2 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    fn draw_vertical(mask: &mut GrayImage, x: u32, y1: u32, y2: u32) {
        for y in y1..=y2 {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    #[test]
    fn test_kernel_length_scales_with_width() {
        assert_eq!(ruling_kernel_length(1000, 120), 8);
        assert_eq!(ruling_kernel_length(2400, 120), 20);
        // Narrow images never degrade to a zero kernel.
        assert_eq!(ruling_kernel_length(100, 120), 1);
    }

    #[test]
    fn test_detects_single_horizontal_ruling() {
        let mut mask = GrayImage::new(200, 100);
        draw_horizontal(&mut mask, 30, 20, 180);

        let segments = detect_segments(&mask, RulingAxis::Horizontal, 10);
        assert!(!segments.is_empty());

        let merged = merge_collinear_segments(segments, RulingAxis::Horizontal, 1, 3);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].y1, 30);
        assert_eq!(merged[0].x1, 17);
        assert_eq!(merged[0].x2, 183);
    }

    #[test]
    fn test_detects_single_vertical_ruling() {
        let mut mask = GrayImage::new(200, 100);
        draw_vertical(&mut mask, 60, 10, 90);

        let segments = detect_segments(&mask, RulingAxis::Vertical, 10);
        assert!(!segments.is_empty());

        let merged = merge_collinear_segments(segments, RulingAxis::Vertical, 1, 3);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].x1, 60);
        assert_eq!(merged[0].y1, 7);
        assert_eq!(merged[0].y2, 93);
    }

    #[test]
    fn test_thick_ruling_merges_to_one_segment() {
        let mut mask = GrayImage::new(240, 120);
        for y in 40..=42 {
            draw_horizontal(&mut mask, y, 10, 230);
        }

        let segments = detect_segments(&mask, RulingAxis::Horizontal, 10);
        let merged = merge_collinear_segments(segments, RulingAxis::Horizontal, 3, 6);
        assert_eq!(merged.len(), 1);
        assert!((40..=42).contains(&merged[0].y1));
    }

    #[test]
    fn test_distinct_rulings_stay_separate() {
        let mut mask = GrayImage::new(200, 100);
        draw_horizontal(&mut mask, 20, 10, 190);
        draw_horizontal(&mut mask, 70, 10, 190);

        let segments = detect_segments(&mask, RulingAxis::Horizontal, 10);
        let merged = merge_collinear_segments(segments, RulingAxis::Horizontal, 2, 3);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].y1, 20);
        assert_eq!(merged[1].y1, 70);
    }

    #[test]
    fn test_merge_uses_seed_coordinate_and_union_span() {
        let segments = vec![
            LineSegment::horizontal(30, 90, 11),
            LineSegment::horizontal(10, 60, 10),
            LineSegment::horizontal(50, 120, 13),
        ];
        let merged = merge_collinear_segments(segments, RulingAxis::Horizontal, 1, 5);

        // Seeds at 10 (absorbing 11) and 13.
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].y1, 10);
        assert_eq!((merged[0].x1, merged[0].x2), (5, 95));
        assert_eq!(merged[1].y1, 13);
        assert_eq!((merged[1].x1, merged[1].x2), (45, 125));
    }

    #[test]
    fn test_opening_removes_glyph_noise() {
        let mut mask = GrayImage::new(200, 100);
        draw_horizontal(&mut mask, 30, 20, 180);
        // Glyph-sized blobs shorter than the kernel.
        for (bx, by) in [(40u32, 60u32), (90, 55), (140, 62)] {
            for y in by..by + 2 {
                for x in bx..bx + 2 {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }

        let opened = isolate_horizontal_rulings(&mask, 8, 3);
        for (_, y, p) in opened.enumerate_pixels() {
            if p.0[0] > 0 {
                assert_eq!(y, 30);
            }
        }
        assert!(opened.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn test_phantom_peaks_without_evidence_are_dropped() {
        // Empty mask: no segments regardless of axis.
        let mask = GrayImage::new(100, 100);
        assert!(detect_segments(&mask, RulingAxis::Horizontal, 10).is_empty());
        assert!(detect_segments(&mask, RulingAxis::Vertical, 10).is_empty());
    }
}

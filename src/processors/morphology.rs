//! Binary morphology with rectangular structuring elements.
//!
//! Ruling isolation and word clustering both need wide-or-tall box kernels
//! (for example 1×k to keep only vertical strokes). Box erosion and
//! dilation are separable, so each operation runs as a horizontal pass
//! followed by a vertical pass using per-row/per-column prefix sums.
//!
//! Masks are binary `GrayImage`s: any value above 0 counts as foreground,
//! output pixels are exactly 0 or 255. Pixels outside the image count as
//! background, so erosion clips runs that touch the border.

use image::{GrayImage, Luma};

/// Dilates `mask` with a `kernel_width` × `kernel_height` box, repeated
/// `iterations` times. Zero iterations returns the mask unchanged.
pub fn dilate_rect(
    mask: &GrayImage,
    kernel_width: u32,
    kernel_height: u32,
    iterations: u32,
) -> GrayImage {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = box_pass(&current, kernel_width, kernel_height, Op::Dilate);
    }
    current
}

/// Erodes `mask` with a `kernel_width` × `kernel_height` box, repeated
/// `iterations` times. Zero iterations returns the mask unchanged.
pub fn erode_rect(
    mask: &GrayImage,
    kernel_width: u32,
    kernel_height: u32,
    iterations: u32,
) -> GrayImage {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = box_pass(&current, kernel_width, kernel_height, Op::Erode);
    }
    current
}

/// Morphological opening: erosion followed by dilation with the same
/// kernel and iteration count.
///
/// With a long thin kernel this keeps only strokes at least as long as the
/// kernel in its major direction, which is how ruling lines are isolated
/// from glyphs.
pub fn open_rect(
    mask: &GrayImage,
    kernel_width: u32,
    kernel_height: u32,
    iterations: u32,
) -> GrayImage {
    let eroded = erode_rect(mask, kernel_width, kernel_height, iterations);
    dilate_rect(&eroded, kernel_width, kernel_height, iterations)
}

#[derive(Clone, Copy, PartialEq)]
enum Op {
    Dilate,
    Erode,
}

fn box_pass(mask: &GrayImage, kernel_width: u32, kernel_height: u32, op: Op) -> GrayImage {
    let horizontal = row_pass(mask, kernel_width.max(1), op);
    column_pass(&horizontal, kernel_height.max(1), op)
}

/// One-dimensional pass along rows. The kernel anchor sits at index
/// `kernel / 2`, matching the usual box-kernel convention for even sizes.
fn row_pass(mask: &GrayImage, kernel: u32, op: Op) -> GrayImage {
    if kernel <= 1 {
        return mask.clone();
    }
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    let left = i64::from(kernel / 2);
    let right = i64::from(kernel - 1 - kernel / 2);
    let w = i64::from(width);

    let mut prefix = vec![0u32; width as usize + 1];
    for y in 0..height {
        for x in 0..width {
            let fg = u32::from(mask.get_pixel(x, y).0[0] > 0);
            prefix[x as usize + 1] = prefix[x as usize] + fg;
        }
        for x in 0..w {
            let lo = (x - left).max(0) as usize;
            let hi = (x + right).min(w - 1) as usize;
            let count = prefix[hi + 1] - prefix[lo];
            let on = match op {
                Op::Dilate => count > 0,
                // Clipped windows cannot reach the full kernel count.
                Op::Erode => count == kernel,
            };
            out.put_pixel(x as u32, y as u32, Luma([if on { 255 } else { 0 }]));
        }
    }
    out
}

/// One-dimensional pass along columns, mirroring [`row_pass`].
fn column_pass(mask: &GrayImage, kernel: u32, op: Op) -> GrayImage {
    if kernel <= 1 {
        return mask.clone();
    }
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    let top = i64::from(kernel / 2);
    let bottom = i64::from(kernel - 1 - kernel / 2);
    let h = i64::from(height);

    let mut prefix = vec![0u32; height as usize + 1];
    for x in 0..width {
        for y in 0..height {
            let fg = u32::from(mask.get_pixel(x, y).0[0] > 0);
            prefix[y as usize + 1] = prefix[y as usize] + fg;
        }
        for y in 0..h {
            let lo = (y - top).max(0) as usize;
            let hi = (y + bottom).min(h - 1) as usize;
            let count = prefix[hi + 1] - prefix[lo];
            let on = match op {
                Op::Dilate => count > 0,
                Op::Erode => count == kernel,
            };
            out.put_pixel(x as u32, y as u32, Luma([if on { 255 } else { 0 }]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(width: u32, height: u32, foreground: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in foreground {
            mask.put_pixel(x, y, Luma([255]));
        }
        mask
    }

    fn foreground_of(mask: &GrayImage) -> Vec<(u32, u32)> {
        let mut on = Vec::new();
        for (x, y, p) in mask.enumerate_pixels() {
            if p.0[0] > 0 {
                on.push((x, y));
            }
        }
        on
    }

    #[test]
    fn test_dilate_grows_single_pixel_horizontally() {
        let mask = mask_with(9, 3, &[(4, 1)]);
        let dilated = dilate_rect(&mask, 5, 1, 1);
        assert_eq!(
            foreground_of(&dilated),
            vec![(2, 1), (3, 1), (4, 1), (5, 1), (6, 1)]
        );
    }

    #[test]
    fn test_erode_trims_run_ends() {
        let run: Vec<(u32, u32)> = (4..=8).map(|x| (x, 2)).collect();
        let mask = mask_with(16, 5, &run);
        let eroded = erode_rect(&mask, 3, 1, 1);
        assert_eq!(foreground_of(&eroded), vec![(5, 2), (6, 2), (7, 2)]);
    }

    #[test]
    fn test_erode_removes_runs_shorter_than_kernel() {
        let mask = mask_with(16, 3, &[(4, 1), (5, 1)]);
        let eroded = erode_rect(&mask, 3, 1, 1);
        assert!(foreground_of(&eroded).is_empty());
    }

    #[test]
    fn test_erode_clips_at_image_border() {
        let run: Vec<(u32, u32)> = (0..=4).map(|x| (x, 1)).collect();
        let mask = mask_with(8, 3, &run);
        let eroded = erode_rect(&mask, 3, 1, 1);
        // x = 0 has a clipped window and drops out.
        assert_eq!(foreground_of(&eroded), vec![(1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_opening_keeps_long_strokes_only() {
        let mut on: Vec<(u32, u32)> = (2..=17).map(|x| (x, 3)).collect(); // long horizontal
        on.extend((1..=6).map(|y| (10, y))); // short vertical
        on.push((5, 7)); // isolated dot
        let mask = mask_with(20, 9, &on);

        let opened = open_rect(&mask, 9, 1, 1);
        let fg = foreground_of(&opened);
        assert!(fg.iter().all(|&(_, y)| y == 3));
        assert!(fg.contains(&(10, 3)));
        assert!(!fg.contains(&(5, 7)));
    }

    #[test]
    fn test_iterated_dilation_matches_wider_kernel() {
        let mask = mask_with(15, 15, &[(7, 7)]);
        let twice = dilate_rect(&mask, 3, 3, 2);
        let wide = dilate_rect(&mask, 5, 5, 1);
        assert_eq!(foreground_of(&twice), foreground_of(&wide));
    }

    #[test]
    fn test_unit_kernel_is_identity() {
        let mask = mask_with(6, 6, &[(1, 1), (4, 3)]);
        let dilated = dilate_rect(&mask, 1, 1, 3);
        assert_eq!(foreground_of(&dilated), foreground_of(&mask));
    }
}

//! # Stage Definition: Cell Grid Construction (ruling-line strategy)
//!
//! This stage is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: [`IntersectionPoint`]s of merged rulings.
//! - **Outputs**: Rows of cell [`BoundingBox`]es, grouped by identical top
//!   coordinate, rows top-to-bottom, cells left-to-right.
//! - **Logging**: Traces point, cell and row counts.
//! - **Invariants**:
//!     - A cell is only emitted when all four of its corners are present in
//!       the point set, by exact integer equality.
//!     - Per top-left corner, the scan prefers the nearest right neighbor,
//!       then the nearest bottom neighbor; when an interior corner is
//!       missing the scan walks outward, so cells span merged regions
//!       instead of disappearing.
//!     - Duplicate input points are collapsed before scanning.

use std::collections::{BTreeMap, HashSet};

use crate::processors::geometry::{BoundingBox, IntersectionPoint};

/// Builds the cell grid from ruling intersection points.
///
/// Each point is treated as a candidate top-left corner. Its cell closes
/// at the first (right, bottom) candidate pair whose opposite corner
/// exists in the point set. Corners on the rightmost column or bottom row
/// have no such pair and produce no cell.
pub fn cells_from_intersections(points: &[IntersectionPoint]) -> Vec<Vec<BoundingBox>> {
    let point_set: HashSet<IntersectionPoint> = points.iter().copied().collect();
    let mut sorted: Vec<IntersectionPoint> = point_set.iter().copied().collect();
    sorted.sort();

    let mut row_map: BTreeMap<i32, Vec<BoundingBox>> = BTreeMap::new();
    let mut cell_count = 0usize;
    for &corner in &sorted {
        // Row-major order keeps these candidate lists nearest-first.
        let right_candidates: Vec<IntersectionPoint> = sorted
            .iter()
            .copied()
            .filter(|p| p.y == corner.y && p.x > corner.x)
            .collect();
        let bottom_candidates: Vec<IntersectionPoint> = sorted
            .iter()
            .copied()
            .filter(|p| p.x == corner.x && p.y > corner.y)
            .collect();

        let Some((right, bottom)) = confirm_cell(&right_candidates, &bottom_candidates, &point_set)
        else {
            continue;
        };
        let Some(bounds) = BoundingBox::from_extents(
            corner.x as f32,
            corner.y as f32,
            right as f32,
            bottom as f32,
        ) else {
            continue;
        };
        row_map.entry(corner.y).or_default().push(bounds);
        cell_count += 1;
    }

    let mut rows: Vec<Vec<BoundingBox>> = row_map.into_values().collect();
    for row in &mut rows {
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }

    tracing::debug!(
        target: "grid",
        points = point_set.len(),
        cells = cell_count,
        rows = rows.len(),
        "constructed cell grid from intersections"
    );
    rows
}

/// First (right.x, bottom.y) pair whose fourth corner exists in the set.
fn confirm_cell(
    right_candidates: &[IntersectionPoint],
    bottom_candidates: &[IntersectionPoint],
    points: &HashSet<IntersectionPoint>,
) -> Option<(i32, i32)> {
    for right in right_candidates {
        for bottom in bottom_candidates {
            if points.contains(&IntersectionPoint::new(right.x, bottom.y)) {
                return Some((right.x, bottom.y));
            }
        }
    }
    None
}

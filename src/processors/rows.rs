//! # Stage Definition: Row Clustering (contour strategy)
//!
//! This stage is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: Unordered word-block [`BoundingBox`]es.
//! - **Outputs**: Rows of boxes, top-to-bottom, each row sorted
//!   left-to-right. Rows may have differing lengths.
//! - **Logging**: Traces box count, mean height and resulting row count.
//! - **Invariants**:
//!     - Every input box appears in exactly one output row.
//!     - A box joins the current row when its top edge is within half the
//!       mean block height of the row's most recently added box, so rows
//!       chain through gradual vertical drift.

use std::cmp::Ordering;

use crate::processors::geometry::BoundingBox;

/// Groups word blocks into reading-order rows.
///
/// Boxes are sorted by top edge, then greedily chained: each box joins the
/// open row when its top is within half the mean height of the previous
/// box, otherwise it opens a new row. Rows are finally sorted internally
/// by left edge.
pub fn cluster_into_rows(mut boxes: Vec<BoundingBox>) -> Vec<Vec<BoundingBox>> {
    if boxes.is_empty() {
        return Vec::new();
    }

    let mean_height = boxes.iter().map(|b| b.height).sum::<f32>() / boxes.len() as f32;
    let half_mean_height = mean_height / 2.0;

    boxes.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal));

    let mut rows: Vec<Vec<BoundingBox>> = Vec::new();
    let mut current_row: Vec<BoundingBox> = Vec::new();
    for bbox in boxes {
        match current_row.last() {
            Some(previous) if (bbox.y - previous.y).abs() > half_mean_height => {
                rows.push(std::mem::take(&mut current_row));
                current_row.push(bbox);
            }
            _ => current_row.push(bbox),
        }
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }

    tracing::debug!(
        target: "grid",
        mean_height,
        rows = rows.len(),
        "clustered word blocks into rows"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, y: f32, w: f32, h: f32) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    #[test]
    fn test_two_visual_rows_cluster_separately() {
        let boxes = vec![
            bbox(60.0, 101.0, 30.0, 20.0),
            bbox(10.0, 100.0, 30.0, 20.0),
            bbox(10.0, 200.0, 30.0, 20.0),
            bbox(60.0, 198.0, 30.0, 20.0),
        ];
        let rows = cluster_into_rows(boxes);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 2);
        // Left-to-right within each row.
        assert_eq!(rows[0][0].x, 10.0);
        assert_eq!(rows[0][1].x, 60.0);
        assert_eq!(rows[1][0].x, 10.0);
    }

    #[test]
    fn test_ragged_rows_are_preserved() {
        let boxes = vec![
            bbox(0.0, 0.0, 20.0, 10.0),
            bbox(30.0, 1.0, 20.0, 10.0),
            bbox(60.0, 0.0, 20.0, 10.0),
            bbox(0.0, 50.0, 20.0, 10.0),
            bbox(30.0, 51.0, 20.0, 10.0),
        ];
        let rows = cluster_into_rows(boxes);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_every_box_lands_in_exactly_one_row() {
        let boxes: Vec<BoundingBox> = (0..17)
            .map(|i| bbox((i % 5) as f32 * 40.0, (i / 5) as f32 * 60.0, 30.0, 12.0))
            .collect();
        let total = boxes.len();

        let rows = cluster_into_rows(boxes);
        let placed: usize = rows.iter().map(Vec::len).sum();
        assert_eq!(placed, total);
        assert!(rows.iter().all(|row| !row.is_empty()));
    }

    #[test]
    fn test_rows_chain_through_vertical_drift() {
        // Each step is within half the mean height (6.0) of the previous
        // box, so the drifting sequence stays one row even though the
        // first and last tops are further apart than the threshold.
        let boxes = vec![
            bbox(0.0, 0.0, 20.0, 12.0),
            bbox(30.0, 5.0, 20.0, 12.0),
            bbox(60.0, 10.0, 20.0, 12.0),
        ];
        let rows = cluster_into_rows(boxes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_gap_of_exactly_half_mean_height_stays_in_row() {
        // Mean height 20 makes the threshold 10; a gap of exactly 10
        // chains, anything past it opens a new row.
        let at_threshold = vec![
            bbox(0.0, 100.0, 30.0, 20.0),
            bbox(40.0, 110.0, 30.0, 20.0),
        ];
        assert_eq!(cluster_into_rows(at_threshold).len(), 1);

        let past_threshold = vec![
            bbox(0.0, 100.0, 30.0, 20.0),
            bbox(40.0, 110.5, 30.0, 20.0),
        ];
        assert_eq!(cluster_into_rows(past_threshold).len(), 2);
    }

    #[test]
    fn test_single_box_single_row() {
        let rows = cluster_into_rows(vec![bbox(5.0, 5.0, 10.0, 10.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(cluster_into_rows(Vec::new()).is_empty());
    }
}

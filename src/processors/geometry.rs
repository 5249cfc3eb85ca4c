//! Geometric primitives for table structure analysis.
//!
//! The pipeline works with three shapes: axis-aligned [`BoundingBox`]es for
//! word blobs, detected text regions and cells; [`LineSegment`]s for ruling
//! lines; and [`IntersectionPoint`]s where rulings meet. All are plain data
//! with the geometry needed by the grid stages, no raster access.

use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (column direction).
    pub x: f32,
    /// Y coordinate (row direction).
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixel coordinates.
///
/// A valid box has strictly positive width and height; constructors that
/// cannot guarantee this return `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent, > 0.
    pub width: f32,
    /// Vertical extent, > 0.
    pub height: f32,
}

impl BoundingBox {
    /// Creates a bounding box from its top-left corner and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a bounding box from corner extents.
    ///
    /// Returns `None` when the extents are degenerate (zero or negative
    /// size).
    pub fn from_extents(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<Self> {
        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area in square pixels.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Expands the box outward by `margin` on every side, clamped to an
    /// image of `image_width` × `image_height`.
    ///
    /// The result can degenerate to zero width or height when the box lies
    /// entirely outside the image; callers validating crops treat that as
    /// an empty region.
    pub fn pad_clamped(&self, margin: f32, image_width: u32, image_height: u32) -> Self {
        let min_x = (self.x - margin).max(0.0);
        let min_y = (self.y - margin).max(0.0);
        let max_x = (self.right() + margin).min(image_width as f32);
        let max_y = (self.bottom() + margin).min(image_height as f32);
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(0.0),
            height: (max_y - min_y).max(0.0),
        }
    }
}

/// The meeting point of one horizontal and one vertical ruling line.
///
/// Coordinates are integer pixels: intersections of snapped axis-aligned
/// rulings land on the lattice, and the cell-confirmation scan relies on
/// exact coordinate equality. Ordering is row-major (top-to-bottom, then
/// left-to-right) so sorted collections read like the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntersectionPoint {
    /// X coordinate in pixels.
    pub x: i32,
    /// Y coordinate in pixels.
    pub y: i32,
}

impl IntersectionPoint {
    /// Creates a new intersection point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Ord for IntersectionPoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for IntersectionPoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A detected line segment with integer endpoints.
///
/// After snapping, ruling segments are axis-aligned: horizontal segments
/// have `y1 == y2`, vertical segments `x1 == x2`. Endpoints may lie outside
/// the image: merged ruling spans are extended past their evidence so
/// border rulings still cross their perpendiculars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    /// X coordinate of the first endpoint.
    pub x1: i32,
    /// Y coordinate of the first endpoint.
    pub y1: i32,
    /// X coordinate of the second endpoint.
    pub x2: i32,
    /// Y coordinate of the second endpoint.
    pub y2: i32,
}

impl LineSegment {
    /// Creates a horizontal segment at height `y` spanning `[x1, x2]`.
    ///
    /// Endpoints are normalized so `x1 <= x2`.
    pub fn horizontal(x1: i32, x2: i32, y: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y,
            x2: x1.max(x2),
            y2: y,
        }
    }

    /// Creates a vertical segment at `x` spanning `[y1, y2]`.
    ///
    /// Endpoints are normalized so `y1 <= y2`.
    pub fn vertical(x: i32, y1: i32, y2: i32) -> Self {
        Self {
            x1: x,
            y1: y1.min(y2),
            x2: x,
            y2: y1.max(y2),
        }
    }

    /// Whether the segment is horizontal (`y1 == y2`).
    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    /// Whether the segment is vertical (`x1 == x2`).
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }

    /// Length of the segment's span along its major axis.
    pub fn span(&self) -> i32 {
        (self.x2 - self.x1).abs().max((self.y2 - self.y1).abs())
    }

    /// Computes the intersection of two segments.
    ///
    /// Both are treated as infinite lines first (perpendicular dot product
    /// form); a zero denominator means parallel lines and yields `None`
    /// without error. The solved point is then validated against both
    /// segments' extents (inclusive, so shared endpoints count) and rounded
    /// to the pixel lattice.
    pub fn intersect(&self, other: &LineSegment) -> Option<IntersectionPoint> {
        let da = (f64::from(self.x2 - self.x1), f64::from(self.y2 - self.y1));
        let db = (
            f64::from(other.x2 - other.x1),
            f64::from(other.y2 - other.y1),
        );
        let dp = (
            f64::from(self.x1 - other.x1),
            f64::from(self.y1 - other.y1),
        );

        // Perpendicular of the direction of `self`.
        let dap = (-da.1, da.0);
        let denom = dap.0 * db.0 + dap.1 * db.1;
        if denom == 0.0 {
            // Parallel (or one segment degenerate); no intersection.
            return None;
        }
        let num = dap.0 * dp.0 + dap.1 * dp.1;
        let t = num / denom;
        let px = t * db.0 + f64::from(other.x1);
        let py = t * db.1 + f64::from(other.y1);

        if !self.extent_contains(px, py) || !other.extent_contains(px, py) {
            return None;
        }

        Some(IntersectionPoint::new(px.round() as i32, py.round() as i32))
    }

    /// Whether `(px, py)` lies within the segment's axis-aligned extent.
    fn extent_contains(&self, px: f64, py: f64) -> bool {
        let (min_x, max_x) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (min_y, max_y) = (self.y1.min(self.y2), self.y1.max(self.y2));
        px >= f64::from(min_x)
            && px <= f64::from(max_x)
            && py >= f64::from(min_y)
            && py <= f64::from(max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_edges_and_center() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(bbox.right(), 40.0);
        assert_eq!(bbox.bottom(), 60.0);
        assert_eq!(bbox.center(), Point::new(25.0, 40.0));
        assert_eq!(bbox.area(), 1200.0);
    }

    #[test]
    fn test_from_extents_rejects_degenerate() {
        assert!(BoundingBox::from_extents(0.0, 0.0, 10.0, 10.0).is_some());
        assert!(BoundingBox::from_extents(10.0, 0.0, 10.0, 10.0).is_none());
        assert!(BoundingBox::from_extents(10.0, 10.0, 5.0, 20.0).is_none());
    }

    #[test]
    fn test_pad_clamped_interior() {
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 10.0);
        let padded = bbox.pad_clamped(2.0, 100, 100);
        assert_eq!(padded.x, 8.0);
        assert_eq!(padded.y, 8.0);
        assert_eq!(padded.width, 24.0);
        assert_eq!(padded.height, 14.0);
    }

    #[test]
    fn test_pad_clamped_at_image_edge() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let padded = bbox.pad_clamped(5.0, 12, 12);
        assert_eq!(padded.x, 0.0);
        assert_eq!(padded.y, 0.0);
        // Right/bottom clamp to the image extent, not past it.
        assert_eq!(padded.right(), 12.0);
        assert_eq!(padded.bottom(), 12.0);
    }

    #[test]
    fn test_intersection_point_row_major_order() {
        let mut points = vec![
            IntersectionPoint::new(5, 10),
            IntersectionPoint::new(0, 10),
            IntersectionPoint::new(9, 0),
        ];
        points.sort();
        assert_eq!(points[0], IntersectionPoint::new(9, 0));
        assert_eq!(points[1], IntersectionPoint::new(0, 10));
        assert_eq!(points[2], IntersectionPoint::new(5, 10));
    }

    #[test]
    fn test_segment_constructors_normalize() {
        let h = LineSegment::horizontal(50, 10, 7);
        assert_eq!((h.x1, h.x2), (10, 50));
        assert!(h.is_horizontal());
        assert_eq!(h.span(), 40);

        let v = LineSegment::vertical(3, 90, 20);
        assert_eq!((v.y1, v.y2), (20, 90));
        assert!(v.is_vertical());
        assert_eq!(v.span(), 70);
    }

    #[test]
    fn test_crossing_segments_intersect() {
        let h = LineSegment::horizontal(0, 100, 40);
        let v = LineSegment::vertical(30, 0, 80);
        let point = h.intersect(&v).expect("segments cross");
        assert_eq!(point, IntersectionPoint::new(30, 40));
        // Symmetric call yields the same point.
        assert_eq!(v.intersect(&h), Some(point));
    }

    #[test]
    fn test_parallel_segments_yield_none() {
        let a = LineSegment::horizontal(0, 100, 40);
        let b = LineSegment::horizontal(0, 100, 50);
        assert_eq!(a.intersect(&b), None);

        let c = LineSegment::vertical(10, 0, 100);
        let d = LineSegment::vertical(20, 0, 100);
        assert_eq!(c.intersect(&d), None);
    }

    #[test]
    fn test_out_of_extent_intersection_rejected() {
        // The infinite lines cross at (30, 40) but the vertical segment
        // stops short of y = 40.
        let h = LineSegment::horizontal(0, 100, 40);
        let v = LineSegment::vertical(30, 0, 35);
        assert_eq!(h.intersect(&v), None);
    }

    #[test]
    fn test_shared_endpoint_counts_as_intersection() {
        let h = LineSegment::horizontal(0, 30, 40);
        let v = LineSegment::vertical(30, 40, 90);
        assert_eq!(h.intersect(&v), Some(IntersectionPoint::new(30, 40)));
    }

    #[test]
    fn test_diagonal_segments_use_general_formula() {
        let a = LineSegment {
            x1: 0,
            y1: 0,
            x2: 10,
            y2: 10,
        };
        let b = LineSegment {
            x1: 0,
            y1: 10,
            x2: 10,
            y2: 0,
        };
        assert_eq!(a.intersect(&b), Some(IntersectionPoint::new(5, 5)));
    }
}

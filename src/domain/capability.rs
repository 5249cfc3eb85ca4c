//! Capability traits for the external OCR engines.
//!
//! Text detection and text recognition are collaborators, not part of this
//! crate: any backend (ONNX runtime, remote service, test mock) plugs in by
//! implementing these traits. Implementations are injected into the
//! extractor as `Arc<dyn …>` at build time and owned for its lifetime;
//! there is no process-global engine state anywhere in the pipeline.

use std::fmt::Debug;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::core::errors::OcrResult;
use crate::processors::geometry::{BoundingBox, Point};

/// A text region reported by the detection capability.
///
/// Well-formed regions carry exactly four corner points (a possibly rotated
/// quadrilateral). Anything else is malformed and skipped by the assembler;
/// a response consisting only of malformed regions counts as an empty
/// detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    /// Corner points of the region, in detector order.
    pub points: Vec<Point>,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl DetectedRegion {
    /// Creates a region from corner points and a confidence score.
    pub fn new(points: Vec<Point>, confidence: f32) -> Self {
        Self { points, confidence }
    }

    /// Whether the region is a well-formed quadrilateral (exactly four
    /// corner points).
    pub fn is_quad(&self) -> bool {
        self.points.len() == 4
    }

    /// Axis-aligned bounding rectangle of the corner points.
    ///
    /// Returns `None` for an empty point list or a degenerate (zero width
    /// or height) extent.
    pub fn bounding_rect(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for point in &self.points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        BoundingBox::from_extents(min_x, min_y, max_x, max_y)
    }
}

/// Detection capability: locates text-bearing sub-regions inside an image.
///
/// Det-only contract: an empty list is a valid response and means "no text
/// found here". Implementations must be callable from worker threads.
pub trait TextRegionDetector: Send + Sync + Debug {
    /// Detects text regions in the given image.
    fn detect_regions(&self, image: &RgbImage) -> OcrResult<Vec<DetectedRegion>>;
}

/// Recognition capability: maps an image region to a string.
///
/// May fail per call; the assembler recovers every failure locally as an
/// empty fragment, so implementations should return errors rather than
/// panic.
pub trait TextRecognizer: Send + Sync + Debug {
    /// Recognizes the text contained in the given image region.
    fn recognize(&self, region: &RgbImage) -> OcrResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_check() {
        let quad = DetectedRegion::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(0.0, 5.0),
            ],
            0.9,
        );
        assert!(quad.is_quad());

        let triangle = DetectedRegion::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 5.0)],
            0.9,
        );
        assert!(!triangle.is_quad());
        assert!(!DetectedRegion::new(vec![], 0.0).is_quad());
    }

    #[test]
    fn test_bounding_rect_covers_rotated_quad() {
        let region = DetectedRegion::new(
            vec![
                Point::new(5.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(5.0, 10.0),
                Point::new(0.0, 5.0),
            ],
            1.0,
        );
        let rect = region.bounding_rect().expect("rect should exist");
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, 10.0);
        assert_eq!(rect.height, 10.0);
    }

    #[test]
    fn test_bounding_rect_degenerate() {
        assert!(DetectedRegion::new(vec![], 0.0).bounding_rect().is_none());
        // A single point has zero extent.
        let point_region = DetectedRegion::new(vec![Point::new(3.0, 3.0)], 1.0);
        assert!(point_region.bounding_rect().is_none());
    }
}

//! Image processing stages for table extraction.
//!
//! Each stage is a pure function or a small parameter struct over `image`
//! buffers and the geometric primitives in [`geometry`]. Stages hold no
//! pipeline state; the orchestrator in [`crate::tabular`] composes them
//! and owns strategy selection.

pub mod binarize;
pub mod blocks;
pub mod geometry;
pub mod grid;
pub mod morphology;
pub mod rows;
pub mod rulings;

pub use binarize::Binarizer;
pub use geometry::{BoundingBox, IntersectionPoint, LineSegment, Point};

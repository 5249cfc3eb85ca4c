//! Domain types shared across the pipeline.
//!
//! This module hosts the capability seam: the traits the external OCR
//! engines implement, and the region type they report.

pub mod capability;

pub use capability::{DetectedRegion, TextRegionDetector, TextRecognizer};

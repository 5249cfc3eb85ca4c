//! # Tabular OCR
//!
//! A Rust library that reconstructs table structure from scanned document
//! images and assembles per-cell text through injected OCR capabilities.
//!
//! ## Features
//!
//! - Grid reconstruction for both ruled tables and borderless layouts
//! - Capability injection: bring your own detection and recognition engines
//! - Per-cell parallel recognition with failure isolation
//! - Cooperative cancellation between stages and per cell
//! - RFC 4180 CSV rendering of recognized tables
//! - Optional intermediate-stage artifacts for debugging
//!
//! ## Components
//!
//! - **Binarization**: Otsu thresholding with low-contrast equalization
//! - **Ruling-Line Grid**: Morphological ruling isolation and Hough voting
//!   to recover drawn grids as cell rectangles
//! - **Contour Grid**: Word merging and connected-block analysis for tables
//!   without ruling lines
//! - **Cell Assembly**: Crop each cell, detect text regions, recognize
//!   fragments, and join them in reading order
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, and cancellation
//! * [`domain`] - Capability traits implemented by external OCR engines
//! * [`export`] - CSV serialization of extracted tables
//! * [`processors`] - Image processing stages and geometric primitives
//! * [`tabular`] - The high-level extraction pipeline and its results
//! * [`utils`] - Image loading, cropping, and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tabular_ocr::prelude::*;
//! # use image::RgbImage;
//! # #[derive(Debug)]
//! # struct MyDetector;
//! # impl TextRegionDetector for MyDetector {
//! #     fn detect_regions(&self, _image: &RgbImage) -> OcrResult<Vec<DetectedRegion>> {
//! #         Ok(Vec::new())
//! #     }
//! # }
//! # #[derive(Debug)]
//! # struct MyRecognizer;
//! # impl TextRecognizer for MyRecognizer {
//! #     fn recognize(&self, _region: &RgbImage) -> OcrResult<String> {
//! #         Ok(String::new())
//! #     }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // MyDetector and MyRecognizer implement the capability traits from
//! // tabular_ocr::domain for whatever OCR engine you use.
//! let extractor = TableExtractorBuilder::new(Arc::new(MyDetector), Arc::new(MyRecognizer))
//!     .strategy(GridDetectionStrategy::RulingLineBased(RulingTuning::default()))
//!     .build()?;
//!
//! let image = load_image(Path::new("scan.png"))?;
//! let extraction = extractor.extract(&image)?;
//! println!("{}", extraction.to_csv_string()?);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod export;
pub mod processors;
pub mod tabular;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use tabular_ocr::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - Extraction pipeline (`TableExtractorBuilder`, `TableExtractor`)
/// - Results (`TableExtraction`, `Table`, `Cell`)
/// - Strategy and tuning configuration (`GridDetectionStrategy`,
///   `RulingTuning`, `ContourTuning`)
/// - Capability traits (`TextRegionDetector`, `TextRecognizer`,
///   `DetectedRegion`)
/// - Essential error and result types (`TableOcrError`, `OcrResult`)
/// - Basic image loading (`load_image`)
///
/// For advanced customization (artifact dumping, parallelism limits, CSV
/// streaming), import directly from the respective modules (e.g.
/// `tabular_ocr::core`, `tabular_ocr::export`).
pub mod prelude {
    // Extraction Pipeline (essential)
    pub use crate::tabular::{Cell, Table, TableExtraction, TableExtractor, TableExtractorBuilder};

    // Strategy Configuration (essential)
    pub use crate::core::{ContourTuning, FragmentSeparator, GridDetectionStrategy, RulingTuning};

    // Capability Seam (essential)
    pub use crate::domain::{DetectedRegion, TextRecognizer, TextRegionDetector};

    // Error Handling (essential)
    pub use crate::core::{CancelFlag, OcrResult, TableOcrError};

    // Image Utility (minimal)
    pub use crate::utils::load_image;
}

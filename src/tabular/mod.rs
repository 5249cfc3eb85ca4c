//! The table extraction pipeline module.
//!
//! This module provides the high-level builder API for constructing table
//! extractors. The builder wires the injected OCR capabilities to the grid
//! detection strategies and the cell assembly stage.
//!
//! # Main APIs
//!
//! - [`TableExtractorBuilder`] - Configures and builds a [`TableExtractor`]
//! - [`TableExtraction`] - The per-image result, renderable as CSV

pub(crate) mod artifacts;
pub(crate) mod assembler;
pub mod extractor;
pub mod result;

pub use extractor::{TableExtractor, TableExtractorBuilder};
pub use result::{Cell, Table, TableExtraction};

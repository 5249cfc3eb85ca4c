//! Core error types for the table extraction pipeline.
//!
//! This module defines the error enum shared by every pipeline component,
//! the stage discriminant used to locate failures, and the crate-wide
//! `OcrResult` alias.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type OcrResult<T> = Result<T, TableOcrError>;

/// Enum identifying the pipeline stage an error originated from.
///
/// Carried inside [`TableOcrError::Processing`] so callers can tell a
/// geometry failure from an assembly failure without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Grayscale conversion and thresholding.
    Binarization,
    /// Ruling-line or contour detection.
    LineDetection,
    /// Intersection computation or row clustering.
    Intersection,
    /// Cell grid construction.
    GridConstruction,
    /// Per-cell crop, detect and recognize.
    CellAssembly,
    /// CSV rendering and output.
    Serialization,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Binarization => write!(f, "binarization"),
            PipelineStage::LineDetection => write!(f, "line detection"),
            PipelineStage::Intersection => write!(f, "intersection resolution"),
            PipelineStage::GridConstruction => write!(f, "grid construction"),
            PipelineStage::CellAssembly => write!(f, "cell assembly"),
            PipelineStage::Serialization => write!(f, "serialization"),
        }
    }
}

/// Enum representing the errors that can occur in the table extraction
/// pipeline.
///
/// Recognition failures inside a single cell are deliberately *not* part of
/// this enum's flow: they are recovered as empty fragments by the assembler
/// (see the error-handling contract of `tabular::assembler`). What surfaces
/// here is everything that legitimately stops a document: unusable input,
/// broken configuration, and output failures.
#[derive(Error, Debug)]
pub enum TableOcrError {
    /// The input did not contain a usable table.
    ///
    /// Unreadable images and empty pages are reported through this variant
    /// rather than a decode error, so callers can treat "bad scan" and
    /// "blank page" uniformly.
    #[error("no table detected: {reason}")]
    NoTableDetected {
        /// Why the input was rejected.
        reason: String,
    },

    /// Error occurred while loading an image from disk.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during a pipeline stage.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of the pipeline where the error occurred.
        stage: PipelineStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error raised by an injected detection or recognition capability.
    #[error("{capability} capability failed: {context}")]
    Capability {
        /// Which capability failed ("detector" or "recognizer").
        capability: &'static str,
        /// Additional context about the failure.
        context: String,
        /// The underlying error reported by the capability.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// The extraction was cancelled before the table was completed.
    ///
    /// In-flight cell work is abandoned; no partial table is returned.
    #[error("extraction cancelled")]
    Cancelled,

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// CSV rendering or write error.
    #[error("csv output")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for TableOcrError {
    /// Converts an image::ImageError to TableOcrError::ImageLoad.
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl TableOcrError {
    /// Creates a `NoTableDetected` error with the given reason.
    pub fn no_table(reason: impl Into<String>) -> Self {
        Self::NoTableDetected {
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidInput` error with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error with context and details.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use tabular_ocr::core::errors::TableOcrError;
    /// let err = TableOcrError::config_error(
    ///     "ruling tuning",
    ///     "kernel_divisor must be non-zero",
    /// );
    /// assert!(matches!(err, TableOcrError::Config { .. }));
    /// ```
    pub fn config_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Config {
            message: format!("{}: {}", context.into(), details.into()),
        }
    }

    /// Creates a configuration error for missing required fields.
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: format!(
                "missing required field '{}' in {}",
                field.into(),
                context.into()
            ),
        }
    }

    /// Creates a configuration error for invalid field values.
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }

    /// Wraps an error that occurred inside a pipeline stage.
    pub fn processing(
        stage: PipelineStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error reported by an injected capability.
    ///
    /// Implementors of the capability traits use this to attach context to
    /// backend-specific failures.
    pub fn capability(
        capability: &'static str,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Capability {
            capability,
            context: context.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_stage_display() {
        assert_eq!(PipelineStage::Binarization.to_string(), "binarization");
        assert_eq!(PipelineStage::LineDetection.to_string(), "line detection");
        assert_eq!(PipelineStage::CellAssembly.to_string(), "cell assembly");
    }

    #[test]
    fn test_no_table_constructor() {
        let err = TableOcrError::no_table("page is blank");
        assert_eq!(err.to_string(), "no table detected: page is blank");
    }

    #[test]
    fn test_processing_carries_stage_and_source() {
        let io = std::io::Error::other("boom");
        let err = TableOcrError::processing(PipelineStage::GridConstruction, "corner scan", io);
        assert_eq!(err.to_string(), "grid construction failed: corner scan");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_field_message() {
        let err = TableOcrError::missing_field("recognizer", "TableExtractorBuilder");
        assert_eq!(
            err.to_string(),
            "configuration: missing required field 'recognizer' in TableExtractorBuilder"
        );
    }
}

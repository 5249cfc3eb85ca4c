//! The core module of the table extraction pipeline.
//!
//! This module contains the fundamental plumbing shared by every stage:
//! - Configuration management
//! - Error handling
//! - Cooperative cancellation
//!
//! It also re-exports the commonly used types for convenience.

pub mod cancel;
pub mod config;
pub mod errors;

pub use cancel::CancelFlag;
pub use config::{
    ArtifactConfig, ContourTuning, FragmentSeparator, GridDetectionStrategy, ParallelPolicy,
    RulingTuning, TableExtractorConfig,
};
pub use errors::{OcrResult, PipelineStage, TableOcrError};

//! Configuration management for the table extraction pipeline.
//!
//! This module provides the extractor configuration tree, per-strategy
//! tuning types, and the parallelism policy.

pub mod parallel;
pub mod pipeline;

// Re-export commonly used types
pub use parallel::ParallelPolicy;
pub use pipeline::{
    ArtifactConfig, ContourTuning, FragmentSeparator, GridDetectionStrategy, RulingTuning,
    TableExtractorConfig,
};

//! Pipeline configuration for the table extractor.
//!
//! Everything tunable about an extraction run lives here: which grid
//! detection strategy runs and its thresholds, how per-cell fragments are
//! joined, crop padding, recognition timeout, parallelism, and debug
//! artifact output. The extractor validates the whole tree once at build
//! time so stage code never re-checks.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::parallel::ParallelPolicy;
use crate::core::errors::{OcrResult, TableOcrError};

/// Strategy used to recover the table grid from a binary image.
///
/// The two strategies are mutually exclusive alternatives selected at
/// configuration time. `RulingLineBased` expects printed table borders;
/// `ContourBased` clusters word blobs into rows for borderless layouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridDetectionStrategy {
    /// Merge glyphs into word blobs by directional dilation, then cluster
    /// the blob bounding boxes into rows.
    ContourBased(ContourTuning),
    /// Isolate printed ruling lines morphologically, intersect them, and
    /// confirm cell rectangles from the intersection set.
    RulingLineBased(RulingTuning),
}

impl Default for GridDetectionStrategy {
    fn default() -> Self {
        Self::RulingLineBased(RulingTuning::default())
    }
}

impl GridDetectionStrategy {
    /// Short name used in logs and result metadata.
    pub fn name(&self) -> &'static str {
        match self {
            GridDetectionStrategy::ContourBased(_) => "contour",
            GridDetectionStrategy::RulingLineBased(_) => "ruling-line",
        }
    }

    fn validate(&self) -> OcrResult<()> {
        match self {
            GridDetectionStrategy::ContourBased(tuning) => tuning.validate(),
            GridDetectionStrategy::RulingLineBased(tuning) => tuning.validate(),
        }
    }
}

/// Tuning for the contour/word-cluster strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourTuning {
    /// Width of the horizontal dilation kernel that merges neighboring
    /// glyphs into word blobs.
    /// Default: 10
    #[serde(default = "ContourTuning::default_word_kernel_width")]
    pub word_kernel_width: u32,

    /// Height of the horizontal dilation kernel.
    /// Default: 2
    #[serde(default = "ContourTuning::default_word_kernel_height")]
    pub word_kernel_height: u32,

    /// Iterations of the horizontal dilation.
    /// Default: 5
    #[serde(default = "ContourTuning::default_word_dilate_iterations")]
    pub word_dilate_iterations: u32,

    /// Side length of the square kernel that closes remaining gaps after
    /// the horizontal pass.
    /// Default: 5
    #[serde(default = "ContourTuning::default_block_kernel_size")]
    pub block_kernel_size: u32,

    /// Iterations of the square dilation.
    /// Default: 2
    #[serde(default = "ContourTuning::default_block_dilate_iterations")]
    pub block_dilate_iterations: u32,

    /// Minimum blob bounding-box area in px²; smaller boxes are dropped as
    /// specks. 0 disables the filter.
    /// Default: 0
    #[serde(default)]
    pub min_box_area: u32,
}

impl ContourTuning {
    fn default_word_kernel_width() -> u32 {
        10
    }

    fn default_word_kernel_height() -> u32 {
        2
    }

    fn default_word_dilate_iterations() -> u32 {
        5
    }

    fn default_block_kernel_size() -> u32 {
        5
    }

    fn default_block_dilate_iterations() -> u32 {
        2
    }

    fn validate(&self) -> OcrResult<()> {
        if self.word_kernel_width == 0 || self.word_kernel_height == 0 {
            return Err(TableOcrError::invalid_field(
                "word_kernel",
                "non-zero dimensions",
                format!("{}x{}", self.word_kernel_width, self.word_kernel_height),
            ));
        }
        if self.block_kernel_size == 0 {
            return Err(TableOcrError::invalid_field(
                "block_kernel_size",
                "a non-zero side length",
                self.block_kernel_size.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ContourTuning {
    fn default() -> Self {
        Self {
            word_kernel_width: Self::default_word_kernel_width(),
            word_kernel_height: Self::default_word_kernel_height(),
            word_dilate_iterations: Self::default_word_dilate_iterations(),
            block_kernel_size: Self::default_block_kernel_size(),
            block_dilate_iterations: Self::default_block_dilate_iterations(),
            min_box_area: 0,
        }
    }
}

/// Tuning for the ruling-line strategy.
///
/// The kernel length scales with the image so the same configuration works
/// across scan resolutions: a 1200 px wide page gets a 10 px kernel at the
/// default divisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulingTuning {
    /// Ruling kernel length = image extent / this divisor, floored at 1 px.
    /// Default: 120
    #[serde(default = "RulingTuning::default_kernel_divisor")]
    pub kernel_divisor: u32,

    /// Erode and dilate iterations used to isolate rulings.
    /// Default: 3
    #[serde(default = "RulingTuning::default_morph_iterations")]
    pub morph_iterations: u32,

    /// Minimum ruling span = image extent / this divisor; shorter candidate
    /// lines are ignored.
    /// Default: 10
    #[serde(default = "RulingTuning::default_min_span_divisor")]
    pub min_span_divisor: u32,
}

impl RulingTuning {
    fn default_kernel_divisor() -> u32 {
        120
    }

    fn default_morph_iterations() -> u32 {
        3
    }

    fn default_min_span_divisor() -> u32 {
        10
    }

    fn validate(&self) -> OcrResult<()> {
        if self.kernel_divisor == 0 {
            return Err(TableOcrError::invalid_field(
                "kernel_divisor",
                "a non-zero divisor",
                "0",
            ));
        }
        if self.min_span_divisor == 0 {
            return Err(TableOcrError::invalid_field(
                "min_span_divisor",
                "a non-zero divisor",
                "0",
            ));
        }
        if self.morph_iterations == 0 {
            return Err(TableOcrError::invalid_field(
                "morph_iterations",
                "at least one iteration",
                "0",
            ));
        }
        Ok(())
    }
}

impl Default for RulingTuning {
    fn default() -> Self {
        Self {
            kernel_divisor: Self::default_kernel_divisor(),
            morph_iterations: Self::default_morph_iterations(),
            min_span_divisor: Self::default_min_span_divisor(),
        }
    }
}

/// Separator placed between recognized fragments of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentSeparator {
    /// Join fragments with a newline, preserving the cell's line layout.
    /// The CSV serializer quotes such fields, so this is lossless.
    #[default]
    Newline,
    /// Join fragments with a single space, flattening the cell to one line.
    Space,
}

impl FragmentSeparator {
    /// The literal separator string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentSeparator::Newline => "\n",
            FragmentSeparator::Space => " ",
        }
    }
}

/// Debug artifact output configuration.
///
/// Artifacts are diagnostic only: stage rasters and cell crops named after
/// the pipeline step that produced them. Write failures are logged and
/// swallowed, never surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory the artifacts are written into (created on demand).
    pub dir: PathBuf,

    /// Write numbered stage rasters (binary image, ruling masks, overlays).
    /// Default: true
    #[serde(default = "ArtifactConfig::default_enabled")]
    pub stage_images: bool,

    /// Write per-cell crop images named `cell_{row}_{col}.png`.
    /// Default: true
    #[serde(default = "ArtifactConfig::default_enabled")]
    pub cell_crops: bool,
}

impl ArtifactConfig {
    /// Artifact output into the given directory with all kinds enabled.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stage_images: true,
            cell_crops: true,
        }
    }

    fn default_enabled() -> bool {
        true
    }
}

/// Complete configuration of a [`crate::tabular::TableExtractor`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableExtractorConfig {
    /// Grid detection strategy and its tuning.
    #[serde(default)]
    pub strategy: GridDetectionStrategy,

    /// Separator between recognized fragments of one cell.
    #[serde(default)]
    pub separator: FragmentSeparator,

    /// Outward padding in pixels applied to each cell's bounds before
    /// cropping, clamped to the image. Keeps glyph strokes that touch a
    /// ruling line inside the crop. Expected range 2..=5.
    /// Default: 2
    #[serde(default = "TableExtractorConfig::default_crop_margin")]
    pub crop_margin: u32,

    /// Per-call recognition timeout in milliseconds. A call whose result
    /// arrives after the deadline is discarded and the fragment treated as
    /// failed. None disables the check.
    /// Default: None
    #[serde(default)]
    pub recognition_timeout_ms: Option<u64>,

    /// Cell assembly parallelism.
    #[serde(default)]
    pub parallel: ParallelPolicy,

    /// Debug artifact output; None disables all artifacts.
    #[serde(default)]
    pub artifacts: Option<ArtifactConfig>,
}

impl TableExtractorConfig {
    /// Checks the whole configuration tree for invalid values.
    pub fn validate(&self) -> OcrResult<()> {
        self.strategy.validate()?;
        // Margins beyond this swallow neighboring cells; the useful range
        // is single digits.
        if self.crop_margin > 16 {
            return Err(TableOcrError::invalid_field(
                "crop_margin",
                "a small pixel margin (2-5 typical, 16 max)",
                self.crop_margin.to_string(),
            ));
        }
        Ok(())
    }

    /// The recognition timeout as a [`Duration`], if configured.
    pub fn recognition_timeout(&self) -> Option<Duration> {
        self.recognition_timeout_ms.map(Duration::from_millis)
    }

    fn default_crop_margin() -> u32 {
        2
    }
}

//! # Stage Definition: Table Extraction
//!
//! This service is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: A page `image::RgbImage` (or a path to one) and the
//!   detection/recognition capabilities injected at build time.
//! - **Outputs**: A [`TableExtraction`] carrying the recognized cell matrix
//!   and the name of the strategy that produced it.
//! - **Logging**: Traces strategy selection, recovered geometry counts, and
//!   the final table dimensions with elapsed time.
//! - **Error Behavior**: A blank page fails with `NoTableDetected`;
//!   downstream geometry failures degrade to an empty table instead of
//!   erroring so a valid (empty) CSV can still be produced.
//! - **Invariants**:
//!     - The configuration is validated once at build time; extraction never
//!       re-checks it.
//!     - Strategies are mutually exclusive; exactly one runs per extraction.
//!     - Cancellation is honored between stages and per cell during
//!       assembly.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::{GrayImage, Rgb, RgbImage};
use tracing::{debug, info, warn};

use crate::core::{
    ArtifactConfig, CancelFlag, ContourTuning, FragmentSeparator, GridDetectionStrategy,
    OcrResult, ParallelPolicy, RulingTuning, TableExtractorConfig, TableOcrError,
};
use crate::domain::{TextRecognizer, TextRegionDetector};
use crate::processors::blocks::{find_word_blocks, merge_words};
use crate::processors::grid::cells_from_intersections;
use crate::processors::rows::cluster_into_rows;
use crate::processors::rulings::{
    RulingAxis, detect_segments, isolate_horizontal_rulings, isolate_vertical_rulings,
    merge_collinear_segments, ruling_kernel_length,
};
use crate::processors::{Binarizer, BoundingBox};
use crate::tabular::artifacts::{ArtifactWriter, overlay_boxes};
use crate::tabular::assembler::CellTextAssembler;
use crate::tabular::result::TableExtraction;
use crate::utils::load_image;

/// Builder for constructing table extractors.
///
/// The detection and recognition capabilities are required; everything else
/// defaults to the ruling-line strategy with reference tuning.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use image::RgbImage;
/// use tabular_ocr::core::OcrResult;
/// use tabular_ocr::domain::{DetectedRegion, TextRecognizer, TextRegionDetector};
/// use tabular_ocr::tabular::TableExtractorBuilder;
///
/// #[derive(Debug)]
/// struct MyDetector;
///
/// impl TextRegionDetector for MyDetector {
///     fn detect_regions(&self, _image: &RgbImage) -> OcrResult<Vec<DetectedRegion>> {
///         Ok(Vec::new())
///     }
/// }
///
/// #[derive(Debug)]
/// struct MyRecognizer;
///
/// impl TextRecognizer for MyRecognizer {
///     fn recognize(&self, _region: &RgbImage) -> OcrResult<String> {
///         Ok(String::new())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = TableExtractorBuilder::new(Arc::new(MyDetector), Arc::new(MyRecognizer))
///     .recognition_timeout_ms(2_000)
///     .build()?;
///
/// let image = tabular_ocr::utils::load_image(std::path::Path::new("page.png"))?;
/// let extraction = extractor.extract(&image)?;
/// println!("{}", extraction.to_csv_string()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TableExtractorBuilder {
    detector: Arc<dyn TextRegionDetector>,
    recognizer: Arc<dyn TextRecognizer>,
    config: TableExtractorConfig,
}

impl TableExtractorBuilder {
    /// Creates a builder from the two required capabilities.
    pub fn new(
        detector: Arc<dyn TextRegionDetector>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            detector,
            recognizer,
            config: TableExtractorConfig::default(),
        }
    }

    /// Replaces the whole configuration tree, e.g. one deserialized from a
    /// config file.
    pub fn config(mut self, config: TableExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the grid detection strategy.
    pub fn strategy(mut self, strategy: GridDetectionStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Sets the separator placed between recognized fragments of one cell.
    pub fn separator(mut self, separator: FragmentSeparator) -> Self {
        self.config.separator = separator;
        self
    }

    /// Sets the outward padding applied to cell bounds before cropping.
    pub fn crop_margin(mut self, margin: u32) -> Self {
        self.config.crop_margin = margin;
        self
    }

    /// Sets the per-call recognition deadline in milliseconds.
    pub fn recognition_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.recognition_timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the cell assembly parallelism policy.
    pub fn parallel_policy(mut self, policy: ParallelPolicy) -> Self {
        self.config.parallel = policy;
        self
    }

    /// Enables debug artifact output.
    pub fn artifacts(mut self, artifacts: ArtifactConfig) -> Self {
        self.config.artifacts = Some(artifacts);
        self
    }

    /// Validates the configuration and builds the extractor.
    ///
    /// A bounded worker pool is created here when the parallel policy caps
    /// thread count, so repeated extractions share it.
    pub fn build(self) -> OcrResult<TableExtractor> {
        self.config.validate()?;

        let thread_pool = self
            .config
            .parallel
            .build_thread_pool()
            .map_err(|err| TableOcrError::config_error("worker pool", err.to_string()))?;

        let artifacts = self.config.artifacts.clone().map(ArtifactWriter::new);

        let assembler = CellTextAssembler {
            detector: self.detector,
            recognizer: self.recognizer,
            separator: self.config.separator,
            crop_margin: self.config.crop_margin as f32,
            recognition_timeout: self.config.recognition_timeout(),
        };

        Ok(TableExtractor {
            config: self.config,
            assembler,
            thread_pool,
            artifacts,
        })
    }
}

/// Extracts one table per page image using the configured strategy and the
/// injected OCR capabilities.
#[derive(Debug)]
pub struct TableExtractor {
    config: TableExtractorConfig,
    assembler: CellTextAssembler,
    thread_pool: Option<rayon::ThreadPool>,
    artifacts: Option<ArtifactWriter>,
}

impl TableExtractor {
    /// The validated configuration this extractor runs with.
    pub fn config(&self) -> &TableExtractorConfig {
        &self.config
    }

    /// Extracts the table from an image loaded from `path`.
    ///
    /// An unreadable file surfaces as [`TableOcrError::NoTableDetected`],
    /// the same category as a blank page.
    pub fn extract_path(&self, path: &Path) -> OcrResult<TableExtraction> {
        let image = load_image(path).map_err(|err| match err {
            TableOcrError::ImageLoad(source) => TableOcrError::no_table(format!(
                "unreadable image {}: {source}",
                path.display()
            )),
            other => other,
        })?;
        self.extract(&image)
    }

    /// Extracts the table from a page image.
    pub fn extract(&self, image: &RgbImage) -> OcrResult<TableExtraction> {
        self.extract_with_cancel(image, &CancelFlag::new())
    }

    /// Extracts the table, checking `cancel` between stages and before each
    /// capability call during assembly.
    ///
    /// Cancellation abandons in-flight cells and fails the extraction with
    /// [`TableOcrError::Cancelled`]; no partial table is returned.
    pub fn extract_with_cancel(
        &self,
        image: &RgbImage,
        cancel: &CancelFlag,
    ) -> OcrResult<TableExtraction> {
        let started = Instant::now();
        if cancel.is_cancelled() {
            return Err(TableOcrError::Cancelled);
        }
        let binary = Binarizer::new().binarize(image);
        self.run(image, &binary, cancel, started)
    }

    /// Extracts the table from an image whose binary mask the caller
    /// prepared (foreground ink = 255), skipping binarization.
    pub fn extract_with_mask(
        &self,
        image: &RgbImage,
        binary: &GrayImage,
    ) -> OcrResult<TableExtraction> {
        if binary.dimensions() != image.dimensions() {
            return Err(TableOcrError::invalid_input(format!(
                "mask dimensions {:?} do not match image dimensions {:?}",
                binary.dimensions(),
                image.dimensions()
            )));
        }
        self.run(image, binary, &CancelFlag::new(), Instant::now())
    }

    fn run(
        &self,
        image: &RgbImage,
        binary: &GrayImage,
        cancel: &CancelFlag,
        started: Instant,
    ) -> OcrResult<TableExtraction> {
        if binary.as_raw().iter().all(|&px| px == 0) {
            return Err(TableOcrError::no_table("page has no foreground ink"));
        }
        if let Some(writer) = self.artifacts.as_ref() {
            writer.save_stage(0, "binary", binary);
        }

        let grid = match &self.config.strategy {
            GridDetectionStrategy::RulingLineBased(tuning) => {
                self.ruling_grid(image, binary, tuning)
            }
            GridDetectionStrategy::ContourBased(tuning) => {
                self.contour_grid(image, binary, tuning)
            }
        };
        if grid.is_empty() {
            warn!(
                target: "extract",
                strategy = self.config.strategy.name(),
                "no cell geometry recovered, emitting empty table"
            );
        }
        if cancel.is_cancelled() {
            return Err(TableOcrError::Cancelled);
        }

        let table = self.assembler.assemble(
            image,
            grid,
            &self.config.parallel,
            self.thread_pool.as_ref(),
            cancel,
            self.artifacts.as_ref(),
        )?;

        info!(
            target: "extract",
            strategy = self.config.strategy.name(),
            rows = table.row_count(),
            columns = table.column_count(),
            recognized = table.recognized_cell_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "table extraction finished"
        );

        Ok(TableExtraction {
            input_img: Arc::new(image.clone()),
            strategy: Arc::from(self.config.strategy.name()),
            table,
        })
    }

    /// Recovers the cell grid from printed ruling lines.
    fn ruling_grid(
        &self,
        image: &RgbImage,
        binary: &GrayImage,
        tuning: &RulingTuning,
    ) -> Vec<Vec<BoundingBox>> {
        let kernel_len = ruling_kernel_length(binary.width(), tuning.kernel_divisor);

        let horizontal_mask =
            isolate_horizontal_rulings(binary, kernel_len, tuning.morph_iterations);
        let vertical_mask = isolate_vertical_rulings(binary, kernel_len, tuning.morph_iterations);
        if let Some(writer) = self.artifacts.as_ref() {
            writer.save_stage(1, "horizontal_mask", &horizontal_mask);
            writer.save_stage(2, "vertical_mask", &vertical_mask);
        }

        let horizontal = merge_collinear_segments(
            detect_segments(&horizontal_mask, RulingAxis::Horizontal, tuning.min_span_divisor),
            RulingAxis::Horizontal,
            kernel_len as i32,
            3 * kernel_len as i32,
        );
        let vertical = merge_collinear_segments(
            detect_segments(&vertical_mask, RulingAxis::Vertical, tuning.min_span_divisor),
            RulingAxis::Vertical,
            kernel_len as i32,
            3 * kernel_len as i32,
        );

        let mut intersections = Vec::new();
        for h in &horizontal {
            for v in &vertical {
                if let Some(point) = h.intersect(v) {
                    intersections.push(point);
                }
            }
        }
        // Coordinate-identical corners collapse to one point.
        intersections.sort_unstable();
        intersections.dedup();

        let grid = cells_from_intersections(&intersections);
        debug!(
            target: "extract",
            kernel_len,
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            intersections = intersections.len(),
            cells = grid.iter().map(Vec::len).sum::<usize>(),
            "ruling-line grid recovered"
        );

        if let Some(writer) = self.artifacts.as_ref() {
            let cell_boxes: Vec<BoundingBox> =
                grid.iter().flat_map(|row| row.iter().copied()).collect();
            let overlay = overlay_boxes(image, &cell_boxes, Rgb([220, 40, 40]));
            writer.save_stage_rgb(3, "grid_overlay", &overlay);
        }

        grid
    }

    /// Recovers the cell grid by clustering word blobs into rows.
    fn contour_grid(
        &self,
        image: &RgbImage,
        binary: &GrayImage,
        tuning: &ContourTuning,
    ) -> Vec<Vec<BoundingBox>> {
        let merged = merge_words(binary, tuning);
        if let Some(writer) = self.artifacts.as_ref() {
            writer.save_stage(1, "word_blocks_mask", &merged);
        }

        let blocks = find_word_blocks(&merged, tuning.min_box_area);
        if let Some(writer) = self.artifacts.as_ref() {
            let overlay = overlay_boxes(image, &blocks, Rgb([40, 180, 60]));
            writer.save_stage_rgb(2, "block_overlay", &overlay);
        }

        let grid = cluster_into_rows(blocks);
        debug!(
            target: "extract",
            rows = grid.len(),
            cells = grid.iter().map(Vec::len).sum::<usize>(),
            "contour grid recovered"
        );
        grid
    }
}

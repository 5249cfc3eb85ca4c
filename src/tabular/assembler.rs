//! # Stage Definition: Cell Text Assembly
//!
//! This stage is considered "Done" when it fulfills the following contract:
//!
//! - **Inputs**: The page image, the cell geometry grid (rows of
//!   `BoundingBox`), and the injected detection/recognition capabilities.
//! - **Outputs**: A [`Table`] whose cells carry recognized text; cells whose
//!   OCR failed in any way carry the empty string.
//! - **Logging**: Warns on every locally recovered failure (degenerate crop,
//!   detector error, dropped fragment, deadline overrun).
//! - **Invariants**:
//!     - The output table has exactly the input grid's shape.
//!     - A failure inside one cell never affects another cell.
//!     - Whole-cell recognition runs only when a cell yields zero usable
//!       regions, never as a retry after failed fragments.
//!     - After cancellation no further capability calls are made and the
//!       extraction fails with [`TableOcrError::Cancelled`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::{CancelFlag, FragmentSeparator, OcrResult, ParallelPolicy, TableOcrError};
use crate::domain::{DetectedRegion, TextRegionDetector, TextRecognizer};
use crate::processors::BoundingBox;
use crate::tabular::artifacts::ArtifactWriter;
use crate::tabular::result::{Cell, Table};
use crate::utils::crop_region;

/// Turns cell geometry into cell text by cropping each cell and running the
/// detection and recognition capabilities over it.
///
/// Cells are independent: each one is cropped, scanned for text regions and
/// recognized on its own, so the stage parallelizes over cells when the
/// grid is large enough.
#[derive(Debug)]
pub(crate) struct CellTextAssembler {
    pub(crate) detector: Arc<dyn TextRegionDetector>,
    pub(crate) recognizer: Arc<dyn TextRecognizer>,
    pub(crate) separator: FragmentSeparator,
    /// Margin in pixels added around each cell before cropping.
    pub(crate) crop_margin: f32,
    /// Deadline for a single recognition call. Results arriving later are
    /// discarded as if the call had failed.
    pub(crate) recognition_timeout: Option<Duration>,
}

impl CellTextAssembler {
    /// Assembles text for every cell of the grid.
    ///
    /// The grid may be ragged; the output table mirrors its shape exactly.
    /// Work runs on `pool` when one is provided and the policy asks for
    /// parallel assembly, otherwise on rayon's shared pool or the calling
    /// thread.
    pub(crate) fn assemble(
        &self,
        image: &RgbImage,
        grid: Vec<Vec<BoundingBox>>,
        policy: &ParallelPolicy,
        pool: Option<&rayon::ThreadPool>,
        cancel: &CancelFlag,
        artifacts: Option<&ArtifactWriter>,
    ) -> OcrResult<Table> {
        let mut cells = Vec::new();
        for (row_idx, row) in grid.into_iter().enumerate() {
            for (col_idx, bounds) in row.into_iter().enumerate() {
                cells.push(Cell::new(row_idx, col_idx, bounds));
            }
        }

        debug!(
            target: "extract",
            cells = cells.len(),
            parallel = policy.should_parallelize(cells.len()),
            "assembling cell text"
        );

        let fill = |cell: &mut Cell| {
            if cancel.is_cancelled() {
                return;
            }
            cell.text = self.assemble_cell(image, cell.row, cell.col, &cell.bounds, cancel, artifacts);
        };

        if policy.should_parallelize(cells.len()) {
            match pool {
                Some(pool) => pool.install(|| cells.par_iter_mut().for_each(fill)),
                None => cells.par_iter_mut().for_each(fill),
            }
        } else {
            cells.iter_mut().for_each(fill);
        }

        if cancel.is_cancelled() {
            return Err(TableOcrError::Cancelled);
        }

        let row_count = cells.iter().map(|cell| cell.row + 1).max().unwrap_or(0);
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_count];
        for cell in cells {
            rows[cell.row].push(cell);
        }
        Ok(Table::new(rows))
    }

    /// Produces the text of a single cell. Every failure is recovered
    /// locally by returning an empty string.
    fn assemble_cell(
        &self,
        image: &RgbImage,
        row: usize,
        col: usize,
        bounds: &BoundingBox,
        cancel: &CancelFlag,
        artifacts: Option<&ArtifactWriter>,
    ) -> String {
        let padded = bounds.pad_clamped(self.crop_margin, image.width(), image.height());
        let Some(crop) = crop_region(image, &padded) else {
            warn!(target: "extract", row, col, "cell crop is degenerate, leaving cell empty");
            return String::new();
        };
        if let Some(writer) = artifacts {
            writer.save_cell_crop(row, col, &crop);
        }

        let regions = match self.detector.detect_regions(&crop) {
            Ok(regions) => regions,
            Err(err) => {
                warn!(
                    target: "extract",
                    row,
                    col,
                    error = %err,
                    "region detection failed, treating cell as region-free"
                );
                Vec::new()
            }
        };

        let usable: Vec<&DetectedRegion> = regions.iter().filter(|r| r.is_quad()).collect();
        let malformed = regions.len() - usable.len();
        if malformed > 0 {
            debug!(target: "extract", row, col, malformed, "dropped malformed regions");
        }

        if usable.is_empty() {
            if cancel.is_cancelled() {
                return String::new();
            }
            // No usable regions at all: run recognition over the whole cell.
            return self.recognize_fragment(&crop, row, col).unwrap_or_default();
        }

        let mut fragments = Vec::with_capacity(usable.len());
        for region in usable {
            if cancel.is_cancelled() {
                break;
            }
            let Some(rect) = region.bounding_rect() else {
                continue;
            };
            let clamped = rect.pad_clamped(0.0, crop.width(), crop.height());
            let Some(fragment) = crop_region(&crop, &clamped) else {
                continue;
            };
            if let Some(text) = self.recognize_fragment(&fragment, row, col) {
                fragments.push(text);
            }
        }
        fragments.join(self.separator.as_str())
    }

    /// Runs one recognition call and normalizes its outcome.
    ///
    /// Returns `None` for failures, deadline overruns and blank results.
    fn recognize_fragment(&self, region: &RgbImage, row: usize, col: usize) -> Option<String> {
        let started = Instant::now();
        let outcome = self.recognizer.recognize(region);

        // The capability call is synchronous and cannot be preempted; a
        // deadline overrun is detected after the fact and the result thrown
        // away, successful or not.
        if let Some(limit) = self.recognition_timeout
            && started.elapsed() > limit
        {
            warn!(
                target: "extract",
                row,
                col,
                limit_ms = limit.as_millis() as u64,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "recognition exceeded its deadline, discarding result"
            );
            return None;
        }

        match outcome {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(err) => {
                warn!(
                    target: "extract",
                    row,
                    col,
                    error = %err,
                    "recognition failed, dropping fragment"
                );
                None
            }
        }
    }
}

//! Debug artifact output for pipeline stages and cell crops.

use crate::core::ArtifactConfig;
use crate::processors::BoundingBox;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::PathBuf;
use tracing::warn;

/// Writes intermediate pipeline images into a configured directory.
///
/// Artifact output is a debug aid: every write failure is logged and
/// swallowed so it can never fail an extraction.
#[derive(Debug)]
pub(crate) struct ArtifactWriter {
    config: ArtifactConfig,
}

impl ArtifactWriter {
    /// Creates the writer and its output directory.
    pub(crate) fn new(config: ArtifactConfig) -> Self {
        if let Err(err) = std::fs::create_dir_all(&config.dir) {
            warn!(
                target: "extract",
                dir = %config.dir.display(),
                error = %err,
                "failed to create artifact directory"
            );
        }
        Self { config }
    }

    /// Saves a numbered grayscale stage raster as `{index}_{name}.png`.
    pub(crate) fn save_stage(&self, index: usize, name: &str, image: &GrayImage) {
        if !self.config.stage_images {
            return;
        }
        self.write(self.stage_path(index, name), |path| image.save(path));
    }

    /// Saves a numbered RGB stage raster as `{index}_{name}.png`.
    pub(crate) fn save_stage_rgb(&self, index: usize, name: &str, image: &RgbImage) {
        if !self.config.stage_images {
            return;
        }
        self.write(self.stage_path(index, name), |path| image.save(path));
    }

    /// Saves a cell crop as `cell_{row}_{col}.png`.
    pub(crate) fn save_cell_crop(&self, row: usize, col: usize, image: &RgbImage) {
        if !self.config.cell_crops {
            return;
        }
        let path = self.config.dir.join(format!("cell_{row}_{col}.png"));
        self.write(path, |path| image.save(path));
    }

    fn stage_path(&self, index: usize, name: &str) -> PathBuf {
        self.config.dir.join(format!("{index}_{name}.png"))
    }

    fn write<F>(&self, path: PathBuf, save: F)
    where
        F: FnOnce(&PathBuf) -> Result<(), image::ImageError>,
    {
        if let Err(err) = save(&path) {
            warn!(
                target: "extract",
                path = %path.display(),
                error = %err,
                "failed to write artifact"
            );
        }
    }
}

/// Draws hollow rectangles for the given boxes over a copy of the image.
pub(crate) fn overlay_boxes(image: &RgbImage, boxes: &[BoundingBox], color: Rgb<u8>) -> RgbImage {
    let mut canvas = image.clone();
    for bounds in boxes {
        let rect = Rect::at(bounds.x.max(0.0) as i32, bounds.y.max(0.0) as i32).of_size(
            (bounds.width.max(1.0)) as u32,
            (bounds.height.max(1.0)) as u32,
        );
        draw_hollow_rect_mut(&mut canvas, rect, color);
    }
    canvas
}

//! PNG file export

use crate::{ExportError, ExportResult};
use capture::CapturedImage;
use chrono::{DateTime, Local};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// File name for a screenshot taken at `now`
pub fn screenshot_filename(now: DateTime<Local>) -> String {
    format!("screenshot_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// PNG file exporter
pub struct PngExporter;

impl PngExporter {
    /// Write `image` into `folder`, named after `now`
    ///
    /// The folder must already exist; it is never created here.
    pub fn save(image: &CapturedImage, folder: &Path, now: DateTime<Local>) -> ExportResult<PathBuf> {
        if !folder.is_dir() {
            return Err(ExportError::FolderMissing(folder.to_path_buf()));
        }

        let path = folder.join(screenshot_filename(now));
        image.as_rgba().save_with_format(&path, ImageFormat::Png)?;

        Ok(path)
    }
}

//! Export module for RegionSnap
//!
//! Provides the clipboard and PNG sinks for captured images.

mod clipboard;
mod dib;
mod png;

pub use clipboard::ClipboardSink;
#[cfg(windows)]
pub use clipboard::Win32Clipboard;
pub use dib::{encode_dib, BITMAPINFOHEADER_SIZE};
pub use png::{screenshot_filename, PngExporter};

use capture::{CaptureOptions, CapturedImage};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Target folder does not exist: {0}")]
    FolderMissing(PathBuf),

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Outcome of each sink that was asked to run
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// `None` when the clipboard sink was not requested
    pub clipboard: Option<ExportResult<()>>,
    /// `None` when the file sink was not requested
    pub file: Option<ExportResult<PathBuf>>,
}

impl DeliveryReport {
    /// True when every requested sink succeeded
    pub fn is_success(&self) -> bool {
        !matches!(self.clipboard, Some(Err(_))) && !matches!(self.file, Some(Err(_)))
    }

    /// Human-readable failure lines, one per failed sink
    pub fn failures(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(Err(err)) = &self.clipboard {
            lines.push(format!("Could not copy the screenshot to the clipboard: {}", err));
        }
        if let Some(Err(err)) = &self.file {
            lines.push(format!("Could not save the screenshot: {}", err));
        }
        lines
    }

    /// Path of the written file, if the file sink succeeded
    pub fn saved_path(&self) -> Option<&PathBuf> {
        match &self.file {
            Some(Ok(path)) => Some(path),
            _ => None,
        }
    }
}

/// Hand `image` to the sinks selected in `options`
///
/// The sinks run independently: one failing never stops the other.
pub fn deliver(
    image: &CapturedImage,
    options: &CaptureOptions,
    clipboard: &mut dyn ClipboardSink,
    now: DateTime<Local>,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    if options.save_to_clipboard {
        let result = encode_dib(image).and_then(|dib| clipboard.set_dib(&dib));
        match &result {
            Ok(()) => log::info!("Copied {}x{} screenshot to clipboard", image.width(), image.height()),
            Err(err) => log::error!("Clipboard sink failed: {}", err),
        }
        report.clipboard = Some(result);
    }

    if options.save_to_file {
        let result = PngExporter::save(image, &options.target_folder, now);
        match &result {
            Ok(path) => log::info!("Saved screenshot to {:?}", path),
            Err(err) => log::error!("File sink failed: {}", err),
        }
        report.file = Some(result);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Default)]
    struct FakeClipboard {
        contents: Option<Vec<u8>>,
        fail: bool,
    }

    impl ClipboardSink for FakeClipboard {
        fn set_dib(&mut self, dib: &[u8]) -> ExportResult<()> {
            if self.fail {
                return Err(ExportError::Clipboard("clipboard is locked".into()));
            }
            self.contents = Some(dib.to_vec());
            Ok(())
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("regionsnap-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).single().unwrap()
    }

    fn options(clipboard: bool, file: bool, folder: PathBuf) -> CaptureOptions {
        CaptureOptions {
            save_to_clipboard: clipboard,
            save_to_file: file,
            target_folder: folder,
            ..Default::default()
        }
    }

    #[test]
    fn both_sinks_run_when_requested() {
        let dir = temp_dir();
        let image = CapturedImage::filled(4, 3, [10, 20, 30, 255]);
        let mut clipboard = FakeClipboard::default();

        let report = deliver(&image, &options(true, true, dir.clone()), &mut clipboard, now());

        assert!(report.is_success());
        assert!(clipboard.contents.is_some());
        let path = report.saved_path().unwrap();
        assert_eq!(path, &dir.join("screenshot_20240305_140709.png"));
        assert!(path.exists());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_folder_does_not_block_clipboard() {
        let missing = std::env::temp_dir().join(format!("regionsnap-missing-{}", uuid::Uuid::new_v4()));
        let image = CapturedImage::filled(2, 2, [0, 0, 0, 255]);
        let mut clipboard = FakeClipboard::default();

        let report = deliver(&image, &options(true, true, missing.clone()), &mut clipboard, now());

        assert!(matches!(report.clipboard, Some(Ok(()))));
        assert!(matches!(report.file, Some(Err(ExportError::FolderMissing(_)))));
        assert!(clipboard.contents.is_some());
        assert!(!missing.exists());
        assert_eq!(report.failures().len(), 1);
    }

    #[test]
    fn locked_clipboard_does_not_block_file() {
        let dir = temp_dir();
        let image = CapturedImage::filled(2, 2, [0, 0, 0, 255]);
        let mut clipboard = FakeClipboard { fail: true, ..Default::default() };

        let report = deliver(&image, &options(true, true, dir.clone()), &mut clipboard, now());

        assert!(matches!(report.clipboard, Some(Err(ExportError::Clipboard(_)))));
        assert!(report.saved_path().is_some_and(|p| p.exists()));
        assert!(!report.is_success());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn unrequested_sinks_do_not_run() {
        let image = CapturedImage::filled(2, 2, [0, 0, 0, 255]);
        let mut clipboard = FakeClipboard::default();

        let report = deliver(&image, &options(false, false, PathBuf::new()), &mut clipboard, now());

        assert!(report.clipboard.is_none());
        assert!(report.file.is_none());
        assert!(clipboard.contents.is_none());
        assert!(report.is_success());
    }
}

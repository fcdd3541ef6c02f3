//! Capture options supplied by the options collaborator

use std::path::PathBuf;
use std::time::Duration;

/// Delay used when the "take screenshot later" option is checked
pub const CAPTURE_DELAY_SECONDS: u32 = 5;

/// What to capture and where the result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    pub capture_pointer: bool,
    pub save_to_clipboard: bool,
    pub save_to_file: bool,
    pub target_folder: PathBuf,
    /// Either 0 or [`CAPTURE_DELAY_SECONDS`]
    pub delay_seconds: u32,
}

impl CaptureOptions {
    pub fn delay(&self) -> Option<Duration> {
        if self.delay_seconds > 0 {
            Some(Duration::from_secs(self.delay_seconds as u64))
        } else {
            None
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            capture_pointer: false,
            save_to_clipboard: true,
            save_to_file: false,
            target_folder: PathBuf::new(),
            delay_seconds: 0,
        }
    }
}

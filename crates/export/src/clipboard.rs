//! Clipboard sink

use crate::ExportResult;

/// Destination for CF_DIB payloads
pub trait ClipboardSink {
    /// Replace the clipboard contents with `dib`
    fn set_dib(&mut self, dib: &[u8]) -> ExportResult<()>;
}

#[cfg(windows)]
pub use win32::Win32Clipboard;

#[cfg(windows)]
mod win32 {
    use super::ClipboardSink;
    use crate::{ExportError, ExportResult};
    use clipboard_win::{formats, raw, Clipboard};

    /// Another process may hold the clipboard briefly
    const OPEN_ATTEMPTS: usize = 10;

    /// System clipboard
    #[derive(Debug, Default)]
    pub struct Win32Clipboard;

    impl ClipboardSink for Win32Clipboard {
        fn set_dib(&mut self, dib: &[u8]) -> ExportResult<()> {
            // Closed again when `_clip` drops
            let _clip = Clipboard::new_attempts(OPEN_ATTEMPTS)
                .map_err(|err| ExportError::Clipboard(format!("open: {}", err)))?;

            raw::set(formats::CF_DIB, dib)
                .map_err(|err| ExportError::Clipboard(format!("set CF_DIB: {}", err)))?;

            log::debug!("Placed {} byte DIB on the clipboard", dib.len());
            Ok(())
        }
    }
}

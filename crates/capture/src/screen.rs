//! Region grab using GDI

use crate::{monitor, CaptureError, CaptureResult, CapturedImage, Rect, ScreenSource};
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject,
    GetDC, GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, DIB_RGB_COLORS, SRCCOPY,
};

impl From<windows::core::Error> for CaptureError {
    fn from(e: windows::core::Error) -> Self {
        CaptureError::Windows(e.to_string())
    }
}

/// Screen source backed by the desktop DC
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiScreen;

impl ScreenSource for GdiScreen {
    fn grab(&self, region: Rect) -> CaptureResult<CapturedImage> {
        if region.is_empty() {
            return Err(CaptureError::EmptyRegion(region));
        }

        let width = region.width as i32;
        let height = region.height as i32;

        unsafe {
            // Get screen DC
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(CaptureError::Grab("Failed to get screen DC".into()));
            }

            // Create compatible DC and bitmap
            let mem_dc = CreateCompatibleDC(screen_dc);
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            let old_bitmap = SelectObject(mem_dc, bitmap);

            // Copy region to bitmap; screen DC coordinates are native
            let blit = BitBlt(
                mem_dc,
                0,
                0,
                width,
                height,
                screen_dc,
                region.x,
                region.y,
                SRCCOPY,
            );

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    biSizeImage: 0,
                    biXPelsPerMeter: 0,
                    biYPelsPerMeter: 0,
                    biClrUsed: 0,
                    biClrImportant: 0,
                },
                bmiColors: [Default::default()],
            };

            let mut data = vec![0u8; region.width as usize * region.height as usize * 4];
            let lines = if blit.is_ok() {
                GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    region.height,
                    Some(data.as_mut_ptr() as *mut _),
                    &mut bmi,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            // Cleanup
            SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);

            blit?;
            if lines == 0 {
                return Err(CaptureError::Grab("GetDIBits returned no lines".into()));
            }

            CapturedImage::from_bgra(data, region.width, region.height)
        }
    }

    fn pointer_position(&self) -> Option<(i32, i32)> {
        match monitor::pointer_position() {
            Ok(pos) => Some(pos),
            Err(e) => {
                log::warn!("GetCursorPos failed: {}", e);
                None
            }
        }
    }
}

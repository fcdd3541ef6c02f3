//! Monitor topology and virtual desktop coordinate spaces
//!
//! Three coordinate spaces are in play:
//! - native: OS screen coordinates, negative left of / above the primary monitor
//! - virtual: native shifted by the negative-origin offset, never negative
//! - local: native relative to the desktop's top-left, as seen by the overlay window

use crate::{CaptureError, CaptureResult, Rect};

/// Union bounding box of all monitors, in native coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualDesktop {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// Compute the minimal box covering every monitor
pub fn compute_virtual_desktop(monitors: &[Rect]) -> CaptureResult<VirtualDesktop> {
    let first = monitors.first().ok_or(CaptureError::NoMonitors)?;

    let desktop = monitors.iter().skip(1).fold(
        VirtualDesktop {
            min_x: first.x,
            min_y: first.y,
            max_x: first.right(),
            max_y: first.bottom(),
        },
        |acc, m| VirtualDesktop {
            min_x: acc.min_x.min(m.x),
            min_y: acc.min_y.min(m.y),
            max_x: acc.max_x.max(m.right()),
            max_y: acc.max_y.max(m.bottom()),
        },
    );

    Ok(desktop)
}

/// Find the monitor containing `point`, falling back to the first one
pub fn locate(point: (i32, i32), monitors: &[Rect]) -> Option<&Rect> {
    let (x, y) = point;
    match monitors.iter().find(|m| m.contains(x, y)) {
        Some(monitor) => Some(monitor),
        None => {
            if !monitors.is_empty() {
                log::warn!(
                    "Pointer at ({}, {}) is outside every monitor, using the first one",
                    x, y
                );
            }
            monitors.first()
        }
    }
}

impl VirtualDesktop {
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y) as u32
    }

    /// Desktop bounds in native coordinates
    pub fn native_bounds(&self) -> Rect {
        Rect::from_corners(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Desktop bounds in virtual coordinates
    pub fn virtual_bounds(&self) -> Rect {
        self.native_rect_to_virtual(&self.native_bounds())
    }

    /// Shift added to native coordinates so none are negative
    pub fn offset(&self) -> (i32, i32) {
        ((-self.min_x).max(0), (-self.min_y).max(0))
    }

    /// Convert overlay window coordinates to virtual coordinates
    pub fn local_to_virtual(&self, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.offset();
        (x + self.min_x + ox, y + self.min_y + oy)
    }

    /// Convert virtual coordinates to overlay window coordinates
    pub fn virtual_to_local(&self, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.offset();
        (x - ox - self.min_x, y - oy - self.min_y)
    }

    pub fn native_to_virtual(&self, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.offset();
        (x + ox, y + oy)
    }

    pub fn native_rect_to_virtual(&self, rect: &Rect) -> Rect {
        let (ox, oy) = self.offset();
        rect.offset(ox, oy)
    }

    pub fn virtual_to_native(&self, rect: &Rect) -> Rect {
        let (ox, oy) = self.offset();
        rect.offset(-ox, -oy)
    }

    /// Clip a virtual rectangle to the desktop, `None` if nothing remains
    pub fn clamp_virtual(&self, rect: &Rect) -> Option<Rect> {
        self.virtual_bounds()
            .intersection(rect)
            .filter(|r| !r.is_empty())
    }
}

/// Enumerate attached monitors in native coordinates
#[cfg(windows)]
pub fn enumerate_monitors() -> CaptureResult<Vec<Rect>> {
    use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
    use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, HDC, HMONITOR};

    unsafe extern "system" fn enum_monitor_callback(
        _hmonitor: HMONITOR,
        _hdc: HDC,
        rect: *mut RECT,
        lparam: LPARAM,
    ) -> BOOL {
        let monitors = &mut *(lparam.0 as *mut Vec<Rect>);
        if let Some(r) = rect.as_ref() {
            monitors.push(Rect::from_corners(r.left, r.top, r.right, r.bottom));
        }
        BOOL(1) // Continue enumeration
    }

    let mut monitors: Vec<Rect> = Vec::new();
    unsafe {
        let ok = EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_callback),
            LPARAM(&mut monitors as *mut Vec<Rect> as isize),
        );
        if !ok.as_bool() {
            return Err(CaptureError::Windows("EnumDisplayMonitors failed".into()));
        }
    }

    log::debug!("Enumerated {} monitor(s): {:?}", monitors.len(), monitors);
    Ok(monitors)
}

/// Current pointer position in native coordinates
#[cfg(windows)]
pub fn pointer_position() -> CaptureResult<(i32, i32)> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut pt = POINT::default();
    unsafe {
        GetCursorPos(&mut pt).map_err(|e| CaptureError::Windows(e.to_string()))?;
    }
    Ok((pt.x, pt.y))
}

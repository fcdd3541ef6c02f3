//! GDI rendering for overlay

use crate::handles::handle_hit_boxes;
use crate::selection::SelectionRect;
use capture::VirtualDesktop;
use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreatePen,
    CreateSolidBrush, DeleteDC, DeleteObject, EndPaint, FillRect, GetStockObject,
    Rectangle, SelectObject, SetBkMode, SetTextColor, TextOutW, HDC, NULL_BRUSH,
    PAINTSTRUCT, PS_SOLID, SRCCOPY, TRANSPARENT,
};

/// Selection border thickness
const BORDER_WIDTH: i32 = 5;
/// Hint bar height at the bottom of the selection
const HINT_OFFSET: i32 = 12;

const WHITE: COLORREF = COLORREF(0x00FFFFFF);
const BLACK: COLORREF = COLORREF(0x00000000);
const HANDLE_BLUE: COLORREF = COLORREF(0x00FF0000); // COLORREF is 0x00BBGGRR

/// Overlay renderer
pub struct OverlayRenderer {
    desktop: VirtualDesktop,
}

impl OverlayRenderer {
    /// Create a renderer for a window covering `desktop`
    pub fn new(desktop: VirtualDesktop) -> Self {
        Self { desktop }
    }

    /// Render to window, double-buffered to avoid flicker while dragging
    pub fn render(&self, hwnd: HWND, selection: &SelectionRect) {
        let width = self.desktop.width() as i32;
        let height = self.desktop.height() as i32;

        unsafe {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            let mem_dc = CreateCompatibleDC(hdc);
            let bitmap = CreateCompatibleBitmap(hdc, width, height);
            let old_bitmap = SelectObject(mem_dc, bitmap);

            self.draw_background(mem_dc, width, height);
            self.draw_selection(mem_dc, selection);
            self.draw_handles(mem_dc, selection);
            self.draw_hint(mem_dc, selection);

            let _ = BitBlt(hdc, 0, 0, width, height, mem_dc, 0, 0, SRCCOPY);

            SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);

            let _ = EndPaint(hwnd, &ps);
        }
    }

    unsafe fn draw_background(&self, hdc: HDC, width: i32, height: i32) {
        // Window is layered at 50% alpha; white reads as a light veil
        let brush = CreateSolidBrush(WHITE);
        let rect = RECT { left: 0, top: 0, right: width, bottom: height };
        FillRect(hdc, &rect, brush);
        let _ = DeleteObject(brush);
    }

    unsafe fn draw_selection(&self, hdc: HDC, selection: &SelectionRect) {
        let pen = CreatePen(PS_SOLID, BORDER_WIDTH, BLACK);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, GetStockObject(NULL_BRUSH));

        let (left, top) = self.desktop.virtual_to_local(selection.x1, selection.y1);
        let (right, bottom) = self.desktop.virtual_to_local(selection.x2, selection.y2);
        let _ = Rectangle(hdc, left, top, right, bottom);

        SelectObject(hdc, old_brush);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(pen);
    }

    unsafe fn draw_handles(&self, hdc: HDC, selection: &SelectionRect) {
        let pen = CreatePen(PS_SOLID, 1, BLACK);
        let brush = CreateSolidBrush(HANDLE_BLUE);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, brush);

        for (_, hit_box) in handle_hit_boxes(selection) {
            let r = hit_box.to_rect();
            let (left, top) = self.desktop.virtual_to_local(r.x, r.y);
            let _ = Rectangle(hdc, left, top, left + r.width as i32, top + r.height as i32);
        }

        SelectObject(hdc, old_brush);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(brush);
        let _ = DeleteObject(pen);
    }

    unsafe fn draw_hint(&self, hdc: HDC, selection: &SelectionRect) {
        let text = format!(
            "{} x {}  |  Enter / double-click: capture  |  Esc: cancel",
            selection.width(),
            selection.height()
        );
        let text_wide: Vec<u16> = text.encode_utf16().collect();

        let (left, bottom) = self.desktop.virtual_to_local(selection.x1, selection.y2);

        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, BLACK);
        let _ = TextOutW(hdc, left, bottom + HINT_OFFSET, &text_wide);
    }
}

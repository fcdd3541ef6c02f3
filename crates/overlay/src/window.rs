//! Overlay window implementation

use crate::{
    controller::{InteractionState, PointerEvent, SelectionController},
    handles::{hit_test, HandleId},
    render::OverlayRenderer,
    OverlayError, OverlayResult, SelectionOutcome,
};
use capture::VirtualDesktop;
use std::cell::RefCell;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{InvalidateRect, UpdateWindow};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, SetFocus};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    LoadCursorW, PostQuitMessage, RegisterClassExW, SetCursor, SetForegroundWindow,
    SetLayeredWindowAttributes, ShowWindow, TranslateMessage, CS_DBLCLKS, CS_HREDRAW,
    CS_VREDRAW, IDC_ARROW, IDC_SIZEALL, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE, IDC_SIZEWE,
    LWA_ALPHA, MSG, SW_SHOW, WM_CAPTURECHANGED, WM_CLOSE, WM_DESTROY, WM_ERASEBKGND,
    WM_KEYDOWN, WM_LBUTTONDBLCLK, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_PAINT,
    WNDCLASSEXW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

/// Window opacity, out of 255
const OVERLAY_ALPHA: u8 = 128;

impl From<windows::core::Error> for OverlayError {
    fn from(err: windows::core::Error) -> Self {
        OverlayError::Windows(err.to_string())
    }
}

thread_local! {
    static OVERLAY_STATE: RefCell<Option<OverlayState>> = const { RefCell::new(None) };
}

struct OverlayState {
    renderer: OverlayRenderer,
    desktop: VirtualDesktop,
    controller: SelectionController,
    result: Option<SelectionOutcome>,
}

/// Overlay window for selection
pub struct OverlayWindow;

impl OverlayWindow {
    const CLASS_NAME: PCWSTR = w!("RegionSnapOverlay");

    /// Show the overlay over the whole virtual desktop and run it modally
    ///
    /// `controller` holds the starting rectangle and is left holding the
    /// final one, whatever the outcome.
    /// Thread messages equal to `wake_message` call `should_cancel`; a `true`
    /// answer ends the session as cancelled. Any other thread message is
    /// dropped while the overlay is up.
    pub fn show<F>(
        desktop: &VirtualDesktop,
        controller: &mut SelectionController,
        wake_message: u32,
        mut should_cancel: F,
    ) -> OverlayResult<SelectionOutcome>
    where
        F: FnMut() -> bool,
    {
        OVERLAY_STATE.with(|s| {
            *s.borrow_mut() = Some(OverlayState {
                renderer: OverlayRenderer::new(*desktop),
                desktop: *desktop,
                controller: *controller,
                result: None,
            });
        });

        let outcome = unsafe { Self::run(desktop, wake_message, &mut should_cancel) };

        let final_state = OVERLAY_STATE.with(|s| s.borrow_mut().take());
        if let Some(state) = final_state {
            *controller = state.controller;
            controller.reset();
        }

        outcome
    }

    unsafe fn run(
        desktop: &VirtualDesktop,
        wake_message: u32,
        should_cancel: &mut dyn FnMut() -> bool,
    ) -> OverlayResult<SelectionOutcome> {
        let hmodule = GetModuleHandleW(None)?;
        let hinstance = HINSTANCE(hmodule.0);

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS,
            lpfnWndProc: Some(Self::wnd_proc),
            hInstance: hinstance,
            lpszClassName: Self::CLASS_NAME,
            ..Default::default()
        };

        // Fails harmlessly when the class is already registered
        RegisterClassExW(&wc);

        let bounds = desktop.native_bounds();
        let hwnd = CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
            Self::CLASS_NAME,
            w!("RegionSnap Selection"),
            WS_POPUP,
            bounds.x,
            bounds.y,
            bounds.width as i32,
            bounds.height as i32,
            None,
            None,
            hinstance,
            None,
        )
        .map_err(|err| {
            log::error!("CreateWindowExW failed: {}", err);
            OverlayError::CreateFailed
        })?;

        if let Err(err) = SetLayeredWindowAttributes(hwnd, COLORREF(0), OVERLAY_ALPHA, LWA_ALPHA) {
            let _ = DestroyWindow(hwnd);
            return Err(err.into());
        }

        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
        let _ = SetFocus(hwnd);
        let _ = UpdateWindow(hwnd);
        log::debug!("Overlay shown over {:?}", bounds);

        // Message loop
        let mut msg = MSG::default();
        loop {
            let ret = GetMessageW(&mut msg, None, 0, 0);
            if !ret.as_bool() {
                // Hand WM_QUIT back to the outer loop
                Self::set_result(SelectionOutcome::Cancelled);
                PostQuitMessage(0);
                break;
            }

            if msg.hwnd.0.is_null() {
                if msg.message == wake_message && should_cancel() {
                    log::info!("Selection cancelled by global key");
                    Self::set_result(SelectionOutcome::Cancelled);
                }
            } else {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            let has_result = OVERLAY_STATE.with(|s| {
                s.borrow().as_ref().map(|state| state.result.is_some()).unwrap_or(false)
            });
            if has_result {
                break;
            }
        }

        let result = OVERLAY_STATE.with(|s| s.borrow().as_ref().and_then(|state| state.result));

        // Cleanup
        let _ = ReleaseCapture();
        let _ = DestroyWindow(hwnd);

        Ok(result.unwrap_or(SelectionOutcome::Cancelled))
    }

    fn set_result(outcome: SelectionOutcome) {
        OVERLAY_STATE.with(|s| {
            if let Some(ref mut state) = *s.borrow_mut() {
                if state.result.is_none() {
                    state.result = Some(outcome);
                }
            }
        });
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_PAINT => {
                OVERLAY_STATE.with(|s| {
                    if let Some(ref state) = *s.borrow() {
                        state.renderer.render(hwnd, &state.controller.selection());
                    }
                });
                LRESULT(0)
            }

            WM_ERASEBKGND => LRESULT(1),

            WM_LBUTTONDOWN => {
                let _ = SetCapture(hwnd);
                Self::pointer_event(hwnd, lparam, |x, y| PointerEvent::Press { x, y });
                LRESULT(0)
            }

            WM_MOUSEMOVE => {
                Self::pointer_event(hwnd, lparam, |x, y| PointerEvent::Move { x, y });
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                Self::pointer_event(hwnd, lparam, |x, y| PointerEvent::Release { x, y });
                let _ = ReleaseCapture();
                LRESULT(0)
            }

            WM_CAPTURECHANGED => {
                // Capture taken away mid-gesture: end the gesture where it is
                OVERLAY_STATE.with(|s| {
                    if let Some(ref mut state) = *s.borrow_mut() {
                        state.controller.reset();
                    }
                });
                LRESULT(0)
            }

            WM_LBUTTONDBLCLK => {
                Self::handle_double_click(lparam);
                LRESULT(0)
            }

            WM_KEYDOWN => {
                Self::handle_key_down(wparam);
                LRESULT(0)
            }

            WM_CLOSE => {
                Self::set_result(SelectionOutcome::Cancelled);
                LRESULT(0)
            }

            WM_DESTROY => LRESULT(0),

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    fn local_point(lparam: LPARAM) -> (i32, i32) {
        let x = (lparam.0 & 0xFFFF) as i16 as i32;
        let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
        (x, y)
    }

    unsafe fn pointer_event(hwnd: HWND, lparam: LPARAM, make: impl Fn(i32, i32) -> PointerEvent) {
        let (x, y) = Self::local_point(lparam);

        let (changed, cursor) = OVERLAY_STATE.with(|s| {
            match *s.borrow_mut() {
                Some(ref mut state) => {
                    let (vx, vy) = state.desktop.local_to_virtual(x, y);
                    let changed = state.controller.handle(make(vx, vy));
                    (changed, Self::cursor_for(&state.controller, vx, vy))
                }
                None => (false, IDC_ARROW),
            }
        });

        if let Ok(hcursor) = LoadCursorW(None, cursor) {
            SetCursor(hcursor);
        }

        if changed {
            let _ = InvalidateRect(hwnd, None, false);
        }
    }

    fn cursor_for(controller: &SelectionController, x: i32, y: i32) -> PCWSTR {
        let selection = controller.selection();
        let handle = match controller.state() {
            InteractionState::Resizing { handle } => Some(handle),
            InteractionState::Dragging { .. } => return IDC_SIZEALL,
            InteractionState::Idle => hit_test((x, y), &selection),
        };

        match handle {
            Some(HandleId::TopLeft | HandleId::BottomRight) => IDC_SIZENWSE,
            Some(HandleId::TopRight | HandleId::BottomLeft) => IDC_SIZENESW,
            Some(HandleId::TopMid | HandleId::BottomMid) => IDC_SIZENS,
            Some(HandleId::LeftMid | HandleId::RightMid) => IDC_SIZEWE,
            None if selection.contains(x, y) => IDC_SIZEALL,
            None => IDC_ARROW,
        }
    }

    fn handle_double_click(lparam: LPARAM) {
        let (x, y) = Self::local_point(lparam);
        OVERLAY_STATE.with(|s| {
            if let Some(ref mut state) = *s.borrow_mut() {
                let (vx, vy) = state.desktop.local_to_virtual(x, y);
                let selection = state.controller.selection();
                if state.result.is_none() && selection.contains(vx, vy) {
                    state.controller.reset();
                    state.result = Some(SelectionOutcome::Confirmed);
                }
            }
        });
    }

    fn handle_key_down(wparam: WPARAM) {
        const VK_ESCAPE: usize = 0x1B;
        const VK_RETURN: usize = 0x0D;

        OVERLAY_STATE.with(|s| {
            if let Some(ref mut state) = *s.borrow_mut() {
                if state.result.is_some() {
                    return;
                }
                match wparam.0 {
                    VK_ESCAPE => {
                        state.controller.reset();
                        state.result = Some(SelectionOutcome::Cancelled);
                    }
                    VK_RETURN => {
                        state.controller.reset();
                        state.result = Some(SelectionOutcome::Confirmed);
                    }
                    _ => {}
                }
            }
        });
    }
}

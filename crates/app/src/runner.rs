//! Win32 message loop driving the session flow

use crate::config::ConfigStore;
use crate::hotkey::{self, GateSignal, HotkeyGate, VK_SNAPSHOT};
use crate::notify;
use crate::scheduler::Ticket;
use crate::session::{CaptureJob, ConfirmAction, Orchestrator, SignalAction};
use anyhow::Context;
use capture::monitor::{enumerate_monitors, pointer_position};
use capture::{CaptureService, GdiScreen};
use chrono::Local;
use crossbeam_channel::{unbounded, Receiver};
use export::{deliver, Win32Clipboard};
use overlay::{OverlayWindow, SelectionOutcome};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Duration;
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PostThreadMessageW, TranslateMessage, MSG, WM_APP,
};

/// Hotkey signals are waiting in the channel
const WM_APP_WAKE: u32 = WM_APP + 1;
/// A delayed capture is due; `wParam` carries the ticket
const WM_APP_DELAY: u32 = WM_APP + 2;

/// Wait for the overlay to leave the screen before grabbing
const HIDE_SETTLE: Duration = Duration::from_millis(100);

fn post(thread_id: u32, message: u32, wparam: usize) {
    unsafe {
        if let Err(err) = PostThreadMessageW(thread_id, message, WPARAM(wparam), LPARAM(0)) {
            log::error!("PostThreadMessageW({:#x}) failed: {}", message, err);
        }
    }
}

struct App {
    store: ConfigStore,
    orchestrator: Orchestrator,
    service: CaptureService<GdiScreen>,
    clipboard: Win32Clipboard,
    signals: Receiver<GateSignal>,
}

pub fn run() -> anyhow::Result<()> {
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let ui_thread = unsafe { GetCurrentThreadId() };
    let (signal_tx, signal_rx) = unbounded();

    let gate = HotkeyGate::new(VK_SNAPSHOT, signal_tx, move || post(ui_thread, WM_APP_WAKE, 0));
    let hook = hotkey::install(gate)?;

    let store = ConfigStore::default_location().context("Failed to locate config directory")?;
    log::info!("Using config {:?}", store.path());

    let mut app = App {
        store,
        orchestrator: Orchestrator::new(move |ticket| post(ui_thread, WM_APP_DELAY, ticket as usize)),
        service: CaptureService::new(GdiScreen),
        clipboard: Win32Clipboard,
        signals: signal_rx,
    };

    log::info!("RegionSnap ready, press Print Screen to select a region");

    let mut msg = MSG::default();
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            match msg.message {
                WM_APP_WAKE => app.guarded(|app| app.drain_signals()),
                WM_APP_DELAY => {
                    let ticket = msg.wParam.0 as Ticket;
                    app.guarded(|app| app.on_delay_elapsed(ticket));
                }
                _ => {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }
    }

    hook.stop();
    log::info!("RegionSnap exiting");
    Ok(())
}

impl App {
    /// Run `f`, forcing the session closed if it panics
    fn guarded(&mut self, f: impl FnOnce(&mut App)) {
        if catch_unwind(AssertUnwindSafe(|| f(self))).is_err() {
            log::error!("Unexpected failure while handling a key event");
            self.orchestrator.reset();
        }
    }

    fn drain_signals(&mut self) {
        while let Ok(signal) = self.signals.try_recv() {
            match self.orchestrator.handle_signal(signal) {
                SignalAction::OpenRequested => self.run_session(),
                SignalAction::Cancelled | SignalAction::Ignored => {}
            }
        }
    }

    fn run_session(&mut self) {
        let mut config = self.store.load();
        let saved = config.saved_geometry();

        let monitors = match enumerate_monitors() {
            Ok(monitors) => monitors,
            Err(err) => {
                notify::show_error(&format!("Could not enumerate monitors: {}", err));
                return;
            }
        };
        let pointer = pointer_position().unwrap_or_else(|err| {
            log::warn!("Pointer position unavailable ({}), assuming origin", err);
            (0, 0)
        });

        let session = match self.orchestrator.open_session(&monitors, pointer, saved.as_ref()) {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(err) => {
                notify::show_error(&format!("Could not start a selection: {}", err));
                return;
            }
        };

        let desktop = session.desktop;
        let signals = &self.signals;
        // Triggers while the overlay is up are dropped
        let outcome = OverlayWindow::show(&desktop, &mut session.controller, WM_APP_WAKE, || {
            hotkey::drain_cancel(signals)
        });

        match outcome {
            Ok(SelectionOutcome::Confirmed) => {
                let options = config.options();
                let confirmed = match self.orchestrator.confirm(options) {
                    Ok(confirmed) => confirmed,
                    Err(err) => {
                        log::error!("Confirm failed: {}", err);
                        self.orchestrator.reset();
                        return;
                    }
                };

                config.set_geometry(confirmed.geometry);
                if let Err(err) = self.store.save(&config) {
                    log::error!("Failed to save config: {}", err);
                }

                match confirmed.action {
                    ConfirmAction::CaptureNow(job) => {
                        thread::sleep(HIDE_SETTLE);
                        self.capture(job);
                    }
                    ConfirmAction::Deferred { ticket, delay } => {
                        log::info!("Capture {} scheduled in {:?}", ticket, delay);
                    }
                }
            }
            Ok(SelectionOutcome::Cancelled) => {
                self.orchestrator.cancel();
            }
            Err(err) => {
                self.orchestrator.reset();
                notify::show_error(&format!("Selection overlay failed: {}", err));
            }
        }
    }

    fn on_delay_elapsed(&mut self, ticket: Ticket) {
        if let Some(job) = self.orchestrator.on_delay_elapsed(ticket) {
            self.capture(job);
        }
    }

    fn capture(&mut self, job: CaptureJob) {
        let image = match self.service.capture(&job.desktop, job.rect, &job.options) {
            Ok(image) => image,
            Err(err) => {
                notify::show_error(&format!("Screenshot failed: {}", err));
                return;
            }
        };

        let report = deliver(&image, &job.options, &mut self.clipboard, Local::now());
        notify::report_delivery(&report);
    }
}

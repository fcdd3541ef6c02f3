//! Session orchestration for RegionSnap

use crate::hotkey::GateSignal;
use crate::scheduler::{DelaySlot, Ticket};
use capture::{compute_virtual_desktop, locate, CaptureError, CaptureOptions, Rect, VirtualDesktop};
use overlay::{initial_selection, saved_geometry, SavedGeometry, SelectionController};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("No selection session is open")]
    NotOpen,
}

/// One hotkey-to-confirm/cancel cycle
#[derive(Debug, Clone)]
pub struct Session {
    pub id: u64,
    pub desktop: VirtualDesktop,
    /// Native bounds of the monitor under the pointer at start
    pub monitor: Rect,
    pub controller: SelectionController,
}

/// Everything the capture step needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureJob {
    pub desktop: VirtualDesktop,
    /// Virtual-desktop coordinates
    pub rect: Rect,
    pub options: CaptureOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Run the capture now
    CaptureNow(CaptureJob),
    /// Capture when the ticket comes back through [`Orchestrator::on_delay_elapsed`]
    Deferred { ticket: Ticket, delay: Duration },
}

/// Result of confirming a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    pub action: ConfirmAction,
    /// Geometry to persist
    pub geometry: SavedGeometry,
}

/// What the UI thread should do about a hotkey signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Enumerate monitors and call [`Orchestrator::open_session`]
    OpenRequested,
    Cancelled,
    Ignored,
}

type ElapsedHook = Arc<dyn Fn(Ticket) + Send + Sync>;

/// Owns the open session and the pending delayed capture
pub struct Orchestrator {
    session: Option<Session>,
    next_id: u64,
    delay: DelaySlot,
    deferred: Option<CaptureJob>,
    on_elapsed: ElapsedHook,
}

impl Orchestrator {
    /// `on_elapsed` runs on a worker thread when a delayed capture is due
    pub fn new<F>(on_elapsed: F) -> Self
    where
        F: Fn(Ticket) + Send + Sync + 'static,
    {
        Self {
            session: None,
            next_id: 0,
            delay: DelaySlot::new(),
            deferred: None,
            on_elapsed: Arc::new(on_elapsed),
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn has_pending_capture(&self) -> bool {
        self.delay.is_pending()
    }

    pub fn handle_signal(&mut self, signal: GateSignal) -> SignalAction {
        match signal {
            GateSignal::OpenSession if self.is_open() => {
                log::debug!("Trigger ignored, a session is already open");
                SignalAction::Ignored
            }
            GateSignal::OpenSession => SignalAction::OpenRequested,
            GateSignal::Cancel => {
                if self.cancel() {
                    SignalAction::Cancelled
                } else {
                    SignalAction::Ignored
                }
            }
        }
    }

    /// Start a session on the monitor under `pointer`
    ///
    /// Returns `Ok(None)` without touching anything if a session is already
    /// open. A pending delayed capture is cancelled.
    pub fn open_session(
        &mut self,
        monitors: &[Rect],
        pointer: (i32, i32),
        saved: Option<&SavedGeometry>,
    ) -> Result<Option<&mut Session>, SessionError> {
        if self.session.is_some() {
            log::debug!("Session already open, ignoring");
            return Ok(None);
        }

        let desktop = compute_virtual_desktop(monitors)?;
        let monitor = *locate(pointer, monitors).ok_or(CaptureError::NoMonitors)?;

        if self.delay.cancel() {
            self.deferred = None;
            log::info!("Pending delayed capture cancelled by new session");
        }

        let selection = initial_selection(saved, &monitor, monitors, &desktop);
        self.next_id += 1;
        log::info!(
            "Session {} opened on monitor {:?}, selection {:?}",
            self.next_id, monitor, selection
        );

        Ok(Some(self.session.insert(Session {
            id: self.next_id,
            desktop,
            monitor,
            controller: SelectionController::new(selection),
        })))
    }

    /// End the session, capturing what its controller currently selects
    pub fn confirm(&mut self, options: CaptureOptions) -> Result<Confirmed, SessionError> {
        let session = self.session.take().ok_or(SessionError::NotOpen)?;
        let selection = session.controller.selection();
        let geometry = saved_geometry(&selection, &session.monitor);
        let delay = options.delay();

        let job = CaptureJob {
            desktop: session.desktop,
            rect: selection.to_rect(),
            options,
        };

        let action = match delay {
            Some(delay) => {
                let on_elapsed = self.on_elapsed.clone();
                let ticket = self.delay.schedule(delay, move |ticket| on_elapsed(ticket));
                self.deferred = Some(job);
                log::info!("Session {} confirmed, capture in {:?}", session.id, delay);
                ConfirmAction::Deferred { ticket, delay }
            }
            None => {
                log::info!("Session {} confirmed, capturing {:?}", session.id, job.rect);
                ConfirmAction::CaptureNow(job)
            }
        };

        Ok(Confirmed { action, geometry })
    }

    /// Discard the open session and any pending capture
    ///
    /// Returns true if there was anything to cancel.
    pub fn cancel(&mut self) -> bool {
        let had_session = match self.session.take() {
            Some(session) => {
                log::info!("Session {} cancelled", session.id);
                true
            }
            None => false,
        };

        let had_pending = self.delay.cancel();
        if had_pending {
            log::info!("Pending delayed capture cancelled");
        }
        self.deferred = None;

        had_session || had_pending
    }

    /// The job to run for `ticket`, or `None` if it is stale
    pub fn on_delay_elapsed(&mut self, ticket: Ticket) -> Option<CaptureJob> {
        if self.delay.take_if_current(ticket) {
            self.deferred.take()
        } else {
            log::debug!("Ignoring stale delay ticket {}", ticket);
            None
        }
    }

    /// Force the closed state after an unexpected failure
    pub fn reset(&mut self) {
        log::warn!("Resetting session state");
        self.session = None;
        self.delay.cancel();
        self.deferred = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};
    use overlay::{PointerEvent, SelectionRect};

    fn orchestrator() -> (Orchestrator, Receiver<Ticket>) {
        let (tx, rx) = unbounded();
        let orchestrator = Orchestrator::new(move |ticket| {
            let _ = tx.send(ticket);
        });
        (orchestrator, rx)
    }

    fn monitors() -> Vec<Rect> {
        vec![Rect::new(0, 0, 1920, 1080)]
    }

    fn select(o: &mut Orchestrator, selection: SelectionRect) {
        o.session_mut().unwrap().controller = SelectionController::new(selection);
    }

    fn delayed_options(seconds: u32) -> CaptureOptions {
        CaptureOptions { delay_seconds: seconds, ..Default::default() }
    }

    #[test]
    fn zero_monitors_is_an_error() {
        let (mut o, _) = orchestrator();
        let err = o.open_session(&[], (0, 0), None).unwrap_err();
        assert!(matches!(err, SessionError::Capture(CaptureError::NoMonitors)));
        assert!(!o.is_open());
    }

    #[test]
    fn trigger_while_open_leaves_first_session_untouched() {
        let (mut o, _) = orchestrator();
        let session = o.open_session(&monitors(), (10, 10), None).unwrap().unwrap();
        session.controller.handle(PointerEvent::Press { x: 1440, y: 810 });
        session.controller.handle(PointerEvent::Move { x: 1500, y: 900 });
        let before = o.session().unwrap().clone();

        assert_eq!(o.handle_signal(GateSignal::OpenSession), SignalAction::Ignored);
        assert!(o.open_session(&monitors(), (10, 10), None).unwrap().is_none());

        let after = o.session().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.controller.selection(), before.controller.selection());
        assert_eq!(after.controller.state(), before.controller.state());
    }

    #[test]
    fn immediate_confirm_yields_job_and_geometry() {
        let (mut o, _) = orchestrator();
        let monitors = vec![Rect::new(0, 0, 1920, 1080), Rect::new(-1920, 0, 1920, 1080)];
        o.open_session(&monitors, (-100, 100), None).unwrap();

        select(&mut o, SelectionRect { x1: 100, y1: 100, x2: 700, y2: 500 });
        let confirmed = o.confirm(CaptureOptions::default()).unwrap();

        assert!(!o.is_open());
        assert_eq!(confirmed.geometry.monitor, Some(monitors[1]));
        match confirmed.action {
            ConfirmAction::CaptureNow(job) => {
                assert_eq!(job.rect, Rect::new(100, 100, 600, 400));
                assert_eq!(job.desktop.offset(), (1920, 0));
            }
            other => panic!("expected immediate capture, got {:?}", other),
        }
    }

    #[test]
    fn confirm_captures_what_the_session_controller_selects() {
        let (mut o, _) = orchestrator();
        let session = o.open_session(&monitors(), (10, 10), None).unwrap().unwrap();
        assert_eq!(
            session.controller.selection(),
            SelectionRect { x1: 480, y1: 270, x2: 1440, y2: 810 }
        );

        session.controller.handle(PointerEvent::Press { x: 960, y: 540 });
        session.controller.handle(PointerEvent::Move { x: 1060, y: 590 });
        session.controller.handle(PointerEvent::Release { x: 1060, y: 590 });

        let confirmed = o.confirm(CaptureOptions::default()).unwrap();
        assert_eq!(confirmed.geometry.rect, Rect::new(580, 320, 960, 540));
        match confirmed.action {
            ConfirmAction::CaptureNow(job) => assert_eq!(job.rect, Rect::new(580, 320, 960, 540)),
            other => panic!("expected immediate capture, got {:?}", other),
        }
    }

    #[test]
    fn confirm_without_session_fails() {
        let (mut o, _) = orchestrator();
        assert!(matches!(o.confirm(CaptureOptions::default()), Err(SessionError::NotOpen)));
    }

    #[test]
    fn delayed_capture_runs_once_for_current_ticket() {
        let (mut o, _) = orchestrator();
        o.open_session(&monitors(), (10, 10), None).unwrap();
        select(&mut o, SelectionRect { x1: 10, y1: 10, x2: 20, y2: 20 });

        let confirmed = o.confirm(delayed_options(60)).unwrap();
        let ConfirmAction::Deferred { ticket, delay } = confirmed.action else {
            panic!("expected deferred capture");
        };
        assert_eq!(delay, Duration::from_secs(60));
        assert!(o.has_pending_capture());

        let job = o.on_delay_elapsed(ticket).unwrap();
        assert_eq!(job.rect, Rect::new(10, 10, 10, 10));
        assert!(o.on_delay_elapsed(ticket).is_none());
    }

    #[test]
    fn escape_cancels_pending_delay() {
        let (mut o, rx) = orchestrator();
        o.open_session(&monitors(), (10, 10), None).unwrap();
        select(&mut o, SelectionRect { x1: 10, y1: 10, x2: 20, y2: 20 });
        let confirmed = o.confirm(delayed_options(1)).unwrap();
        let ConfirmAction::Deferred { ticket, .. } = confirmed.action else {
            panic!("expected deferred capture");
        };

        assert_eq!(o.handle_signal(GateSignal::Cancel), SignalAction::Cancelled);
        assert!(!o.has_pending_capture());
        assert!(o.on_delay_elapsed(ticket).is_none());
        assert!(rx.recv_timeout(Duration::from_millis(1500)).is_err());
    }

    #[test]
    fn new_session_cancels_pending_delay() {
        let (mut o, _) = orchestrator();
        o.open_session(&monitors(), (10, 10), None).unwrap();
        select(&mut o, SelectionRect { x1: 10, y1: 10, x2: 20, y2: 20 });
        let confirmed = o.confirm(delayed_options(60)).unwrap();
        let ConfirmAction::Deferred { ticket, .. } = confirmed.action else {
            panic!("expected deferred capture");
        };

        assert!(o.open_session(&monitors(), (10, 10), None).unwrap().is_some());
        assert!(!o.has_pending_capture());
        assert!(o.on_delay_elapsed(ticket).is_none());
    }

    #[test]
    fn reopening_uses_persisted_geometry() {
        let (mut o, _) = orchestrator();
        o.open_session(&monitors(), (10, 10), None).unwrap();
        let selection = SelectionRect { x1: 50, y1: 60, x2: 450, y2: 360 };
        select(&mut o, selection);
        let confirmed = o.confirm(CaptureOptions::default()).unwrap();

        let session = o
            .open_session(&monitors(), (10, 10), Some(&confirmed.geometry))
            .unwrap()
            .unwrap();
        assert_eq!(session.controller.selection(), selection);
        assert_eq!(session.id, 2);
    }

    #[test]
    fn cancel_with_nothing_open_is_ignored() {
        let (mut o, _) = orchestrator();
        assert_eq!(o.handle_signal(GateSignal::Cancel), SignalAction::Ignored);
        assert_eq!(o.handle_signal(GateSignal::OpenSession), SignalAction::OpenRequested);
    }

    #[test]
    fn reset_closes_everything() {
        let (mut o, _) = orchestrator();
        o.open_session(&monitors(), (10, 10), None).unwrap();
        o.reset();
        assert!(!o.is_open());
        assert!(!o.has_pending_capture());
    }
}

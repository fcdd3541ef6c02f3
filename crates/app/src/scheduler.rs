//! One-shot delayed capture with a single pending slot

use crossbeam_channel::{after, bounded, select, Sender};
use std::thread;
use std::time::Duration;

/// Identifies one scheduled task
pub type Ticket = u64;

struct Pending {
    ticket: Ticket,
    // Dropping the sender wakes the worker and cancels the task
    _cancel: Sender<()>,
}

/// Holds at most one pending delayed task
///
/// The worker only reports the ticket when the delay elapses; the owner must
/// still check [`DelaySlot::take_if_current`] before acting on it, since a
/// cancel can race with the report.
#[derive(Default)]
pub struct DelaySlot {
    next_ticket: Ticket,
    pending: Option<Pending>,
}

impl DelaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `on_elapsed` after `delay`, cancelling any pending task
    pub fn schedule<F>(&mut self, delay: Duration, on_elapsed: F) -> Ticket
    where
        F: FnOnce(Ticket) + Send + 'static,
    {
        self.cancel();

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let (cancel_tx, cancel_rx) = bounded::<()>(0);

        thread::spawn(move || {
            select! {
                recv(cancel_rx) -> _ => {
                    log::debug!("Delayed task {} cancelled", ticket);
                }
                recv(after(delay)) -> _ => {
                    on_elapsed(ticket);
                }
            }
        });

        log::debug!("Delayed task {} scheduled in {:?}", ticket, delay);
        self.pending = Some(Pending { ticket, _cancel: cancel_tx });
        ticket
    }

    /// Cancel the pending task; returns true if there was one
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Clear the slot if `ticket` is the pending task
    pub fn take_if_current(&mut self, ticket: Ticket) -> bool {
        if self.current() == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

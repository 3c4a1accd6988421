//! Per-step auto-advance timer.
//!
//! The timer never calls into the sequencer directly. When it elapses it
//! posts an [`AutoAdvance`] ticket into the player's event channel, and the
//! sequencer only acts on the ticket if it is still the armed one. Cancelling
//! aborts the sleeping task and invalidates the ticket, so a late delivery
//! from a superseded step is ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Tickets are unique across every timer in the process so a ticket from a
/// dropped sequencer can never match a fresh one.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Fired when a step's display time has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvance {
    pub ticket: u64,
}

/// Single-shot, cancellable, re-armable timer.
pub struct AutoAdvanceTimer {
    tx: mpsc::UnboundedSender<AutoAdvance>,
    armed: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl AutoAdvanceTimer {
    pub fn new(tx: mpsc::UnboundedSender<AutoAdvance>) -> Self {
        Self {
            tx,
            armed: None,
            handle: None,
        }
    }

    /// Arm for `delay`, superseding any pending fire. Returns the ticket.
    pub fn arm(&mut self, delay: Duration) -> u64 {
        self.cancel();

        let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the player shut down.
            let _ = tx.send(AutoAdvance { ticket });
        }));
        self.armed = Some(ticket);

        debug!("Auto-advance armed for {:?} (ticket {})", delay, ticket);
        ticket
    }

    /// Cancel any pending fire. No-op when nothing is armed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if let Some(ticket) = self.armed.take() {
            debug!("Auto-advance cancelled (ticket {})", ticket);
        }
    }

    /// Consume `ticket` if it is the armed one.
    pub fn claim(&mut self, ticket: u64) -> bool {
        if self.armed == Some(ticket) {
            self.armed = None;
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

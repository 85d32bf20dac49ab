//! Seek generation tracking.
//!
//! Each seek gets a fresh [`SeekTicket`]; only the completion carrying the
//! newest ticket is honoured. A completion for an older ticket means the
//! engine finished (or cancelled) a seek that has already been superseded.

use crate::observation::{Notifier, Observation};

/// Generation number of one seek request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeekTicket(u64);

/// Completion handle passed to the engine with a seek request.
///
/// Consumed by [`complete`](Self::complete), so an engine reports at most
/// once per request.
#[derive(Debug)]
pub struct SeekCompletion {
    notifier: Notifier,
    ticket: SeekTicket,
}

impl SeekCompletion {
    pub(crate) fn new(notifier: Notifier, ticket: SeekTicket) -> Self {
        Self { notifier, ticket }
    }

    #[must_use]
    pub fn ticket(&self) -> SeekTicket {
        self.ticket
    }

    /// Report the outcome. `finished` is `false` when the engine dropped the
    /// seek (interrupted by another seek or by a rate change).
    pub fn complete(self, finished: bool) {
        let _ = self.notifier.notify(Observation::SeekCompleted {
            ticket: self.ticket,
            finished,
        });
    }
}

/// Seek that is waiting for its completion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingSeek {
    pub(crate) ticket: SeekTicket,
    /// Position in seconds when the seek was issued.
    pub(crate) position: f64,
    /// Requested target in seconds.
    pub(crate) offset: f64,
}

#[derive(Debug, Default)]
pub(crate) struct SeekTracker {
    epoch: u64,
    pending: Option<PendingSeek>,
}

impl SeekTracker {
    /// Start a seek; any seek still pending is superseded.
    pub(crate) fn begin(&mut self, position: f64, offset: f64) -> SeekTicket {
        self.epoch = self.epoch.wrapping_add(1);
        let ticket = SeekTicket(self.epoch);
        self.pending = Some(PendingSeek {
            ticket,
            position,
            offset,
        });
        ticket
    }

    /// Take the pending seek if `ticket` is the newest one.
    pub(crate) fn complete(&mut self, ticket: SeekTicket) -> Option<PendingSeek> {
        match self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take(),
            _ => None,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget the pending seek. The epoch keeps counting so tickets from a
    /// torn-down session never match again.
    pub(crate) fn reset(&mut self) {
        self.pending = None;
    }
}

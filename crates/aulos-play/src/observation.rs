//! Typed observer registrations between an engine and the controller.
//!
//! Every registration gets a [`SubscriptionId`] stamped with the session
//! generation it belongs to. Engines hold a [`Notifier`] per registration and
//! post [`Observation`]s through it; the controller drains them from one
//! channel and drops anything whose generation or subscription is no longer
//! live.

use std::{collections::HashMap, fmt};

use tracing::trace;

use crate::{
    seek::SeekTicket,
    time::MediaTime,
    types::{ItemStatus, ObserverId, TimeControlStatus},
};

/// Observable engine transition, one per observer source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObservationKind {
    ItemStatus,
    TimeControlStatus,
    PeriodicTime,
    PlayedToEnd,
    NewErrorLogEntry,
    FailedToPlayToEnd,
    SeekCompleted,
}

impl ObservationKind {
    /// Status and notification sources attached to every session.
    ///
    /// The periodic time observer and seek completion are registered
    /// separately.
    pub const STATUS: [Self; 5] = [
        Self::ItemStatus,
        Self::TimeControlStatus,
        Self::PlayedToEnd,
        Self::NewErrorLogEntry,
        Self::FailedToPlayToEnd,
    ];
}

/// Payload posted by an engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    ItemStatus(ItemStatus),
    TimeControlStatus(TimeControlStatus),
    PeriodicTime(MediaTime),
    PlayedToEnd,
    NewErrorLogEntry(String),
    FailedToPlayToEnd(String),
    SeekCompleted { ticket: SeekTicket, finished: bool },
}

impl Observation {
    #[must_use]
    pub fn kind(&self) -> ObservationKind {
        match self {
            Self::ItemStatus(_) => ObservationKind::ItemStatus,
            Self::TimeControlStatus(_) => ObservationKind::TimeControlStatus,
            Self::PeriodicTime(_) => ObservationKind::PeriodicTime,
            Self::PlayedToEnd => ObservationKind::PlayedToEnd,
            Self::NewErrorLogEntry(_) => ObservationKind::NewErrorLogEntry,
            Self::FailedToPlayToEnd(_) => ObservationKind::FailedToPlayToEnd,
            Self::SeekCompleted { .. } => ObservationKind::SeekCompleted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// An observation tagged with the registration it came through.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub generation: u64,
    pub subscription: SubscriptionId,
    pub observation: Observation,
}

/// Sending half handed to an engine for one registration.
#[derive(Clone)]
pub struct Notifier {
    generation: u64,
    subscription: SubscriptionId,
    kind: ObservationKind,
    tx: kanal::Sender<Notification>,
}

impl Notifier {
    #[must_use]
    pub fn kind(&self) -> ObservationKind {
        self.kind
    }

    #[must_use]
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Post `observation` to the controller. Never blocks.
    ///
    /// Returns `false` once the controller is gone.
    pub fn notify(&self, observation: Observation) -> bool {
        self.tx
            .send(Notification {
                generation: self.generation,
                subscription: self.subscription,
                observation,
            })
            .is_ok()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("generation", &self.generation)
            .field("subscription", &self.subscription)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

struct Entry {
    kind: ObservationKind,
    observer: Option<ObserverId>,
}

/// Registrations of the live session plus the channel they report through.
pub(crate) struct SubscriptionTable {
    entries: HashMap<SubscriptionId, Entry>,
    generation: u64,
    next_id: u64,
    rx: kanal::Receiver<Notification>,
    tx: kanal::Sender<Notification>,
}

impl SubscriptionTable {
    pub(crate) fn new() -> Self {
        let (tx, rx) = kanal::unbounded();
        Self {
            entries: HashMap::new(),
            generation: 0,
            next_id: 0,
            rx,
            tx,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Register a new subscription of `kind` in the current generation.
    pub(crate) fn subscribe(&mut self, kind: ObservationKind) -> Notifier {
        let subscription = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            subscription,
            Entry {
                kind,
                observer: None,
            },
        );
        Notifier {
            generation: self.generation,
            subscription,
            kind,
            tx: self.tx.clone(),
        }
    }

    /// Remember the engine-side handle for `subscription`.
    pub(crate) fn bind(&mut self, subscription: SubscriptionId, observer: ObserverId) {
        if let Some(entry) = self.entries.get_mut(&subscription) {
            entry.observer = Some(observer);
        }
    }

    /// Drop every registration and move to the next generation.
    ///
    /// Returns the engine handles that must be removed from the engine.
    /// Notifications already queued under the old generation are rejected
    /// by [`accept`](Self::accept) from here on.
    pub(crate) fn retire(&mut self) -> Vec<ObserverId> {
        self.generation = self.generation.wrapping_add(1);
        let mut observers: Vec<_> = self
            .entries
            .drain()
            .filter_map(|(id, entry)| entry.observer.map(|observer| (id, observer)))
            .collect();
        observers.sort_by_key(|(id, _)| *id);
        observers.into_iter().map(|(_, observer)| observer).collect()
    }

    /// Whether `notification` belongs to a live registration of the right kind.
    pub(crate) fn accept(&self, notification: &Notification) -> bool {
        if notification.generation != self.generation {
            trace!(
                generation = notification.generation,
                current = self.generation,
                "stale notification dropped"
            );
            return false;
        }
        match self.entries.get(&notification.subscription) {
            Some(entry) if entry.kind == notification.observation.kind() => true,
            Some(entry) => {
                trace!(
                    expected = ?entry.kind,
                    got = ?notification.observation.kind(),
                    "mismatched notification dropped"
                );
                false
            }
            None => {
                trace!(subscription = ?notification.subscription, "unsubscribed notification dropped");
                false
            }
        }
    }

    pub(crate) fn try_next(&self) -> Option<Notification> {
        self.rx.try_recv().ok().flatten()
    }

    pub(crate) fn receiver(&self) -> kanal::AsyncReceiver<Notification> {
        self.rx.clone_async()
    }
}

#![forbid(unsafe_code)]

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use crate::PlaybackEvent;

/// Receiver of normalized playback events.
pub trait EventListener: Send + Sync + 'static {
    fn on_event(&self, event: &PlaybackEvent);
}

impl<F> EventListener for F
where
    F: Fn(&PlaybackEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: &PlaybackEvent) {
        self(event);
    }
}

/// Listener forwarding events into an unbounded tokio channel.
#[derive(Clone, Debug)]
pub struct ChannelListener(mpsc::UnboundedSender<PlaybackEvent>);

impl ChannelListener {
    /// Create a listener together with the receiving end of its channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl EventListener for ChannelListener {
    fn on_event(&self, event: &PlaybackEvent) {
        let _ = self.0.send(event.clone());
    }
}

/// Slot holding at most one event listener.
///
/// Attaching replaces the current listener, detaching clears it. Events emitted
/// while nothing is attached are dropped; there is no buffering. Clones share
/// the same slot, so the host side can attach while the player emits.
#[derive(Clone, Default)]
pub struct EventSink {
    listener: Arc<Mutex<Option<Arc<dyn EventListener>>>>,
}

impl EventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `listener`, replacing any previous one.
    pub fn attach<L: EventListener>(&self, listener: L) {
        self.attach_arc(Arc::new(listener));
    }

    pub fn attach_arc(&self, listener: Arc<dyn EventListener>) {
        let replaced = self.listener.lock().replace(listener).is_some();
        trace!(replaced, "event listener attached");
    }

    /// Clear the current listener. Returns `true` if one was attached.
    pub fn detach(&self) -> bool {
        let had = self.listener.lock().take().is_some();
        trace!(had, "event listener detached");
        had
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Deliver `event` to the current listener.
    ///
    /// Returns `false` when the event was dropped for lack of a listener.
    /// The lock is released before the listener runs, so a listener may
    /// re-attach or detach from inside its callback.
    pub fn emit(&self, event: PlaybackEvent) -> bool {
        let listener = self.listener.lock().clone();
        let Some(listener) = listener else {
            trace!(name = event.name(), "no listener, event dropped");
            return false;
        };
        trace!(name = event.name(), "event delivered");
        listener.on_event(&event);
        true
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("attached", &self.is_attached())
            .finish()
    }
}

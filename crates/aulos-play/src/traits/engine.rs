use std::time::Duration;

use url::Url;

use crate::{
    error::PlayError,
    observation::Notifier,
    seek::SeekCompletion,
    time::MediaTime,
    types::ObserverId,
};

/// Platform media player bound to a single URL.
///
/// Playback, decoding and buffering are the engine's business. The controller
/// only issues transport requests and learns about their outcome through the
/// notifiers it registers; an engine must never call back synchronously from
/// inside these methods.
pub trait MediaEngine: Send + 'static {
    // -- transport --

    fn play(&mut self);

    fn pause(&mut self);

    /// 0.0 when paused, 1.0 when playing.
    fn rate(&self) -> f32;

    // -- timing --

    fn current_time(&self) -> MediaTime;

    /// Item duration; indefinite for live streams, invalid while unknown.
    fn duration(&self) -> MediaTime;

    /// Start an asynchronous seek and report through `completion`.
    ///
    /// A seek issued while another is in flight may cancel the earlier one.
    fn seek(&mut self, to: MediaTime, completion: SeekCompletion);

    // -- status --

    /// Description of the current item error, if the item failed.
    fn error(&self) -> Option<String>;

    // -- observation --

    /// Start delivering observations of `notifier.kind()`.
    fn add_observer(&mut self, notifier: Notifier) -> ObserverId;

    /// Deliver `PeriodicTime` observations every `interval` of playback.
    fn add_periodic_time_observer(&mut self, interval: Duration, notifier: Notifier)
    -> ObserverId;

    /// Stop delivering through `id`. Must take effect before returning.
    fn remove_observer(&mut self, id: ObserverId);
}

/// Factory for engines, one per session.
pub trait MediaBackend: Send + 'static {
    type Engine: MediaEngine;

    fn create_engine(&self, url: &Url) -> Result<Self::Engine, PlayError>;
}

//! Test doubles for the collaborator traits.
//!
//! `AudioSession` and `NowPlayingCenter` get unimock APIs. The engine seam is
//! stateful and driven from the test side, so it gets a scripted fake:
//! [`ScriptedBackend`] hands out [`ScriptedEngine`]s and keeps a
//! [`ScriptedEngineHandle`] to each one for driving and inspection.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use aulos_events::{EventListener, PlaybackEvent};
use derivative::Derivative;
use parking_lot::Mutex;
use url::Url;

pub use crate::traits::{now_playing::NowPlayingCenterMock, session::AudioSessionMock};
use crate::{
    error::PlayError,
    observation::{Notifier, Observation, ObservationKind},
    seek::SeekCompletion,
    time::MediaTime,
    traits::{
        engine::{MediaBackend, MediaEngine},
        now_playing::{NowPlayingCenter, NowPlayingInfo},
    },
    types::{ItemStatus, ObserverId, TimeControlStatus},
};

/// Request received by a [`ScriptedEngine`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Play,
    Pause,
    Seek(MediaTime),
    AddObserver(ObservationKind),
    AddPeriodicTimeObserver(Duration),
    RemoveObserver(ObserverId),
}

#[derive(Derivative)]
#[derivative(Default)]
struct EngineState {
    calls: Vec<EngineCall>,
    current_time: MediaTime,
    /// Unknown until the test sets it.
    #[derivative(Default(value = "MediaTime::INVALID"))]
    duration: MediaTime,
    error: Option<String>,
    next_observer: u64,
    observers: BTreeMap<ObserverId, Notifier>,
    pending_seek: Option<(MediaTime, SeekCompletion)>,
    rate: f32,
    ready: bool,
    released: bool,
}

impl EngineState {
    fn notify(&self, observation: &Observation) {
        let kind = observation.kind();
        for notifier in self.observers.values().filter(|n| n.kind() == kind) {
            notifier.notify(observation.clone());
        }
    }

    /// Report where `play` left the engine: playing once the item is ready
    /// and no seek is in flight, waiting otherwise.
    fn settle(&self) {
        if self.rate <= 0.0 {
            return;
        }
        let status = if self.ready && self.pending_seek.is_none() {
            TimeControlStatus::Playing
        } else {
            TimeControlStatus::WaitingToPlay
        };
        self.notify(&Observation::TimeControlStatus(status));
    }
}

/// Engine fake that records every request and reports only what the test
/// tells it to.
pub struct ScriptedEngine {
    state: Arc<Mutex<EngineState>>,
}

impl MediaEngine for ScriptedEngine {
    fn play(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Play);
        state.rate = 1.0;
        state.settle();
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Pause);
        state.rate = 0.0;
        state.notify(&Observation::TimeControlStatus(TimeControlStatus::Paused));
    }

    fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    fn current_time(&self) -> MediaTime {
        self.state.lock().current_time
    }

    fn duration(&self) -> MediaTime {
        self.state.lock().duration
    }

    fn seek(&mut self, to: MediaTime, completion: SeekCompletion) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::Seek(to));
        if let Some((_, superseded)) = state.pending_seek.replace((to, completion)) {
            superseded.complete(false);
        }
    }

    fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    fn add_observer(&mut self, notifier: Notifier) -> ObserverId {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::AddObserver(notifier.kind()));
        let id = ObserverId(state.next_observer);
        state.next_observer += 1;
        state.observers.insert(id, notifier);
        id
    }

    fn add_periodic_time_observer(&mut self, interval: Duration, notifier: Notifier) -> ObserverId {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::AddPeriodicTimeObserver(interval));
        let id = ObserverId(state.next_observer);
        state.next_observer += 1;
        state.observers.insert(id, notifier);
        id
    }

    fn remove_observer(&mut self, id: ObserverId) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::RemoveObserver(id));
        state.observers.remove(&id);
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.state.lock().released = true;
    }
}

/// Test-side view of one [`ScriptedEngine`].
#[derive(Clone)]
pub struct ScriptedEngineHandle {
    state: Arc<Mutex<EngineState>>,
    url: Url,
}

impl ScriptedEngineHandle {
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().calls.clone()
    }

    /// Whether the controller dropped the engine.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    /// Observers still registered on the engine.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    #[must_use]
    pub fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.state.lock().current_time.seconds()
    }

    #[must_use]
    pub fn has_pending_seek(&self) -> bool {
        self.state.lock().pending_seek.is_some()
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.state.lock().current_time = MediaTime::with_seconds(seconds, 1000);
    }

    pub fn set_duration(&self, seconds: f64) {
        self.state.lock().duration = MediaTime::with_seconds(seconds, 1000);
    }

    /// Item finished loading.
    pub fn become_ready(&self) {
        let mut state = self.state.lock();
        state.ready = true;
        state.notify(&Observation::ItemStatus(ItemStatus::ReadyToPlay));
        state.settle();
    }

    pub fn fail_item(&self, error: Option<&str>) {
        let mut state = self.state.lock();
        state.error = error.map(str::to_owned);
        state.notify(&Observation::ItemStatus(ItemStatus::Failed));
    }

    /// Finish the outstanding seek. Returns `false` if none was pending.
    pub fn complete_seek(&self, finished: bool) -> bool {
        let mut state = self.state.lock();
        let Some((target, completion)) = state.pending_seek.take() else {
            return false;
        };
        if finished {
            state.current_time = target;
        }
        completion.complete(finished);
        state.settle();
        true
    }

    /// Fire the periodic time observer at `seconds`.
    pub fn tick(&self, seconds: f64) {
        let mut state = self.state.lock();
        state.current_time = MediaTime::with_seconds(seconds, 1000);
        let time = state.current_time;
        state.notify(&Observation::PeriodicTime(time));
    }

    /// Reach the end of the item. The engine stops on its own, like a
    /// player configured to pause at item end.
    pub fn play_to_end(&self) {
        let mut state = self.state.lock();
        state.current_time = state.duration;
        state.rate = 0.0;
        state.notify(&Observation::PlayedToEnd);
    }

    pub fn log_error(&self, entry: &str) {
        self.state
            .lock()
            .notify(&Observation::NewErrorLogEntry(entry.to_owned()));
    }

    pub fn fail_to_play_to_end(&self, error: &str) {
        self.state
            .lock()
            .notify(&Observation::FailedToPlayToEnd(error.to_owned()));
    }

    /// Deliver `observation` to matching observers without touching engine
    /// state.
    pub fn emit_raw(&self, observation: &Observation) {
        self.state.lock().notify(observation);
    }
}

#[derive(Default)]
struct BackendState {
    engines: Vec<ScriptedEngineHandle>,
    fail_next: Option<PlayError>,
}

/// [`MediaBackend`] producing [`ScriptedEngine`]s.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles of every engine created so far, oldest first.
    #[must_use]
    pub fn engines(&self) -> Vec<ScriptedEngineHandle> {
        self.state.lock().engines.clone()
    }

    /// Handle of the most recently created engine.
    #[must_use]
    pub fn last(&self) -> Option<ScriptedEngineHandle> {
        self.state.lock().engines.last().cloned()
    }

    /// Make the next `create_engine` call fail with `error`.
    pub fn fail_next(&self, error: PlayError) {
        self.state.lock().fail_next = Some(error);
    }
}

impl MediaBackend for ScriptedBackend {
    type Engine = ScriptedEngine;

    fn create_engine(&self, url: &Url) -> Result<Self::Engine, PlayError> {
        let mut backend = self.state.lock();
        if let Some(error) = backend.fail_next.take() {
            return Err(error);
        }
        let state = Arc::new(Mutex::new(EngineState::default()));
        backend.engines.push(ScriptedEngineHandle {
            state: Arc::clone(&state),
            url: url.clone(),
        });
        Ok(ScriptedEngine { state })
    }
}

/// [`NowPlayingCenter`] that keeps every published record.
#[derive(Clone, Default)]
pub struct RecordingNowPlaying {
    published: Arc<Mutex<Vec<Option<NowPlayingInfo>>>>,
}

impl RecordingNowPlaying {
    #[must_use]
    pub fn published(&self) -> Vec<Option<NowPlayingInfo>> {
        self.published.lock().clone()
    }

    /// Last published record; `None` if nothing was published or the last
    /// publication cleared the surface.
    #[must_use]
    pub fn current(&self) -> Option<NowPlayingInfo> {
        self.published.lock().last().cloned().flatten()
    }
}

impl NowPlayingCenter for RecordingNowPlaying {
    fn publish(&self, info: Option<NowPlayingInfo>) {
        self.published.lock().push(info);
    }
}

/// [`EventListener`] that collects delivered events.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
}

impl EventRecorder {
    #[must_use]
    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().clone()
    }

    /// Delivered events' wire names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(PlaybackEvent::name).collect()
    }

    /// Take everything recorded so far.
    pub fn take(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventListener for EventRecorder {
    fn on_event(&self, event: &PlaybackEvent) {
        self.events.lock().push(event.clone());
    }
}

//! Playback controller: the single owner of the live session.
//!
//! Commands only request transitions. The engine confirms them through the
//! observers registered in [`play`](PlaybackController::play), and
//! [`handle_notification`](PlaybackController::handle_notification) turns
//! each confirmation into a state change plus at most one event.
//!
//! All methods take `&mut self`; the controller expects every command and
//! notification to be applied from one serial context.

use std::sync::Arc;

use aulos_events::{EventSink, PlaybackEvent};
use tracing::{debug, trace, warn};

use crate::{
    command::{Command, PlayRequest},
    config::PlayerConfig,
    observation::{Notification, Observation, ObservationKind, SubscriptionTable},
    presenter::{NowPlayingPresenter, RemoteCommand, RemoteCommandStatus},
    seek::{SeekCompletion, SeekTicket, SeekTracker},
    session::{Session, SessionSnapshot},
    time::MediaTime,
    traits::{
        engine::{MediaBackend, MediaEngine},
        now_playing::{NowPlayingCenter, NowPlayingInfo, NullNowPlaying},
        session::{AudioSession, NullAudioSession, SessionCategory, SessionOptions},
    },
    types::{ItemStatus, PlayerState, TimeControlStatus},
};

const UNKNOWN_ERROR: &str = "unknown error";

pub struct PlaybackController<B: MediaBackend> {
    audio_session: Arc<dyn AudioSession>,
    backend: B,
    config: PlayerConfig,
    events: EventSink,
    presenter: NowPlayingPresenter,
    seeks: SeekTracker,
    session: Option<Session<B::Engine>>,
    subscriptions: SubscriptionTable,
}

impl<B: MediaBackend> PlaybackController<B> {
    /// Create a controller with no audio session and no now-playing surface.
    pub fn new(backend: B, config: PlayerConfig) -> Self {
        Self {
            audio_session: Arc::new(NullAudioSession),
            backend,
            config,
            events: EventSink::new(),
            presenter: NowPlayingPresenter::new(Arc::new(NullNowPlaying)),
            seeks: SeekTracker::default(),
            session: None,
            subscriptions: SubscriptionTable::new(),
        }
    }

    #[must_use]
    pub fn with_audio_session(mut self, audio_session: Arc<dyn AudioSession>) -> Self {
        self.audio_session = audio_session;
        self
    }

    #[must_use]
    pub fn with_now_playing(mut self, center: Arc<dyn NowPlayingCenter>) -> Self {
        self.presenter = NowPlayingPresenter::new(center);
        self
    }

    /// Deliver events to `events` instead of a private sink.
    #[must_use]
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    // -- inspection --

    /// Listener slot events are emitted into.
    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> PlayerState {
        self.session
            .as_ref()
            .map_or(PlayerState::Idle, |session| session.state)
    }

    pub fn session(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(Session::snapshot)
    }

    /// Record currently shown on the now-playing surface.
    pub fn now_playing(&self) -> Option<&NowPlayingInfo> {
        self.presenter.info()
    }

    /// Whether a seek is waiting for its completion.
    pub fn is_seeking(&self) -> bool {
        self.seeks.is_pending()
    }

    /// Generation stamped into registrations of the live session.
    pub fn generation(&self) -> u64 {
        self.subscriptions.generation()
    }

    /// Async receiving end of the engine notification channel.
    pub fn notifications(&self) -> kanal::AsyncReceiver<Notification> {
        self.subscriptions.receiver()
    }

    // -- commands --

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::Play(request) => self.play(request),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::SeekTo { seconds } => self.seek_to(seconds),
        }
    }

    /// Replace the live session with a new one for `request`.
    ///
    /// The old session's observers are removed from its engine before the
    /// engine is released and before the new engine exists.
    pub fn play(&mut self, request: PlayRequest) {
        debug!(url = %request.url, live = request.is_live_stream, "play");
        self.release_session();
        self.activate_audio_session();

        let mut engine = match self.backend.create_engine(&request.url) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(?e, url = %request.url, "failed to create engine");
                self.deactivate_audio_session();
                self.emit(PlaybackEvent::error(e.to_string()));
                return;
            }
        };

        for kind in ObservationKind::STATUS {
            let notifier = self.subscriptions.subscribe(kind);
            let subscription = notifier.subscription();
            let observer = engine.add_observer(notifier);
            self.subscriptions.bind(subscription, observer);
        }
        let ticks = self.subscriptions.subscribe(ObservationKind::PeriodicTime);
        let subscription = ticks.subscription();
        let observer = engine.add_periodic_time_observer(self.config.time_observer_interval, ticks);
        self.subscriptions.bind(subscription, observer);
        let seek_notifier = self.subscriptions.subscribe(ObservationKind::SeekCompleted);

        let start = request.start_seconds();
        let session = Session::new(engine, request, seek_notifier);
        self.presenter.begin(
            &session.request.title,
            &session.request.subtitle,
            session.request.is_live_stream,
            session.position(),
            session.duration(),
        );
        self.session = Some(session);
        debug!(
            generation = self.subscriptions.generation(),
            observers = self.subscriptions.len(),
            "session created"
        );

        self.seek_to(start);
        if let Some(session) = self.session.as_mut() {
            session.engine.play();
        }
    }

    pub fn pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            trace!("pause without session");
            return;
        };
        session.engine.pause();
        self.presenter.update(session.position(), 0.0);
        debug!("pause");
    }

    /// Tear down the live session and deactivate the audio session.
    ///
    /// The now-playing record is cleared even without a session.
    pub fn stop(&mut self) {
        let had_session = self.session.is_some();
        if had_session {
            self.release_session();
        } else {
            self.presenter.clear();
        }
        self.deactivate_audio_session();
        debug!(had_session, "stop");
    }

    /// Request a seek to `seconds`. The `onSeek` event follows when the
    /// engine completes this seek and no newer one was issued meanwhile.
    pub fn seek_to(&mut self, seconds: f64) {
        let Some(session) = self.session.as_mut() else {
            trace!(seconds, "seek without session");
            return;
        };
        let position = session.position();
        self.presenter.update(position, 0.0);
        let ticket = self.seeks.begin(position, seconds);
        let target = MediaTime::with_seconds(seconds, self.config.seek_timescale);
        debug!(position, offset = seconds, ?ticket, "seek");
        let completion = SeekCompletion::new(session.seek_notifier.clone(), ticket);
        session.engine.seek(target, completion);
    }

    /// Apply a play/pause trigger from the system remote-command source.
    ///
    /// Play only acts while paused and pause only while playing.
    pub fn handle_remote(&mut self, command: RemoteCommand) -> RemoteCommandStatus {
        let Some(session) = self.session.as_mut() else {
            return RemoteCommandStatus::CommandFailed;
        };
        let playing = session.rate() > 0.0;
        let status = match command {
            RemoteCommand::Play if !playing => {
                session.engine.play();
                self.presenter.update(session.position(), 1.0);
                RemoteCommandStatus::Success
            }
            RemoteCommand::Pause if playing => {
                self.pause();
                RemoteCommandStatus::Success
            }
            _ => RemoteCommandStatus::CommandFailed,
        };
        debug!(?command, ?status, "remote command");
        status
    }

    // -- observers --

    /// Apply every notification queued by engines so far.
    pub fn drain_notifications(&mut self) -> usize {
        let mut count = 0;
        while let Some(notification) = self.subscriptions.try_next() {
            self.handle_notification(notification);
            count += 1;
        }
        count
    }

    /// Apply one engine notification. Notifications from retired sessions,
    /// removed observers, or with a payload that does not match their
    /// registration are dropped.
    pub fn handle_notification(&mut self, notification: Notification) {
        if !self.subscriptions.accept(&notification) || self.session.is_none() {
            return;
        }
        match notification.observation {
            Observation::ItemStatus(status) => self.on_item_status(status),
            Observation::TimeControlStatus(status) => self.on_time_control(status),
            Observation::PeriodicTime(time) => self.on_periodic_time(time),
            Observation::PlayedToEnd => self.on_played_to_end(),
            Observation::NewErrorLogEntry(entry) => self.fail(trim_log_entry(&entry)),
            Observation::FailedToPlayToEnd(error) => self.fail(error),
            Observation::SeekCompleted { ticket, finished } => {
                self.on_seek_completed(ticket, finished);
            }
        }
    }

    fn on_item_status(&mut self, status: ItemStatus) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match status {
            ItemStatus::ReadyToPlay if !session.state.is_failed() => {
                if session.state == PlayerState::Loading {
                    session.state = PlayerState::Ready;
                }
                self.presenter.set_duration(session.duration());
                self.emit(PlaybackEvent::Ready);
            }
            ItemStatus::Failed => {
                let error = session
                    .engine
                    .error()
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
                self.fail(error);
            }
            _ => {}
        }
    }

    fn on_time_control(&mut self, status: TimeControlStatus) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state.is_failed() {
            trace!(?status, "time control ignored in failed state");
            return;
        }
        match status {
            TimeControlStatus::Playing => {
                session.state = PlayerState::Playing;
                self.emit(PlaybackEvent::Play);
            }
            TimeControlStatus::Paused => {
                if matches!(session.state, PlayerState::Ready | PlayerState::Playing) {
                    session.state = PlayerState::Paused;
                }
                self.emit(PlaybackEvent::Pause);
            }
            _ => trace!(?status, "time control not surfaced"),
        }
    }

    fn on_periodic_time(&mut self, time: MediaTime) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.state.is_failed() {
            return;
        }
        let seconds = time.seconds();
        let rate = session.rate();
        self.emit(PlaybackEvent::Time { time: seconds });
        self.presenter.update(seconds, rate);
    }

    fn on_played_to_end(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state.is_failed() {
            return;
        }
        session.state = PlayerState::Ended;
        self.pause();
        self.emit(PlaybackEvent::Complete);
        self.seek_to(0.0);
        self.presenter.complete();
        debug!("played to end");
    }

    fn on_seek_completed(&mut self, ticket: SeekTicket, finished: bool) {
        let Some(pending) = self.seeks.complete(ticket) else {
            trace!(?ticket, "superseded seek completion ignored");
            return;
        };
        if finished {
            self.emit(PlaybackEvent::Seek {
                position: pending.position,
                offset: pending.offset,
            });
        } else {
            trace!(?ticket, "seek cancelled by engine");
        }
        if let Some(session) = self.session.as_ref() {
            self.presenter.update(session.position(), session.rate());
        }
    }

    fn fail(&mut self, error: String) {
        if let Some(session) = self.session.as_mut() {
            session.state = PlayerState::Failed;
        }
        warn!(%error, "playback failed");
        self.emit(PlaybackEvent::Error { error });
    }

    // -- lifecycle --

    /// Remove every observer from the live engine, then release it.
    fn release_session(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.engine.pause();
        for observer in self.subscriptions.retire() {
            session.engine.remove_observer(observer);
        }
        self.seeks.reset();
        self.presenter.clear();
        self.session = None;
        debug!(generation = self.subscriptions.generation(), "session released");
    }

    fn activate_audio_session(&self) {
        let options = SessionOptions::with_bluetooth(self.config.allow_bluetooth);
        let result = self
            .audio_session
            .set_category(SessionCategory::Playback, options)
            .and_then(|()| self.audio_session.set_active(true));
        if let Err(e) = result {
            debug!(?e, "audio session activation failed");
        }
    }

    fn deactivate_audio_session(&self) {
        if let Err(e) = self.audio_session.set_active(false) {
            debug!(?e, "audio session deactivation failed");
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(event);
    }
}

/// Error-log entries arrive with a trailing terminator.
fn trim_log_entry(entry: &str) -> String {
    entry.trim_end_matches(['\0', '\n', '\r']).to_owned()
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

use url::Url;

use crate::{
    command::PlayRequest,
    observation::Notifier,
    time::MediaTime,
    traits::engine::MediaEngine,
    types::PlayerState,
};

/// The single live playback context, from `play` until `stop`.
pub(crate) struct Session<E> {
    pub(crate) engine: E,
    pub(crate) request: PlayRequest,
    /// Completion channel handed to every seek of this session.
    pub(crate) seek_notifier: Notifier,
    pub(crate) state: PlayerState,
}

impl<E: MediaEngine> Session<E> {
    pub(crate) fn new(engine: E, request: PlayRequest, seek_notifier: Notifier) -> Self {
        Self {
            engine,
            request,
            seek_notifier,
            state: PlayerState::Loading,
        }
    }

    pub(crate) fn position(&self) -> f64 {
        self.engine.current_time().seconds()
    }

    pub(crate) fn rate(&self) -> f32 {
        self.engine.rate()
    }

    /// Duration in seconds; `None` for live streams and unknown durations.
    pub(crate) fn duration(&self) -> Option<f64> {
        if self.request.is_live_stream {
            return None;
        }
        numeric_seconds(self.engine.duration())
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            url: self.request.url.clone(),
            title: self.request.title.clone(),
            subtitle: self.request.subtitle.clone(),
            is_live_stream: self.request.is_live_stream,
            state: self.state,
            position: self.position(),
            rate: self.rate(),
            duration: self.duration(),
        }
    }
}

fn numeric_seconds(time: MediaTime) -> Option<f64> {
    time.is_numeric().then(|| time.seconds())
}

/// Read-only view of the live session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub url: Url,
    pub title: String,
    pub subtitle: String,
    pub is_live_stream: bool,
    pub state: PlayerState,
    /// Seconds.
    pub position: f64,
    pub rate: f32,
    /// Seconds; `None` for live streams or while unknown.
    pub duration: Option<f64>,
}

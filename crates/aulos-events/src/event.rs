#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Event delivered to the registered listener.
///
/// Serializes to the flat record the host layer consumes, with the event name
/// under the `name` key: `{"name":"onSeek","position":12.0,"offset":30.0}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name")]
#[non_exhaustive]
pub enum PlaybackEvent {
    /// The current item became ready to play.
    #[serde(rename = "onReady")]
    Ready,
    /// The engine started rendering audio.
    #[serde(rename = "onPlay")]
    Play,
    /// The engine paused.
    #[serde(rename = "onPause")]
    Pause,
    /// Periodic position tick, in seconds.
    #[serde(rename = "onTime")]
    Time { time: f64 },
    /// A seek finished. `position` is where playback was before the seek,
    /// `offset` is the requested target, both in seconds.
    #[serde(rename = "onSeek")]
    Seek { position: f64, offset: f64 },
    /// The item played to its end.
    #[serde(rename = "onComplete")]
    Complete,
    /// Playback failed; `error` is the engine's description.
    #[serde(rename = "onError")]
    Error { error: String },
}

impl PlaybackEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "onReady",
            Self::Play => "onPlay",
            Self::Pause => "onPause",
            Self::Time { .. } => "onTime",
            Self::Seek { .. } => "onSeek",
            Self::Complete => "onComplete",
            Self::Error { .. } => "onError",
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }
}

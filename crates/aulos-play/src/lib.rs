#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

//! Playback state machine over a platform media engine.
//!
//! [`PlaybackController`] owns at most one live session. Commands request
//! transitions on the engine; the engine reports back through typed
//! [`Notifier`]s, and only those reports move the [`PlayerState`] and produce
//! [`PlaybackEvent`](aulos_events::PlaybackEvent)s.

mod config;
mod controller;
mod error;
mod observation;
mod presenter;
mod seek;
mod session;
mod time;
mod types;

pub mod command;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use command::{Command, CommandError, PlayRequest};
pub use config::PlayerConfig;
pub use controller::PlaybackController;
pub use error::PlayError;
pub use observation::{Notification, Notifier, Observation, ObservationKind, SubscriptionId};
pub use presenter::{NowPlayingPresenter, RemoteCommand, RemoteCommandStatus};
pub use seek::{SeekCompletion, SeekTicket};
pub use session::SessionSnapshot;
pub use time::{MediaTime, NANOS_TIMESCALE};
pub use traits::{
    engine::{MediaBackend, MediaEngine},
    now_playing::{NowPlayingCenter, NowPlayingInfo, NullNowPlaying},
    session::{AudioSession, NullAudioSession, SessionCategory, SessionOptions},
};
pub use types::{ItemStatus, ObserverId, PlayerState, TimeControlStatus};

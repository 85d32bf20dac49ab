use std::fmt;

/// Status of the media item bound to an engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ItemStatus {
    #[default]
    Unknown,
    ReadyToPlay,
    Failed,
}

/// Whether the engine is rendering, paused, or waiting to be able to render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TimeControlStatus {
    #[default]
    Paused,
    WaitingToPlay,
    Playing,
}

/// Handle returned by an engine for a registered observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// State of the player state machine.
///
/// Entered only through observer callbacks; commands merely request a
/// transition, the engine confirms it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// No session.
    #[default]
    Idle,
    /// Engine created, observers attached, initial seek issued.
    Loading,
    /// Item reported ready to play.
    Ready,
    Playing,
    Paused,
    /// Item played to its end.
    Ended,
    /// Item or engine failed. Sticks until the session is replaced.
    Failed,
}

impl PlayerState {
    #[must_use]
    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

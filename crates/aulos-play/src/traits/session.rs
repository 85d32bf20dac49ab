use crate::error::PlayError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SessionCategory {
    /// Audio keeps playing with the screen locked or the app in background.
    Playback,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct SessionOptions {
    pub allow_bluetooth: bool,
}

impl SessionOptions {
    #[must_use]
    pub fn with_bluetooth(allow_bluetooth: bool) -> Self {
        Self { allow_bluetooth }
    }
}

/// Process-wide audio output category and activation.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = AudioSessionMock)
)]
pub trait AudioSession: Send + Sync + 'static {
    fn set_category(
        &self,
        category: SessionCategory,
        options: SessionOptions,
    ) -> Result<(), PlayError>;

    fn set_active(&self, active: bool) -> Result<(), PlayError>;
}

/// Session for hosts without an audio category concept.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudioSession;

impl AudioSession for NullAudioSession {
    fn set_category(&self, _: SessionCategory, _: SessionOptions) -> Result<(), PlayError> {
        Ok(())
    }

    fn set_active(&self, _: bool) -> Result<(), PlayError> {
        Ok(())
    }
}

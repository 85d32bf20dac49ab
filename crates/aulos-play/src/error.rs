/// Failures raised by the media backend and the audio session.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error("engine could not open {url}: {reason}")]
    EngineUnavailable { url: String, reason: String },

    #[error("session activation failed: {reason}")]
    SessionActivationFailed { reason: String },

    #[error("session category not supported: {reason}")]
    SessionCategoryUnsupported { reason: String },
}

/// Failures on the host-facing side of the player.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// The service task has stopped; no further calls are accepted.
    #[error("player service closed")]
    Closed,

    #[error("event encoding failed: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

//! Typed decoding of host method calls.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const PLAY: &str = "play";
pub const PAUSE: &str = "pause";
pub const STOP: &str = "stop";
pub const SEEK_TO: &str = "seekTo";

/// Validated arguments of a `play` call.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayRequest {
    pub url: Url,
    pub title: String,
    pub subtitle: String,
    /// Start position in milliseconds.
    pub position_ms: f64,
    pub is_live_stream: bool,
}

impl PlayRequest {
    /// Start position in seconds.
    #[must_use]
    pub fn start_seconds(&self) -> f64 {
        self.position_ms / 1000.0
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayArgs {
    url: String,
    title: String,
    subtitle: String,
    position: f64,
    is_live_stream: bool,
}

#[derive(Deserialize)]
struct SeekArgs {
    second: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Play(PlayRequest),
    Pause,
    Stop,
    SeekTo { seconds: f64 },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum CommandError {
    #[error("method not implemented: {method}")]
    NotImplemented { method: String },

    #[error("invalid arguments for {method}: {reason}")]
    InvalidArguments { method: &'static str, reason: String },
}

impl CommandError {
    fn invalid(method: &'static str, reason: impl ToString) -> Self {
        Self::InvalidArguments {
            method,
            reason: reason.to_string(),
        }
    }
}

impl Command {
    /// Decode a host call into a command, validating every argument at once.
    pub fn decode(method: &str, arguments: &Value) -> Result<Self, CommandError> {
        match method {
            PLAY => {
                let args = PlayArgs::deserialize(arguments)
                    .map_err(|e| CommandError::invalid(PLAY, e))?;
                let url = Url::parse(&args.url).map_err(|e| CommandError::invalid(PLAY, e))?;
                Ok(Self::Play(PlayRequest {
                    url,
                    title: args.title,
                    subtitle: args.subtitle,
                    position_ms: args.position,
                    is_live_stream: args.is_live_stream,
                }))
            }
            PAUSE => Ok(Self::Pause),
            STOP => Ok(Self::Stop),
            SEEK_TO => {
                let args = SeekArgs::deserialize(arguments)
                    .map_err(|e| CommandError::invalid(SEEK_TO, e))?;
                Ok(Self::SeekTo {
                    seconds: args.second,
                })
            }
            other => Err(CommandError::NotImplemented {
                method: other.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Play(_) => PLAY,
            Self::Pause => PAUSE,
            Self::Stop => STOP,
            Self::SeekTo { .. } => SEEK_TO,
        }
    }
}

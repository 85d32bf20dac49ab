#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

//! Host-facing surface of the player.
//!
//! Method calls arrive as `{method, arguments}` pairs and are decoded into
//! typed commands. [`PlayerService`] owns the controller on a single tokio
//! task, so commands and engine notifications are applied strictly one at a
//! time. Events leave through the controller's [`EventSink`](aulos_events::EventSink),
//! optionally encoded as flat JSON records.

mod call;
mod config;
mod error;
mod service;

pub use call::{INVALID_ARGUMENTS, MethodCall, MethodResult, encode_event};
pub use config::{BridgeConfig, InvalidArgumentPolicy};
pub use error::BridgeError;
pub use service::{PlayerHandle, PlayerService};

/// Channel carrying method calls from the host.
pub const METHOD_CHANNEL: &str = "tv.mta/NativeAudioChannel";

/// Channel carrying playback events to the host.
pub const EVENT_CHANNEL: &str = "tv.mta/NativeAudioEventChannel";

#![forbid(unsafe_code)]

//! # Aulos
//!
//! Facade crate for single-stream audio playback over a platform media
//! engine, driven by a host through a method channel and observed through an
//! event channel.
//!
//! ## Quick start
//!
//! ```ignore
//! use aulos::prelude::*;
//!
//! let controller = PlaybackController::new(platform_backend, PlayerConfig::default())
//!     .with_audio_session(Arc::new(platform_session))
//!     .with_now_playing(Arc::new(platform_now_playing));
//! let (player, _task) = PlayerService::spawn(controller, BridgeConfig::default());
//!
//! player.listen_json(|record| host.send_event(record));
//! player.invoke(MethodCall::new("play", arguments)).await?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod play {
    pub use aulos_play::*;
}

pub mod events {
    pub use aulos_events::*;
}

pub mod bridge {
    pub use aulos_bridge::*;
}

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use aulos_bridge::{
        BridgeConfig, InvalidArgumentPolicy, MethodCall, MethodResult, PlayerHandle,
        PlayerService,
    };
    pub use aulos_events::{EventListener, EventSink, PlaybackEvent};
    pub use aulos_play::{
        AudioSession, MediaBackend, MediaEngine, NowPlayingCenter, NowPlayingInfo,
        PlaybackController, PlayerConfig, PlayerState, RemoteCommand, RemoteCommandStatus,
    };
}

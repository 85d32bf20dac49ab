#![forbid(unsafe_code)]

//! Normalized playback events and the single-listener sink they are delivered to.

mod event;
mod sink;

pub use event::PlaybackEvent;
pub use sink::{ChannelListener, EventListener, EventSink};

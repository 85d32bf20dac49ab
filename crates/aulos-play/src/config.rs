use std::time::Duration;

use derivative::Derivative;
use derive_setters::Setters;

use crate::time::NANOS_TIMESCALE;

/// Configuration for [`PlaybackController`](crate::PlaybackController).
#[derive(Clone, Debug, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct PlayerConfig {
    /// Interval of the periodic time observer. Default: 1 second.
    #[derivative(Default(value = "Duration::from_secs(1)"))]
    pub time_observer_interval: Duration,
    /// Timescale of seek targets handed to the engine. Default: nanoseconds.
    #[derivative(Default(value = "NANOS_TIMESCALE"))]
    pub seek_timescale: i32,
    /// Ask the audio session to route to Bluetooth devices. Default: true.
    #[derivative(Default(value = "true"))]
    pub allow_bluetooth: bool,
}

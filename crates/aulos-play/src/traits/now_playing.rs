/// Record shown on the system now-playing surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlayingInfo {
    pub title: String,
    /// Shown in the artist slot.
    pub subtitle: String,
    pub is_live_stream: bool,
    /// Elapsed playback time in seconds.
    pub elapsed: f64,
    /// Item duration in seconds, unknown for live streams.
    pub duration: Option<f64>,
    /// 0.0 paused, 1.0 playing.
    pub rate: f32,
}

/// System now-playing metadata surface.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = NowPlayingCenterMock)
)]
pub trait NowPlayingCenter: Send + Sync + 'static {
    /// Replace the displayed record; `None` clears it.
    fn publish(&self, info: Option<NowPlayingInfo>);
}

/// Center for hosts without a now-playing surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNowPlaying;

impl NowPlayingCenter for NullNowPlaying {
    fn publish(&self, _: Option<NowPlayingInfo>) {}
}

//! Mirrors the live session into the system now-playing surface.

use std::sync::Arc;

use crate::traits::now_playing::{NowPlayingCenter, NowPlayingInfo};

/// External transport trigger from the system remote-command source
/// (lock screen, headset buttons, car controls).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    Play,
    Pause,
}

/// Answer returned to the remote-command source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteCommandStatus {
    Success,
    CommandFailed,
}

/// Projection of the session onto a [`NowPlayingCenter`].
///
/// Holds nothing that cannot be recomputed from the session; every update
/// republishes the whole record.
pub struct NowPlayingPresenter {
    center: Arc<dyn NowPlayingCenter>,
    info: Option<NowPlayingInfo>,
}

impl NowPlayingPresenter {
    pub fn new(center: Arc<dyn NowPlayingCenter>) -> Self {
        Self { center, info: None }
    }

    /// Current record, `None` when nothing is displayed.
    #[must_use]
    pub fn info(&self) -> Option<&NowPlayingInfo> {
        self.info.as_ref()
    }

    /// Publish the record for a new session. Rate starts at 0 until the
    /// engine reports playback.
    pub fn begin(
        &mut self,
        title: &str,
        subtitle: &str,
        is_live_stream: bool,
        elapsed: f64,
        duration: Option<f64>,
    ) {
        self.info = Some(NowPlayingInfo {
            title: title.to_owned(),
            subtitle: subtitle.to_owned(),
            is_live_stream,
            elapsed,
            duration,
            rate: 0.0,
        });
        self.publish();
    }

    /// Refresh elapsed time and rate.
    pub fn update(&mut self, elapsed: f64, rate: f32) {
        let Some(info) = self.info.as_mut() else {
            return;
        };
        info.elapsed = elapsed;
        info.rate = rate;
        self.publish();
    }

    /// Refresh duration once the engine learns it.
    pub fn set_duration(&mut self, duration: Option<f64>) {
        let Some(info) = self.info.as_mut() else {
            return;
        };
        if info.duration != duration {
            info.duration = duration;
            self.publish();
        }
    }

    /// Rewind the record after the item ended.
    pub fn complete(&mut self) {
        self.update(0.0, 0.0);
    }

    /// Remove the record from the system surface.
    pub fn clear(&mut self) {
        self.info = None;
        self.center.publish(None);
    }

    fn publish(&self) {
        self.center.publish(self.info.clone());
    }
}

use std::{sync::Arc, time::Duration};

use aulos_events::PlaybackEvent;
use aulos_test_utils::tracing_setup;
use rstest::rstest;
use unimock::{MockFn, Unimock, matching};
use url::Url;

use super::*;
use crate::{
    error::PlayError,
    mock::{AudioSessionMock, EngineCall, EventRecorder, RecordingNowPlaying, ScriptedBackend},
    time::NANOS_TIMESCALE,
};

struct Harness {
    backend: ScriptedBackend,
    controller: PlaybackController<ScriptedBackend>,
    events: EventRecorder,
    now_playing: RecordingNowPlaying,
}

impl Harness {
    fn new() -> Self {
        let backend = ScriptedBackend::new();
        let events = EventRecorder::default();
        let now_playing = RecordingNowPlaying::default();
        let controller = PlaybackController::new(backend.clone(), PlayerConfig::default())
            .with_now_playing(Arc::new(now_playing.clone()));
        controller.events().attach(events.clone());
        Self {
            backend,
            controller,
            events,
            now_playing,
        }
    }

    /// Play `url` and drive the engine until it reports playback.
    fn start(&mut self, url: &str, position_ms: f64) {
        self.controller.play(request(url, position_ms, false));
        let engine = self.backend.last().expect("engine created");
        engine.become_ready();
        engine.complete_seek(true);
        self.controller.drain_notifications();
    }
}

fn request(url: &str, position_ms: f64, is_live_stream: bool) -> PlayRequest {
    PlayRequest {
        url: Url::parse(url).expect("valid url"),
        title: "Title".to_owned(),
        subtitle: "Artist".to_owned(),
        position_ms,
        is_live_stream,
    }
}

fn names(events: &[PlaybackEvent]) -> Vec<&'static str> {
    events.iter().map(PlaybackEvent::name).collect()
}

#[test]
fn new_controller_is_idle() {
    let harness = Harness::new();
    assert_eq!(harness.controller.state(), PlayerState::Idle);
    assert!(harness.controller.session().is_none());
    assert!(harness.controller.now_playing().is_none());
}

#[rstest]
fn play_emits_nothing_synchronously(_tracing_setup: ()) {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));

    assert!(harness.events.events().is_empty());
    assert_eq!(harness.controller.state(), PlayerState::Loading);
}

#[test]
fn play_registers_observers_and_seeks_to_start() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 5000.0, false));

    let engine = harness.backend.last().expect("engine created");
    let calls = engine.calls();
    for kind in ObservationKind::STATUS {
        assert!(calls.contains(&EngineCall::AddObserver(kind)), "{kind:?}");
    }
    assert!(calls.contains(&EngineCall::AddPeriodicTimeObserver(Duration::from_secs(1))));
    assert!(calls.contains(&EngineCall::Seek(MediaTime::with_seconds(5.0, NANOS_TIMESCALE))));
    assert_eq!(calls.last(), Some(&EngineCall::Play));
    assert_eq!(engine.observer_count(), 6);
}

#[test]
fn play_from_position_reports_ready_seek_and_play() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 5000.0);

    assert_eq!(
        harness.events.events(),
        vec![
            PlaybackEvent::Ready,
            PlaybackEvent::Seek {
                position: 0.0,
                offset: 5.0
            },
            PlaybackEvent::Play,
        ]
    );
    assert_eq!(harness.controller.state(), PlayerState::Playing);
}

#[test]
fn seek_offset_is_exact_millisecond_conversion() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 1234.0);

    let offsets: Vec<f64> = harness
        .events
        .events()
        .into_iter()
        .filter_map(|event| match event {
            PlaybackEvent::Seek { offset, .. } => Some(offset),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![1234.0 / 1000.0]);
}

#[test]
fn replacing_session_drops_old_notifications() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    let first = harness.backend.last().expect("first engine");
    first.become_ready();
    first.tick(1.0);

    harness.controller.play(request("https://cdn.test/b.m3u8", 0.0, false));
    let second = harness.backend.last().expect("second engine");
    harness.controller.drain_notifications();

    assert!(harness.events.events().is_empty());
    assert_eq!(harness.backend.engines().len(), 2);
    assert!(first.is_released());
    assert_eq!(first.observer_count(), 0);
    assert!(!second.is_released());
    assert_eq!(
        harness.controller.session().map(|s| s.url),
        Some(second.url().clone())
    );
}

#[test]
fn old_engine_observers_removed_before_release() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    let first = harness.backend.last().expect("first engine");

    harness.controller.play(request("https://cdn.test/b.m3u8", 0.0, false));

    let removed = first
        .calls()
        .into_iter()
        .filter(|call| matches!(call, EngineCall::RemoveObserver(_)))
        .count();
    assert_eq!(removed, 6);
    assert!(first.calls().contains(&EngineCall::Pause));
}

#[test]
fn late_seek_completion_from_replaced_session_is_ignored() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 3000.0, false));
    let first = harness.backend.last().expect("first engine");
    harness.controller.play(request("https://cdn.test/b.m3u8", 0.0, false));

    assert!(first.complete_seek(true));
    harness.controller.drain_notifications();

    assert!(harness.events.events().is_empty());
}

#[test]
fn seek_while_paused_stays_paused() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 5000.0);
    harness.controller.pause();
    harness.controller.drain_notifications();
    harness.events.take();

    harness.controller.seek_to(10.0);
    let engine = harness.backend.last().expect("engine");
    engine.complete_seek(true);
    harness.controller.drain_notifications();

    assert_eq!(
        harness.events.events(),
        vec![PlaybackEvent::Seek {
            position: 5.0,
            offset: 10.0
        }]
    );
    assert_eq!(harness.controller.state(), PlayerState::Paused);
    assert_eq!(engine.rate(), 0.0);
    assert_eq!(harness.now_playing.current().map(|info| info.rate), Some(0.0));
}

#[test]
fn superseded_seek_reports_only_newest() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 5000.0);
    harness.events.take();

    harness.controller.seek_to(10.0);
    harness.controller.seek_to(20.0);
    harness.controller.drain_notifications();
    assert!(harness.controller.is_seeking());

    harness.backend.last().expect("engine").complete_seek(true);
    harness.controller.drain_notifications();
    assert!(!harness.controller.is_seeking());

    let seeks: Vec<_> = harness
        .events
        .events()
        .into_iter()
        .filter(|event| matches!(event, PlaybackEvent::Seek { .. }))
        .collect();
    assert_eq!(
        seeks,
        vec![PlaybackEvent::Seek {
            position: 5.0,
            offset: 20.0
        }]
    );
}

#[test]
fn cancelled_seek_emits_nothing() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    harness.events.take();

    harness.controller.seek_to(42.0);
    harness.backend.last().expect("engine").complete_seek(false);
    harness.controller.drain_notifications();

    assert!(!names(&harness.events.events()).contains(&"onSeek"));
}

#[test]
fn seek_restores_playing_rate_in_now_playing() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);

    harness.controller.seek_to(30.0);
    assert_eq!(harness.now_playing.current().map(|info| info.rate), Some(0.0));

    harness.backend.last().expect("engine").complete_seek(true);
    harness.controller.drain_notifications();

    let info = harness.now_playing.current().expect("record published");
    assert_eq!(info.rate, 1.0);
    assert_eq!(info.elapsed, 30.0);
}

#[test]
fn periodic_tick_reports_time_and_updates_now_playing() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    harness.events.take();

    harness.backend.last().expect("engine").tick(12.5);
    harness.controller.drain_notifications();

    assert_eq!(harness.events.events(), vec![PlaybackEvent::Time { time: 12.5 }]);
    assert_eq!(
        harness.now_playing.current().map(|info| info.elapsed),
        Some(12.5)
    );
}

#[test]
fn no_time_events_after_stop() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    let engine = harness.backend.last().expect("engine");
    engine.tick(1.0);

    harness.controller.stop();
    engine.tick(2.0);
    harness.controller.drain_notifications();

    assert!(!names(&harness.events.events()).contains(&"onTime"));
    assert_eq!(harness.controller.state(), PlayerState::Idle);
    assert!(engine.is_released());
    assert_eq!(engine.observer_count(), 0);
}

#[test]
fn stop_clears_now_playing() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);

    harness.controller.stop();

    assert_eq!(harness.now_playing.published().last(), Some(&None));
    assert!(harness.controller.now_playing().is_none());
}

#[test]
fn stop_and_pause_without_session_touch_no_engine() {
    let mut harness = Harness::new();
    harness.controller.stop();
    harness.controller.stop();
    harness.controller.pause();
    harness.controller.seek_to(3.0);

    assert!(harness.events.events().is_empty());
    assert!(harness.backend.engines().is_empty());
    assert_eq!(harness.now_playing.published(), vec![None, None]);
}

#[test]
fn stop_without_session_clears_now_playing() {
    let mut harness = Harness::new();
    harness.controller.stop();

    assert_eq!(harness.now_playing.published(), vec![None]);
    assert!(harness.now_playing.current().is_none());
}

#[test]
fn stop_after_failed_play_clears_now_playing() {
    let mut harness = Harness::new();
    harness.backend.fail_next(PlayError::EngineUnavailable {
        url: "https://cdn.test/a.m3u8".to_owned(),
        reason: "offline".to_owned(),
    });
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    harness.controller.stop();

    assert_eq!(harness.now_playing.published().last(), Some(&None));
    assert_eq!(harness.controller.state(), PlayerState::Idle);
}

#[test]
fn pause_before_ready_keeps_loading() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    harness.controller.pause();
    harness.controller.drain_notifications();

    assert_eq!(harness.controller.state(), PlayerState::Loading);
    assert_eq!(names(&harness.events.events()), vec!["onPause"]);
}

#[test]
fn end_of_media_completes_once_and_rewinds() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    let engine = harness.backend.last().expect("engine");
    engine.set_duration(30.0);
    harness.events.take();

    engine.play_to_end();
    harness.controller.drain_notifications();
    engine.complete_seek(true);
    harness.controller.drain_notifications();

    let events = harness.events.events();
    assert_eq!(
        events
            .iter()
            .filter(|event| **event == PlaybackEvent::Complete)
            .count(),
        1
    );
    assert_eq!(harness.controller.state(), PlayerState::Ended);
    let info = harness.now_playing.current().expect("record published");
    assert_eq!(info.elapsed, 0.0);
    assert_eq!(info.rate, 0.0);
    assert!(engine.calls().contains(&EngineCall::Seek(MediaTime::ZERO)));
}

#[rstest]
#[case::with_message(Some("decoder exploded"), "decoder exploded")]
#[case::without_message(None, "unknown error")]
fn item_failure_reports_error(#[case] message: Option<&str>, #[case] expected: &str) {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    harness.backend.last().expect("engine").fail_item(message);
    harness.controller.drain_notifications();

    assert_eq!(harness.events.events(), vec![PlaybackEvent::error(expected)]);
    assert_eq!(harness.controller.state(), PlayerState::Failed);
}

#[test]
fn failed_state_suppresses_play_pause_and_time() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    let engine = harness.backend.last().expect("engine");
    engine.fail_to_play_to_end("network lost");
    harness.controller.drain_notifications();
    harness.events.take();

    engine.tick(3.0);
    engine.become_ready();
    harness.controller.pause();
    engine.play_to_end();
    harness.controller.drain_notifications();

    assert!(harness.events.events().is_empty());
    assert_eq!(harness.controller.state(), PlayerState::Failed);
}

#[test]
fn errors_keep_flowing_in_failed_state() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    let engine = harness.backend.last().expect("engine");

    engine.fail_to_play_to_end("first");
    engine.log_error("second\n\0");
    harness.controller.drain_notifications();

    let errors: Vec<_> = harness
        .events
        .events()
        .into_iter()
        .filter(|event| matches!(event, PlaybackEvent::Error { .. }))
        .collect();
    assert_eq!(
        errors,
        vec![PlaybackEvent::error("first"), PlaybackEvent::error("second")]
    );
}

#[test]
fn new_play_recovers_from_failed() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    harness.backend.last().expect("engine").fail_item(None);
    harness.controller.drain_notifications();

    harness.start("https://cdn.test/b.m3u8", 0.0);

    assert_eq!(harness.controller.state(), PlayerState::Playing);
}

#[test]
fn engine_creation_failure_reports_error_and_stays_idle() {
    let mut harness = Harness::new();
    harness.backend.fail_next(PlayError::EngineUnavailable {
        url: "https://cdn.test/a.m3u8".to_owned(),
        reason: "unsupported scheme".to_owned(),
    });

    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));

    assert_eq!(harness.controller.state(), PlayerState::Idle);
    assert_eq!(names(&harness.events.events()), vec!["onError"]);
    assert!(harness.controller.now_playing().is_none());
}

#[test]
fn now_playing_mirrors_request() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    let engine = harness.backend.last().expect("engine");
    engine.set_duration(180.0);
    engine.become_ready();
    harness.controller.drain_notifications();

    let info = harness.controller.now_playing().expect("record");
    assert_eq!(info.title, "Title");
    assert_eq!(info.subtitle, "Artist");
    assert!(!info.is_live_stream);
    assert_eq!(info.duration, Some(180.0));
}

#[test]
fn live_stream_has_no_duration() {
    let mut harness = Harness::new();
    harness.controller.play(request("https://cdn.test/live.m3u8", 0.0, true));
    let engine = harness.backend.last().expect("engine");
    engine.set_duration(180.0);
    engine.become_ready();
    harness.controller.drain_notifications();

    let snapshot = harness.controller.session().expect("session");
    assert!(snapshot.is_live_stream);
    assert_eq!(snapshot.duration, None);
    assert_eq!(harness.controller.now_playing().and_then(|i| i.duration), None);
}

#[test]
fn remote_commands_without_session_fail() {
    let mut harness = Harness::new();
    assert_eq!(
        harness.controller.handle_remote(RemoteCommand::Play),
        RemoteCommandStatus::CommandFailed
    );
    assert_eq!(
        harness.controller.handle_remote(RemoteCommand::Pause),
        RemoteCommandStatus::CommandFailed
    );
}

#[test]
fn remote_commands_are_guarded_by_rate() {
    let mut harness = Harness::new();
    harness.start("https://cdn.test/a.m3u8", 0.0);
    let engine = harness.backend.last().expect("engine");

    assert_eq!(
        harness.controller.handle_remote(RemoteCommand::Play),
        RemoteCommandStatus::CommandFailed
    );
    assert_eq!(
        harness.controller.handle_remote(RemoteCommand::Pause),
        RemoteCommandStatus::Success
    );
    assert_eq!(engine.rate(), 0.0);
    assert_eq!(
        harness.controller.handle_remote(RemoteCommand::Pause),
        RemoteCommandStatus::CommandFailed
    );
    assert_eq!(
        harness.controller.handle_remote(RemoteCommand::Play),
        RemoteCommandStatus::Success
    );
    assert_eq!(engine.rate(), 1.0);
    assert_eq!(harness.now_playing.current().map(|info| info.rate), Some(1.0));
}

#[test]
fn execute_dispatches_commands() {
    let mut harness = Harness::new();
    harness
        .controller
        .execute(Command::Play(request("https://cdn.test/a.m3u8", 0.0, false)));
    harness.controller.execute(Command::SeekTo { seconds: 7.0 });
    harness.controller.execute(Command::Pause);

    let engine = harness.backend.last().expect("engine");
    assert!(engine.calls().contains(&EngineCall::Seek(MediaTime::with_seconds(
        7.0,
        NANOS_TIMESCALE
    ))));
    assert_eq!(engine.rate(), 0.0);

    harness.controller.execute(Command::Stop);
    assert_eq!(harness.controller.state(), PlayerState::Idle);
}

#[test]
fn generation_advances_per_session() {
    let mut harness = Harness::new();
    let initial = harness.controller.generation();
    harness.controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    harness.controller.play(request("https://cdn.test/b.m3u8", 0.0, false));
    harness.controller.stop();

    assert_eq!(harness.controller.generation(), initial + 2);
}

#[test]
fn audio_session_is_activated_and_deactivated() {
    let session = Unimock::new((
        AudioSessionMock::set_category
            .next_call(matching!(
                SessionCategory::Playback,
                SessionOptions {
                    allow_bluetooth: true,
                    ..
                }
            ))
            .returns(Ok(())),
        AudioSessionMock::set_active
            .next_call(matching!(true))
            .returns(Ok(())),
        AudioSessionMock::set_active
            .next_call(matching!(false))
            .returns(Ok(())),
    ));
    let mut controller = PlaybackController::new(ScriptedBackend::new(), PlayerConfig::default())
        .with_audio_session(Arc::new(session));

    controller.play(request("https://cdn.test/a.m3u8", 0.0, false));
    controller.stop();
}

#[test]
fn audio_session_is_deactivated_when_engine_creation_fails() {
    let session = Unimock::new((
        AudioSessionMock::set_category
            .next_call(matching!(SessionCategory::Playback, _))
            .returns(Ok(())),
        AudioSessionMock::set_active
            .next_call(matching!(true))
            .returns(Ok(())),
        AudioSessionMock::set_active
            .next_call(matching!(false))
            .returns(Err(PlayError::SessionActivationFailed {
                reason: "in use".to_owned(),
            })),
    ));
    let backend = ScriptedBackend::new();
    backend.fail_next(PlayError::EngineUnavailable {
        url: "https://cdn.test/a.m3u8".to_owned(),
        reason: "offline".to_owned(),
    });
    let mut controller = PlaybackController::new(backend.clone(), PlayerConfig::default())
        .with_audio_session(Arc::new(session));

    controller.play(request("https://cdn.test/a.m3u8", 0.0, false));

    assert_eq!(controller.state(), PlayerState::Idle);
    assert!(backend.engines().is_empty());
}

#[test]
fn audio_session_failure_does_not_block_playback() {
    let session = Unimock::new((
        AudioSessionMock::set_category
            .each_call(matching!(_, _))
            .returns(Err(PlayError::SessionCategoryUnsupported {
                reason: "busy".to_owned(),
            })),
        AudioSessionMock::set_active
            .each_call(matching!(_))
            .returns(Ok(()))
            .at_least_times(0),
    ));
    let backend = ScriptedBackend::new();
    let mut controller = PlaybackController::new(backend.clone(), PlayerConfig::default())
        .with_audio_session(Arc::new(session));

    controller.play(request("https://cdn.test/a.m3u8", 0.0, false));

    assert_eq!(controller.state(), PlayerState::Loading);
    assert_eq!(backend.engines().len(), 1);
}

#[test]
fn trims_error_log_terminators() {
    assert_eq!(trim_log_entry("stall\n"), "stall");
    assert_eq!(trim_log_entry("stall\0"), "stall");
    assert_eq!(trim_log_entry("mid\nline"), "mid\nline");
}

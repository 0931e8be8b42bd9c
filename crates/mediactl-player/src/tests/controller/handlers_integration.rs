use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::bridge::simulated::{BridgeCall, SimulatedBridge, SimulatedMedia};
use crate::bridge::{NativeBridge, NativeEvent};
use crate::config::PlayerConfig;
use crate::controller::{NativeEventMessage, PlayerController, PositionPolledMessage};
use crate::error::{PlaybackError, PlayerError};
use crate::event::{EventItem, EventStream, PlayerEvent};
use crate::registry::PlayerRegistry;
use crate::source::{DataSource, SourceKind};
use crate::value::{FrameSize, MediaHandle, PlayerValue};

const TEST_TIMEOUT: Duration = Duration::from_millis(500);
const MOVIE_URI: &str = "https://media.example/movie.mp4";
const MOVIE_DURATION: Duration = Duration::from_millis(120_000);
const MOVIE_FRAME: FrameSize = FrameSize::new(1920, 1080);

fn test_config() -> PlayerConfig {
    PlayerConfig {
        command_timeout: TEST_TIMEOUT,
        poll_interval: Duration::from_millis(20),
        event_capacity: 64,
    }
}

struct Harness {
    registry: Arc<PlayerRegistry>,
    bridge: Arc<SimulatedBridge>,
    controller: PlayerController,
    events: EventStream,
}

impl Harness {
    fn new() -> Self {
        Self::with_source(DataSource::network(MOVIE_URI))
    }

    fn with_source(source: DataSource) -> Self {
        let registry = Arc::new(PlayerRegistry::new());
        let bridge = Arc::new(
            SimulatedBridge::new(registry.event_sink())
                .with_media(MOVIE_URI, SimulatedMedia::new(MOVIE_DURATION, MOVIE_FRAME)),
        );
        let dyn_bridge: Arc<dyn NativeBridge> = bridge.clone();
        let controller = PlayerController::with_config(
            source,
            dyn_bridge,
            Arc::clone(&registry),
            test_config(),
        )
        .expect("create controller");
        let events = controller.events();
        Self {
            registry,
            bridge,
            controller,
            events,
        }
    }

    /// Initialized harness with the `Initialized` event already consumed.
    async fn opened() -> (Self, MediaHandle) {
        let mut harness = Self::new();
        harness.controller.initialize().await.expect("initialize");
        let handle = harness.controller.handle().expect("handle assigned");
        match harness.next_event().await {
            Ok(PlayerEvent::Initialized { .. }) => {},
            other => panic!("unexpected first event: {other:?}"),
        }
        (harness, handle)
    }

    fn emit(&self, handle: MediaHandle, event: NativeEvent) {
        self.bridge.emit(handle, event);
    }

    /// Value after every previously emitted native event was applied.
    async fn settle(&self) -> PlayerValue {
        self.controller.snapshot().await.expect("snapshot")
    }

    async fn next_event(&mut self) -> EventItem {
        tokio::time::timeout(TEST_TIMEOUT, self.events.next())
            .await
            .expect("event in time")
            .expect("event stream open")
    }

    fn drain_events(&mut self) -> Vec<EventItem> {
        let mut items = Vec::new();
        while let Some(item) = self.events.try_next() {
            items.push(item);
        }
        items
    }
}

async fn wait_until(mut check: impl FnMut() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn initialize_opens_network_source_with_headers() {
    let source = DataSource::network(MOVIE_URI).with_header("Authorization", "Bearer token");
    let mut harness = Harness::with_source(source);

    harness.controller.initialize().await.expect("initialize");

    let value = harness.controller.value();
    assert!(value.is_initialized);
    assert_eq!(value.duration, MOVIE_DURATION);
    assert_eq!(value.frame_size, MOVIE_FRAME);
    assert!((value.aspect_ratio() - 1920.0 / 1080.0).abs() < 1e-9);

    let handle = value.handle.expect("handle assigned");
    let expected_headers =
        BTreeMap::from([("Authorization".to_string(), "Bearer token".to_string())]);
    assert_eq!(
        harness.bridge.calls(),
        vec![BridgeCall::Open {
            uri: MOVIE_URI.to_string(),
            kind: SourceKind::Network,
            headers: Some(expected_headers),
        }]
    );
    assert_eq!(
        harness.next_event().await,
        Ok(PlayerEvent::Initialized {
            duration: Some(MOVIE_DURATION),
            frame_size: Some(MOVIE_FRAME),
        })
    );
    assert!(harness.drain_events().is_empty());
    assert!(harness.registry.contains(handle));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_open_reports_through_value_and_initialized_event() {
    let mut harness = Harness::with_source(DataSource::network("https://media.example/missing.mp4"));

    harness
        .controller
        .initialize()
        .await
        .expect("failed open is not a command error");

    let value = harness.controller.value();
    assert!(!value.is_initialized);
    assert!(value.has_error());
    assert!(value.handle.is_none());
    assert_eq!(
        harness.next_event().await,
        Ok(PlayerEvent::Initialized {
            duration: None,
            frame_size: None,
        })
    );
    assert!(harness.registry.is_empty());

    let err = harness.controller.play().await.expect_err("play after failed open");
    assert!(err.is_invalid_state());
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_sources_are_rejected_at_construction() {
    for source in [
        DataSource::asset("intro.mp4"),
        DataSource::content_uri("content://media/external/video/7"),
    ] {
        let registry = Arc::new(PlayerRegistry::new());
        let bridge: Arc<dyn NativeBridge> = Arc::new(SimulatedBridge::new(registry.event_sink()));
        let result = PlayerController::with_config(source, bridge, registry, test_config());
        assert!(matches!(result, Err(PlayerError::UnsupportedSource { .. })));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn commands_before_initialize_report_invalid_state() {
    let harness = Harness::new();
    let controller = &harness.controller;

    assert!(controller.play().await.expect_err("play").is_invalid_state());
    assert!(controller.pause().await.expect_err("pause").is_invalid_state());
    assert!(
        controller
            .seek_to(Duration::from_secs(1))
            .await
            .expect_err("seek")
            .is_invalid_state()
    );
    assert!(controller.set_volume(0.5).await.expect_err("volume").is_invalid_state());
    assert!(
        controller
            .set_playback_speed(2.0)
            .await
            .expect_err("speed")
            .is_invalid_state()
    );

    controller.set_looping(true).await.expect("looping before init");
    assert!(controller.value().is_looping);
    assert!(harness.bridge.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn initialize_twice_fails() {
    let (harness, _handle) = Harness::opened().await;
    let err = harness
        .controller
        .initialize()
        .await
        .expect_err("second initialize");
    assert!(err.is_invalid_state());
    assert_eq!(
        harness
            .bridge
            .count_calls(|call| matches!(call, BridgeCall::Open { .. })),
        1
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn session_end_without_looping_completes() {
    let (mut harness, handle) = Harness::opened().await;

    harness.controller.play().await.expect("play");
    harness.emit(handle, NativeEvent::SessionStarted);
    assert!(harness.settle().await.is_playing);

    harness.emit(handle, NativeEvent::SessionEnded);
    let value = harness.settle().await;
    assert!(value.is_completed);
    assert!(!value.is_playing);
    assert_eq!(value.position, MOVIE_DURATION);

    assert_eq!(
        harness.drain_events(),
        vec![
            Ok(PlayerEvent::PlayingStateUpdate { is_playing: true }),
            Ok(PlayerEvent::Completed),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn session_end_while_looping_seeks_to_start() {
    let (mut harness, handle) = Harness::opened().await;
    harness.controller.set_looping(true).await.expect("looping");
    harness
        .controller
        .seek_to(Duration::from_secs(100))
        .await
        .expect("seek near end");

    harness.emit(handle, NativeEvent::SessionStarted);
    harness.emit(handle, NativeEvent::SessionEnded);
    let value = harness.settle().await;

    assert!(!value.is_completed);
    assert!(value.is_playing);
    assert_eq!(value.position, Duration::ZERO);
    assert_eq!(
        harness
            .bridge
            .count_calls(|call| *call == BridgeCall::Seek(handle, Duration::ZERO)),
        1
    );
    let events = harness.drain_events();
    assert!(!events.contains(&Ok(PlayerEvent::Completed)));
}

#[tokio::test(flavor = "multi_thread")]
async fn late_poll_result_cannot_undo_completion() {
    let (harness, handle) = Harness::opened().await;
    harness.emit(handle, NativeEvent::SessionStarted);
    harness.emit(handle, NativeEvent::SessionEnded);
    assert!(harness.settle().await.is_completed);

    for generation in 0..4 {
        harness
            .controller
            .actor_ref
            .cast(PositionPolledMessage {
                generation,
                position: Duration::from_secs(3),
            })
            .expect("cast late poll");
    }

    let value = harness.settle().await;
    assert!(value.is_completed);
    assert_eq!(value.position, MOVIE_DURATION);
}

#[tokio::test(flavor = "multi_thread")]
async fn poller_refreshes_position_while_playing() {
    let (harness, handle) = Harness::opened().await;
    harness.bridge.set_position(handle, Duration::from_secs(42));
    harness.emit(handle, NativeEvent::SessionStarted);

    let mut values = harness.controller.subscribe_value();
    let refreshed = tokio::time::timeout(
        Duration::from_secs(2),
        values.wait_for(|value| value.position == Duration::from_secs(42)),
    )
    .await
    .expect("poll in time")
    .map(|value| value.position)
    .expect("value channel open");
    assert_eq!(refreshed, Duration::from_secs(42));

    harness.emit(handle, NativeEvent::SessionPaused);
    harness.settle().await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    let polls_after_pause = harness
        .bridge
        .count_calls(|call| matches!(call, BridgeCall::GetPosition(_)));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        harness
            .bridge
            .count_calls(|call| matches!(call, BridgeCall::GetPosition(_))),
        polls_after_pause
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn position_query_prefers_engine_while_playing() {
    let (harness, handle) = Harness::opened().await;
    assert_eq!(
        harness.controller.position().await.expect("idle position"),
        Duration::ZERO
    );

    harness.emit(handle, NativeEvent::SessionStarted);
    harness.bridge.set_position(handle, Duration::from_secs(7));
    assert_eq!(
        harness.controller.position().await.expect("live position"),
        Duration::from_secs(7)
    );

    harness.controller.dispose().await.expect("dispose");
    assert!(
        harness
            .controller
            .position()
            .await
            .expect_err("position after dispose")
            .is_invalid_state()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn seek_clamps_and_clears_completion() {
    let (harness, handle) = Harness::opened().await;

    harness
        .controller
        .seek_to(Duration::from_secs(500))
        .await
        .expect("seek past end");
    assert!(
        harness
            .bridge
            .calls()
            .contains(&BridgeCall::Seek(handle, MOVIE_DURATION))
    );
    assert_eq!(harness.controller.value().position, MOVIE_DURATION);

    harness.emit(handle, NativeEvent::SessionEnded);
    assert!(harness.settle().await.is_completed);

    harness
        .controller
        .seek_to(Duration::from_secs(30))
        .await
        .expect("seek back");
    let value = harness.controller.value();
    assert!(!value.is_completed);
    assert_eq!(value.position, Duration::from_secs(30));
}

#[tokio::test(flavor = "multi_thread")]
async fn volume_is_clamped_and_speed_validated() {
    let (harness, handle) = Harness::opened().await;
    let controller = &harness.controller;

    controller.set_volume(1.7).await.expect("loud volume");
    assert_eq!(controller.value().volume, 1.0);
    controller.set_volume(-0.5).await.expect("negative volume");
    assert_eq!(controller.value().volume, 0.0);
    assert_eq!(harness.bridge.volume(handle), Some(0.0));
    assert!(matches!(
        controller.set_volume(f64::NAN).await,
        Err(PlayerError::InvalidArgument { .. })
    ));

    for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            controller.set_playback_speed(speed).await,
            Err(PlayerError::InvalidArgument { .. })
        ));
    }
    controller.set_playback_speed(1.5).await.expect("speed");
    assert_eq!(controller.value().playback_speed, 1.5);
    assert_eq!(
        harness
            .bridge
            .count_calls(|call| matches!(call, BridgeCall::SetPlaybackSpeed(..))),
        1
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn play_after_completion_restarts_from_zero() {
    let (harness, handle) = Harness::opened().await;
    harness.emit(handle, NativeEvent::SessionStarted);
    harness.emit(handle, NativeEvent::SessionEnded);
    assert!(harness.settle().await.is_completed);

    harness.controller.play().await.expect("replay");

    let value = harness.controller.value();
    assert!(!value.is_completed);
    assert_eq!(value.position, Duration::ZERO);
    let calls = harness.bridge.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[
            BridgeCall::Seek(handle, Duration::ZERO),
            BridgeCall::Play(handle),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn native_error_fails_the_stream_and_closes_commands() {
    let (mut harness, handle) = Harness::opened().await;
    harness.emit(handle, NativeEvent::SessionStarted);
    harness.emit(
        handle,
        NativeEvent::Error {
            message: Some("decoder crashed".to_string()),
        },
    );
    let value = harness.settle().await;

    assert!(!value.is_initialized);
    assert!(!value.is_playing);
    assert_eq!(value.duration, Duration::ZERO);
    assert_eq!(value.error_description.as_deref(), Some("decoder crashed"));
    assert_eq!(
        harness.drain_events(),
        vec![
            Ok(PlayerEvent::PlayingStateUpdate { is_playing: true }),
            Err(PlaybackError {
                description: "decoder crashed".to_string(),
            }),
        ]
    );
    assert!(harness.controller.play().await.expect_err("play").is_invalid_state());

    harness.controller.dispose().await.expect("dispose after error");
    assert!(!harness.bridge.is_open(handle));
}

#[tokio::test(flavor = "multi_thread")]
async fn buffering_events_toggle_flag() {
    let (mut harness, handle) = Harness::opened().await;

    harness.emit(handle, NativeEvent::BufferingStarted);
    assert!(harness.settle().await.is_buffering);
    harness.emit(handle, NativeEvent::BufferingStopped);
    assert!(!harness.settle().await.is_buffering);

    assert_eq!(
        harness.drain_events(),
        vec![Ok(PlayerEvent::BufferingStart), Ok(PlayerEvent::BufferingEnd)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn dispose_releases_once_and_closes_commands() {
    let (mut harness, handle) = Harness::opened().await;

    harness.controller.dispose().await.expect("dispose");
    harness.controller.dispose().await.expect("dispose again");

    assert_eq!(
        harness
            .bridge
            .count_calls(|call| *call == BridgeCall::Release(handle)),
        1
    );
    assert!(harness.registry.lookup(handle).is_none());
    assert!(harness.controller.value().handle.is_none());
    assert!(harness.controller.play().await.expect_err("play").is_invalid_state());
    assert!(
        harness
            .controller
            .set_looping(true)
            .await
            .expect_err("looping")
            .is_invalid_state()
    );
    assert!(
        harness
            .controller
            .initialize()
            .await
            .expect_err("initialize")
            .is_invalid_state()
    );

    harness.emit(handle, NativeEvent::SessionStarted);
    harness.settle().await;
    assert!(harness.drain_events().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn dropping_undisposed_controller_releases_handle() {
    let (harness, handle) = Harness::opened().await;
    let Harness {
        registry,
        bridge,
        controller,
        events,
    } = harness;
    drop(events);
    drop(controller);

    wait_until(
        || bridge.count_calls(|call| *call == BridgeCall::Release(handle)) == 1,
        "leak guard release",
    )
    .await;
    assert!(registry.lookup(handle).is_none());
    assert!(!bridge.is_open(handle));
}

#[tokio::test(flavor = "multi_thread")]
async fn event_for_foreign_handle_is_ignored() {
    let (mut harness, _handle) = Harness::opened().await;

    harness
        .controller
        .actor_ref
        .cast(NativeEventMessage {
            handle: MediaHandle::new(999),
            event: NativeEvent::SessionStarted,
        })
        .expect("cast foreign event");

    assert!(!harness.settle().await.is_playing);
    assert!(harness.drain_events().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_implies_stopped_at_end() {
    use NativeEvent::{SessionEnded, SessionPaused, SessionStarted};

    let cases: Vec<Vec<NativeEvent>> = vec![
        vec![SessionStarted, SessionEnded],
        vec![SessionStarted, SessionPaused, SessionStarted, SessionEnded],
        vec![SessionStarted, SessionEnded, SessionStarted],
        vec![SessionEnded, SessionStarted, SessionEnded],
    ];

    for events in cases {
        let (harness, handle) = Harness::opened().await;
        for event in events.clone() {
            harness.emit(handle, event);
            let value = harness.settle().await;
            if value.is_completed {
                assert!(!value.is_playing, "completed while playing after {events:?}");
                assert_eq!(value.position, value.duration, "completed mid-media after {events:?}");
            }
        }
        harness.controller.dispose().await.expect("dispose");
    }
}

fn movie_bridge(registry: &Arc<PlayerRegistry>) -> Arc<SimulatedBridge> {
    Arc::new(
        SimulatedBridge::new(registry.event_sink())
            .with_media(MOVIE_URI, SimulatedMedia::new(MOVIE_DURATION, MOVIE_FRAME)),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn handle_collision_is_reported_as_failed_open() {
    let registry = Arc::new(PlayerRegistry::new());
    let first_bridge = movie_bridge(&registry);
    let second_bridge = movie_bridge(&registry);
    let first = PlayerController::with_config(
        DataSource::network(MOVIE_URI),
        first_bridge.clone(),
        Arc::clone(&registry),
        test_config(),
    )
    .expect("create first controller");
    let second = PlayerController::with_config(
        DataSource::network(MOVIE_URI),
        second_bridge.clone(),
        Arc::clone(&registry),
        test_config(),
    )
    .expect("create second controller");
    let mut second_events = second.events();

    first.initialize().await.expect("first initialize");
    let handle = first.handle().expect("first handle");

    // Both engines number their sessions from one, so the second open
    // collides with the handle the first controller owns.
    second
        .initialize()
        .await
        .expect("collision is not a command error");

    let value = second.value();
    assert!(!value.is_initialized);
    assert!(value.handle.is_none());
    assert!(value.has_error());
    let item = tokio::time::timeout(TEST_TIMEOUT, second_events.next())
        .await
        .expect("event in time")
        .expect("event stream open");
    assert_eq!(
        item,
        Ok(PlayerEvent::Initialized {
            duration: None,
            frame_size: None,
        })
    );

    assert_eq!(
        second_bridge.count_calls(|call| *call == BridgeCall::Release(handle)),
        1
    );
    assert!(!second_bridge.is_open(handle));
    assert!(first_bridge.is_open(handle));
    let owner = registry.lookup(handle).expect("first controller still registered");
    assert!(owner.value().is_initialized);
    assert!(second.play().await.expect_err("play").is_invalid_state());

    second.dispose().await.expect("dispose second");
    assert!(registry.contains(handle));
}

#[tokio::test(flavor = "multi_thread")]
async fn session_stopped_clears_playing() {
    let (mut harness, handle) = Harness::opened().await;

    harness.emit(handle, NativeEvent::SessionStarted);
    harness.emit(handle, NativeEvent::SessionStopped);
    let value = harness.settle().await;

    assert!(!value.is_playing);
    assert!(!value.is_completed);
    assert_eq!(
        harness.drain_events(),
        vec![
            Ok(PlayerEvent::PlayingStateUpdate { is_playing: true }),
            Ok(PlayerEvent::PlayingStateUpdate { is_playing: false }),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn raw_event_codes_reach_the_owning_controller() {
    let (mut harness, handle) = Harness::opened().await;

    assert!(harness.registry.dispatch_code(handle, 3));
    assert!(harness.settle().await.is_playing);
    assert!(!harness.registry.dispatch_code(handle, 0));

    assert!(harness.registry.dispatch_code(handle, 7));
    let value = harness.settle().await;
    let expected = format!("native playback error on {handle}");
    assert!(!value.is_initialized);
    assert!(!value.is_playing);
    assert_eq!(value.error_description.as_deref(), Some(expected.as_str()));
    assert_eq!(
        harness.drain_events(),
        vec![
            Ok(PlayerEvent::PlayingStateUpdate { is_playing: true }),
            Err(PlaybackError {
                description: expected,
            }),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn dispose_while_polling_stops_the_poller() {
    let (harness, handle) = Harness::opened().await;
    harness.bridge.set_position(handle, Duration::from_secs(9));
    harness.emit(handle, NativeEvent::SessionStarted);
    let bridge = Arc::clone(&harness.bridge);
    wait_until(
        || bridge.count_calls(|call| matches!(call, BridgeCall::GetPosition(_))) >= 2,
        "poller activity",
    )
    .await;

    let (disposed, queried) =
        tokio::join!(harness.controller.dispose(), harness.controller.position());
    disposed.expect("dispose while polling");
    match queried {
        Ok(position) => assert_eq!(position, Duration::from_secs(9)),
        Err(err) => assert!(err.is_invalid_state()),
    }

    assert_eq!(
        harness
            .bridge
            .count_calls(|call| *call == BridgeCall::Release(handle)),
        1
    );
    tokio::time::sleep(Duration::from_millis(40)).await;
    let polls_after_dispose = harness
        .bridge
        .count_calls(|call| matches!(call, BridgeCall::GetPosition(_)));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        harness
            .bridge
            .count_calls(|call| matches!(call, BridgeCall::GetPosition(_))),
        polls_after_dispose
    );
    assert!(harness.controller.value().handle.is_none());
    assert!(harness.registry.lookup(handle).is_none());
}

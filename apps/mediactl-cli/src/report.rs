use mediactl_player::{PlayerEvent, PlayerValue};
use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    TimedOut,
    Failed,
    Closed,
}

#[derive(Debug, Serialize)]
pub struct ValueReport {
    pub outcome: Outcome,
    pub handle: Option<i64>,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub volume: f64,
    pub playback_speed: f64,
    pub is_initialized: bool,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub is_looping: bool,
    pub is_completed: bool,
    pub error: Option<String>,
}

impl ValueReport {
    pub fn new(outcome: Outcome, value: &PlayerValue) -> Self {
        Self {
            outcome,
            handle: value.handle.map(|handle| handle.raw()),
            duration_ms: value.duration.as_millis() as u64,
            position_ms: value.position.as_millis() as u64,
            width: value.frame_size.width,
            height: value.frame_size.height,
            aspect_ratio: value.aspect_ratio(),
            volume: value.volume,
            playback_speed: value.playback_speed,
            is_initialized: value.is_initialized,
            is_playing: value.is_playing,
            is_buffering: value.is_buffering,
            is_looping: value.is_looping,
            is_completed: value.is_completed,
            error: value.error_description.clone(),
        }
    }
}

pub fn describe_event(event: &PlayerEvent) -> String {
    match event {
        PlayerEvent::Initialized {
            duration: Some(duration),
            frame_size: Some(frame),
        } => format!(
            "initialized: {} ms, {}x{}",
            duration.as_millis(),
            frame.width,
            frame.height
        ),
        PlayerEvent::Initialized { .. } => "initialized: open failed".to_string(),
        PlayerEvent::BufferingStart => "buffering started".to_string(),
        PlayerEvent::BufferingEnd => "buffering finished".to_string(),
        PlayerEvent::PlayingStateUpdate { is_playing: true } => "playing".to_string(),
        PlayerEvent::PlayingStateUpdate { is_playing: false } => "paused".to_string(),
        PlayerEvent::Completed => "completed".to_string(),
    }
}

//! Immutable player state snapshot and the small value types it is built from.

use std::fmt;
use std::time::Duration;

/// Opaque identifier of one native playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaHandle(i64);

impl MediaHandle {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decoded frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when the frame covers no pixels, as reported for audio-only media.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One coherent snapshot of a player.
///
/// Snapshots are never mutated once published; the controller builds the next
/// snapshot from the previous one and swaps it in whole.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerValue {
    /// Native session currently owned by the controller, `None` before
    /// initialization and after disposal.
    pub handle: Option<MediaHandle>,
    pub duration: Duration,
    pub position: Duration,
    pub frame_size: FrameSize,
    /// Linear gain in `0.0..=1.0`.
    pub volume: f64,
    /// Playback rate, always positive.
    pub playback_speed: f64,
    pub is_initialized: bool,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub is_looping: bool,
    pub is_completed: bool,
    pub error_description: Option<String>,
}

impl Default for PlayerValue {
    fn default() -> Self {
        Self {
            handle: None,
            duration: Duration::ZERO,
            position: Duration::ZERO,
            frame_size: FrameSize::ZERO,
            volume: 1.0,
            playback_speed: 1.0,
            is_initialized: false,
            is_playing: false,
            is_buffering: false,
            is_looping: false,
            is_completed: false,
            error_description: None,
        }
    }
}

impl PlayerValue {
    pub fn has_error(&self) -> bool {
        self.error_description.is_some()
    }

    /// Width over height, or `1.0` when the frame has no area.
    pub fn aspect_ratio(&self) -> f64 {
        if self.frame_size.is_empty() {
            return 1.0;
        }
        f64::from(self.frame_size.width) / f64::from(self.frame_size.height)
    }

    /// Whether a freshly polled position may still be folded into this value.
    ///
    /// Completion pins `position` to `duration`, so once completed (or
    /// stopped, or failed) any poll result is stale.
    pub(crate) fn accepts_position_poll(&self) -> bool {
        self.is_initialized && self.is_playing && !self.is_completed && !self.has_error()
    }
}

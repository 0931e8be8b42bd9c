//! Contract with the native playback engine.
//!
//! The engine is driven through [`NativeBridge`] commands and reports
//! lifecycle changes asynchronously as [`NativeEvent`]s, which it pushes into
//! a [`NativeEventSink`] obtained from [`crate::PlayerRegistry::event_sink`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::BridgeError;
use crate::source::SourceKind;
use crate::value::{FrameSize, MediaHandle};

pub mod simulated;

/// Arguments of a native open call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub uri: String,
    pub kind: SourceKind,
    /// Request headers, only ever set for network sources.
    pub headers: Option<BTreeMap<String, String>>,
}

/// Result of a successful native open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenedMedia {
    pub handle: MediaHandle,
    pub duration: Duration,
    pub frame_size: FrameSize,
}

/// Push notification from the native engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    BufferingStarted,
    BufferingStopped,
    SessionStarted,
    SessionPaused,
    SessionStopped,
    SessionEnded,
    Error { message: Option<String> },
}

impl NativeEvent {
    /// Decodes the engine's wire code (`1..=7`).
    pub fn from_code(code: i32) -> Option<Self> {
        let event = match code {
            1 => Self::BufferingStarted,
            2 => Self::BufferingStopped,
            3 => Self::SessionStarted,
            4 => Self::SessionPaused,
            5 => Self::SessionStopped,
            6 => Self::SessionEnded,
            7 => Self::Error { message: None },
            _ => return None,
        };
        Some(event)
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::BufferingStarted => 1,
            Self::BufferingStopped => 2,
            Self::SessionStarted => 3,
            Self::SessionPaused => 4,
            Self::SessionStopped => 5,
            Self::SessionEnded => 6,
            Self::Error { .. } => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BufferingStarted => "buffering_started",
            Self::BufferingStopped => "buffering_stopped",
            Self::SessionStarted => "session_started",
            Self::SessionPaused => "session_paused",
            Self::SessionStopped => "session_stopped",
            Self::SessionEnded => "session_ended",
            Self::Error { .. } => "error",
        }
    }
}

/// Callback the engine invokes for every push event, in emission order.
pub type NativeEventSink = Arc<dyn Fn(MediaHandle, NativeEvent) + Send + Sync>;

/// Commands understood by the native engine.
///
/// Implementations must be cheap to share; the controller holds one
/// `Arc<dyn NativeBridge>` and calls it from its actor task, its position
/// poller and, as a last resort, from the leak guard.
#[async_trait::async_trait]
pub trait NativeBridge: Send + Sync + 'static {
    /// Allocates a native session. `None` means the engine could not open the
    /// source.
    async fn open(&self, request: OpenRequest) -> Option<OpenedMedia>;

    async fn play(&self, handle: MediaHandle) -> Result<(), BridgeError>;

    async fn pause(&self, handle: MediaHandle) -> Result<(), BridgeError>;

    async fn seek(&self, handle: MediaHandle, position: Duration) -> Result<(), BridgeError>;

    async fn set_volume(&self, handle: MediaHandle, volume: f64) -> Result<(), BridgeError>;

    async fn set_playback_speed(&self, handle: MediaHandle, speed: f64)
    -> Result<(), BridgeError>;

    async fn get_position(&self, handle: MediaHandle) -> Result<Duration, BridgeError>;

    /// Frees the native session. The handle must not be used afterwards.
    async fn release(&self, handle: MediaHandle) -> Result<(), BridgeError>;
}

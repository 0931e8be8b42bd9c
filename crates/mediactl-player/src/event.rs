//! Lifecycle notifications published by a controller.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;

use crate::error::PlaybackError;
use crate::value::FrameSize;

/// Observer-facing projection of a player value transition.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Open handshake finished. Both fields are `None` when the open failed.
    Initialized {
        duration: Option<Duration>,
        frame_size: Option<FrameSize>,
    },
    BufferingStart,
    BufferingEnd,
    PlayingStateUpdate {
        is_playing: bool,
    },
    /// Playback reached the end without looping.
    Completed,
}

/// Item delivered on an [`EventStream`]. Native playback errors arrive as
/// `Err`.
pub type EventItem = Result<PlayerEvent, PlaybackError>;

/// One subscriber of a controller's events.
///
/// Every subscriber sees items in emission order. A subscriber that falls
/// more than the configured capacity behind skips the oldest items.
pub struct EventStream {
    rx: broadcast::Receiver<EventItem>,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<EventItem>) -> Self {
        Self { rx }
    }

    /// Waits for the next item; `None` once the controller is gone.
    pub async fn next(&mut self) -> Option<EventItem> {
        loop {
            match self.rx.recv().await {
                Ok(item) => return Some(item),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "player event subscriber lagged");
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns an already queued item without waiting.
    pub fn try_next(&mut self) -> Option<EventItem> {
        loop {
            match self.rx.try_recv() {
                Ok(item) => return Some(item),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "player event subscriber lagged");
                },
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

use tokio::sync::broadcast;

use crate::error::PlaybackError;
use crate::event::{EventItem, EventStream, PlayerEvent};

pub(crate) struct EventHub {
    tx: broadcast::Sender<EventItem>,
}

impl EventHub {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn emit(&self, event: PlayerEvent) {
        let _ = self.tx.send(Ok(event));
    }

    pub(crate) fn fail(&self, error: PlaybackError) {
        let _ = self.tx.send(Err(error));
    }

    pub(crate) fn subscribe(&self) -> EventStream {
        EventStream::new(self.tx.subscribe())
    }
}

use std::time::Duration;

use mediactl_runtime::actor::{ActorContext, Handler, Message};
use tracing::{debug, error, warn};

use crate::bridge::NativeEvent;
use crate::controller::actor::{Lifecycle, PlayerActor};
use crate::error::PlaybackError;
use crate::event::PlayerEvent;
use crate::value::{MediaHandle, PlayerValue};

pub(crate) struct NativeEventMessage {
    pub(crate) handle: MediaHandle,
    pub(crate) event: NativeEvent,
}

impl Message for NativeEventMessage {
    type Response = ();
}

#[async_trait::async_trait]
impl Handler<NativeEventMessage> for PlayerActor {
    async fn handle(&mut self, message: NativeEventMessage, ctx: &mut ActorContext<Self>) {
        let NativeEventMessage { handle, event } = message;
        if self.lifecycle == Lifecycle::Disposed || self.handle != Some(handle) {
            debug!(%handle, event = event.name(), "dropping native event for a handle this player does not own");
            return;
        }
        debug!(%handle, event = event.name(), "applying native event");

        match event {
            NativeEvent::BufferingStarted => {
                self.transition(|value| PlayerValue {
                    is_initialized: true,
                    is_buffering: true,
                    ..value.clone()
                });
                self.events.emit(PlayerEvent::BufferingStart);
            },
            NativeEvent::BufferingStopped => {
                self.transition(|value| PlayerValue {
                    is_initialized: true,
                    is_buffering: false,
                    ..value.clone()
                });
                self.events.emit(PlayerEvent::BufferingEnd);
            },
            NativeEvent::SessionStarted => {
                self.transition(|value| PlayerValue {
                    is_initialized: true,
                    is_playing: true,
                    is_completed: false,
                    ..value.clone()
                });
                self.events
                    .emit(PlayerEvent::PlayingStateUpdate { is_playing: true });
                self.start_poller(ctx);
            },
            NativeEvent::SessionPaused | NativeEvent::SessionStopped => {
                self.stop_poller();
                self.transition(|value| PlayerValue {
                    is_playing: false,
                    ..value.clone()
                });
                self.events
                    .emit(PlayerEvent::PlayingStateUpdate { is_playing: false });
            },
            NativeEvent::SessionEnded => {
                // The loop flag is read before anything else changes: a looping
                // player must never surface a completion.
                if self.looping {
                    debug!(%handle, "end of media while looping, seeking to start");
                    match self.bridge.seek(handle, Duration::ZERO).await {
                        Ok(()) => {
                            // New generation so a poll fetched before the seek
                            // cannot move the position back to the end.
                            let was_polling = self.poller.is_some();
                            self.stop_poller();
                            self.transition(|value| PlayerValue {
                                position: Duration::ZERO,
                                ..value.clone()
                            });
                            if was_polling {
                                self.start_poller(ctx);
                            }
                        },
                        Err(error) => warn!(%handle, %error, "loop seek failed"),
                    }
                    return;
                }
                self.stop_poller();
                self.transition(|value| PlayerValue {
                    is_playing: false,
                    is_completed: true,
                    position: value.duration,
                    ..value.clone()
                });
                self.events.emit(PlayerEvent::Completed);
            },
            NativeEvent::Error { message } => {
                self.stop_poller();
                let description = message
                    .unwrap_or_else(|| format!("native playback error on {handle}"));
                error!(%handle, description = %description, "native playback error");
                self.transition(|value| PlayerValue {
                    is_initialized: false,
                    is_playing: false,
                    duration: Duration::ZERO,
                    error_description: Some(description.clone()),
                    ..value.clone()
                });
                self.events.fail(PlaybackError { description });
            },
        }
    }
}

use std::time::Duration;

use mediactl_runtime::actor::{ActorContext, Handler, Message};
use tracing::{debug, trace};

use crate::controller::actor::PlayerActor;
use crate::error::PlayerError;
use crate::value::PlayerValue;

/// Result of one poller tick.
pub(crate) struct PositionPolledMessage {
    pub(crate) generation: u64,
    pub(crate) position: Duration,
}

impl Message for PositionPolledMessage {
    type Response = ();
}

pub(crate) struct GetPositionMessage;

impl Message for GetPositionMessage {
    type Response = Result<Duration, PlayerError>;
}

impl PlayerActor {
    /// Folds a freshly fetched position in unless the value moved on while the
    /// fetch was in flight. Returns whether it was applied.
    fn fold_position(&self, position: Duration) -> bool {
        if !self.value.borrow().accepts_position_poll() {
            return false;
        }
        self.transition(|value| PlayerValue {
            position: if value.duration.is_zero() {
                position
            } else {
                position.min(value.duration)
            },
            ..value.clone()
        });
        true
    }
}

#[async_trait::async_trait]
impl Handler<PositionPolledMessage> for PlayerActor {
    async fn handle(&mut self, message: PositionPolledMessage, _ctx: &mut ActorContext<Self>) {
        if !self.is_current_poll(message.generation) {
            trace!(generation = message.generation, "discarding stale position poll");
            return;
        }
        if !self.fold_position(message.position) {
            trace!(generation = message.generation, "position poll arrived after playback settled");
        }
    }
}

#[async_trait::async_trait]
impl Handler<GetPositionMessage> for PlayerActor {
    async fn handle(
        &mut self,
        _message: GetPositionMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<Duration, PlayerError> {
        self.ensure_not_disposed()?;
        let (handle, last_known, live) = {
            let value = self.value.borrow();
            (self.handle, value.position, value.accepts_position_poll())
        };
        let Some(handle) = handle.filter(|_| live) else {
            return Ok(last_known);
        };
        match self.bridge.get_position(handle).await {
            Ok(position) => {
                self.fold_position(position);
                let position = self.value.borrow().position;
                Ok(position)
            },
            Err(error) => {
                debug!(%handle, %error, "position query failed, using last known position");
                Ok(last_known)
            },
        }
    }
}

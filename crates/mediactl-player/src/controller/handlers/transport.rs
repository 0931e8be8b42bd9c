use std::time::Duration;

use mediactl_runtime::actor::{ActorContext, Handler, Message};
use tracing::debug;

use crate::controller::actor::PlayerActor;
use crate::error::PlayerError;
use crate::value::PlayerValue;

pub(crate) struct PlayMessage;

impl Message for PlayMessage {
    type Response = Result<(), PlayerError>;
}

pub(crate) struct PauseMessage;

impl Message for PauseMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<PlayMessage> for PlayerActor {
    async fn handle(
        &mut self,
        _message: PlayMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        let handle = self.ensure_opened()?;
        let completed = self.value.borrow().is_completed;
        if completed {
            debug!(%handle, "restarting completed media from the beginning");
            self.bridge.seek(handle, Duration::ZERO).await?;
            self.transition(|value| PlayerValue {
                position: Duration::ZERO,
                is_completed: false,
                ..value.clone()
            });
        }
        // The playing flag flips when the engine reports the session start.
        self.bridge.play(handle).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Handler<PauseMessage> for PlayerActor {
    async fn handle(
        &mut self,
        _message: PauseMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        let handle = self.ensure_opened()?;
        self.bridge.pause(handle).await?;
        Ok(())
    }
}

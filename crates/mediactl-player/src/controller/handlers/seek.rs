use std::time::Duration;

use mediactl_runtime::actor::{ActorContext, Handler, Message};

use crate::controller::actor::PlayerActor;
use crate::error::PlayerError;
use crate::value::PlayerValue;

pub(crate) struct SeekMessage {
    pub(crate) position: Duration,
}

impl Message for SeekMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<SeekMessage> for PlayerActor {
    async fn handle(
        &mut self,
        message: SeekMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        let handle = self.ensure_opened()?;
        let duration = self.value.borrow().duration;
        // Zero duration means the engine reported none (live streams).
        let position = if duration.is_zero() {
            message.position
        } else {
            message.position.min(duration)
        };
        self.bridge.seek(handle, position).await?;
        self.transition(|value| PlayerValue {
            position,
            is_completed: false,
            ..value.clone()
        });
        Ok(())
    }
}

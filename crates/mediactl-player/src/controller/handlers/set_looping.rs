use mediactl_runtime::actor::{ActorContext, Handler, Message};

use crate::controller::actor::PlayerActor;
use crate::error::PlayerError;
use crate::value::PlayerValue;

pub(crate) struct SetLoopingMessage {
    pub(crate) looping: bool,
}

impl Message for SetLoopingMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<SetLoopingMessage> for PlayerActor {
    async fn handle(
        &mut self,
        message: SetLoopingMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        // No bridge call: end of media is turned into a seek by the native
        // event handler while this flag is set.
        self.ensure_not_disposed()?;
        self.looping = message.looping;
        self.transition(|value| PlayerValue {
            is_looping: message.looping,
            ..value.clone()
        });
        Ok(())
    }
}

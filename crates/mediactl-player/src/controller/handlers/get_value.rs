use mediactl_runtime::actor::{ActorContext, Handler, Message};

use crate::controller::actor::PlayerActor;
use crate::value::PlayerValue;

pub(crate) struct GetValueMessage;

impl Message for GetValueMessage {
    type Response = PlayerValue;
}

#[async_trait::async_trait]
impl Handler<GetValueMessage> for PlayerActor {
    async fn handle(
        &mut self,
        _message: GetValueMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> PlayerValue {
        self.current()
    }
}

use mediactl_runtime::actor::{ActorContext, Handler, Message};

use crate::controller::actor::PlayerActor;
use crate::error::PlayerError;
use crate::value::PlayerValue;

pub(crate) struct SetVolumeMessage {
    pub(crate) volume: f64,
}

impl Message for SetVolumeMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<SetVolumeMessage> for PlayerActor {
    async fn handle(
        &mut self,
        message: SetVolumeMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        let handle = self.ensure_opened()?;
        if message.volume.is_nan() {
            return Err(PlayerError::InvalidArgument {
                name: "volume",
                message: "volume is not a number".to_string(),
            });
        }
        let volume = message.volume.clamp(0.0, 1.0);
        self.bridge.set_volume(handle, volume).await?;
        self.transition(|value| PlayerValue {
            volume,
            ..value.clone()
        });
        Ok(())
    }
}

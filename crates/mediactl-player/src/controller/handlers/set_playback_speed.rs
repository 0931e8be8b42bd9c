use mediactl_runtime::actor::{ActorContext, Handler, Message};

use crate::controller::actor::PlayerActor;
use crate::error::PlayerError;
use crate::value::PlayerValue;

pub(crate) struct SetPlaybackSpeedMessage {
    pub(crate) speed: f64,
}

impl Message for SetPlaybackSpeedMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<SetPlaybackSpeedMessage> for PlayerActor {
    async fn handle(
        &mut self,
        message: SetPlaybackSpeedMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        let handle = self.ensure_opened()?;
        let speed = message.speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlayerError::InvalidArgument {
                name: "playback_speed",
                message: format!("{speed} is not a positive rate"),
            });
        }
        self.bridge.set_playback_speed(handle, speed).await?;
        self.transition(|value| PlayerValue {
            playback_speed: speed,
            ..value.clone()
        });
        Ok(())
    }
}

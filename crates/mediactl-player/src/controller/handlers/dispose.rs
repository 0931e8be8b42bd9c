use mediactl_runtime::actor::{ActorContext, Handler, Message};
use tracing::{debug, info, warn};

use crate::controller::actor::{Lifecycle, PlayerActor};
use crate::error::PlayerError;
use crate::value::PlayerValue;

pub(crate) struct DisposeMessage;

impl Message for DisposeMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<DisposeMessage> for PlayerActor {
    async fn handle(
        &mut self,
        _message: DisposeMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        if self.lifecycle == Lifecycle::Disposed {
            debug!("dispose ignored, player already disposed");
            return Ok(());
        }
        self.lifecycle = Lifecycle::Disposed;
        self.stop_poller();

        let Some(handle) = self.handle.take() else {
            info!("player disposed before a native handle was assigned");
            return Ok(());
        };
        self.registry.unregister(handle);
        if let Some(guard) = self.leak_guard.take() {
            guard.disarm();
        }
        if let Err(error) = self.bridge.release(handle).await {
            warn!(%handle, %error, "native release failed during dispose");
        }
        self.transition(|value| PlayerValue {
            handle: None,
            ..value.clone()
        });
        info!(%handle, "player disposed");
        Ok(())
    }
}

use std::sync::Arc;

use mediactl_runtime::actor::{ActorContext, Handler, Message};
use tracing::{info, warn};

use crate::controller::actor::{Lifecycle, PlayerActor};
use crate::controller::handle::PlayerController;
use crate::error::{ALREADY_INITIALIZED, DISPOSED, PlayerError};
use crate::event::PlayerEvent;
use crate::leak_guard::LeakGuard;
use crate::value::PlayerValue;

pub(crate) struct InitializeMessage;

impl Message for InitializeMessage {
    type Response = Result<(), PlayerError>;
}

#[async_trait::async_trait]
impl Handler<InitializeMessage> for PlayerActor {
    async fn handle(
        &mut self,
        _message: InitializeMessage,
        ctx: &mut ActorContext<Self>,
    ) -> Result<(), PlayerError> {
        match self.lifecycle {
            Lifecycle::Created => {},
            Lifecycle::Initialized => return Err(PlayerError::invalid_state(ALREADY_INITIALIZED)),
            Lifecycle::Disposed => return Err(PlayerError::invalid_state(DISPOSED)),
        }
        self.lifecycle = Lifecycle::Initialized;

        let request = self.source.open_request();
        let Some(opened) = self.bridge.open(request).await else {
            warn!(uri = self.source.uri(), "native open returned no handle");
            let description = format!(
                "failed to open {} source '{}'",
                self.source.kind(),
                self.source.uri()
            );
            self.fail_open(description);
            return Ok(());
        };

        let handle = opened.handle;
        let controller = PlayerController::from_parts(
            ctx.actor_ref(),
            Arc::clone(&self.events),
            self.value.subscribe(),
            self.config.command_timeout,
        );
        if let Err(error) = self.registry.register(handle, &controller) {
            warn!(%handle, %error, "native handle already owned, releasing it");
            if let Err(release_error) = self.bridge.release(handle).await {
                warn!(%handle, error = %release_error, "release of duplicate handle failed");
            }
            self.fail_open(format!("failed to register {handle}: {error}"));
            return Ok(());
        }
        self.handle = Some(handle);
        self.leak_guard = Some(LeakGuard::arm(
            handle,
            Arc::clone(&self.bridge),
            Arc::clone(&self.registry),
        ));
        self.transition(|value| PlayerValue {
            handle: Some(handle),
            duration: opened.duration,
            frame_size: opened.frame_size,
            is_initialized: true,
            error_description: None,
            ..value.clone()
        });
        info!(
            %handle,
            uri = self.source.uri(),
            duration_ms = opened.duration.as_millis() as u64,
            width = opened.frame_size.width,
            height = opened.frame_size.height,
            "player initialized"
        );
        self.events.emit(PlayerEvent::Initialized {
            duration: Some(opened.duration),
            frame_size: Some(opened.frame_size),
        });
        Ok(())
    }
}

impl PlayerActor {
    /// Records an open that produced no usable handle.
    fn fail_open(&self, description: String) {
        self.transition(|value| PlayerValue {
            is_initialized: false,
            error_description: Some(description),
            ..value.clone()
        });
        // Consumers wait for `Initialized` whatever the outcome; a failed open
        // is the variant without duration and frame size.
        self.events.emit(PlayerEvent::Initialized {
            duration: None,
            frame_size: None,
        });
    }
}

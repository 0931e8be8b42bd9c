use std::sync::{Arc, Weak};
use std::time::Duration;

use mediactl_runtime::actor::{ActorRef, Handler, Message, WeakActorRef};
use tokio::sync::watch;

use crate::bridge::{NativeBridge, NativeEvent};
use crate::config::PlayerConfig;
use crate::controller::actor::PlayerActor;
use crate::controller::handlers::{
    DisposeMessage, GetPositionMessage, GetValueMessage, InitializeMessage, NativeEventMessage,
    PauseMessage, PlayMessage, SeekMessage, SetLoopingMessage, SetPlaybackSpeedMessage,
    SetVolumeMessage,
};
use crate::controller::startup::start_player;
use crate::error::PlayerError;
use crate::event::EventStream;
use crate::event_hub::EventHub;
use crate::registry::PlayerRegistry;
use crate::source::DataSource;
use crate::value::{MediaHandle, PlayerValue};

/// Consumer-facing handle of one player.
///
/// Clones share the same underlying controller. The controller lives until
/// the last clone is dropped; call [`PlayerController::dispose`] before that
/// to release the native session deterministically.
#[derive(Clone)]
pub struct PlayerController {
    pub(crate) actor_ref: ActorRef<PlayerActor>,
    events: Arc<EventHub>,
    value: watch::Receiver<PlayerValue>,
    timeout: Duration,
}

impl PlayerController {
    /// Creates a controller routed through [`PlayerRegistry::global`].
    ///
    /// Fails with [`PlayerError::UnsupportedSource`] for asset and
    /// content-URI sources.
    pub fn new(source: DataSource, bridge: Arc<dyn NativeBridge>) -> Result<Self, PlayerError> {
        Self::with_config(
            source,
            bridge,
            PlayerRegistry::global(),
            PlayerConfig::default(),
        )
    }

    pub fn with_config(
        source: DataSource,
        bridge: Arc<dyn NativeBridge>,
        registry: Arc<PlayerRegistry>,
        config: PlayerConfig,
    ) -> Result<Self, PlayerError> {
        start_player(source, bridge, registry, config)
    }

    pub(crate) fn from_parts(
        actor_ref: ActorRef<PlayerActor>,
        events: Arc<EventHub>,
        value: watch::Receiver<PlayerValue>,
        timeout: Duration,
    ) -> Self {
        Self {
            actor_ref,
            events,
            value,
            timeout,
        }
    }

    async fn call<M>(&self, operation: &'static str, message: M) -> Result<M::Response, PlayerError>
    where
        M: Message,
        PlayerActor: Handler<M>,
    {
        self.actor_ref
            .call(message, self.timeout)
            .await
            .map_err(|err| PlayerError::from_call_error(operation, self.timeout, err))
    }

    /// Opens the native session. A failed open is reported through the value
    /// and an `Initialized` event without duration, not as an error.
    pub async fn initialize(&self) -> Result<(), PlayerError> {
        self.call("initialize", InitializeMessage).await?
    }

    pub async fn play(&self) -> Result<(), PlayerError> {
        self.call("play", PlayMessage).await?
    }

    pub async fn pause(&self) -> Result<(), PlayerError> {
        self.call("pause", PauseMessage).await?
    }

    /// Seeks to `position`, clamped to the media duration.
    pub async fn seek_to(&self, position: Duration) -> Result<(), PlayerError> {
        self.call("seek_to", SeekMessage { position }).await?
    }

    /// Sets the volume, clamped to `0.0..=1.0`.
    pub async fn set_volume(&self, volume: f64) -> Result<(), PlayerError> {
        self.call("set_volume", SetVolumeMessage { volume }).await?
    }

    pub async fn set_playback_speed(&self, speed: f64) -> Result<(), PlayerError> {
        self.call("set_playback_speed", SetPlaybackSpeedMessage { speed })
            .await?
    }

    pub async fn set_looping(&self, looping: bool) -> Result<(), PlayerError> {
        self.call("set_looping", SetLoopingMessage { looping })
            .await?
    }

    /// Releases the native session. Calling it again is a no-op.
    pub async fn dispose(&self) -> Result<(), PlayerError> {
        self.call("dispose", DisposeMessage).await?
    }

    /// Fresh engine position while playing, the last known one otherwise.
    pub async fn position(&self) -> Result<Duration, PlayerError> {
        self.call("position", GetPositionMessage).await?
    }

    /// Latest published snapshot, without waiting for queued work.
    pub fn value(&self) -> PlayerValue {
        self.value.borrow().clone()
    }

    /// Receiver notified on every committed transition.
    pub fn subscribe_value(&self) -> watch::Receiver<PlayerValue> {
        self.value.clone()
    }

    /// Snapshot after every message queued before this call was applied.
    pub async fn snapshot(&self) -> Result<PlayerValue, PlayerError> {
        self.call("snapshot", GetValueMessage).await
    }

    pub fn events(&self) -> EventStream {
        self.events.subscribe()
    }

    pub fn handle(&self) -> Option<MediaHandle> {
        self.value.borrow().handle
    }

    pub fn downgrade(&self) -> WeakPlayerController {
        WeakPlayerController {
            actor: self.actor_ref.downgrade(),
            events: Arc::downgrade(&self.events),
            value: self.value.clone(),
            timeout: self.timeout,
        }
    }
}

/// Non-owning reference to a controller, as held by the registry.
#[derive(Clone)]
pub struct WeakPlayerController {
    actor: WeakActorRef<PlayerActor>,
    events: Weak<EventHub>,
    value: watch::Receiver<PlayerValue>,
    timeout: Duration,
}

impl WeakPlayerController {
    pub fn upgrade(&self) -> Option<PlayerController> {
        let actor_ref = self.actor.upgrade()?;
        let events = self.events.upgrade()?;
        Some(PlayerController::from_parts(
            actor_ref,
            events,
            self.value.clone(),
            self.timeout,
        ))
    }

    pub fn is_alive(&self) -> bool {
        self.actor.upgrade().is_some()
    }

    /// Enqueues a native event behind everything already in the mailbox.
    pub(crate) fn deliver(&self, handle: MediaHandle, event: NativeEvent) -> bool {
        self.actor
            .cast(NativeEventMessage { handle, event })
            .is_ok()
    }
}

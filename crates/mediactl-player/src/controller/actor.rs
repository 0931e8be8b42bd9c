use std::sync::Arc;

use mediactl_runtime::actor::ActorContext;
use tokio::sync::watch;
use tracing::debug;

use crate::bridge::NativeBridge;
use crate::config::PlayerConfig;
use crate::error::{DISPOSED, NOT_OPENED, PlayerError};
use crate::event_hub::EventHub;
use crate::leak_guard::LeakGuard;
use crate::poller::PositionPoller;
use crate::registry::PlayerRegistry;
use crate::source::DataSource;
use crate::value::{MediaHandle, PlayerValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Created,
    Initialized,
    Disposed,
}

pub(crate) struct PlayerActor {
    pub(crate) source: DataSource,
    pub(crate) bridge: Arc<dyn NativeBridge>,
    pub(crate) registry: Arc<PlayerRegistry>,
    pub(crate) config: PlayerConfig,
    pub(crate) events: Arc<EventHub>,
    pub(crate) value: watch::Sender<PlayerValue>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) handle: Option<MediaHandle>,
    pub(crate) looping: bool,
    pub(crate) poller: Option<PositionPoller>,
    pub(crate) poll_generation: u64,
    pub(crate) leak_guard: Option<LeakGuard>,
}

impl PlayerActor {
    pub(crate) fn new(
        source: DataSource,
        bridge: Arc<dyn NativeBridge>,
        registry: Arc<PlayerRegistry>,
        config: PlayerConfig,
        events: Arc<EventHub>,
        value: watch::Sender<PlayerValue>,
    ) -> Self {
        Self {
            source,
            bridge,
            registry,
            config,
            events,
            value,
            lifecycle: Lifecycle::Created,
            handle: None,
            looping: false,
            poller: None,
            poll_generation: 0,
            leak_guard: None,
        }
    }

    pub(crate) fn current(&self) -> PlayerValue {
        self.value.borrow().clone()
    }

    /// Builds the next snapshot from the current one and publishes it whole.
    pub(crate) fn transition(&self, next: impl FnOnce(&PlayerValue) -> PlayerValue) {
        let next = next(&self.value.borrow());
        self.value.send_replace(next);
    }

    pub(crate) fn ensure_not_disposed(&self) -> Result<(), PlayerError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Err(PlayerError::invalid_state(DISPOSED));
        }
        Ok(())
    }

    /// Handle of an initialized session, or the invalid-state error every
    /// transport command reports otherwise.
    pub(crate) fn ensure_opened(&self) -> Result<MediaHandle, PlayerError> {
        self.ensure_not_disposed()?;
        if !self.value.borrow().is_initialized {
            return Err(PlayerError::invalid_state(NOT_OPENED));
        }
        self.handle
            .ok_or_else(|| PlayerError::invalid_state(NOT_OPENED))
    }

    pub(crate) fn start_poller(&mut self, ctx: &ActorContext<Self>) {
        let Some(handle) = self.handle else {
            return;
        };
        self.poll_generation = self.poll_generation.wrapping_add(1);
        debug!(%handle, generation = self.poll_generation, "starting position poller");
        self.poller = Some(PositionPoller::start(
            self.poll_generation,
            self.config.poll_interval,
            Arc::clone(&self.bridge),
            self.value.subscribe(),
            ctx.weak_ref(),
        ));
    }

    /// Cancels the poller and invalidates any poll result still in flight.
    pub(crate) fn stop_poller(&mut self) {
        self.poll_generation = self.poll_generation.wrapping_add(1);
        if self.poller.take().is_some() {
            debug!(generation = self.poll_generation, "position poller stopped");
        }
    }

    pub(crate) fn is_current_poll(&self, generation: u64) -> bool {
        self.poller
            .as_ref()
            .is_some_and(|poller| poller.generation() == generation)
    }
}

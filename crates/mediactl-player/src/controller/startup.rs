use std::sync::Arc;

use mediactl_runtime::actor::spawn_actor_named;
use tokio::sync::watch;
use tracing::debug;

use crate::bridge::NativeBridge;
use crate::config::PlayerConfig;
use crate::controller::actor::PlayerActor;
use crate::controller::handle::PlayerController;
use crate::error::PlayerError;
use crate::event_hub::EventHub;
use crate::registry::PlayerRegistry;
use crate::source::DataSource;
use crate::value::PlayerValue;

pub(crate) fn start_player(
    source: DataSource,
    bridge: Arc<dyn NativeBridge>,
    registry: Arc<PlayerRegistry>,
    config: PlayerConfig,
) -> Result<PlayerController, PlayerError> {
    source.ensure_supported()?;

    let events = Arc::new(EventHub::new(config.event_capacity));
    let (value_tx, value_rx) = watch::channel(PlayerValue::default());
    let timeout = config.command_timeout;
    debug!(uri = source.uri(), kind = %source.kind(), "starting player actor");
    let actor = PlayerActor::new(
        source,
        bridge,
        registry,
        config,
        Arc::clone(&events),
        value_tx,
    );
    let (actor_ref, _join) = spawn_actor_named(actor, "mediactl-player");

    Ok(PlayerController::from_parts(
        actor_ref, events, value_rx, timeout,
    ))
}

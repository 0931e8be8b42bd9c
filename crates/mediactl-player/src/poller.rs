use std::sync::Arc;
use std::time::Duration;

use mediactl_runtime::actor::WeakActorRef;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::bridge::NativeBridge;
use crate::controller::{PlayerActor, PositionPolledMessage};
use crate::value::PlayerValue;

/// Periodic position refresh for one playing stretch.
///
/// The task only holds a weak reference to the controller and a value
/// receiver, so it never keeps a dropped controller alive. Dropping the
/// poller aborts the task.
pub(crate) struct PositionPoller {
    generation: u64,
    task: JoinHandle<()>,
}

impl PositionPoller {
    pub(crate) fn start(
        generation: u64,
        interval: Duration,
        bridge: Arc<dyn NativeBridge>,
        value: watch::Receiver<PlayerValue>,
        actor: WeakActorRef<PlayerActor>,
    ) -> Self {
        let task = mediactl_runtime::spawn(poll_loop(generation, interval, bridge, value, actor));
        Self { generation, task }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PositionPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_loop(
    generation: u64,
    interval: Duration,
    bridge: Arc<dyn NativeBridge>,
    value: watch::Receiver<PlayerValue>,
    actor: WeakActorRef<PlayerActor>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; polling starts one period in.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let (handle, accepts) = {
            let current = value.borrow();
            (current.handle, current.accepts_position_poll())
        };
        let Some(handle) = handle.filter(|_| accepts) else {
            debug!(generation, "position poller self-cancelled");
            return;
        };
        let position = match bridge.get_position(handle).await {
            Ok(position) => position,
            Err(error) => {
                debug!(%handle, generation, %error, "position poll failed");
                continue;
            },
        };
        trace!(%handle, generation, position_ms = position.as_millis() as u64, "position polled");
        if actor
            .cast(PositionPolledMessage {
                generation,
                position,
            })
            .is_err()
        {
            return;
        }
    }
}

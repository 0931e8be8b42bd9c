use std::sync::Arc;

use tracing::{debug, warn};

use crate::bridge::NativeBridge;
use crate::registry::PlayerRegistry;
use crate::value::MediaHandle;

/// Last-resort release of a native handle whose controller was dropped
/// without `dispose()`.
///
/// Armed once a handle is assigned. Explicit disposal consumes it through
/// [`LeakGuard::disarm`]; otherwise dropping it unregisters the handle and
/// releases it on the shared runtime.
pub(crate) struct LeakGuard {
    handle: MediaHandle,
    bridge: Arc<dyn NativeBridge>,
    registry: Arc<PlayerRegistry>,
    armed: bool,
}

impl LeakGuard {
    pub(crate) fn arm(
        handle: MediaHandle,
        bridge: Arc<dyn NativeBridge>,
        registry: Arc<PlayerRegistry>,
    ) -> Self {
        Self {
            handle,
            bridge,
            registry,
            armed: true,
        }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
        debug!(handle = %self.handle, "leak guard detached");
    }
}

impl Drop for LeakGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let handle = self.handle;
        warn!(%handle, "player dropped without dispose; force-releasing native handle");
        self.registry.unregister(handle);
        let bridge = Arc::clone(&self.bridge);
        mediactl_runtime::spawn(async move {
            if let Err(error) = bridge.release(handle).await {
                warn!(%handle, %error, "leak guard release failed");
            }
        });
    }
}

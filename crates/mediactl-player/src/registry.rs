//! Process-wide routing table from native handle to controller.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::bridge::{NativeEvent, NativeEventSink};
use crate::controller::{PlayerController, WeakPlayerController};
use crate::error::PlayerError;
use crate::value::MediaHandle;

const HANDLE_IN_USE: &str = "native handle is already owned by another player";

/// Maps each assigned [`MediaHandle`] to the controller that owns it.
///
/// Entries hold weak references: the registry never keeps a controller alive.
/// Controllers add themselves on successful initialization and remove
/// themselves on dispose (or from their leak guard).
#[derive(Default)]
pub struct PlayerRegistry {
    entries: RwLock<HashMap<MediaHandle, WeakPlayerController>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shared by every controller created with
    /// [`PlayerController::new`].
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<PlayerRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Fails if a live controller already holds `handle`.
    pub fn register(
        &self,
        handle: MediaHandle,
        controller: &PlayerController,
    ) -> Result<(), PlayerError> {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&handle) {
            if existing.is_alive() {
                return Err(PlayerError::invalid_state(HANDLE_IN_USE));
            }
            warn!(%handle, "replacing registry entry of a vanished player");
        }
        entries.insert(handle, controller.downgrade());
        debug!(%handle, "player registered");
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub fn unregister(&self, handle: MediaHandle) -> bool {
        let removed = self.entries.write().remove(&handle).is_some();
        if removed {
            debug!(%handle, "player unregistered");
        }
        removed
    }

    pub fn lookup(&self, handle: MediaHandle) -> Option<PlayerController> {
        let entry = self.entries.read().get(&handle).cloned()?;
        entry.upgrade()
    }

    pub fn contains(&self, handle: MediaHandle) -> bool {
        self.lookup(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Routes a native event to its controller's mailbox.
    ///
    /// Returns `false` when no live controller owns the handle.
    pub fn dispatch(&self, handle: MediaHandle, event: NativeEvent) -> bool {
        let Some(entry) = self.entries.read().get(&handle).cloned() else {
            debug!(%handle, event = event.name(), "no player registered for native event");
            return false;
        };
        entry.deliver(handle, event)
    }

    /// Routes a raw engine event code (`1..=7`).
    pub fn dispatch_code(&self, handle: MediaHandle, code: i32) -> bool {
        match NativeEvent::from_code(code) {
            Some(event) => self.dispatch(handle, event),
            None => {
                warn!(%handle, code, "ignoring unknown native event code");
                false
            },
        }
    }

    /// Callback to hand to the native engine for push events.
    pub fn event_sink(self: &Arc<Self>) -> NativeEventSink {
        let registry = Arc::clone(self);
        Arc::new(move |handle, event| {
            registry.dispatch(handle, event);
        })
    }

    /// Drops entries whose controller disappeared without unregistering and
    /// returns their handles. Diagnostic only; leak guards normally clean up
    /// on their own.
    pub fn audit(&self) -> Vec<MediaHandle> {
        let mut entries = self.entries.write();
        let mut stale: Vec<MediaHandle> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_alive())
            .map(|(handle, _)| *handle)
            .collect();
        stale.sort();
        for handle in &stale {
            entries.remove(handle);
            warn!(%handle, "registry entry outlived its player");
        }
        stale
    }
}

//! Typed error enums for controller commands and native bridge calls.
//!
//! [`PlayerError`] is what every [`crate::PlayerController`] command returns.
//! Native playback failures that happen after initialization are never
//! returned from a command; they are folded into the player value and
//! surfaced on the event stream as a [`PlaybackError`].

use std::time::Duration;

use mediactl_runtime::actor::CallError;
use thiserror::Error;

use crate::source::SourceKind;
use crate::value::MediaHandle;

pub(crate) const NOT_OPENED: &str = "resource not opened yet";
pub(crate) const DISPOSED: &str = "player has been disposed";
pub(crate) const ALREADY_INITIALIZED: &str = "player is already initialized";

/// Failures reported by a [`crate::NativeBridge`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The handle does not name a live native session.
    #[error("unknown media handle {handle}")]
    UnknownHandle {
        /// Handle passed to the bridge.
        handle: MediaHandle,
    },
    /// The engine refused the command.
    #[error("native engine rejected '{operation}' on {handle}: {message}")]
    Rejected {
        /// Bridge operation name.
        operation: &'static str,
        /// Target session.
        handle: MediaHandle,
        /// Engine-provided reason.
        message: String,
    },
    /// The engine could not be reached at all.
    #[error("native engine unavailable: {message}")]
    Unavailable {
        /// Engine-provided reason.
        message: String,
    },
}

/// Native playback failure delivered on the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct PlaybackError {
    pub description: String,
}

/// Errors returned by the controller command surface.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The data source kind cannot be opened by this controller.
    #[error("{kind} data sources are not supported")]
    UnsupportedSource {
        /// Rejected source kind.
        kind: SourceKind,
    },
    /// Command issued before initialization, after disposal, or twice.
    #[error("invalid player state: {reason}")]
    InvalidState {
        /// Precondition that failed.
        reason: &'static str,
    },
    /// Command argument outside its domain.
    #[error("invalid value for {name}: {message}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// Control actor call timed out.
    #[error("player command '{operation}' timed out after {timeout_ms}ms")]
    ControlCommandTimedOut {
        /// Operation name used for the actor call.
        operation: &'static str,
        /// Timeout budget used for the actor call.
        timeout_ms: u128,
    },
    /// Control actor exited before command completion.
    #[error("player actor exited while handling '{operation}'")]
    ControlActorExited {
        /// Operation name used for the actor call.
        operation: &'static str,
    },
    /// Wrapped native bridge failure.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl PlayerError {
    pub(crate) fn from_call_error(
        operation: &'static str,
        timeout: Duration,
        err: CallError,
    ) -> Self {
        match err {
            CallError::MailboxClosed | CallError::ActorStopped => {
                Self::ControlActorExited { operation }
            },
            CallError::Timeout => Self::ControlCommandTimedOut {
                operation,
                timeout_ms: timeout.as_millis(),
            },
        }
    }

    pub(crate) fn invalid_state(reason: &'static str) -> Self {
        Self::InvalidState { reason }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

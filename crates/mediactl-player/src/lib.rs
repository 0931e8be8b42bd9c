//! Controller that turns a callback-driven native playback engine into one
//! coherent, observable player value plus an ordered event stream.
//!
//! The entry point is [`PlayerController`]. A controller owns at most one
//! native [`MediaHandle`], applies native push events and caller commands to
//! a single [`PlayerValue`] snapshot, and publishes lifecycle notifications
//! through [`EventStream`]s.
//!
//! The native engine itself is abstracted by [`NativeBridge`]. Push events are
//! routed to the owning controller by handle through a [`PlayerRegistry`].
#![deny(clippy::wildcard_imports)]

pub mod bridge;
pub mod config;
mod controller;
pub mod error;
pub mod event;
mod event_hub;
mod leak_guard;
mod poller;
pub mod registry;
pub mod source;
pub mod value;

pub use bridge::simulated::{BridgeCall, SimulatedBridge, SimulatedMedia};
pub use bridge::{NativeBridge, NativeEvent, NativeEventSink, OpenRequest, OpenedMedia};
pub use config::PlayerConfig;
pub use controller::{PlayerController, WeakPlayerController};
pub use error::{BridgeError, PlaybackError, PlayerError};
pub use event::{EventItem, EventStream, PlayerEvent};
pub use registry::PlayerRegistry;
pub use source::{DataSource, SourceKind};
pub use value::{FrameSize, MediaHandle, PlayerValue};

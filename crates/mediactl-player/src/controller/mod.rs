mod actor;
mod handle;
mod handlers;
mod startup;

pub(crate) use actor::PlayerActor;
pub use handle::{PlayerController, WeakPlayerController};
pub(crate) use handlers::{NativeEventMessage, PositionPolledMessage};

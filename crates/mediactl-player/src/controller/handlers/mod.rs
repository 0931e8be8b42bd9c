mod dispose;
mod get_value;
mod initialize;
#[cfg(test)]
#[path = "../../tests/controller/handlers_integration.rs"]
mod integration_tests;
mod native_event;
mod position;
mod seek;
mod set_looping;
mod set_playback_speed;
mod set_volume;
mod transport;

pub(crate) use dispose::DisposeMessage;
pub(crate) use get_value::GetValueMessage;
pub(crate) use initialize::InitializeMessage;
pub(crate) use native_event::NativeEventMessage;
pub(crate) use position::{GetPositionMessage, PositionPolledMessage};
pub(crate) use seek::SeekMessage;
pub(crate) use set_looping::SetLoopingMessage;
pub(crate) use set_playback_speed::SetPlaybackSpeedMessage;
pub(crate) use set_volume::SetVolumeMessage;
pub(crate) use transport::{PauseMessage, PlayMessage};

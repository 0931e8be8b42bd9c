//! In-process engine implementing [`NativeBridge`].
//!
//! `SimulatedBridge` keeps a catalog of playable URIs and one clock per open
//! session. Recent calls are kept in a bounded log so tests can assert on the
//! exact command sequence a controller issued.
//!
//! In manual mode (the default) the engine never pushes events on its own;
//! callers inject them with [`SimulatedBridge::emit`]. With
//! [`SimulatedBridge::with_auto_events`] it behaves like a real engine: `play`
//! reports buffering and session start, the end of media is reported once the
//! clock reaches the duration, and `pause` reports the pause.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::bridge::{NativeBridge, NativeEvent, NativeEventSink, OpenRequest, OpenedMedia};
use crate::error::BridgeError;
use crate::source::SourceKind;
use crate::value::{FrameSize, MediaHandle};

/// One recorded bridge invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    Open {
        uri: String,
        kind: SourceKind,
        headers: Option<BTreeMap<String, String>>,
    },
    Play(MediaHandle),
    Pause(MediaHandle),
    Seek(MediaHandle, Duration),
    SetVolume(MediaHandle, f64),
    SetPlaybackSpeed(MediaHandle, f64),
    GetPosition(MediaHandle),
    Release(MediaHandle),
}

/// Catalog entry describing a playable URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedMedia {
    pub duration: Duration,
    pub frame_size: FrameSize,
}

impl SimulatedMedia {
    pub fn new(duration: Duration, frame_size: FrameSize) -> Self {
        Self {
            duration,
            frame_size,
        }
    }
}

struct Session {
    media: SimulatedMedia,
    anchor: Duration,
    playing_since: Option<Instant>,
    speed: f64,
    volume: f64,
    ended: bool,
    epoch: u64,
    end_timer: Option<JoinHandle<()>>,
    scripted_position: Option<Duration>,
}

impl Session {
    fn new(media: SimulatedMedia) -> Self {
        Self {
            media,
            anchor: Duration::ZERO,
            playing_since: None,
            speed: 1.0,
            volume: 1.0,
            ended: false,
            epoch: 0,
            end_timer: None,
            scripted_position: None,
        }
    }

    fn clock_position(&self) -> Duration {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().mul_f64(self.speed))
            .unwrap_or_default();
        (self.anchor + elapsed).min(self.media.duration)
    }

    fn reported_position(&self) -> Duration {
        self.scripted_position
            .unwrap_or_else(|| self.clock_position())
    }

    fn reanchor(&mut self) {
        self.anchor = self.clock_position();
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn cancel_end_timer(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }
}

/// Default number of recorded calls kept; older entries are dropped first.
pub const DEFAULT_CALL_LOG_LIMIT: usize = 1024;

struct EngineState {
    next_handle: i64,
    sessions: HashMap<MediaHandle, Session>,
    calls: VecDeque<BridgeCall>,
    call_log_limit: usize,
}

impl EngineState {
    fn new() -> Self {
        Self {
            next_handle: 0,
            sessions: HashMap::new(),
            calls: VecDeque::new(),
            call_log_limit: DEFAULT_CALL_LOG_LIMIT,
        }
    }

    fn record(&mut self, call: BridgeCall) {
        if self.call_log_limit == 0 {
            return;
        }
        while self.calls.len() >= self.call_log_limit {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
    }

    fn session_mut(&mut self, handle: MediaHandle) -> Result<&mut Session, BridgeError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(BridgeError::UnknownHandle { handle })
    }
}

pub struct SimulatedBridge {
    sink: NativeEventSink,
    auto_events: bool,
    catalog: HashMap<String, SimulatedMedia>,
    state: Arc<Mutex<EngineState>>,
}

impl SimulatedBridge {
    pub fn new(sink: NativeEventSink) -> Self {
        Self {
            sink,
            auto_events: false,
            catalog: HashMap::new(),
            state: Arc::new(Mutex::new(EngineState::new())),
        }
    }

    pub fn with_auto_events(mut self, enabled: bool) -> Self {
        self.auto_events = enabled;
        self
    }

    /// Bounds the call log. Zero disables recording.
    pub fn with_call_log_limit(self, limit: usize) -> Self {
        {
            let mut state = self.state.lock();
            state.call_log_limit = limit;
            while state.calls.len() > limit {
                state.calls.pop_front();
            }
        }
        self
    }

    pub fn with_media(mut self, uri: impl Into<String>, media: SimulatedMedia) -> Self {
        self.catalog.insert(uri.into(), media);
        self
    }

    /// Pushes an event as if the engine had emitted it.
    pub fn emit(&self, handle: MediaHandle, event: NativeEvent) {
        (self.sink)(handle, event);
    }

    /// Pins what `get_position` reports for a session until the next seek.
    pub fn set_position(&self, handle: MediaHandle, position: Duration) {
        if let Some(session) = self.state.lock().sessions.get_mut(&handle) {
            session.scripted_position = Some(position);
        }
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.state.lock().calls.iter().cloned().collect()
    }

    pub fn count_calls(&self, predicate: impl Fn(&BridgeCall) -> bool) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    pub fn is_open(&self, handle: MediaHandle) -> bool {
        self.state.lock().sessions.contains_key(&handle)
    }

    pub fn open_handles(&self) -> Vec<MediaHandle> {
        let mut handles: Vec<_> = self.state.lock().sessions.keys().copied().collect();
        handles.sort();
        handles
    }

    pub fn volume(&self, handle: MediaHandle) -> Option<f64> {
        self.state
            .lock()
            .sessions
            .get(&handle)
            .map(|session| session.volume)
    }

    fn emit_all(&self, handle: MediaHandle, events: &[NativeEvent]) {
        for event in events {
            (self.sink)(handle, event.clone());
        }
    }

    /// (Re)arms the end-of-media timer for a playing session.
    fn schedule_end(&self, handle: MediaHandle, session: &mut Session) {
        session.cancel_end_timer();
        if !self.auto_events || session.playing_since.is_none() {
            return;
        }
        let remaining = session
            .media
            .duration
            .saturating_sub(session.clock_position());
        let delay = remaining.div_f64(session.speed);
        let epoch = session.epoch;
        let state = Arc::clone(&self.state);
        let sink = Arc::clone(&self.sink);
        session.end_timer = Some(mediactl_runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            let reached_end = {
                let mut guard = state.lock();
                match guard.sessions.get_mut(&handle) {
                    Some(session) if session.epoch == epoch && session.playing_since.is_some() => {
                        session.anchor = session.media.duration;
                        session.playing_since = None;
                        session.ended = true;
                        session.end_timer = None;
                        true
                    },
                    _ => false,
                }
            };
            if reached_end {
                debug!(%handle, "simulated media reached end");
                sink(handle, NativeEvent::SessionEnded);
            }
        }));
    }
}

impl Drop for SimulatedBridge {
    fn drop(&mut self) {
        for session in self.state.lock().sessions.values_mut() {
            session.cancel_end_timer();
        }
    }
}

#[async_trait::async_trait]
impl NativeBridge for SimulatedBridge {
    async fn open(&self, request: OpenRequest) -> Option<OpenedMedia> {
        let mut state = self.state.lock();
        state.record(BridgeCall::Open {
            uri: request.uri.clone(),
            kind: request.kind,
            headers: request.headers.clone(),
        });
        let Some(media) = self.catalog.get(&request.uri).copied() else {
            debug!(uri = %request.uri, "simulated engine has no such media");
            return None;
        };
        state.next_handle += 1;
        let handle = MediaHandle::new(state.next_handle);
        state.sessions.insert(handle, Session::new(media));
        Some(OpenedMedia {
            handle,
            duration: media.duration,
            frame_size: media.frame_size,
        })
    }

    async fn play(&self, handle: MediaHandle) -> Result<(), BridgeError> {
        {
            let mut state = self.state.lock();
            state.record(BridgeCall::Play(handle));
            let session = state.session_mut(handle)?;
            session.ended = false;
            if session.playing_since.is_none() {
                session.playing_since = Some(Instant::now());
            }
            self.schedule_end(handle, session);
        }
        if self.auto_events {
            self.emit_all(
                handle,
                &[
                    NativeEvent::BufferingStarted,
                    NativeEvent::BufferingStopped,
                    NativeEvent::SessionStarted,
                ],
            );
        }
        Ok(())
    }

    async fn pause(&self, handle: MediaHandle) -> Result<(), BridgeError> {
        {
            let mut state = self.state.lock();
            state.record(BridgeCall::Pause(handle));
            let session = state.session_mut(handle)?;
            session.anchor = session.clock_position();
            session.playing_since = None;
            session.cancel_end_timer();
        }
        if self.auto_events {
            self.emit_all(handle, &[NativeEvent::SessionPaused]);
        }
        Ok(())
    }

    async fn seek(&self, handle: MediaHandle, position: Duration) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        state.record(BridgeCall::Seek(handle, position));
        let session = state.session_mut(handle)?;
        session.anchor = position.min(session.media.duration);
        session.scripted_position = None;
        if session.playing_since.is_some() {
            session.playing_since = Some(Instant::now());
        } else if session.ended && self.auto_events {
            // Engines keep running after end of media, so seeking back resumes.
            session.playing_since = Some(Instant::now());
        }
        session.ended = false;
        self.schedule_end(handle, session);
        Ok(())
    }

    async fn set_volume(&self, handle: MediaHandle, volume: f64) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        state.record(BridgeCall::SetVolume(handle, volume));
        let session = state.session_mut(handle)?;
        if !(0.0..=1.0).contains(&volume) {
            return Err(BridgeError::Rejected {
                operation: "set_volume",
                handle,
                message: format!("volume {volume} outside 0.0..=1.0"),
            });
        }
        session.volume = volume;
        Ok(())
    }

    async fn set_playback_speed(
        &self,
        handle: MediaHandle,
        speed: f64,
    ) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        state.record(BridgeCall::SetPlaybackSpeed(handle, speed));
        let session = state.session_mut(handle)?;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(BridgeError::Rejected {
                operation: "set_playback_speed",
                handle,
                message: format!("speed {speed} must be positive"),
            });
        }
        session.reanchor();
        session.speed = speed;
        self.schedule_end(handle, session);
        Ok(())
    }

    async fn get_position(&self, handle: MediaHandle) -> Result<Duration, BridgeError> {
        let mut state = self.state.lock();
        state.record(BridgeCall::GetPosition(handle));
        let session = state.session_mut(handle)?;
        Ok(session.reported_position())
    }

    async fn release(&self, handle: MediaHandle) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        state.record(BridgeCall::Release(handle));
        let mut session = state
            .sessions
            .remove(&handle)
            .ok_or(BridgeError::UnknownHandle { handle })?;
        session.cancel_end_timer();
        Ok(())
    }
}

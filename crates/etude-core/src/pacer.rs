use crate::events::{EventCallback, SessionEvent};
use crate::session_state::{SessionPhase, SessionState};
use etude_ports::audio::AudioDevice;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Raised at a wait point once stop has been requested. Unwinds to teardown.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("session interrupted")]
pub struct Interrupted;

/// Interruptible waits: every sleep in a session goes through here.
pub struct Pacer {
    state: Arc<SessionState>,
    audio: Arc<dyn AudioDevice>,
    events: EventCallback,
    poll: Duration,
}

impl Pacer {
    pub fn new(
        state: Arc<SessionState>,
        audio: Arc<dyn AudioDevice>,
        events: EventCallback,
        poll: Duration,
    ) -> Self {
        Self {
            state,
            audio,
            events,
            poll: poll.max(Duration::from_millis(1)),
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Waits for `duration` of running time. Paused time does not count.
    pub fn rest(&self, duration: Duration) -> Result<(), Interrupted> {
        let mut remaining = duration;
        loop {
            match self.state.phase() {
                SessionPhase::Stopped => return Err(Interrupted),
                SessionPhase::Paused => self.hold()?,
                SessionPhase::Running => {
                    if remaining.is_zero() {
                        return Ok(());
                    }
                    let slice = remaining.min(self.poll);
                    let started = Instant::now();
                    self.state.wait_for_change(slice);
                    remaining = remaining.saturating_sub(started.elapsed());
                }
            }
        }
    }

    /// Zero-length wait: blocks while paused, fails once stopped.
    pub fn checkpoint(&self) -> Result<(), Interrupted> {
        self.rest(Duration::ZERO)
    }

    fn hold(&self) -> Result<(), Interrupted> {
        self.audio.pause_all();
        log::info!("paused");
        (self.events)(&SessionEvent::Paused);

        if self.state.wait_while_paused() == SessionPhase::Stopped {
            return Err(Interrupted);
        }

        self.audio.resume_all();
        log::info!("resumed");
        (self.events)(&SessionEvent::Resumed);
        Ok(())
    }
}

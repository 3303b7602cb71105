use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Running,
    Paused,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Quit,
    BudgetReached,
    ChunkLimit,
}

/// Wall clock that does not advance while paused and freezes once stopped.
#[derive(Clone, Copy, Debug)]
struct PracticeClock {
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
    stopped_at: Option<Instant>,
}

impl PracticeClock {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            paused_at: None,
            paused_total: Duration::ZERO,
            stopped_at: None,
        }
    }

    fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    fn stop(&mut self, now: Instant) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let now = self.stopped_at.map_or(now, |stopped| stopped.min(now));
        let pending = self
            .paused_at
            .map_or(Duration::ZERO, |paused_at| now.saturating_duration_since(paused_at));
        now.saturating_duration_since(self.started)
            .saturating_sub(self.paused_total + pending)
    }
}

struct Inner {
    phase: SessionPhase,
    stop_reason: Option<StopReason>,
    chunks: u64,
    clock: PracticeClock,
}

/// The only state shared between the scheduler and the control listener.
pub struct SessionState {
    inner: Mutex<Inner>,
    changed: Condvar,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                phase: SessionPhase::Running,
                stop_reason: None,
                chunks: 0,
                clock: PracticeClock::new(Instant::now()),
            }),
            changed: Condvar::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase
    }

    pub fn is_stopped(&self) -> bool {
        self.phase() == SessionPhase::Stopped
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.inner.lock().stop_reason
    }

    /// Running becomes Paused and Paused becomes Running; Stopped is terminal.
    pub fn toggle_pause(&self) -> SessionPhase {
        let phase = {
            let mut inner = self.inner.lock();
            let now = Instant::now();
            inner.phase = match inner.phase {
                SessionPhase::Running => {
                    inner.clock.pause(now);
                    SessionPhase::Paused
                }
                SessionPhase::Paused => {
                    inner.clock.resume(now);
                    SessionPhase::Running
                }
                SessionPhase::Stopped => SessionPhase::Stopped,
            };
            inner.phase
        };
        self.changed.notify_all();
        phase
    }

    /// The first reason wins; later requests are ignored.
    pub fn request_stop(&self, reason: StopReason) {
        {
            let mut inner = self.inner.lock();
            if inner.phase == SessionPhase::Stopped {
                return;
            }
            let now = Instant::now();
            inner.clock.resume(now);
            inner.clock.stop(now);
            inner.phase = SessionPhase::Stopped;
            inner.stop_reason = Some(reason);
        }
        self.changed.notify_all();
    }

    /// Practice time so far, excluding pauses.
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().clock.elapsed(Instant::now())
    }

    pub fn chunks_played(&self) -> u64 {
        self.inner.lock().chunks
    }

    pub fn record_chunk(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.chunks += 1;
        inner.chunks
    }

    /// Blocks until the phase is no longer Paused.
    pub fn wait_while_paused(&self) -> SessionPhase {
        let mut inner = self.inner.lock();
        while inner.phase == SessionPhase::Paused {
            self.changed.wait(&mut inner);
        }
        inner.phase
    }

    /// Blocks while Running, for at most `timeout`. Returns early on any phase change.
    pub fn wait_for_change(&self, timeout: Duration) -> SessionPhase {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while inner.phase == SessionPhase::Running {
            if self.changed.wait_until(&mut inner, deadline).timed_out() {
                break;
            }
        }
        inner.phase
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

use crate::config::{ConfigError, SessionConfig};
use crate::drill::DrillScheduler;
use crate::events::{EventCallback, SessionEvent};
use crate::pacer::{Interrupted, Pacer};
use crate::player::Player;
use crate::progression::ProgressionSession;
use crate::session_state::{SessionState, StopReason};
use etude_ports::audio::AudioDevice;
use etude_ports::input::{ControlCallback, ControlSignal, InputListener, InputStream};
use etude_ports::samples::SampleStore;
use etude_ports::speech::Speaker;
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeMode {
    /// Random chunks over the expanded scale.
    Drill,
    /// Chord-by-chord ear training over a progression.
    Progression,
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PracticeMode::Drill => "drill",
            PracticeMode::Progression => "progression",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(StopReason),
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub outcome: SessionOutcome,
    pub chunks: u64,
    /// Practice time, pauses excluded.
    pub elapsed: Duration,
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The devices a session talks to. Input is optional; without it the session runs to its budget.
#[derive(Clone)]
pub struct PracticePorts {
    pub audio: Arc<dyn AudioDevice>,
    pub samples: Arc<dyn SampleStore>,
    pub speaker: Arc<dyn Speaker>,
    pub input: Option<Arc<dyn InputListener>>,
}

enum Plan {
    Drill(DrillScheduler),
    Progression(ProgressionSession),
}

pub struct PracticeApp {
    config: SessionConfig,
    ports: PracticePorts,
    events: EventCallback,
    state: Arc<SessionState>,
}

impl PracticeApp {
    pub fn new(config: SessionConfig, ports: PracticePorts, events: EventCallback) -> Self {
        Self {
            config,
            ports,
            events,
            state: Arc::new(SessionState::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared with whoever needs to pause or stop the session from outside.
    pub fn state(&self) -> Arc<SessionState> {
        self.state.clone()
    }

    /// Runs one session to completion. Only configuration problems are errors;
    /// a quit request ends the session normally.
    pub fn run(&self, mode: PracticeMode, rng: &mut impl Rng) -> Result<SessionSummary, AppError> {
        let plan = match mode {
            PracticeMode::Drill => Plan::Drill(DrillScheduler::new(&self.config)?),
            PracticeMode::Progression => {
                Plan::Progression(ProgressionSession::new(&self.config)?)
            }
        };

        log::info!(
            "{mode} session in {} {} ({})",
            self.config.key_name,
            self.config.tonality,
            self.config.signature
        );
        self.emit(SessionEvent::Started {
            mode,
            key: self.config.key_name.clone(),
            signature: self.config.signature.to_string(),
            tonality: self.config.tonality,
            progression: (mode == PracticeMode::Progression)
                .then(|| self.config.progression.name.clone()),
        });

        let controls = self.start_controls();

        let pacer = Pacer::new(
            self.state.clone(),
            self.ports.audio.clone(),
            self.events.clone(),
            self.config.timing.poll_interval,
        );
        let mut player = Player::new(
            self.ports.audio.clone(),
            self.ports.samples.clone(),
            self.ports.speaker.clone(),
            pacer,
            self.events.clone(),
        )
        .with_voice(self.config.voice, self.config.speech_volume);

        let result = match &plan {
            Plan::Drill(scheduler) => scheduler.run(&mut player, rng),
            Plan::Progression(session) => session.run(&mut player, rng),
        };
        let outcome = self.finish(result);

        self.ports.audio.stop_all();
        if let Some(stream) = controls {
            stream.close();
        }

        let summary = SessionSummary {
            outcome,
            chunks: self.state.chunks_played(),
            elapsed: self.state.elapsed(),
        };
        log::info!(
            "session over: {:?} after {} chunks, {:.0?}",
            summary.outcome,
            summary.chunks,
            summary.elapsed
        );
        self.emit(SessionEvent::Finished(summary.clone()));
        Ok(summary)
    }

    fn finish(&self, result: Result<StopReason, Interrupted>) -> SessionOutcome {
        match result {
            Ok(reason) => {
                self.state.request_stop(reason);
                match self.state.stop_reason() {
                    Some(StopReason::Quit) => SessionOutcome::Quit,
                    _ => SessionOutcome::Completed(reason),
                }
            }
            Err(Interrupted) => {
                log::info!("stopped");
                match self.state.stop_reason() {
                    Some(StopReason::Quit) | None => SessionOutcome::Quit,
                    Some(reason) => SessionOutcome::Completed(reason),
                }
            }
        }
    }

    fn start_controls(&self) -> Option<Box<dyn InputStream>> {
        let input = self.ports.input.as_ref()?;
        let state = self.state.clone();
        let callback: ControlCallback = Arc::new(move |signal| match signal {
            ControlSignal::Toggle => {
                log::debug!("toggle -> {:?}", state.toggle_pause());
            }
            ControlSignal::Quit => {
                log::info!("quit requested");
                state.request_stop(StopReason::Quit);
            }
        });
        match input.listen(callback) {
            Ok(stream) => Some(stream),
            Err(err) => {
                log::warn!("keyboard controls unavailable: {err}");
                None
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        (self.events)(&event);
    }
}

#![allow(dead_code)]

use etude_core::{EventCallback, SessionConfig, SessionEvent};
use etude_ports::audio::{AudioDevice, AudioError, PlaybackHandle};
use etude_ports::input::{ControlCallback, ControlSignal, InputError, InputListener, InputStream};
use etude_ports::samples::{SampleData, SampleError, SampleStore};
use etude_ports::speech::{Speaker, SpeechError};
use etude_ports::storage::PracticeSettings;
use etude_ports::types::{NoteId, Volume01};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Settings that keep every wait at (nearly) zero.
pub fn fast_settings() -> PracticeSettings {
    PracticeSettings {
        key: "C".to_string(),
        tonality: Some("major".to_string()),
        tempo_bpm: 60_000,
        note_seconds: 0.0,
        repeat_rest_seconds: 0.0,
        segment_rest_seconds: 0.0,
        chord_melody_gap_seconds: 0.0,
        poll_interval_ms: 1,
        scale_walk: false,
        chunk_limit: Some(12),
        ..PracticeSettings::default()
    }
}

pub fn config(settings: &PracticeSettings) -> SessionConfig {
    let mut rng = StdRng::seed_from_u64(0);
    SessionConfig::from_settings(settings, &mut rng).unwrap()
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCall {
    Play(String, f32),
    PauseAll,
    ResumeAll,
    StopAll,
}

struct Voice {
    stopped: AtomicBool,
    paused: Arc<AtomicBool>,
}

struct FakeHandle(Arc<Voice>);

impl PlaybackHandle for FakeHandle {
    fn stop(&self) {
        self.0.stopped.store(true, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        !self.0.stopped.load(Ordering::SeqCst) && !self.0.paused.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
    voices: Mutex<Vec<Arc<Voice>>>,
    paused: Arc<AtomicBool>,
}

impl RecordingAudio {
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().clone()
    }

    pub fn played(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                AudioCall::Play(id, _) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                AudioCall::Play(_, volume) => Some(*volume),
                _ => None,
            })
            .collect()
    }

    pub fn sounding(&self) -> usize {
        let paused = self.paused.load(Ordering::SeqCst);
        self.voices
            .lock()
            .iter()
            .filter(|voice| !paused && !voice.stopped.load(Ordering::SeqCst))
            .count()
    }
}

impl AudioDevice for RecordingAudio {
    fn play(&self, note: &NoteId, volume: Volume01) -> Result<Box<dyn PlaybackHandle>, AudioError> {
        self.calls
            .lock()
            .push(AudioCall::Play(note.to_string(), volume.get()));
        let voice = Arc::new(Voice {
            stopped: AtomicBool::new(false),
            paused: self.paused.clone(),
        });
        self.voices.lock().push(voice.clone());
        Ok(Box::new(FakeHandle(voice)))
    }

    fn pause_all(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.calls.lock().push(AudioCall::PauseAll);
    }

    fn resume_all(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.calls.lock().push(AudioCall::ResumeAll);
    }

    fn stop_all(&self) {
        for voice in self.voices.lock().iter() {
            voice.stopped.store(true, Ordering::SeqCst);
        }
        self.calls.lock().push(AudioCall::StopAll);
    }
}

/// Every note has a sample except the ones listed.
#[derive(Default)]
pub struct SampleSet {
    missing: HashSet<String>,
}

impl SampleSet {
    pub fn without(ids: &[&str]) -> Self {
        Self {
            missing: ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl SampleStore for SampleSet {
    fn exists(&self, note: &NoteId) -> bool {
        !self.missing.contains(note.as_str())
    }

    fn load(&self, note: &NoteId) -> Result<SampleData, SampleError> {
        if !self.exists(note) {
            return Err(SampleError::Missing(note.clone()));
        }
        Ok(SampleData {
            sample_rate_hz: 44_100,
            left: Arc::from(vec![0.0; 4]),
            right: Arc::from(vec![0.0; 4]),
        })
    }
}

#[derive(Default)]
pub struct RecordingSpeaker {
    said: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn said(&self) -> Vec<String> {
        self.said.lock().clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn say(&self, text: &str, _volume: Volume01) -> Result<(), SpeechError> {
        self.said.lock().push(text.to_string());
        Ok(())
    }
}

/// Hands the control callback to the test.
#[derive(Default)]
pub struct ManualInput {
    callback: Mutex<Option<ControlCallback>>,
    closed: Arc<AtomicBool>,
}

impl ManualInput {
    pub fn send(&self, signal: ControlSignal) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(signal);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct ManualStream(Arc<AtomicBool>);

impl InputStream for ManualStream {
    fn close(self: Box<Self>) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl InputListener for ManualInput {
    fn listen(&self, cb: ControlCallback) -> Result<Box<dyn InputStream>, InputError> {
        *self.callback.lock() = Some(cb);
        Ok(Box::new(ManualStream(self.closed.clone())))
    }
}

#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn callback(&self) -> EventCallback {
        let events = self.events.clone();
        Arc::new(move |event: &SessionEvent| events.lock().push(event.clone()))
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }
}

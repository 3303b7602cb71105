use crate::events::{EventCallback, SessionEvent};
use crate::pacer::{Interrupted, Pacer};
use etude_domain_scale::Note;
use etude_ports::audio::{AudioDevice, PlaybackHandle};
use etude_ports::samples::SampleStore;
use etude_ports::speech::Speaker;
use etude_ports::types::{NoteId, Volume01};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Handles started together. Dropping stops them.
#[derive(Default)]
pub struct Sounding {
    handles: Vec<Box<dyn PlaybackHandle>>,
}

impl Sounding {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn extend(&mut self, mut other: Sounding) {
        self.handles.append(&mut other.handles);
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Sounding {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.stop();
        }
    }
}

/// Sends notes and speech to the devices. Missing samples are skipped.
pub struct Player {
    audio: Arc<dyn AudioDevice>,
    samples: Arc<dyn SampleStore>,
    speaker: Arc<dyn Speaker>,
    pacer: Pacer,
    events: EventCallback,
    voice: bool,
    speech_volume: Volume01,
    missing: HashSet<NoteId>,
}

impl Player {
    pub fn new(
        audio: Arc<dyn AudioDevice>,
        samples: Arc<dyn SampleStore>,
        speaker: Arc<dyn Speaker>,
        pacer: Pacer,
        events: EventCallback,
    ) -> Self {
        Self {
            audio,
            samples,
            speaker,
            pacer,
            events,
            voice: true,
            speech_volume: Volume01::new(0.7),
            missing: HashSet::new(),
        }
    }

    pub fn with_voice(mut self, voice: bool, speech_volume: Volume01) -> Self {
        self.voice = voice;
        self.speech_volume = speech_volume;
        self
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn emit(&self, event: SessionEvent) {
        (self.events)(&event);
    }

    pub fn rest(&self, duration: Duration) -> Result<(), Interrupted> {
        self.pacer.rest(duration)
    }

    /// Starts every note at once and returns without waiting.
    pub fn strike(&mut self, notes: &[Note], volume: Volume01) -> Sounding {
        let mut sounding = Sounding::default();
        for note in notes {
            let id = note.id();
            if !self.samples.exists(&id) {
                self.report_missing(id);
                continue;
            }
            match self.audio.play(&id, volume) {
                Ok(handle) => sounding.handles.push(handle),
                Err(err) => log::warn!("could not play {id}: {err}"),
            }
        }
        sounding
    }

    /// Sounds `notes` together for `hold`, then cuts them.
    pub fn play(
        &mut self,
        notes: &[Note],
        volume: Volume01,
        hold: Duration,
    ) -> Result<(), Interrupted> {
        self.pacer.checkpoint()?;
        let sounding = self.strike(notes, volume);
        self.pacer.rest(hold)?;
        sounding.stop();
        Ok(())
    }

    /// Prints `text` and speaks `spoken` unless the voice is off. Blocks while speaking.
    pub fn say(&mut self, text: &str, spoken: &str) -> Result<(), Interrupted> {
        self.pacer.checkpoint()?;
        self.emit(SessionEvent::Label {
            text: text.to_string(),
        });
        if self.voice {
            if let Err(err) = self.speaker.say(spoken, self.speech_volume) {
                log::warn!("speech failed: {err}");
            }
        }
        Ok(())
    }

    fn report_missing(&mut self, id: NoteId) {
        if self.missing.insert(id.clone()) {
            log::warn!("no sample for {id}, skipping");
            self.emit(SessionEvent::MissingSample { note: id });
        }
    }
}
